use std::{sync::OnceLock, time::Duration};

use tracing::debug;

use crate::{Error, Result};

/// User agent sent with every webhook request.
pub const USER_AGENT: &str = concat!("notif/", env!("CARGO_PKG_VERSION"));

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Another crate installed a provider first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Build the `reqwest::Client` used by webhook backends.
///
/// A zero `timeout` leaves the client without a per-request timeout; the
/// caller's context still bounds the call.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    install_rustls_provider();

    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if timeout > Duration::ZERO {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))
}
