//! Decorator chains around the Slack backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use common::{Behavior, Receiver, capture_logs};
use notif::{
    Context, Error, LoggingNotifier, Message, Notifier, Priority, RetryConfig, RetryNotifier,
    SlackConfig, SlackNotifier,
};

fn slack(url: &str) -> SlackNotifier {
    SlackNotifier::new(SlackConfig::new(url)).expect("Failed to build notifier")
}

fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig::new(
        max_retries,
        Duration::from_millis(10),
        Duration::from_millis(40),
    )
}

#[tokio::test]
async fn test_retry_exhausts_against_server_error() {
    let receiver = Receiver::with_status(StatusCode::INTERNAL_SERVER_ERROR).await;
    let notifier = RetryNotifier::new(slack(&receiver.url), fast_retry(2));

    let err = notifier
        .send(&Context::background(), &Message::new("Test Alert", ""))
        .await
        .unwrap_err();

    assert_eq!(receiver.hits(), 3);
    assert!(err.to_string().starts_with("failed after 2 retries"));
    assert!(matches!(err.last_error(), Some(Error::Status { .. })));
    assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn test_retry_recovers_after_transient_failures() {
    let receiver = Receiver::start(Behavior {
        fail_first: 2,
        fail_status: StatusCode::SERVICE_UNAVAILABLE,
        ..Default::default()
    })
    .await;
    let notifier = RetryNotifier::new(LoggingNotifier::new(slack(&receiver.url)), fast_retry(3));

    notifier
        .send(&Context::background(), &Message::new("Test Alert", ""))
        .await
        .expect("third attempt should succeed");

    assert_eq!(receiver.hits(), 3);
}

#[tokio::test]
async fn test_retry_does_not_outlive_deadline() {
    let receiver = Receiver::with_status(StatusCode::BAD_GATEWAY).await;
    let notifier = RetryNotifier::new(
        slack(&receiver.url),
        RetryConfig::new(5, Duration::from_secs(10), Duration::from_secs(60)),
    );

    let ctx = Context::background().with_timeout(Duration::from_millis(300));
    let err = notifier
        .send(&ctx, &Message::new("Test Alert", ""))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DeadlineExceeded));
    assert_eq!(receiver.hits(), 1);
}

#[tokio::test]
async fn test_logging_names_the_wrapped_notifier() {
    let receiver = Receiver::ok().await;
    let (logs, dispatch) = capture_logs();

    let notifier = RetryNotifier::new(
        LoggingNotifier::with_dispatch(slack(&receiver.url), dispatch),
        fast_retry(1),
    );
    let msg = Message::new("Backup finished", "").with_priority(Priority::Low);
    notifier.send(&Context::background(), &msg).await.unwrap();

    let logs = logs.contents();
    assert!(logs.contains("Sending notification"));
    assert!(logs.contains("notifier=Slack"));
    assert!(logs.contains("title=Backup finished"));
    assert!(logs.contains("priority=low"));
    assert!(logs.contains("Notification sent successfully"));
}

#[tokio::test]
async fn test_logging_outside_retry_sees_retry_name() {
    let receiver = Receiver::ok().await;
    let (logs, dispatch) = capture_logs();

    let notifier = LoggingNotifier::with_dispatch(
        RetryNotifier::new(slack(&receiver.url), fast_retry(1)),
        dispatch,
    );
    notifier
        .send(&Context::background(), &Message::new("t", ""))
        .await
        .unwrap();

    assert!(logs.contents().contains("notifier=Retry"));
}

#[tokio::test]
async fn test_logging_preserves_exhaustion_error() {
    let receiver = Receiver::with_status(StatusCode::INTERNAL_SERVER_ERROR).await;
    let (logs, dispatch) = capture_logs();

    let notifier = LoggingNotifier::with_dispatch(
        RetryNotifier::new(slack(&receiver.url), fast_retry(1)),
        dispatch,
    );
    let err = notifier
        .send(&Context::background(), &Message::new("t", ""))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RetriesExhausted { retries: 1, .. }));
    assert!(logs.contents().contains("failed after 1 retries"));
}

#[tokio::test]
async fn test_boxed_chain() {
    let receiver = Receiver::ok().await;

    let base: Box<dyn Notifier> = Box::new(slack(&receiver.url));
    let logged: Box<dyn Notifier> = Box::new(LoggingNotifier::new(base));
    let chain: Box<dyn Notifier> = Box::new(RetryNotifier::new(logged, fast_retry(2)));

    assert_eq!(chain.name(), "Retry");
    chain
        .send(&Context::background(), &Message::new("t", ""))
        .await
        .unwrap();
    assert_eq!(receiver.hits(), 1);
}

#[tokio::test]
async fn test_concurrent_sends_share_one_chain() {
    let receiver = Receiver::ok().await;
    let notifier: Arc<dyn Notifier> = Arc::new(RetryNotifier::new(
        LoggingNotifier::new(slack(&receiver.url)),
        fast_retry(2),
    ));

    let mut handles = Vec::new();
    for i in 0..5 {
        let notifier = notifier.clone();
        handles.push(tokio::spawn(async move {
            let msg = Message::new(format!("Alert {i}"), "");
            notifier.send(&Context::background(), &msg).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(receiver.hits(), 5);

    let titles: Vec<String> = receiver
        .received()
        .iter()
        .map(|r| r.body["attachments"][0]["title"].as_str().unwrap().to_string())
        .collect();
    for i in 0..5 {
        assert!(titles.contains(&format!("Alert {i}")));
    }
}
