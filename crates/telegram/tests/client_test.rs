use std::time::Duration;

use report::{ChatId, HasRetryPolicy, MessageSink, OutgoingMessage, RetryPolicy, SecretToken};
use serde_json::json;
use telegram::{TelegramClient, TelegramConfig, TelegramError};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123456:fake-token";

fn client_for(base: String) -> TelegramClient {
    TelegramClient::new(TelegramConfig {
        api_base_url: base,
        token: SecretToken::new(TOKEN).unwrap(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn client(server: &MockServer) -> TelegramClient {
    client_for(server.uri())
}

#[tokio::test]
async fn get_me_returns_bot_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/bot{TOKEN}/getMe")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "id": 42, "is_bot": true, "first_name": "CI", "username": "ci_bot" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let bot = client(&server).check_connection().await.unwrap();

    assert_eq!(bot.id, 42);
    assert_eq!(bot.username.as_deref(), Some("ci_bot"));
}

#[tokio::test]
async fn send_message_posts_markdown_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .and(body_json(json!({
            "chat_id": "fake_chat_id",
            "text": "Test message",
            "parse_mode": "Markdown",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "message_id": 7, "date": 1_700_000_000, "text": "Test message" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send(
            &ChatId::new("fake_chat_id").unwrap(),
            &OutgoingMessage::markdown("Test message"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn rejected_message_surfaces_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found",
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .send(&ChatId::new("-1").unwrap(), &OutgoingMessage::markdown("hi"))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Telegram API returned 400: Bad Request: chat not found"
    );
    assert_eq!(err.retry_policy(), RetryPolicy::NonRetryable);
}

#[tokio::test]
async fn flood_control_is_retryable_after_hint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "ok": false,
            "error_code": 429,
            "description": "Too Many Requests: retry after 3",
            "parameters": { "retry_after": 3 },
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .send(&ChatId::new("-1").unwrap(), &OutgoingMessage::markdown("hi"))
        .await
        .unwrap_err();

    assert_eq!(
        err.retry_policy(),
        RetryPolicy::Retryable {
            after: Some(Duration::from_secs(3))
        }
    );
}

#[tokio::test]
async fn non_json_gateway_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/bot{TOKEN}/getMe")))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client(&server).check_connection().await.unwrap_err();

    assert!(matches!(err, TelegramError::Api { status: 502, .. }));
    assert_eq!(err.retry_policy(), RetryPolicy::Retryable { after: None });
}

#[tokio::test]
async fn transport_errors_do_not_leak_the_token() {
    // Bind and drop a listener so the port is closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client_for(base).check_connection().await.unwrap_err();

    assert!(matches!(err, TelegramError::Http(_)));
    assert!(!err.to_string().contains("fake-token"), "{err}");
    assert!(!format!("{err:?}").contains("fake-token"));
}

#[tokio::test]
async fn send_timeout_is_unconfirmed_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(json!({ "ok": true, "result": { "message_id": 8 } })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let slow = TelegramClient::new(TelegramConfig {
        api_base_url: server.uri(),
        token: SecretToken::new(TOKEN).unwrap(),
        timeout: Duration::from_millis(200),
    })
    .unwrap();

    let err = slow
        .send(&ChatId::new("-1").unwrap(), &OutgoingMessage::markdown("hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, TelegramError::Unconfirmed(_)), "{err:?}");
    assert_eq!(err.retry_policy(), RetryPolicy::NonRetryable);
    assert!(!format!("{err:?}").contains("fake-token"));
}
