use std::time::Duration;

use async_trait::async_trait;
use report::{BotIdentity, ChatId, MessageSink, OutgoingMessage, SecretToken};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::TelegramError;

/// Public Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Connection settings for [`TelegramClient`].
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Base URL without a trailing slash, e.g. `https://api.telegram.org`.
    pub api_base_url: String,
    pub token: SecretToken,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl TelegramConfig {
    /// Settings for the public Bot API with a 30 second timeout.
    pub fn new(token: SecretToken) -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            token,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

// Every Bot API response shares this envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    id: i64,
    username: Option<String>,
}

/// Sends messages through the Telegram Bot API.
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: SecretToken,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            api_base: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    // The token is embedded in the path; this URL must never be logged.
    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token.expose(), method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, TelegramError> {
        debug!(method, "Telegram API request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(err) if status.is_success() => return Err(err.into()),
            Err(_) => {
                return Err(TelegramError::Api {
                    status: status.as_u16(),
                    description: body,
                    retry_after: None,
                })
            }
        };

        match envelope {
            Envelope {
                ok: true,
                result: Some(result),
                ..
            } if status.is_success() => Ok(result),
            Envelope { ok: true, .. } if status.is_success() => Err(TelegramError::Decode(
                serde::de::Error::custom("`ok` response without `result`"),
            )),
            Envelope {
                description,
                parameters,
                ..
            } => Err(TelegramError::Api {
                status: status.as_u16(),
                description: description.unwrap_or_else(|| "no description".to_string()),
                retry_after: parameters
                    .and_then(|p| p.retry_after)
                    .map(Duration::from_secs),
            }),
        }
    }
}

#[async_trait]
impl MessageSink for TelegramClient {
    type Error = TelegramError;

    #[instrument(skip_all)]
    async fn check_connection(&self) -> Result<BotIdentity, TelegramError> {
        let request = self.http.get(self.method_url("getMe"));
        let user: UserDto = self.call("getMe", request).await?;
        Ok(BotIdentity {
            id: user.id,
            username: user.username,
        })
    }

    #[instrument(skip_all, fields(%chat, chars = message.text.chars().count()))]
    async fn send(&self, chat: &ChatId, message: &OutgoingMessage) -> Result<(), TelegramError> {
        let payload = SendMessageRequest {
            chat_id: chat.as_str(),
            text: &message.text,
            parse_mode: message.parse_mode.as_str(),
        };
        let request = self.http.post(self.method_url("sendMessage")).json(&payload);
        let _sent: serde_json::Value = self
            .call("sendMessage", request)
            .await
            .map_err(TelegramError::into_unconfirmed_on_timeout)?;
        Ok(())
    }
}
