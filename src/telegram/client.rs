//! Bot API client that posts one message per alert to a fixed chat.

use crate::config::{Config, Credentials};
use crate::error::{Result, TrackerError};
use crate::format;
use crate::tracker::PriceDrop;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use wreq::Client;

/// Delivers price-drop alerts - enables mocking for tests.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one alert. No batching or deduplication happens at this layer.
    async fn notify(&self, drop: &PriceDrop) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API notifier.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    credentials: Credentials,
}

impl TelegramNotifier {
    /// Creates a notifier from the run configuration.
    ///
    /// Fails with [`TrackerError::MissingCredentials`] when the bot token or
    /// chat id is absent.
    pub fn new(config: &Config) -> Result<Self> {
        let credentials = config.telegram_credentials()?;
        Self::with_credentials(credentials, &config.telegram.api_base)
    }

    /// Creates a notifier against an explicit API base URL (for testing).
    pub fn with_credentials(credentials: Credentials, api_base: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TrackerError::Notification(format!("Failed to build client: {}", e)))?;

        Ok(Self { client, api_base: api_base.trim_end_matches('/').to_string(), credentials })
    }

    async fn send_message(&self, text: &str) -> Result<()> {
        // The token is part of the path; never log this URL
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.credentials.bot_token);
        let body = serde_json::to_string(&SendMessage {
            chat_id: &self.credentials.chat_id,
            text,
            parse_mode: "MarkdownV2",
            disable_web_page_preview: false,
        })
        .map_err(|e| TrackerError::Notification(e.to_string()))?;

        debug!("Sending alert to chat {}", self.credentials.chat_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TrackerError::Notification(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                debug!("Failed to read Telegram response body: {}", e);
                String::new()
            }
        };
        debug!("Telegram response status: {}", status);

        let parsed: Option<ApiResponse> = serde_json::from_str(&text).ok();
        match parsed {
            Some(r) if r.ok && status.is_success() => Ok(()),
            Some(ApiResponse { description: Some(desc), .. }) => {
                Err(TrackerError::Notification(format!("Telegram rejected message: {}", desc)))
            }
            _ => Err(TrackerError::Notification(format!("Telegram returned status: {}", status))),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, drop: &PriceDrop) -> Result<()> {
        self.send_message(&format::alert_message(drop)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn creds() -> Credentials {
        Credentials { bot_token: "123:abc".to_string(), chat_id: "@deals".to_string() }
    }

    fn make_drop() -> PriceDrop {
        PriceDrop {
            product_id: "kindle".to_string(),
            name: "Kindle".to_string(),
            url: "https://www.amazon.in/dp/B08N3TCP2F".to_string(),
            old_price: 13999.0,
            new_price: 11999.0,
            currency_symbol: "₹".to_string(),
        }
    }

    #[tokio::test]
    async fn test_notify_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_partial_json(serde_json::json!({
                "chat_id": "@deals",
                "parse_mode": "MarkdownV2"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true, "result": {}})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let notifier = TelegramNotifier::with_credentials(creds(), &mock_server.uri()).unwrap();
        assert!(notifier.notify(&make_drop()).await.is_ok());
    }

    #[tokio::test]
    async fn test_notify_sends_formatted_text() {
        let mock_server = MockServer::start().await;
        let expected = format::alert_message(&make_drop());

        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "text": expected })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let notifier = TelegramNotifier::with_credentials(creds(), &mock_server.uri()).unwrap();
        notifier.notify(&make_drop()).await.unwrap();
    }

    #[tokio::test]
    async fn test_notify_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&mock_server)
            .await;

        let notifier = TelegramNotifier::with_credentials(creds(), &mock_server.uri()).unwrap();
        let err = notifier.notify(&make_drop()).await.unwrap_err();

        assert!(matches!(err, TrackerError::Notification(_)));
        assert!(err.to_string().contains("chat not found"));
    }

    #[tokio::test]
    async fn test_notify_server_error_without_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let notifier = TelegramNotifier::with_credentials(creds(), &mock_server.uri()).unwrap();
        let err = notifier.notify(&make_drop()).await.unwrap_err();
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_notify_unreadable_body_falls_back_to_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(502).set_body_string("<html><h1>502 Bad Gateway</h1></html>"),
            )
            .mount(&mock_server)
            .await;

        let notifier = TelegramNotifier::with_credentials(creds(), &mock_server.uri()).unwrap();
        let err = notifier.notify(&make_drop()).await.unwrap_err();
        assert!(matches!(err, TrackerError::Notification(_)));
        assert!(err.to_string().contains("Telegram returned status: 502"));
    }

    #[tokio::test]
    async fn test_notify_unreachable() {
        let notifier = TelegramNotifier::with_credentials(creds(), "http://127.0.0.1:9").unwrap();
        let err = notifier.notify(&make_drop()).await.unwrap_err();
        assert!(matches!(err, TrackerError::Notification(_)));
    }

    #[tokio::test]
    async fn test_new_requires_credentials() {
        let err = TelegramNotifier::new(&Config::default()).err().unwrap();
        assert!(matches!(err, TrackerError::MissingCredentials("BOT_TOKEN")));
    }

    #[tokio::test]
    async fn test_api_base_trailing_slash() {
        let notifier =
            TelegramNotifier::with_credentials(creds(), "https://api.telegram.org/").unwrap();
        assert_eq!(notifier.api_base, "https://api.telegram.org");
    }
}
