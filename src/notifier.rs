use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("delivery failed with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Delivers a rendered message to a channel. One attempt per call.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, channel: &str, text: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

pub struct TelegramNotifier {
    send_url: String,
    http_client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str) -> Self {
        Self::with_api_url(TELEGRAM_API_URL, bot_token)
    }

    pub fn with_api_url(api_url: &str, bot_token: &str) -> Self {
        Self {
            send_url: format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), bot_token),
            http_client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        let payload = SendMessage {
            chat_id: channel,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response = self.http_client.post(&self.send_url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        info!(channel = %channel, "Dry run, message not sent:\n{}", text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_url() {
        let notifier = TelegramNotifier::with_api_url("https://api.telegram.org/", "123:abc");
        assert_eq!(
            notifier.send_url,
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_payload_shape() {
        let payload = SendMessage {
            chat_id: "-100123",
            text: "<b>hi</b>",
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "chat_id": "-100123",
                "text": "<b>hi</b>",
                "parse_mode": "HTML",
                "disable_web_page_preview": true
            })
        );
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        assert!(LogNotifier.notify("-100123", "text").await.is_ok());
    }
}
