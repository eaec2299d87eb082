//! Notification delivery.

use crate::{error::NotifierError, render::Attachment};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use session_levels::{EconomicIntel, LevelMap};
use std::{fmt::Write, time::Duration};
use tracing::info;
use url::Url;

/// Outbound message for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub ticker: String,
    pub content: String,
    /// RGB status colour taken from the economic intel.
    pub colour: u32,
    pub attachment: Option<Attachment>,
}

impl Notification {
    /// Plain text body listing the anchor, every level and the economic intel.
    pub fn new(
        ticker: &str,
        levels: &LevelMap,
        intel: &EconomicIntel,
        attachment: Option<Attachment>,
    ) -> Self {
        let mut content = format!("**{ticker}** session levels\n");
        for (name, price) in levels.iter_with_anchor() {
            let _ = writeln!(content, "`{name:<6}` {price:.2}");
        }
        content.push('\n');
        content.push_str(&intel.text);

        Self {
            ticker: ticker.to_string(),
            content,
            colour: intel.status.colour(),
            attachment,
        }
    }

    /// JSON body posted to the webhook.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::json!({ "content": self.content })
    }
}

/// Result of a successful delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Posted { status: u16 },
    Logged,
}

/// Delivers a [`Notification`].
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<Delivery, NotifierError>;
}

/// Emits notifications through `tracing`, used when no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<Delivery, NotifierError> {
        info!(
            ticker = %notification.ticker,
            colour = %format!("{:#08x}", notification.colour),
            attachment = ?notification.attachment.as_ref().map(|file| file.file_name.as_str()),
            "{}",
            notification.content
        );
        Ok(Delivery::Logged)
    }
}

/// Posts notifications to an HTTP webhook.
///
/// Text-only notifications are sent as a JSON body, notifications with an attachment as
/// multipart form data with a `payload_json` field and a `file` part.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client, url: Url, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<Delivery, NotifierError> {
        let request = self.client.post(self.url.clone()).timeout(self.timeout);

        let request = match &notification.attachment {
            Some(attachment) => {
                let file = Part::bytes(attachment.bytes.clone())
                    .file_name(attachment.file_name.clone())
                    .mime_str(&attachment.content_type)?;
                request.multipart(
                    Form::new()
                        .text("payload_json", notification.payload().to_string())
                        .part("file", file),
                )
            }
            None => request.json(&notification.payload()),
        };

        let response = request.send().await?.error_for_status()?;

        Ok(Delivery::Posted {
            status: response.status().as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use session_levels::{Bar, IntelStatus, SessionWindow, compute_default_levels};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, body_string_contains, header, method, path},
    };

    fn webhook(server: &MockServer) -> WebhookNotifier {
        WebhookNotifier::new(
            reqwest::Client::new(),
            Url::parse(&format!("{}/webhook", server.uri())).unwrap(),
            Duration::from_secs(5),
        )
    }

    fn levels() -> LevelMap {
        let time = DateTime::from_timestamp(1_709_562_600, 0).unwrap();
        let bars = vec![
            Bar::new(time, 100.0, 105.0, 98.0, 101.0, 1.0),
            Bar::new(time + chrono::Duration::minutes(1), 102.0, 108.0, 101.0, 103.0, 1.0),
            Bar::new(time + chrono::Duration::minutes(2), 101.0, 103.0, 99.0, 100.0, 1.0),
        ];
        compute_default_levels(&SessionWindow::new(&bars).unwrap())
    }

    #[test]
    fn test_notification_content() {
        let intel = EconomicIntel {
            text: "🚩 **CPI** (In 30m)".to_string(),
            status: IntelStatus::Red,
        };

        let notification = Notification::new("ESUSDT", &levels(), &intel, None);

        assert_eq!(
            notification.content,
            "**ESUSDT** session levels\n\
             `P50 H ` 105.00\n\
             `P50 L ` 99.00\n\
             `P75 H ` 108.00\n\
             `P75 L ` 98.00\n\
             `P90 H ` 108.00\n\
             `P90 L ` 98.00\n\
             `ANCHOR` 100.00\n\
             \n\
             🚩 **CPI** (In 30m)"
        );
        assert_eq!(notification.colour, 0xe74c3c);
        assert_eq!(notification.ticker, "ESUSDT");
    }

    #[test]
    fn test_notification_payload() {
        let notification =
            Notification::new("ESUSDT", &levels(), &EconomicIntel::no_news(), None);

        let payload = notification.payload();

        assert_eq!(payload["content"], notification.content.as_str());
        assert_eq!(payload.as_object().map(|object| object.len()), Some(1));
    }

    #[tokio::test]
    async fn test_log_notifier() {
        let notification =
            Notification::new("ESUSDT", &levels(), &EconomicIntel::no_news(), None);

        assert_eq!(LogNotifier.notify(&notification).await, Ok(Delivery::Logged));
    }

    #[tokio::test]
    async fn test_webhook_notifier_posts_json() {
        let notification =
            Notification::new("ESUSDT", &levels(), &EconomicIntel::no_news(), None);

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .and(header("content-type", "application/json"))
            .and(body_json(notification.payload()))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let actual = webhook(&server).notify(&notification).await;

        assert_eq!(actual, Ok(Delivery::Posted { status: 204 }));
    }

    #[tokio::test]
    async fn test_webhook_notifier_posts_multipart_with_attachment() {
        let attachment = Attachment {
            file_name: "esusdt_levels.csv".to_string(),
            content_type: "text/csv".to_string(),
            bytes: b"time,open\n".to_vec(),
        };
        let notification = Notification::new(
            "ESUSDT",
            &levels(),
            &EconomicIntel::no_news(),
            Some(attachment),
        );

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .and(body_string_contains("name=\"payload_json\""))
            .and(body_string_contains("name=\"file\"; filename=\"esusdt_levels.csv\""))
            .and(body_string_contains("time,open"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let actual = webhook(&server).notify(&notification).await;

        assert_eq!(actual, Ok(Delivery::Posted { status: 200 }));

        let requests = server.received_requests().await.unwrap();
        let content_type = requests[0].headers.get("content-type").unwrap();
        assert!(
            content_type
                .to_str()
                .unwrap()
                .starts_with("multipart/form-data; boundary=")
        );
    }

    #[tokio::test]
    async fn test_webhook_notifier_error_status() {
        let notification =
            Notification::new("ESUSDT", &levels(), &EconomicIntel::no_news(), None);

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let actual = webhook(&server).notify(&notification).await;

        assert_eq!(
            actual,
            Err(NotifierError::Status {
                status: 500,
                url: format!("{}/webhook", server.uri()),
            })
        );
    }
}
