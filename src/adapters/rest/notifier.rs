//! Webhook-based notification channel.
//!
//! Posts a small JSON payload to a configured gateway URL. Delivery is
//! fire-and-forget from the domain's point of view; senders log failures
//! and move on.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::NotificationChannel;

#[derive(Debug, Serialize)]
struct NotificationPayload<'a> {
    recipient: &'a str,
    text: &'a str,
}

/// Notification channel that POSTs messages to a webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotificationChannel {
    http: Client,
    url: String,
}

impl WebhookNotificationChannel {
    /// Create a channel delivering to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl NotificationChannel for WebhookNotificationChannel {
    async fn send(&self, recipient: &str, text: &str) -> DomainResult<()> {
        let payload = NotificationPayload { recipient, text };

        let resp = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DomainError::Collaborator {
                name: "notifier".to_string(),
                reason: format!("notification request failed: {e}"),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Collaborator {
                name: "notifier".to_string(),
                reason: format!("notification returned {status}: {body}"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_send_posts_json_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/hooks/agora")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "recipient": "dana@example.com",
                "text": "Your proposal moved into execution"
            })))
            .with_status(202)
            .create_async()
            .await;

        let channel = WebhookNotificationChannel::new(format!("{}/hooks/agora", server.url()));
        channel
            .send("dana@example.com", "Your proposal moved into execution")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_surfaces_gateway_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/hooks/agora")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let channel = WebhookNotificationChannel::new(format!("{}/hooks/agora", server.url()));
        let err = channel.send("dana@example.com", "hello").await.unwrap_err();

        match err {
            DomainError::Collaborator { name, reason } => {
                assert_eq!(name, "notifier");
                assert!(reason.contains("500"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
