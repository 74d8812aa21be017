//! Null notification channel implementation.
//!
//! Used when no webhook is configured; messages are dropped silently.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

use super::notifier::NotificationChannel;

/// A notification channel that delivers nothing.
#[derive(Debug, Clone, Default)]
pub struct NullNotificationChannel;

impl NullNotificationChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationChannel for NullNotificationChannel {
    async fn send(&self, _recipient: &str, _text: &str) -> DomainResult<()> {
        Ok(())
    }
}
