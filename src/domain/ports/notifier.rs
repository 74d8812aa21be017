//! Notification channel port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Outbound notification interface.
///
/// Fire-and-forget: callers log failures and move on. Delivery is never
/// part of a lifecycle transaction.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Send a message to a recipient address.
    async fn send(&self, recipient: &str, text: &str) -> DomainResult<()>;
}
