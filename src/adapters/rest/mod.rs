//! REST clients for the association's collaborator services.
//!
//! These adapters talk to the member directory and the notification
//! gateway. Both are optional at runtime; callers fall back to the
//! null implementations when no URL is configured.

pub mod member_directory;
pub mod notifier;

pub use member_directory::RestMemberDirectory;
pub use notifier::WebhookNotificationChannel;
