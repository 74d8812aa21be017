//! Comment repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Comment, CommentSubject};

use super::Page;

/// Repository interface for Comment persistence.
///
/// Threads are append-only; there is no delete.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment.
    async fn create(&self, comment: &Comment) -> DomainResult<()>;

    /// Get a comment by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Comment>>;

    /// Top-level comments for a subject, oldest first, paginated.
    async fn list_top_level(
        &self,
        subject: CommentSubject,
        page: Page,
    ) -> DomainResult<Vec<Comment>>;

    /// Every comment attached to a subject, oldest first.
    ///
    /// Used to rebuild reply trees in memory without one query per node.
    async fn list_for_subject(&self, subject: CommentSubject) -> DomainResult<Vec<Comment>>;

    /// Total comments attached to a subject, replies included.
    async fn count_for_subject(&self, subject: CommentSubject) -> DomainResult<i64>;
}
