//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters implement:
//! - Repositories: SQLite-backed persistence for proposals, ballots,
//!   comments, and execution records
//! - Collaborators: the member directory, image store, and notification
//!   channel the engine talks to but does not own
//!
//! These traits define the contracts that allow the domain to be independent
//! of specific infrastructure implementations.

pub mod ballot_repository;
pub mod comment_repository;
pub mod execution_repository;
pub mod image_store;
pub mod member_directory;
pub mod notifier;
pub mod null_image_store;
pub mod null_member_directory;
pub mod null_notifier;
pub mod proposal_repository;

pub use ballot_repository::BallotRepository;
pub use comment_repository::CommentRepository;
pub use execution_repository::ExecutionRepository;
pub use image_store::{ImageStore, ImageUpload};
pub use member_directory::MemberDirectory;
pub use notifier::NotificationChannel;
pub use null_image_store::NullImageStore;
pub use null_member_directory::NullMemberDirectory;
pub use null_notifier::NullNotificationChannel;
pub use proposal_repository::{ProposalFilter, ProposalRepository};

/// A page request for list queries. Page numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    /// Row offset for this page.
    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.size)
    }

    /// Row limit for this page.
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { number: 1, size: 20 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(Page::new(1, 10).offset(), 0);
        assert_eq!(Page::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_page_clamps_to_one() {
        let page = Page::new(0, 0);
        assert_eq!(page.number, 1);
        assert_eq!(page.size, 1);
    }
}
