//! Engagement service - the coordinator for the proposal lifecycle.
//!
//! The service is a thin layer over the repository ports, split into
//! focused submodules:
//!
//! - **views**: Read-optimized DTOs returned to the outer surfaces
//! - **proposals**: Submission, editing, listing, and the detail view
//! - **voting**: Toggle-style ballots on proposals and comments
//! - **comments**: Append-only threads on proposals and executions
//! - **lifecycle**: The move into execution, manual and scheduled
//! - **executions**: Outcome recording, attendance, and documentation

pub mod views;

mod comments;
mod executions;
mod lifecycle;
mod proposals;
mod voting;

pub use views::{
    AttendanceInput, AttendanceReport, CommentView, DocumentationView, ExecutionBrief,
    ExecutionView, NewComment, NewDocumentation, NewProposal, ProposalChanges, ProposalDetail,
    ProposalPage, ProposalSummary, ScanReport, VoteView,
};

use std::sync::Arc;

use crate::domain::models::EngagementConfig;
use crate::domain::ports::{
    BallotRepository, CommentRepository, ExecutionRepository, ImageStore, MemberDirectory,
    NotificationChannel, NullImageStore, NullMemberDirectory, NullNotificationChannel,
    ProposalRepository,
};

/// Coordinates proposals, ballots, comments, and execution records.
///
/// Generic over the four repository ports; collaborators default to the
/// null implementations and are swapped in through the builder methods.
pub struct EngagementService<P, V, C, E>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    pub(super) proposals: Arc<P>,
    pub(super) ballots: Arc<V>,
    pub(super) comments: Arc<C>,
    pub(super) executions: Arc<E>,

    pub(super) images: Arc<dyn ImageStore>,
    pub(super) directory: Arc<dyn MemberDirectory>,
    pub(super) notifier: Arc<dyn NotificationChannel>,

    pub(super) config: EngagementConfig,
}

impl<P, V, C, E> EngagementService<P, V, C, E>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    pub fn new(proposals: Arc<P>, ballots: Arc<V>, comments: Arc<C>, executions: Arc<E>) -> Self {
        Self {
            proposals,
            ballots,
            comments,
            executions,
            images: Arc::new(NullImageStore),
            directory: Arc::new(NullMemberDirectory),
            notifier: Arc::new(NullNotificationChannel),
            config: EngagementConfig::default(),
        }
    }

    // -- Builder methods --

    /// Attach an image store for cover photos and documentation.
    pub fn with_image_store(mut self, images: Arc<dyn ImageStore>) -> Self {
        self.images = images;
        self
    }

    /// Attach the association's member directory.
    pub fn with_member_directory(mut self, directory: Arc<dyn MemberDirectory>) -> Self {
        self.directory = directory;
        self
    }

    /// Attach a notification channel for proposer updates.
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationChannel>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Override the engagement tuning knobs.
    pub fn with_config(mut self, config: EngagementConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the active configuration.
    pub fn config(&self) -> &EngagementConfig {
        &self.config
    }
}
