pub mod comment;
pub mod config;
pub mod execution;
pub mod member;
pub mod proposal;
pub mod vote;

pub use comment::{Comment, CommentNode, CommentSubject};
pub use config::{
    ApiConfig, CollaboratorConfig, Config, DatabaseConfig, EngagementConfig, LoggingConfig,
    SchedulerConfig,
};
pub use execution::{AttendanceEntry, DocumentationEntry, ExecutionRecord, ExecutionStatus};
pub use member::MemberProfile;
pub use proposal::{Proposal, ProposalStatus};
pub use vote::{
    toggle_action, CommentBallot, ProposalBallot, VoteAction, VoteKind, VoteOutcome, VoteReceipt,
    VoteTally,
};
