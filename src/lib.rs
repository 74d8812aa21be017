//! Agora - Alumni Association Engagement Engine
//!
//! Agora runs the proposal lifecycle for an alumni community: members
//! submit improvement proposals, vote and comment on them, and proposals
//! whose voting window closes become tracked execution records with
//! attendance rosters and photo documentation.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Entities, state machines, and the port
//!   traits the engine depends on
//! - **Service Layer** (`services`): The engagement orchestrator and the
//!   lifecycle daemon
//! - **Adapters** (`adapters`): SQLite persistence, the HTTP API, and the
//!   REST/disk collaborator clients
//! - **Infrastructure** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AttendanceEntry, Comment, CommentNode, CommentSubject, Config, DocumentationEntry,
    ExecutionRecord, ExecutionStatus, Proposal, ProposalStatus, VoteKind, VoteReceipt, VoteTally,
};
pub use domain::ports::{
    BallotRepository, CommentRepository, ExecutionRepository, ImageStore, MemberDirectory,
    NotificationChannel, Page, ProposalFilter, ProposalRepository,
};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{EngagementService, LifecycleDaemon, LifecycleDaemonConfig};
