//! Shared helpers for the engagement integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use agora::adapters::sqlite::{
    create_migrated_test_pool, SqliteBallotRepository, SqliteCommentRepository,
    SqliteExecutionRepository, SqliteProposalRepository,
};
use agora::services::engagement::NewProposal;
use agora::services::EngagementService;
use agora::{MemberDirectory, Proposal};

pub type TestService = EngagementService<
    SqliteProposalRepository,
    SqliteBallotRepository,
    SqliteCommentRepository,
    SqliteExecutionRepository,
>;

/// Service over a fresh in-memory database with all migrations applied.
pub async fn build_service() -> (SqlitePool, Arc<TestService>) {
    let pool = create_migrated_test_pool().await.expect("test pool");
    let service = EngagementService::new(
        Arc::new(SqliteProposalRepository::new(pool.clone())),
        Arc::new(SqliteBallotRepository::new(pool.clone())),
        Arc::new(SqliteCommentRepository::new(pool.clone())),
        Arc::new(SqliteExecutionRepository::new(pool.clone())),
    );
    (pool, Arc::new(service))
}

/// Same as [`build_service`], with a member directory attached.
pub async fn build_service_with_directory(
    directory: Arc<dyn MemberDirectory>,
) -> (SqlitePool, Arc<TestService>) {
    let pool = create_migrated_test_pool().await.expect("test pool");
    let service = EngagementService::new(
        Arc::new(SqliteProposalRepository::new(pool.clone())),
        Arc::new(SqliteBallotRepository::new(pool.clone())),
        Arc::new(SqliteCommentRepository::new(pool.clone())),
        Arc::new(SqliteExecutionRepository::new(pool.clone())),
    )
    .with_member_directory(directory);
    (pool, Arc::new(service))
}

/// Yesterday's date, for proposals whose window has already closed.
pub fn yesterday() -> NaiveDate {
    Utc::now().date_naive() - chrono::Duration::days(1)
}

/// Today's date.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// A valid submission whose voting window ends on the given day.
pub fn proposal_ending(title: &str, ends_on: NaiveDate) -> NewProposal {
    NewProposal {
        title: title.to_string(),
        plan: format!("Plan for {title}"),
        starts_on: Some(ends_on - chrono::Duration::days(7)),
        ends_on: Some(ends_on),
        proposer_name: "Alex Kim".to_string(),
        proposer_email: "alex@example.com".to_string(),
        image: None,
    }
}

/// Submit a proposal that is still open for voting.
pub async fn submit_open_proposal(service: &TestService, title: &str) -> Proposal {
    service
        .create_proposal(proposal_ending(title, today() + chrono::Duration::days(14)))
        .await
        .expect("create proposal")
}

/// Submit a proposal whose window closed yesterday.
pub async fn submit_overdue_proposal(service: &TestService, title: &str) -> Proposal {
    service
        .create_proposal(proposal_ending(title, yesterday()))
        .await
        .expect("create proposal")
}
