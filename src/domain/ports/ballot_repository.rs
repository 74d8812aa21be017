//! Ballot ledger port.
//!
//! The ledger owns cast-or-toggle writes and keeps the denormalized
//! counters on the voted subject equal to the live ballot rows. Every
//! toggle and its counter rebuild happen inside a single storage
//! transaction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CommentBallot, ProposalBallot, VoteKind, VoteReceipt, VoteTally};

/// Repository interface for the vote ledgers.
#[async_trait]
pub trait BallotRepository: Send + Sync {
    /// Cast, flip, or withdraw a ballot on a proposal and rebuild its
    /// counters, all in one transaction.
    async fn toggle_proposal_vote(
        &self,
        proposal_id: Uuid,
        voter_email: &str,
        kind: VoteKind,
    ) -> DomainResult<VoteReceipt>;

    /// The voter's current ballot on a proposal, if any.
    async fn find_proposal_vote(
        &self,
        proposal_id: Uuid,
        voter_email: &str,
    ) -> DomainResult<Option<ProposalBallot>>;

    /// Live per-kind counts for a proposal, derived from ballot rows.
    async fn proposal_tally(&self, proposal_id: Uuid) -> DomainResult<VoteTally>;

    /// Cast, flip, or withdraw a ballot on a comment and rebuild its
    /// counters, all in one transaction.
    async fn toggle_comment_vote(
        &self,
        comment_id: Uuid,
        voter_id: Uuid,
        voter_name: &str,
        kind: VoteKind,
    ) -> DomainResult<VoteReceipt>;

    /// The voter's current ballot on a comment, if any.
    async fn find_comment_vote(
        &self,
        comment_id: Uuid,
        voter_id: Uuid,
    ) -> DomainResult<Option<CommentBallot>>;

    /// Live per-kind counts for a comment, derived from ballot rows.
    async fn comment_tally(&self, comment_id: Uuid) -> DomainResult<VoteTally>;
}
