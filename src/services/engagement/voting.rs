//! Toggle-style ballots on proposals and comments.
//!
//! A voter holds at most one ballot per subject. Repeating a vote
//! withdraws it, voting the other way flips the row; the ledger rebuilds
//! the subject's counters in the same transaction either way.

use tracing::debug;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{VoteKind, VoteReceipt};
use crate::domain::ports::{
    BallotRepository, CommentRepository, ExecutionRepository, ProposalRepository,
};

use super::EngagementService;

impl<P, V, C, E> EngagementService<P, V, C, E>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    /// Cast, flip, or withdraw a ballot on a proposal.
    pub async fn vote_on_proposal(
        &self,
        proposal_id: Uuid,
        voter_email: &str,
        kind: VoteKind,
    ) -> DomainResult<VoteReceipt> {
        if !voter_email.contains('@') {
            return Err(DomainError::ValidationFailed(format!(
                "Invalid voter email: {voter_email}"
            )));
        }

        let receipt = self
            .ballots
            .toggle_proposal_vote(proposal_id, voter_email, kind)
            .await?;

        debug!(
            proposal_id = %proposal_id,
            voter = voter_email,
            outcome = ?receipt.outcome,
            "Proposal ballot toggled"
        );
        Ok(receipt)
    }

    /// Cast, flip, or withdraw a ballot on a comment.
    ///
    /// The voter's display name is resolved through the member directory
    /// for the ballot's audit column; lookup failures degrade to the
    /// unknown-member placeholder rather than blocking the vote.
    pub async fn vote_on_comment(
        &self,
        comment_id: Uuid,
        voter_id: Uuid,
        kind: VoteKind,
    ) -> DomainResult<VoteReceipt> {
        let voter_name = self.resolve_author(Some(voter_id), None).await;

        let receipt = self
            .ballots
            .toggle_comment_vote(comment_id, voter_id, &voter_name, kind)
            .await?;

        debug!(
            comment_id = %comment_id,
            voter_id = %voter_id,
            outcome = ?receipt.outcome,
            "Comment ballot toggled"
        );
        Ok(receipt)
    }
}
