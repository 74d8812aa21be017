//! The move from voting into execution, manual and scheduled.
//!
//! Both paths converge on the same storage write: insert a pending
//! execution record and flip the proposal to in-execution in one
//! transaction. The scheduled path additionally walks the proposal
//! through the transient expired status in memory before that commit,
//! so the expired marker is never persisted on its own.

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ExecutionRecord, Proposal, ProposalStatus};
use crate::domain::ports::{
    BallotRepository, CommentRepository, ExecutionRepository, ProposalRepository,
};

use super::views::ScanReport;
use super::EngagementService;

impl<P, V, C, E> EngagementService<P, V, C, E>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    /// Move a proposal into execution ahead of its window closing.
    ///
    /// Idempotent: a proposal that already owns an execution record gets
    /// that record back unchanged. Completed proposals are rejected.
    pub async fn move_to_execution(&self, proposal_id: Uuid) -> DomainResult<ExecutionRecord> {
        let mut proposal = self
            .proposals
            .get(proposal_id)
            .await?
            .ok_or(DomainError::ProposalNotFound(proposal_id))?;

        if let Some(existing) = self.executions.get_by_proposal(proposal_id).await? {
            if proposal.status == ProposalStatus::Completed {
                return Err(DomainError::InvalidStateTransition {
                    from: proposal.status.as_str().to_string(),
                    to: ProposalStatus::InExecution.as_str().to_string(),
                    reason: "proposal already completed".to_string(),
                });
            }
            debug!(
                proposal_id = %proposal_id,
                execution_id = %existing.id,
                "Proposal already owns an execution record"
            );
            return Ok(existing);
        }

        // The manual move goes straight to in-execution; the expired
        // marker belongs to the scheduled path only.
        let from = proposal.status;
        proposal
            .transition_to(ProposalStatus::InExecution)
            .map_err(|reason| DomainError::InvalidStateTransition {
                from: from.as_str().to_string(),
                to: ProposalStatus::InExecution.as_str().to_string(),
                reason,
            })?;

        let record = ExecutionRecord::new(proposal_id);
        match self.executions.open_for_proposal(&record).await {
            Ok(()) => {}
            Err(e) if e.is_constraint_violation() => {
                // Lost a race against another advance; the winner's record
                // stands.
                if let Some(existing) = self.executions.get_by_proposal(proposal_id).await? {
                    return Ok(existing);
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        }

        info!(
            proposal_id = %proposal_id,
            execution_id = %record.id,
            "Proposal moved into execution"
        );
        self.notify_proposer(
            &proposal,
            &format!("Your proposal \"{}\" is now in execution", proposal.title),
        )
        .await;

        Ok(record)
    }

    /// Move every active proposal whose voting window ended before `today`
    /// into execution.
    ///
    /// Each proposal is its own unit of work; one failure is logged and
    /// counted without touching the rest of the batch.
    pub async fn run_expiry_scan(&self, today: NaiveDate) -> DomainResult<ScanReport> {
        let overdue = self.proposals.list_overdue(today).await?;
        let mut report = ScanReport {
            scanned: overdue.len(),
            ..ScanReport::default()
        };

        for mut proposal in overdue {
            match self.expire_one(&mut proposal).await {
                Ok(()) => report.moved += 1,
                Err(e) => {
                    warn!(
                        proposal_id = %proposal.id,
                        error = %e,
                        "Expiry scan could not move a proposal"
                    );
                    report.failed += 1;
                }
            }
        }

        if report.scanned > 0 {
            info!(
                scanned = report.scanned,
                moved = report.moved,
                failed = report.failed,
                "Expiry scan finished"
            );
        }
        Ok(report)
    }

    /// Walk one overdue proposal through expired into execution.
    async fn expire_one(&self, proposal: &mut Proposal) -> DomainResult<()> {
        for status in [ProposalStatus::Expired, ProposalStatus::InExecution] {
            let from = proposal.status;
            proposal
                .transition_to(status)
                .map_err(|reason| DomainError::InvalidStateTransition {
                    from: from.as_str().to_string(),
                    to: status.as_str().to_string(),
                    reason,
                })?;
        }

        let record = ExecutionRecord::new(proposal.id);
        match self.executions.open_for_proposal(&record).await {
            Ok(()) => {
                self.notify_proposer(
                    proposal,
                    &format!(
                        "Voting on your proposal \"{}\" has closed; it is now in execution",
                        proposal.title
                    ),
                )
                .await;
                Ok(())
            }
            // A manual advance got there first. The end state is the one
            // this scan wanted, so the proposal counts as moved.
            Err(e) if e.is_constraint_violation() => {
                debug!(proposal_id = %proposal.id, "Execution record already present");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Tell the proposer something happened to their proposal. Delivery
    /// failures are logged, never propagated.
    pub(super) async fn notify_proposer(&self, proposal: &Proposal, text: &str) {
        if let Err(e) = self.notifier.send(&proposal.proposer_email, text).await {
            warn!(
                proposal_id = %proposal.id,
                error = %e,
                "Proposer notification failed"
            );
        }
    }
}
