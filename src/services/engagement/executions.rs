//! Outcome recording, attendance rosters, and photo documentation.

use std::collections::HashSet;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AttendanceEntry, CommentSubject, DocumentationEntry, ExecutionRecord, ExecutionStatus,
};
use crate::domain::ports::{
    BallotRepository, CommentRepository, ExecutionRepository, ProposalRepository,
};

use super::views::{
    AttendanceInput, AttendanceReport, DocumentationView, ExecutionView, NewDocumentation,
};
use super::EngagementService;

impl<P, V, C, E> EngagementService<P, V, C, E>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    /// The execution record owned by a proposal.
    pub async fn execution_for_proposal(&self, proposal_id: Uuid) -> DomainResult<ExecutionRecord> {
        if self.proposals.get(proposal_id).await?.is_none() {
            return Err(DomainError::ProposalNotFound(proposal_id));
        }
        self.executions
            .get_by_proposal(proposal_id)
            .await?
            .ok_or(DomainError::NoExecutionForProposal(proposal_id))
    }

    /// Full execution view with roster, documentation, and comment count.
    pub async fn execution_view(&self, execution_id: Uuid) -> DomainResult<ExecutionView> {
        let record = self
            .executions
            .get(execution_id)
            .await?
            .ok_or(DomainError::ExecutionNotFound(execution_id))?;
        let proposal = self
            .proposals
            .get(record.proposal_id)
            .await?
            .ok_or(DomainError::ProposalNotFound(record.proposal_id))?;

        let attendance = self.executions.list_attendance(execution_id).await?;
        let documentation = self
            .executions
            .list_documentation(execution_id)
            .await?
            .into_iter()
            .map(|entry| self.documentation_view(entry))
            .collect();
        let comment_total = self
            .comments
            .count_for_subject(CommentSubject::Execution(execution_id))
            .await?;

        Ok(ExecutionView {
            id: record.id,
            proposal_id: record.proposal_id,
            proposal_title: proposal.title,
            status: record.status,
            note: record.note,
            attendance,
            documentation,
            comment_total,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Record the execution's terminal outcome.
    ///
    /// Only pending records accept an outcome; the owning proposal flips
    /// to completed in the same storage transaction. The proposer is told
    /// best-effort afterwards.
    pub async fn update_execution_status(
        &self,
        execution_id: Uuid,
        status: ExecutionStatus,
        note: Option<String>,
    ) -> DomainResult<ExecutionRecord> {
        let mut record = self
            .executions
            .get(execution_id)
            .await?
            .ok_or(DomainError::ExecutionNotFound(execution_id))?;

        let from = record.status;
        record
            .transition_to(status, note)
            .map_err(|reason| DomainError::InvalidStateTransition {
                from: from.as_str().to_string(),
                to: status.as_str().to_string(),
                reason,
            })?;

        self.executions.finalize(&record).await?;

        info!(
            execution_id = %execution_id,
            status = status.as_str(),
            "Execution finalized"
        );

        match self.proposals.get(record.proposal_id).await {
            Ok(Some(proposal)) => {
                let verdict = match status {
                    ExecutionStatus::Success => "completed successfully",
                    ExecutionStatus::Failed => "recorded as failed",
                    ExecutionStatus::Pending => unreachable!("finalize rejects pending"),
                };
                self.notify_proposer(
                    &proposal,
                    &format!("Your proposal \"{}\" was {verdict}", proposal.title),
                )
                .await;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(execution_id = %execution_id, error = %e, "Could not load proposal for notification");
            }
        }

        Ok(record)
    }

    /// Replace the whole attendance roster for an execution.
    ///
    /// Every line is resolved through the member directory; lines the
    /// directory cannot resolve are skipped and logged rather than
    /// failing the save. Duplicate member ids keep their first line.
    pub async fn save_attendance(
        &self,
        execution_id: Uuid,
        roster: &[AttendanceInput],
    ) -> DomainResult<AttendanceReport> {
        if self.executions.get(execution_id).await?.is_none() {
            return Err(DomainError::ExecutionNotFound(execution_id));
        }

        let mut entries = Vec::with_capacity(roster.len());
        let mut seen = HashSet::new();
        let mut skipped = 0usize;

        for line in roster {
            if !seen.insert(line.member_id) {
                continue;
            }
            match self.directory.find_by_id(line.member_id).await {
                Ok(Some(profile)) => {
                    let mut entry =
                        AttendanceEntry::new(execution_id, line.member_id, profile.name);
                    if !line.attended {
                        entry = entry.absent();
                    }
                    if let Some(note) = &line.note {
                        entry = entry.with_note(note.clone());
                    }
                    entries.push(entry);
                }
                Ok(None) => {
                    warn!(
                        member_id = %line.member_id,
                        "Attendance line skipped, member unknown to the directory"
                    );
                    skipped += 1;
                }
                Err(e) => {
                    warn!(
                        member_id = %line.member_id,
                        error = %e,
                        "Attendance line skipped, directory lookup failed"
                    );
                    skipped += 1;
                }
            }
        }

        self.executions
            .replace_attendance(execution_id, &entries)
            .await?;

        info!(
            execution_id = %execution_id,
            saved = entries.len(),
            skipped,
            "Attendance roster replaced"
        );
        Ok(AttendanceReport {
            saved: entries.len(),
            skipped,
        })
    }

    /// Attendance roster for an execution.
    pub async fn attendance(&self, execution_id: Uuid) -> DomainResult<Vec<AttendanceEntry>> {
        if self.executions.get(execution_id).await?.is_none() {
            return Err(DomainError::ExecutionNotFound(execution_id));
        }
        self.executions.list_attendance(execution_id).await
    }

    /// Attach a documentation entry, with an optional photo.
    pub async fn add_documentation(
        &self,
        execution_id: Uuid,
        input: NewDocumentation,
    ) -> DomainResult<DocumentationEntry> {
        if self.executions.get(execution_id).await?.is_none() {
            return Err(DomainError::ExecutionNotFound(execution_id));
        }

        let mut entry = DocumentationEntry::new(execution_id, input.title, input.description)
            .with_uploader(input.uploader_name, input.uploader_email);

        if let Some(upload) = input.photo {
            if let Some(photo_ref) = self.store_image(upload, "documentation photo").await {
                entry = entry.with_photo(photo_ref);
            }
        }

        entry.validate().map_err(DomainError::ValidationFailed)?;
        self.executions.add_documentation(&entry).await?;

        debug!(
            execution_id = %execution_id,
            doc_id = %entry.id,
            "Documentation entry added"
        );
        Ok(entry)
    }

    /// Remove a documentation entry and, best-effort, its stored photo.
    pub async fn remove_documentation(&self, doc_id: Uuid) -> DomainResult<()> {
        let entry = self
            .executions
            .get_documentation(doc_id)
            .await?
            .ok_or(DomainError::DocumentationNotFound(doc_id))?;

        self.executions.delete_documentation(doc_id).await?;

        if let Some(photo_ref) = entry.photo_ref {
            self.discard_image(&photo_ref).await;
        }

        debug!(doc_id = %doc_id, "Documentation entry removed");
        Ok(())
    }

    /// Documentation entries for an execution, newest first.
    pub async fn documentation(&self, execution_id: Uuid) -> DomainResult<Vec<DocumentationView>> {
        if self.executions.get(execution_id).await?.is_none() {
            return Err(DomainError::ExecutionNotFound(execution_id));
        }
        Ok(self
            .executions
            .list_documentation(execution_id)
            .await?
            .into_iter()
            .map(|entry| self.documentation_view(entry))
            .collect())
    }

    fn documentation_view(&self, entry: DocumentationEntry) -> DocumentationView {
        DocumentationView {
            id: entry.id,
            title: entry.title,
            description: entry.description,
            uploader_name: entry.uploader_name,
            photo_url: entry
                .photo_ref
                .as_deref()
                .map(|photo_ref| self.images.resolve_url(photo_ref)),
            created_at: entry.created_at,
        }
    }
}
