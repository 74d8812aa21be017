//! Proposal submission, editing, listing, and the detail view.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CommentSubject, Proposal, ProposalStatus};
use crate::domain::ports::{
    BallotRepository, CommentRepository, ExecutionRepository, ImageUpload, Page, ProposalFilter,
    ProposalRepository,
};

use super::views::{
    ExecutionBrief, NewProposal, ProposalChanges, ProposalDetail, ProposalPage, ProposalSummary,
};
use super::EngagementService;

impl<P, V, C, E> EngagementService<P, V, C, E>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    /// Submit a new proposal.
    ///
    /// The voting window defaults to a single day starting today. A failed
    /// cover image upload is logged and the proposal is created without one.
    pub async fn create_proposal(&self, input: NewProposal) -> DomainResult<Proposal> {
        let NewProposal {
            title,
            plan,
            starts_on,
            ends_on,
            proposer_name,
            proposer_email,
            image,
        } = input;

        let starts = starts_on.unwrap_or_else(|| Utc::now().date_naive());
        let ends = ends_on.unwrap_or(starts);

        let mut proposal = Proposal::new(title, plan)
            .with_window(starts, ends)
            .with_proposer(proposer_name, proposer_email);

        if let Some(upload) = image {
            if let Some(image_ref) = self.store_image(upload, "proposal cover").await {
                proposal = proposal.with_image(image_ref);
            }
        }

        proposal.validate().map_err(DomainError::ValidationFailed)?;
        self.proposals.create(&proposal).await?;

        info!(proposal_id = %proposal.id, title = %proposal.title, "Proposal submitted");
        Ok(proposal)
    }

    /// Edit a proposal's title, plan, window, or cover image.
    ///
    /// Completed proposals are frozen. When the image is replaced the prior
    /// reference is deleted best-effort after the row is written.
    pub async fn update_proposal(
        &self,
        id: Uuid,
        changes: ProposalChanges,
    ) -> DomainResult<Proposal> {
        let mut proposal = self
            .proposals
            .get(id)
            .await?
            .ok_or(DomainError::ProposalNotFound(id))?;

        if proposal.status == ProposalStatus::Completed {
            return Err(DomainError::ValidationFailed(
                "Completed proposals can no longer be edited".to_string(),
            ));
        }

        if let Some(title) = changes.title {
            proposal.title = title;
        }
        if let Some(plan) = changes.plan {
            proposal.plan = plan;
        }
        if let Some(starts_on) = changes.starts_on {
            proposal.starts_on = starts_on;
        }
        if let Some(ends_on) = changes.ends_on {
            proposal.ends_on = ends_on;
        }

        let mut replaced = None;
        if let Some(upload) = changes.image {
            if let Some(image_ref) = self.store_image(upload, "proposal cover").await {
                replaced = proposal.image_ref.replace(image_ref);
            }
        }

        proposal.validate().map_err(DomainError::ValidationFailed)?;
        proposal.updated_at = Utc::now();
        self.proposals.update(&proposal).await?;

        if let Some(old_ref) = replaced {
            self.discard_image(&old_ref).await;
        }

        debug!(proposal_id = %proposal.id, "Proposal updated");
        Ok(proposal)
    }

    /// List proposals matching a filter, newest first, with comment counts.
    pub async fn list_proposals(
        &self,
        filter: ProposalFilter,
        page: Page,
    ) -> DomainResult<ProposalPage> {
        let total = self.proposals.count(filter.clone()).await?;
        let proposals = self.proposals.list(filter, page).await?;

        let mut items = Vec::with_capacity(proposals.len());
        for proposal in &proposals {
            let comments = self
                .comments
                .count_for_subject(CommentSubject::Proposal(proposal.id))
                .await?;
            items.push(ProposalSummary::from_proposal(proposal, comments));
        }

        Ok(ProposalPage {
            items,
            total,
            page: page.number,
            page_size: page.size,
        })
    }

    /// Full proposal view.
    ///
    /// Vote counts are re-tallied from the ballot ledger rather than read
    /// from the denormalized columns; `viewer` selects whose own ballot to
    /// include. The comment thread carries the requested page of top-level
    /// comments with their complete reply trees.
    pub async fn proposal_detail(
        &self,
        id: Uuid,
        viewer: Option<&str>,
        page: Page,
    ) -> DomainResult<ProposalDetail> {
        let proposal = self
            .proposals
            .get(id)
            .await?
            .ok_or(DomainError::ProposalNotFound(id))?;
        let subject = CommentSubject::Proposal(id);

        let tally = self.ballots.proposal_tally(id).await?;
        let viewer_vote = match viewer {
            Some(email) => self
                .ballots
                .find_proposal_vote(id, email)
                .await?
                .map(|ballot| ballot.kind),
            None => None,
        };

        let execution = self.executions.get_by_proposal(id).await?;
        let comments = self.comment_thread(subject, page).await?;
        let comment_total = self.comments.count_for_subject(subject).await?;

        Ok(ProposalDetail {
            id: proposal.id,
            title: proposal.title,
            plan: proposal.plan,
            status: proposal.status,
            starts_on: proposal.starts_on,
            ends_on: proposal.ends_on,
            image_url: proposal
                .image_ref
                .as_deref()
                .map(|image_ref| self.images.resolve_url(image_ref)),
            proposer_name: proposal.proposer_name,
            proposer_email: proposal.proposer_email,
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
            viewer_vote,
            execution: execution.as_ref().map(ExecutionBrief::from),
            comments,
            comment_total,
            created_at: proposal.created_at,
            updated_at: proposal.updated_at,
        })
    }

    /// Store an image, logging instead of failing. Image loss never blocks
    /// the write that carried it.
    pub(super) async fn store_image(&self, upload: ImageUpload, context: &str) -> Option<String> {
        match self.images.save(upload).await {
            Ok(image_ref) => Some(image_ref),
            Err(e) => {
                warn!(context, error = %e, "Image upload failed, continuing without it");
                None
            }
        }
    }

    /// Delete a stored image, logging instead of failing.
    pub(super) async fn discard_image(&self, image_ref: &str) {
        if let Err(e) = self.images.delete(image_ref).await {
            warn!(image_ref, error = %e, "Failed to delete stored image");
        }
    }
}
