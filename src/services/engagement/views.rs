//! Read-optimized DTOs and write inputs for the engagement service.
//!
//! Conversion only; lifecycle rules live in the domain models and the
//! service submodules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::models::{
    AttendanceEntry, Comment, CommentNode, ExecutionRecord, ExecutionStatus, Proposal,
    ProposalStatus, VoteKind, VoteOutcome, VoteReceipt,
};
use crate::domain::ports::ImageUpload;

// ---------------------------------------------------------------------------
// Write inputs
// ---------------------------------------------------------------------------

/// A proposal submission.
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub title: String,
    pub plan: String,
    /// Defaults to today when absent.
    pub starts_on: Option<NaiveDate>,
    /// Defaults to the window start when absent.
    pub ends_on: Option<NaiveDate>,
    pub proposer_name: String,
    pub proposer_email: String,
    pub image: Option<ImageUpload>,
}

/// An edit to an existing proposal. Absent fields stay untouched.
#[derive(Debug, Clone, Default)]
pub struct ProposalChanges {
    pub title: Option<String>,
    pub plan: Option<String>,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    /// Replacement cover image; the prior one is deleted best-effort.
    pub image: Option<ImageUpload>,
}

/// A comment submission on a proposal or execution.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub body: String,
    /// Display name for authors outside the directory.
    pub author_name: Option<String>,
    /// Directory id; resolved to a display name when present.
    pub member_id: Option<Uuid>,
    /// Parent comment for replies.
    pub parent_id: Option<Uuid>,
}

/// A documentation entry submission.
#[derive(Debug, Clone)]
pub struct NewDocumentation {
    pub title: String,
    pub description: String,
    pub uploader_name: String,
    pub uploader_email: String,
    pub photo: Option<ImageUpload>,
}

/// One roster line handed to `save_attendance`.
#[derive(Debug, Clone)]
pub struct AttendanceInput {
    pub member_id: Uuid,
    pub attended: bool,
    pub note: Option<String>,
}

impl AttendanceInput {
    pub fn present(member_id: Uuid) -> Self {
        Self { member_id, attended: true, note: None }
    }

    pub fn absent(member_id: Uuid) -> Self {
        Self { member_id, attended: false, note: None }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Read views
// ---------------------------------------------------------------------------

/// One proposal in a listing.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalSummary {
    pub id: Uuid,
    pub title: String,
    pub status: ProposalStatus,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub proposer_name: String,
    pub upvotes: i64,
    pub downvotes: i64,
    pub comments: i64,
    pub created_at: DateTime<Utc>,
}

impl ProposalSummary {
    pub fn from_proposal(proposal: &Proposal, comments: i64) -> Self {
        Self {
            id: proposal.id,
            title: proposal.title.clone(),
            status: proposal.status,
            starts_on: proposal.starts_on,
            ends_on: proposal.ends_on,
            proposer_name: proposal.proposer_name.clone(),
            upvotes: proposal.upvotes,
            downvotes: proposal.downvotes,
            comments,
            created_at: proposal.created_at,
        }
    }
}

/// One page of proposal summaries.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalPage {
    pub items: Vec<ProposalSummary>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

/// The execution attached to a proposal, as shown in its detail.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionBrief {
    pub id: Uuid,
    pub status: ExecutionStatus,
    pub note: Option<String>,
}

impl From<&ExecutionRecord> for ExecutionBrief {
    fn from(record: &ExecutionRecord) -> Self {
        Self {
            id: record.id,
            status: record.status,
            note: record.note.clone(),
        }
    }
}

/// Full proposal view with the viewer's ballot and the comment thread.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalDetail {
    pub id: Uuid,
    pub title: String,
    pub plan: String,
    pub status: ProposalStatus,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub image_url: Option<String>,
    pub proposer_name: String,
    pub proposer_email: String,
    pub upvotes: i64,
    pub downvotes: i64,
    /// The requesting voter's current ballot, when a viewer was given.
    pub viewer_vote: Option<VoteKind>,
    pub execution: Option<ExecutionBrief>,
    pub comments: Vec<CommentView>,
    /// All comments on the proposal, replies included.
    pub comment_total: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment with its reply subtree, display-ready.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author_name: String,
    pub author_id: Option<Uuid>,
    pub body: String,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<CommentView>,
}

impl From<CommentNode> for CommentView {
    fn from(node: CommentNode) -> Self {
        let CommentNode { comment, replies } = node;
        Self::from_parts(comment, replies.into_iter().map(Into::into).collect())
    }
}

impl CommentView {
    fn from_parts(comment: Comment, replies: Vec<CommentView>) -> Self {
        Self {
            id: comment.id,
            parent_id: comment.parent_id,
            author_name: comment.author_name,
            author_id: comment.author_id,
            body: comment.body,
            likes: comment.likes,
            dislikes: comment.dislikes,
            created_at: comment.created_at,
            replies,
        }
    }
}

/// Full execution view with roster and documentation.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionView {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub proposal_title: String,
    pub status: ExecutionStatus,
    pub note: Option<String>,
    pub attendance: Vec<AttendanceEntry>,
    pub documentation: Vec<DocumentationView>,
    pub comment_total: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A documentation entry with its photo reference resolved to a URL.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentationView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub uploader_name: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The outcome of a toggle, display-ready.
#[derive(Debug, Clone, Serialize)]
pub struct VoteView {
    pub outcome: &'static str,
    pub kind: Option<VoteKind>,
    pub upvotes: i64,
    pub downvotes: i64,
}

impl From<VoteReceipt> for VoteView {
    fn from(receipt: VoteReceipt) -> Self {
        let (outcome, kind) = match receipt.outcome {
            VoteOutcome::Cast(kind) => ("cast", Some(kind)),
            VoteOutcome::Flipped(kind) => ("flipped", Some(kind)),
            VoteOutcome::Withdrawn => ("withdrawn", None),
        };
        Self {
            outcome,
            kind,
            upvotes: receipt.tally.upvotes,
            downvotes: receipt.tally.downvotes,
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Aggregate result of one expiry scan.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScanReport {
    /// Proposals whose window had elapsed.
    pub scanned: usize,
    /// Proposals moved into execution this scan.
    pub moved: usize,
    /// Proposals the scan could not move.
    pub failed: usize,
}

/// Result of a whole-roster attendance save.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AttendanceReport {
    /// Roster lines persisted.
    pub saved: usize,
    /// Lines dropped because the member could not be resolved.
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CommentSubject, VoteTally};

    #[test]
    fn test_vote_view_from_receipt() {
        let receipt = VoteReceipt {
            outcome: VoteOutcome::Flipped(VoteKind::Down),
            tally: VoteTally { upvotes: 3, downvotes: 2 },
        };
        let view = VoteView::from(receipt);
        assert_eq!(view.outcome, "flipped");
        assert_eq!(view.kind, Some(VoteKind::Down));
        assert_eq!(view.upvotes, 3);

        let receipt = VoteReceipt {
            outcome: VoteOutcome::Withdrawn,
            tally: VoteTally::default(),
        };
        let view = VoteView::from(receipt);
        assert_eq!(view.outcome, "withdrawn");
        assert!(view.kind.is_none());
    }

    #[test]
    fn test_comment_view_keeps_nesting() {
        let subject = CommentSubject::Proposal(Uuid::new_v4());
        let root = Comment::new(subject, "top").with_author("Ana");
        let reply = Comment::new(subject, "nested").with_author("Bo").with_parent(root.id);

        let node = CommentNode {
            comment: root,
            replies: vec![CommentNode::new(reply)],
        };

        let view = CommentView::from(node);
        assert_eq!(view.body, "top");
        assert_eq!(view.replies.len(), 1);
        assert_eq!(view.replies[0].body, "nested");
        assert!(view.replies[0].replies.is_empty());
    }

    #[test]
    fn test_summary_serializes_status_snake_case() {
        let proposal = Proposal::new("T", "P").with_proposer("A", "a@example.com");
        let summary = ProposalSummary::from_proposal(&proposal, 4);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"status\":\"active\""));
        assert!(json.contains("\"comments\":4"));
    }
}
