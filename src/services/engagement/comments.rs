//! Append-only comment threads on proposals and executions.
//!
//! Storage is one flat table with a single parent pointer; this module
//! rebuilds arbitrarily deep reply trees at read time.

use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Comment, CommentNode, CommentSubject};
use crate::domain::ports::{
    BallotRepository, CommentRepository, ExecutionRepository, Page, ProposalRepository,
};

use super::views::{CommentView, NewComment};
use super::EngagementService;

/// Display name used when the directory cannot resolve an author.
pub(super) const UNKNOWN_MEMBER: &str = "unknown member";

impl<P, V, C, E> EngagementService<P, V, C, E>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    /// Add a comment to a proposal or execution thread.
    ///
    /// The subject must exist, and a reply's parent must belong to the
    /// same subject. Author resolution through the directory degrades to
    /// the caller-supplied name, then to the unknown-member placeholder.
    pub async fn add_comment(
        &self,
        subject: CommentSubject,
        input: NewComment,
    ) -> DomainResult<Comment> {
        self.ensure_subject_exists(subject).await?;

        if let Some(parent_id) = input.parent_id {
            let parent = self
                .comments
                .get(parent_id)
                .await?
                .ok_or(DomainError::CommentNotFound(parent_id))?;
            if parent.subject != subject {
                return Err(DomainError::ValidationFailed(
                    "Parent comment belongs to a different thread".to_string(),
                ));
            }
        }

        let author_name = self.resolve_author(input.member_id, input.author_name).await;

        let mut comment = Comment::new(subject, input.body).with_author(author_name);
        if let Some(member_id) = input.member_id {
            comment = comment.with_member(member_id);
        }
        if let Some(parent_id) = input.parent_id {
            comment = comment.with_parent(parent_id);
        }

        comment.validate().map_err(DomainError::ValidationFailed)?;
        self.comments.create(&comment).await?;

        debug!(comment_id = %comment.id, subject = ?subject, "Comment added");
        Ok(comment)
    }

    /// One page of top-level comments with their complete reply trees.
    pub async fn comment_thread(
        &self,
        subject: CommentSubject,
        page: Page,
    ) -> DomainResult<Vec<CommentView>> {
        let roots = self.comments.list_top_level(subject, page).await?;
        if roots.is_empty() {
            return Ok(Vec::new());
        }

        // One query for the whole subject, then group replies by parent.
        // list_for_subject is ordered by created_at, so sibling order
        // survives the grouping.
        let mut children: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        for comment in self.comments.list_for_subject(subject).await? {
            if let Some(parent_id) = comment.parent_id {
                children.entry(parent_id).or_default().push(comment);
            }
        }

        Ok(roots
            .into_iter()
            .map(|root| Self::assemble_node(root, &mut children))
            .map(Into::into)
            .collect())
    }

    /// Total comments attached to a subject, replies included.
    pub async fn comment_count(&self, subject: CommentSubject) -> DomainResult<i64> {
        self.comments.count_for_subject(subject).await
    }

    fn assemble_node(comment: Comment, children: &mut HashMap<Uuid, Vec<Comment>>) -> CommentNode {
        let replies = children
            .remove(&comment.id)
            .unwrap_or_default()
            .into_iter()
            .map(|child| Self::assemble_node(child, children))
            .collect();
        CommentNode { comment, replies }
    }

    /// Error unless the commented-on proposal or execution exists.
    pub(crate) async fn ensure_subject_exists(&self, subject: CommentSubject) -> DomainResult<()> {
        match subject {
            CommentSubject::Proposal(id) => {
                self.proposals
                    .get(id)
                    .await?
                    .ok_or(DomainError::ProposalNotFound(id))?;
            }
            CommentSubject::Execution(id) => {
                self.executions
                    .get(id)
                    .await?
                    .ok_or(DomainError::ExecutionNotFound(id))?;
            }
        }
        Ok(())
    }

    /// Resolve an author's display name, degrading on directory trouble.
    pub(super) async fn resolve_author(
        &self,
        member_id: Option<Uuid>,
        fallback: Option<String>,
    ) -> String {
        if let Some(id) = member_id {
            match self.directory.find_by_id(id).await {
                Ok(Some(profile)) => return profile.name,
                Ok(None) => {
                    warn!(member_id = %id, "Author not known to the member directory");
                }
                Err(e) => {
                    warn!(member_id = %id, error = %e, "Member directory lookup failed");
                }
            }
        }

        fallback
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_MEMBER.to_string())
    }
}
