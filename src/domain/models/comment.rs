//! Comment domain model.
//!
//! Comments attach to either a proposal or an execution record and form
//! arbitrarily deep reply trees through a single parent pointer. Storage
//! is flat; trees are rebuilt at read time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a comment (or a whole thread) is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum CommentSubject {
    Proposal(Uuid),
    Execution(Uuid),
}

impl CommentSubject {
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Proposal(_) => "proposal",
            Self::Execution(_) => "execution",
        }
    }

    pub fn subject_id(&self) -> Uuid {
        match self {
            Self::Proposal(id) | Self::Execution(id) => *id,
        }
    }

    /// Rebuild a subject from its stored parts.
    pub fn from_parts(kind: &str, id: Uuid) -> Option<Self> {
        match kind {
            "proposal" => Some(Self::Proposal(id)),
            "execution" => Some(Self::Execution(id)),
            _ => None,
        }
    }
}

/// A single comment in a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier
    pub id: Uuid,
    /// What this comment is attached to
    pub subject: CommentSubject,
    /// Parent comment for replies; None means top-level
    pub parent_id: Option<Uuid>,
    /// Display name of the author
    pub author_name: String,
    /// Member id of the author, when known
    pub author_id: Option<Uuid>,
    /// Comment text
    pub body: String,
    /// Denormalized count of like ballots
    pub likes: i64,
    /// Denormalized count of dislike ballots
    pub dislikes: i64,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new top-level comment.
    pub fn new(subject: CommentSubject, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            subject,
            parent_id: None,
            author_name: String::new(),
            author_id: None,
            body: body.into(),
            likes: 0,
            dislikes: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the author's display name.
    pub fn with_author(mut self, name: impl Into<String>) -> Self {
        self.author_name = name.into();
        self
    }

    /// Set the author's member id.
    pub fn with_member(mut self, member_id: Uuid) -> Self {
        self.author_id = Some(member_id);
        self
    }

    /// Make this a reply to another comment.
    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Check if this is a top-level comment.
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Validate comment.
    pub fn validate(&self) -> Result<(), String> {
        if self.body.trim().is_empty() {
            return Err("Comment body cannot be empty".to_string());
        }
        if self.author_name.trim().is_empty() {
            return Err("Comment author cannot be empty".to_string());
        }
        if self.parent_id == Some(self.id) {
            return Err("Comment cannot reply to itself".to_string());
        }
        Ok(())
    }
}

/// A comment with its reply subtree, assembled at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    pub fn new(comment: Comment) -> Self {
        Self { comment, replies: Vec::new() }
    }

    /// Total number of comments in this subtree, including this node.
    pub fn count(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::count).sum::<usize>()
    }

    /// Maximum depth of this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::depth).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_creation() {
        let subject = CommentSubject::Proposal(Uuid::new_v4());
        let comment = Comment::new(subject, "Count me in").with_author("Mikkel");

        assert!(comment.is_top_level());
        assert_eq!(comment.likes, 0);
        assert!(comment.validate().is_ok());
    }

    #[test]
    fn test_reply_is_not_top_level() {
        let subject = CommentSubject::Execution(Uuid::new_v4());
        let parent = Comment::new(subject, "How did it go?").with_author("Ana");
        let reply = Comment::new(subject, "Great turnout")
            .with_author("Mikkel")
            .with_parent(parent.id);

        assert!(!reply.is_top_level());
        assert_eq!(reply.parent_id, Some(parent.id));
    }

    #[test]
    fn test_subject_parts_round_trip() {
        let id = Uuid::new_v4();
        for subject in [CommentSubject::Proposal(id), CommentSubject::Execution(id)] {
            let rebuilt = CommentSubject::from_parts(subject.kind_str(), subject.subject_id());
            assert_eq!(rebuilt, Some(subject));
        }
        assert_eq!(CommentSubject::from_parts("news", id), None);
    }

    #[test]
    fn test_comment_validation() {
        let subject = CommentSubject::Proposal(Uuid::new_v4());

        let comment = Comment::new(subject, "   ").with_author("Ana");
        assert!(comment.validate().is_err());

        let comment = Comment::new(subject, "Text");
        assert!(comment.validate().is_err());

        let mut comment = Comment::new(subject, "Text").with_author("Ana");
        comment.parent_id = Some(comment.id);
        assert!(comment.validate().is_err());
    }

    #[test]
    fn test_node_count_and_depth() {
        let subject = CommentSubject::Proposal(Uuid::new_v4());
        let mk = |body: &str| Comment::new(subject, body).with_author("A");

        let mut root = CommentNode::new(mk("c1"));
        let mut child = CommentNode::new(mk("c2"));
        child.replies.push(CommentNode::new(mk("c3")));
        root.replies.push(child);
        root.replies.push(CommentNode::new(mk("c4")));

        assert_eq!(root.count(), 4);
        assert_eq!(root.depth(), 3);
    }
}
