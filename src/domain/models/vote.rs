//! Vote ledger domain model.
//!
//! Ballots are the single source of truth for engagement counts. A voter
//! holds at most one ballot per subject; repeating the same vote withdraws
//! it and voting the opposite way flips the existing row in place. The
//! denormalized counters on proposals and comments are always rebuilt from
//! live ballot rows, never incremented.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a ballot. Comment surfaces call these like/dislike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteKind {
    Up,
    Down,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "upvote" | "like" => Some(Self::Up),
            "down" | "downvote" | "dislike" => Some(Self::Down),
            _ => None,
        }
    }

    /// The opposite direction.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// What a toggle request should do to the ledger, given the voter's
/// existing ballot on the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    /// No existing ballot: insert one of the requested kind
    Insert,
    /// Existing ballot of the same kind: remove it
    Withdraw,
    /// Existing ballot of the opposite kind: rewrite it in place
    Flip,
}

/// Decide how a vote request changes the ledger.
///
/// This is the whole toggle protocol; both ledgers share it.
pub fn toggle_action(existing: Option<VoteKind>, requested: VoteKind) -> VoteAction {
    match existing {
        None => VoteAction::Insert,
        Some(kind) if kind == requested => VoteAction::Withdraw,
        Some(_) => VoteAction::Flip,
    }
}

/// Outcome of a toggle, reported back to the voter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "kind")]
pub enum VoteOutcome {
    /// A new ballot was recorded
    Cast(VoteKind),
    /// An opposite ballot was rewritten to this kind
    Flipped(VoteKind),
    /// The voter's ballot was removed
    Withdrawn,
}

/// Live counts per direction, derived from ballot rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
}

/// Result of a toggle: what happened plus the post-toggle tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub outcome: VoteOutcome,
    pub tally: VoteTally,
}

/// A member's ballot on a proposal, keyed by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalBallot {
    /// Unique identifier
    pub id: Uuid,
    /// Proposal voted on
    pub proposal_id: Uuid,
    /// Voter identity for this ledger
    pub voter_email: String,
    /// Direction
    pub kind: VoteKind,
    /// When cast or last flipped
    pub created_at: DateTime<Utc>,
}

impl ProposalBallot {
    pub fn new(proposal_id: Uuid, voter_email: impl Into<String>, kind: VoteKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            proposal_id,
            voter_email: voter_email.into(),
            kind,
            created_at: Utc::now(),
        }
    }
}

/// A member's ballot on a comment, keyed by member id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentBallot {
    /// Unique identifier
    pub id: Uuid,
    /// Comment voted on
    pub comment_id: Uuid,
    /// Voter identity for this ledger
    pub voter_id: Uuid,
    /// Display name at vote time, kept for audit
    pub voter_name: String,
    /// Direction
    pub kind: VoteKind,
    /// When cast or last flipped
    pub created_at: DateTime<Utc>,
}

impl CommentBallot {
    pub fn new(
        comment_id: Uuid,
        voter_id: Uuid,
        voter_name: impl Into<String>,
        kind: VoteKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            comment_id,
            voter_id,
            voter_name: voter_name.into(),
            kind,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_on_empty_ledger_inserts() {
        assert_eq!(toggle_action(None, VoteKind::Up), VoteAction::Insert);
        assert_eq!(toggle_action(None, VoteKind::Down), VoteAction::Insert);
    }

    #[test]
    fn test_repeat_vote_withdraws() {
        assert_eq!(
            toggle_action(Some(VoteKind::Up), VoteKind::Up),
            VoteAction::Withdraw
        );
        assert_eq!(
            toggle_action(Some(VoteKind::Down), VoteKind::Down),
            VoteAction::Withdraw
        );
    }

    #[test]
    fn test_opposite_vote_flips() {
        assert_eq!(
            toggle_action(Some(VoteKind::Up), VoteKind::Down),
            VoteAction::Flip
        );
        assert_eq!(
            toggle_action(Some(VoteKind::Down), VoteKind::Up),
            VoteAction::Flip
        );
    }

    #[test]
    fn test_kind_aliases() {
        assert_eq!(VoteKind::from_str("like"), Some(VoteKind::Up));
        assert_eq!(VoteKind::from_str("DISLIKE"), Some(VoteKind::Down));
        assert_eq!(VoteKind::from_str("upvote"), Some(VoteKind::Up));
        assert_eq!(VoteKind::from_str("sideways"), None);
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [VoteKind::Up, VoteKind::Down] {
            assert_eq!(VoteKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(VoteKind::Up.opposite(), VoteKind::Down);
        assert_eq!(VoteKind::Down.opposite(), VoteKind::Up);
    }
}
