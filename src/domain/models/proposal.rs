//! Proposal domain model.
//!
//! A proposal is an initiative suggested by an association member. It
//! carries a voting window, denormalized vote counters, and a lifecycle
//! status that ends in execution and completion.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a proposal in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Open for votes and comments, voting window not yet closed
    Active,
    /// Voting window elapsed; transient marker on the scheduled path
    Expired,
    /// An execution record exists and is being carried out
    InExecution,
    /// The execution reached a terminal outcome
    Completed,
}

impl Default for ProposalStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::InExecution => "in_execution",
            Self::Completed => "completed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "expired" => Some(Self::Expired),
            "in_execution" | "in-execution" => Some(Self::InExecution),
            "completed" | "complete" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Valid transitions from this status.
    pub fn valid_transitions(&self) -> Vec<ProposalStatus> {
        match self {
            Self::Active => vec![Self::Expired, Self::InExecution],
            Self::Expired => vec![Self::InExecution],
            Self::InExecution => vec![Self::Completed],
            Self::Completed => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

/// An initiative proposed by a member, voted on by the community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// Unique identifier
    pub id: Uuid,
    /// Human-readable title
    pub title: String,
    /// What the proposer intends to do
    pub plan: String,
    /// First day of the voting window
    pub starts_on: NaiveDate,
    /// Last day of the voting window (inclusive)
    pub ends_on: NaiveDate,
    /// Reference to an uploaded cover image, if any
    pub image_ref: Option<String>,
    /// Display name of the proposer
    pub proposer_name: String,
    /// Contact email of the proposer
    pub proposer_email: String,
    /// Denormalized count of up ballots; rebuilt from the ledger on write
    pub upvotes: i64,
    /// Denormalized count of down ballots; rebuilt from the ledger on write
    pub downvotes: i64,
    /// Current lifecycle status
    pub status: ProposalStatus,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

impl Proposal {
    /// Create a new proposal with a voting window starting today.
    pub fn new(title: impl Into<String>, plan: impl Into<String>) -> Self {
        let now = Utc::now();
        let today = now.date_naive();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            plan: plan.into(),
            starts_on: today,
            ends_on: today,
            image_ref: None,
            proposer_name: String::new(),
            proposer_email: String::new(),
            upvotes: 0,
            downvotes: 0,
            status: ProposalStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the voting window.
    pub fn with_window(mut self, starts_on: NaiveDate, ends_on: NaiveDate) -> Self {
        self.starts_on = starts_on;
        self.ends_on = ends_on;
        self
    }

    /// Set the proposer.
    pub fn with_proposer(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.proposer_name = name.into();
        self.proposer_email = email.into();
        self
    }

    /// Attach a cover image reference.
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Check if can transition to given status.
    pub fn can_transition_to(&self, new_status: ProposalStatus) -> bool {
        self.status.can_transition_to(new_status)
    }

    /// Transition to new status.
    pub fn transition_to(&mut self, new_status: ProposalStatus) -> Result<(), String> {
        if !self.can_transition_to(new_status) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.status.as_str(),
                new_status.as_str()
            ));
        }

        self.status = new_status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Check if the proposal is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check if the voting window has elapsed relative to the given day.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == ProposalStatus::Active && self.ends_on < today
    }

    /// Validate proposal.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Proposal title cannot be empty".to_string());
        }
        if self.plan.trim().is_empty() {
            return Err("Proposal plan cannot be empty".to_string());
        }
        if self.ends_on < self.starts_on {
            return Err("Voting window cannot end before it starts".to_string());
        }
        if self.proposer_name.trim().is_empty() {
            return Err("Proposer name cannot be empty".to_string());
        }
        if !self.proposer_email.contains('@') {
            return Err(format!("Invalid proposer email: {}", self.proposer_email));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_proposal() -> Proposal {
        Proposal::new("Alumni hiking weekend", "Rent a cabin, organize trails")
            .with_proposer("Dana Petrov", "dana@example.com")
    }

    #[test]
    fn test_proposal_creation() {
        let proposal = valid_proposal();
        assert_eq!(proposal.status, ProposalStatus::Active);
        assert_eq!(proposal.upvotes, 0);
        assert_eq!(proposal.downvotes, 0);
        assert!(proposal.validate().is_ok());
    }

    #[test]
    fn test_scheduled_lifecycle_path() {
        let mut proposal = valid_proposal();

        // Active -> Expired -> InExecution -> Completed
        proposal.transition_to(ProposalStatus::Expired).unwrap();
        proposal.transition_to(ProposalStatus::InExecution).unwrap();
        assert!(!proposal.is_terminal());
        proposal.transition_to(ProposalStatus::Completed).unwrap();
        assert!(proposal.is_terminal());
    }

    #[test]
    fn test_manual_path_skips_expired() {
        let mut proposal = valid_proposal();

        // The manual move goes straight from Active to InExecution.
        assert!(proposal.can_transition_to(ProposalStatus::InExecution));
        proposal.transition_to(ProposalStatus::InExecution).unwrap();
        assert_eq!(proposal.status, ProposalStatus::InExecution);
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut proposal = valid_proposal();
        proposal.status = ProposalStatus::Completed;

        assert!(proposal.transition_to(ProposalStatus::Active).is_err());
        assert!(proposal.transition_to(ProposalStatus::InExecution).is_err());
        assert_eq!(proposal.status, ProposalStatus::Completed);
    }

    #[test]
    fn test_expired_cannot_reopen() {
        let mut proposal = valid_proposal();
        proposal.status = ProposalStatus::Expired;

        assert!(!proposal.can_transition_to(ProposalStatus::Active));
        assert!(proposal.can_transition_to(ProposalStatus::InExecution));
    }

    #[test]
    fn test_is_overdue() {
        let mut proposal = valid_proposal().with_window(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        );
        let day_after = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();

        assert!(proposal.is_overdue(day_after));
        assert!(!proposal.is_overdue(proposal.ends_on));

        // Only Active proposals count as overdue.
        proposal.status = ProposalStatus::InExecution;
        assert!(!proposal.is_overdue(day_after));
    }

    #[test]
    fn test_proposal_validation() {
        let proposal = Proposal::new("", "Plan").with_proposer("A", "a@example.com");
        assert!(proposal.validate().is_err());

        let proposal = Proposal::new("Title", "   ").with_proposer("A", "a@example.com");
        assert!(proposal.validate().is_err());

        let proposal = valid_proposal().with_window(
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        );
        assert!(proposal.validate().is_err());

        let proposal = Proposal::new("Title", "Plan").with_proposer("A", "not-an-email");
        assert!(proposal.validate().is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ProposalStatus::Active,
            ProposalStatus::Expired,
            ProposalStatus::InExecution,
            ProposalStatus::Completed,
        ] {
            assert_eq!(ProposalStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(ProposalStatus::from_str("bogus"), None);
    }
}
