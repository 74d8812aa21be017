//! Execution domain model.
//!
//! When a proposal leaves its voting window it gains exactly one execution
//! record tracking how the initiative is carried out, together with an
//! attendance roster and photo documentation of the outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of an execution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Opened, outcome not yet recorded
    Pending,
    /// Initiative carried out successfully
    Success,
    /// Initiative abandoned or failed
    Failed,
}

impl Default for ExecutionStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "success" | "succeeded" => Some(Self::Success),
            "failed" | "failure" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    /// Valid transitions from this status.
    pub fn valid_transitions(&self) -> Vec<ExecutionStatus> {
        match self {
            Self::Pending => vec![Self::Success, Self::Failed],
            Self::Success | Self::Failed => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

/// Tracks how a single proposal's initiative is carried out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Unique identifier
    pub id: Uuid,
    /// Owning proposal; at most one record per proposal
    pub proposal_id: Uuid,
    /// Current status
    pub status: ExecutionStatus,
    /// Free-text outcome note, set when finalized
    pub note: Option<String>,
    /// When opened
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

impl ExecutionRecord {
    /// Open a new pending record for a proposal.
    pub fn new(proposal_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            proposal_id,
            status: ExecutionStatus::default(),
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if can transition to given status.
    pub fn can_transition_to(&self, new_status: ExecutionStatus) -> bool {
        self.status.can_transition_to(new_status)
    }

    /// Transition to new status, recording an outcome note.
    pub fn transition_to(
        &mut self,
        new_status: ExecutionStatus,
        note: Option<String>,
    ) -> Result<(), String> {
        if !self.can_transition_to(new_status) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.status.as_str(),
                new_status.as_str()
            ));
        }

        self.status = new_status;
        if note.is_some() {
            self.note = note;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Check if the record reached a terminal outcome.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// One member on an execution's attendance roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    /// Unique identifier
    pub id: Uuid,
    /// Owning execution
    pub execution_id: Uuid,
    /// Member id resolved through the directory
    pub member_id: Uuid,
    /// Member display name at roster time
    pub member_name: String,
    /// Whether the member showed up
    pub attended: bool,
    /// Optional remark
    pub note: Option<String>,
    /// When recorded
    pub created_at: DateTime<Utc>,
}

impl AttendanceEntry {
    pub fn new(execution_id: Uuid, member_id: Uuid, member_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            execution_id,
            member_id,
            member_name: member_name.into(),
            attended: true,
            note: None,
            created_at: Utc::now(),
        }
    }

    /// Mark the member as absent.
    pub fn absent(mut self) -> Self {
        self.attended = false;
        self
    }

    /// Attach a remark.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A photo-backed documentation entry for an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationEntry {
    /// Unique identifier
    pub id: Uuid,
    /// Owning execution
    pub execution_id: Uuid,
    /// Short caption
    pub title: String,
    /// What the entry documents
    pub description: String,
    /// Display name of the uploader
    pub uploader_name: String,
    /// Contact email of the uploader
    pub uploader_email: String,
    /// Reference to the uploaded photo, if any
    pub photo_ref: Option<String>,
    /// When uploaded
    pub created_at: DateTime<Utc>,
}

impl DocumentationEntry {
    pub fn new(
        execution_id: Uuid,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            execution_id,
            title: title.into(),
            description: description.into(),
            uploader_name: String::new(),
            uploader_email: String::new(),
            photo_ref: None,
            created_at: Utc::now(),
        }
    }

    /// Set the uploader.
    pub fn with_uploader(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.uploader_name = name.into();
        self.uploader_email = email.into();
        self
    }

    /// Attach a photo reference.
    pub fn with_photo(mut self, photo_ref: impl Into<String>) -> Self {
        self.photo_ref = Some(photo_ref.into());
        self
    }

    /// Validate documentation entry.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Documentation title cannot be empty".to_string());
        }
        if self.uploader_name.trim().is_empty() {
            return Err("Uploader name cannot be empty".to_string());
        }
        if !self.uploader_email.contains('@') {
            return Err(format!("Invalid uploader email: {}", self.uploader_email));
        }
        Ok(())
    }
}
