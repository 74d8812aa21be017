//! Execution repository port.
//!
//! Two operations here are deliberately cross-aggregate: opening a record
//! also moves the owning proposal into execution, and finalizing one also
//! completes it. Each pairs both writes in a single transaction so the
//! proposal and its execution can never disagree.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AttendanceEntry, DocumentationEntry, ExecutionRecord};

/// Repository interface for ExecutionRecord persistence.
#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    /// Get an execution record by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<ExecutionRecord>>;

    /// Get the execution record owned by a proposal, if any.
    async fn get_by_proposal(&self, proposal_id: Uuid) -> DomainResult<Option<ExecutionRecord>>;

    /// Insert a pending record and set the owning proposal's status in the
    /// same transaction. The record carries the proposal's target status
    /// already applied by the caller.
    async fn open_for_proposal(&self, record: &ExecutionRecord) -> DomainResult<()>;

    /// Persist a terminal record and complete the owning proposal in the
    /// same transaction.
    async fn finalize(&self, record: &ExecutionRecord) -> DomainResult<()>;

    /// Replace the whole attendance roster for an execution in one
    /// transaction.
    async fn replace_attendance(
        &self,
        execution_id: Uuid,
        entries: &[AttendanceEntry],
    ) -> DomainResult<()>;

    /// Attendance roster for an execution.
    async fn list_attendance(&self, execution_id: Uuid) -> DomainResult<Vec<AttendanceEntry>>;

    /// Append a documentation entry.
    async fn add_documentation(&self, entry: &DocumentationEntry) -> DomainResult<()>;

    /// Get a documentation entry by ID.
    async fn get_documentation(&self, id: Uuid) -> DomainResult<Option<DocumentationEntry>>;

    /// Documentation entries for an execution, newest first.
    async fn list_documentation(&self, execution_id: Uuid)
        -> DomainResult<Vec<DocumentationEntry>>;

    /// Delete a documentation entry.
    async fn delete_documentation(&self, id: Uuid) -> DomainResult<()>;
}
