//! Proposal repository port.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Proposal, ProposalStatus};

use super::Page;

/// Filter criteria for listing proposals.
#[derive(Debug, Clone, Default)]
pub struct ProposalFilter {
    pub status: Option<ProposalStatus>,
    /// Case-insensitive substring match on title and plan
    pub keyword: Option<String>,
    pub starts_after: Option<NaiveDate>,
    pub ends_before: Option<NaiveDate>,
    pub proposer_email: Option<String>,
}

/// Repository interface for Proposal persistence.
#[async_trait]
pub trait ProposalRepository: Send + Sync {
    /// Create a new proposal.
    async fn create(&self, proposal: &Proposal) -> DomainResult<()>;

    /// Get a proposal by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Proposal>>;

    /// Update an existing proposal.
    async fn update(&self, proposal: &Proposal) -> DomainResult<()>;

    /// Update only the status and updated_at of a proposal.
    async fn update_status(&self, id: Uuid, status: ProposalStatus) -> DomainResult<()>;

    /// List proposals matching a filter, newest first.
    async fn list(&self, filter: ProposalFilter, page: Page) -> DomainResult<Vec<Proposal>>;

    /// Count proposals matching a filter.
    async fn count(&self, filter: ProposalFilter) -> DomainResult<i64>;

    /// Active proposals whose voting window ended strictly before the given day.
    async fn list_overdue(&self, before: NaiveDate) -> DomainResult<Vec<Proposal>>;
}
