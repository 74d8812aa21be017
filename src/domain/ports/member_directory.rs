//! Member directory port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::MemberProfile;

/// Lookup interface for the external member directory.
///
/// `Ok(None)` means the directory answered but knows no such member;
/// transport failures surface as errors for the caller to absorb. Neither
/// case may block the write that triggered the lookup.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Resolve a member by directory id.
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<MemberProfile>>;

    /// Resolve a member by email.
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<MemberProfile>>;
}
