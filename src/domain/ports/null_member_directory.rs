//! Null member directory implementation.
//!
//! Used when no directory service is configured. Every lookup resolves to
//! nothing, which downstream code treats as an unknown member.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::MemberProfile;

use super::member_directory::MemberDirectory;

/// A directory that knows no members.
#[derive(Debug, Clone, Default)]
pub struct NullMemberDirectory;

impl NullMemberDirectory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MemberDirectory for NullMemberDirectory {
    async fn find_by_id(&self, _id: Uuid) -> DomainResult<Option<MemberProfile>> {
        Ok(None)
    }

    async fn find_by_email(&self, _email: &str) -> DomainResult<Option<MemberProfile>> {
        Ok(None)
    }
}
