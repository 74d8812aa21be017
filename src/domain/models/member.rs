//! Member directory resolution result.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A member as resolved through the external directory.
///
/// The directory is authoritative for membership data; this engine only
/// keeps what it needs to render names next to engagement records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    /// Directory id
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Profile photo URL, if the member has one
    pub photo_url: Option<String>,
}

impl MemberProfile {
    pub fn new(id: Uuid, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            photo_url: None,
        }
    }
}
