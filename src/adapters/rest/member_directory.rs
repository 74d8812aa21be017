//! REST client for the association's member directory.
//!
//! Wraps the directory's read-only member API. A `404` or an empty
//! search result maps to `Ok(None)`; only transport and server errors
//! surface as [`DomainError::Collaborator`], and callers are expected
//! to degrade rather than fail the write they were performing.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::MemberProfile;
use crate::domain::ports::MemberDirectory;

/// Wire format of a directory member record.
#[derive(Debug, Deserialize)]
struct MemberRecord {
    id: Uuid,
    name: String,
    email: String,
    #[serde(default)]
    photo_url: Option<String>,
}

impl From<MemberRecord> for MemberProfile {
    fn from(record: MemberRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            photo_url: record.photo_url,
        }
    }
}

/// HTTP client for the member directory service.
#[derive(Debug, Clone)]
pub struct RestMemberDirectory {
    http: Client,
    base_url: String,
}

impl RestMemberDirectory {
    /// Create a client for the directory at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    fn collaborator_error(reason: impl Into<String>) -> DomainError {
        DomainError::Collaborator {
            name: "member-directory".to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl MemberDirectory for RestMemberDirectory {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<MemberProfile>> {
        let url = format!("{}/members/{}", self.base_url, id);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::collaborator_error(format!("member lookup request failed: {e}")))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Self::collaborator_error(format!(
                "member lookup returned {status}: {body}"
            )));
        }

        let record = resp
            .json::<MemberRecord>()
            .await
            .map_err(|e| Self::collaborator_error(format!("member lookup parse failed: {e}")))?;

        Ok(Some(record.into()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<MemberProfile>> {
        let url = format!("{}/members", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| Self::collaborator_error(format!("member search request failed: {e}")))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Self::collaborator_error(format!(
                "member search returned {status}: {body}"
            )));
        }

        let records = resp
            .json::<Vec<MemberRecord>>()
            .await
            .map_err(|e| Self::collaborator_error(format!("member search parse failed: {e}")))?;

        Ok(records.into_iter().next().map(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_find_by_id_returns_profile() {
        let mut server = Server::new_async().await;
        let member_id = Uuid::new_v4();
        let mock = server
            .mock("GET", format!("/members/{member_id}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "id": member_id,
                    "name": "Rita Okafor",
                    "email": "rita@example.com",
                    "photo_url": "https://cdn.example.com/rita.jpg"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let directory = RestMemberDirectory::new(server.url());
        let profile = directory.find_by_id(member_id).await.unwrap().unwrap();

        assert_eq!(profile.name, "Rita Okafor");
        assert_eq!(profile.email, "rita@example.com");
        assert_eq!(profile.photo_url.as_deref(), Some("https://cdn.example.com/rita.jpg"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_find_by_id_maps_404_to_none() {
        let mut server = Server::new_async().await;
        let member_id = Uuid::new_v4();
        server
            .mock("GET", format!("/members/{member_id}").as_str())
            .with_status(404)
            .create_async()
            .await;

        let directory = RestMemberDirectory::new(server.url());
        let profile = directory.find_by_id(member_id).await.unwrap();
        assert!(profile.is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_server_error_is_collaborator_failure() {
        let mut server = Server::new_async().await;
        let member_id = Uuid::new_v4();
        server
            .mock("GET", format!("/members/{member_id}").as_str())
            .with_status(503)
            .with_body("maintenance window")
            .create_async()
            .await;

        let directory = RestMemberDirectory::new(server.url());
        let err = directory.find_by_id(member_id).await.unwrap_err();

        match err {
            DomainError::Collaborator { name, reason } => {
                assert_eq!(name, "member-directory");
                assert!(reason.contains("503"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_find_by_email_takes_first_match() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/members")
            .match_query(mockito::Matcher::UrlEncoded(
                "email".into(),
                "omar@example.com".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!([{
                    "id": Uuid::new_v4(),
                    "name": "Omar Haddad",
                    "email": "omar@example.com"
                }])
                .to_string(),
            )
            .create_async()
            .await;

        let directory = RestMemberDirectory::new(server.url());
        let profile = directory
            .find_by_email("omar@example.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(profile.name, "Omar Haddad");
        assert!(profile.photo_url.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_find_by_email_empty_result_is_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/members")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let directory = RestMemberDirectory::new(server.url());
        let profile = directory.find_by_email("nobody@example.com").await.unwrap();
        assert!(profile.is_none());
    }
}
