//! SQLite implementation of the ProposalRepository.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Proposal, ProposalStatus};
use crate::domain::ports::{Page, ProposalFilter, ProposalRepository};

use super::{parse_date, parse_datetime, parse_uuid};

#[derive(Clone)]
pub struct SqliteProposalRepository {
    pool: SqlitePool,
}

impl SqliteProposalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn filter_clauses(filter: &ProposalFilter, query: &mut String, bindings: &mut Vec<String>) {
        if let Some(status) = &filter.status {
            query.push_str(" AND status = ?");
            bindings.push(status.as_str().to_string());
        }
        if let Some(keyword) = &filter.keyword {
            query.push_str(" AND (title LIKE ? OR plan LIKE ?)");
            let pattern = format!("%{keyword}%");
            bindings.push(pattern.clone());
            bindings.push(pattern);
        }
        if let Some(starts_after) = &filter.starts_after {
            query.push_str(" AND starts_on >= ?");
            bindings.push(starts_after.to_string());
        }
        if let Some(ends_before) = &filter.ends_before {
            query.push_str(" AND ends_on <= ?");
            bindings.push(ends_before.to_string());
        }
        if let Some(proposer_email) = &filter.proposer_email {
            query.push_str(" AND proposer_email = ?");
            bindings.push(proposer_email.clone());
        }
    }
}

#[async_trait]
impl ProposalRepository for SqliteProposalRepository {
    async fn create(&self, proposal: &Proposal) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO proposals (id, title, plan, starts_on, ends_on, image_ref,
               proposer_name, proposer_email, upvotes, downvotes, status, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(proposal.id.to_string())
        .bind(&proposal.title)
        .bind(&proposal.plan)
        .bind(proposal.starts_on.to_string())
        .bind(proposal.ends_on.to_string())
        .bind(&proposal.image_ref)
        .bind(&proposal.proposer_name)
        .bind(&proposal.proposer_email)
        .bind(proposal.upvotes)
        .bind(proposal.downvotes)
        .bind(proposal.status.as_str())
        .bind(proposal.created_at.to_rfc3339())
        .bind(proposal.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Proposal>> {
        let row: Option<ProposalRow> = sqlx::query_as("SELECT * FROM proposals WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn update(&self, proposal: &Proposal) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE proposals SET title = ?, plan = ?, starts_on = ?, ends_on = ?,
               image_ref = ?, proposer_name = ?, proposer_email = ?, upvotes = ?, downvotes = ?,
               status = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&proposal.title)
        .bind(&proposal.plan)
        .bind(proposal.starts_on.to_string())
        .bind(proposal.ends_on.to_string())
        .bind(&proposal.image_ref)
        .bind(&proposal.proposer_name)
        .bind(&proposal.proposer_email)
        .bind(proposal.upvotes)
        .bind(proposal.downvotes)
        .bind(proposal.status.as_str())
        .bind(proposal.updated_at.to_rfc3339())
        .bind(proposal.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ProposalNotFound(proposal.id));
        }

        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: ProposalStatus) -> DomainResult<()> {
        let result = sqlx::query("UPDATE proposals SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ProposalNotFound(id));
        }

        Ok(())
    }

    async fn list(&self, filter: ProposalFilter, page: Page) -> DomainResult<Vec<Proposal>> {
        let mut query = String::from("SELECT * FROM proposals WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();
        Self::filter_clauses(&filter, &mut query, &mut bindings);
        query.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut q = sqlx::query_as::<_, ProposalRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }
        q = q.bind(page.limit()).bind(page.offset());

        let rows: Vec<ProposalRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count(&self, filter: ProposalFilter) -> DomainResult<i64> {
        let mut query = String::from("SELECT COUNT(*) FROM proposals WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();
        Self::filter_clauses(&filter, &mut query, &mut bindings);

        let mut q = sqlx::query_as::<_, (i64,)>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let (count,) = q.fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn list_overdue(&self, before: NaiveDate) -> DomainResult<Vec<Proposal>> {
        let rows: Vec<ProposalRow> = sqlx::query_as(
            "SELECT * FROM proposals WHERE status = 'active' AND ends_on < ? ORDER BY ends_on",
        )
        .bind(before.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct ProposalRow {
    id: String,
    title: String,
    plan: String,
    starts_on: String,
    ends_on: String,
    image_ref: Option<String>,
    proposer_name: String,
    proposer_email: String,
    upvotes: i64,
    downvotes: i64,
    status: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ProposalRow> for Proposal {
    type Error = DomainError;

    fn try_from(row: ProposalRow) -> Result<Self, Self::Error> {
        let status = ProposalStatus::from_str(&row.status)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid status: {}", row.status)))?;

        Ok(Proposal {
            id: parse_uuid(&row.id)?,
            title: row.title,
            plan: row.plan,
            starts_on: parse_date(&row.starts_on)?,
            ends_on: parse_date(&row.ends_on)?,
            image_ref: row.image_ref,
            proposer_name: row.proposer_name,
            proposer_email: row.proposer_email,
            upvotes: row.upvotes,
            downvotes: row.downvotes,
            status,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup_test_repo() -> SqliteProposalRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteProposalRepository::new(pool)
    }

    fn sample_proposal(title: &str) -> Proposal {
        Proposal::new(title, "Do something nice for the alumni")
            .with_proposer("Dana Petrov", "dana@example.com")
    }

    #[tokio::test]
    async fn test_create_and_get_proposal() {
        let repo = setup_test_repo().await;
        let proposal = sample_proposal("Spring picnic");

        repo.create(&proposal).await.unwrap();

        let retrieved = repo.get(proposal.id).await.unwrap().unwrap();
        assert_eq!(retrieved.title, "Spring picnic");
        assert_eq!(retrieved.status, ProposalStatus::Active);
        assert_eq!(retrieved.starts_on, proposal.starts_on);
    }

    #[tokio::test]
    async fn test_update_missing_proposal_fails() {
        let repo = setup_test_repo().await;
        let proposal = sample_proposal("Ghost");

        let err = repo.update(&proposal).await.unwrap_err();
        assert!(matches!(err, DomainError::ProposalNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_with_keyword_filter() {
        let repo = setup_test_repo().await;
        repo.create(&sample_proposal("Annual hiking weekend")).await.unwrap();
        repo.create(&sample_proposal("Charity auction")).await.unwrap();

        let filter = ProposalFilter { keyword: Some("hiking".to_string()), ..Default::default() };
        let found = repo.list(filter.clone(), Page::default()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Annual hiking weekend");
        assert_eq!(repo.count(filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_overdue_only_active() {
        let repo = setup_test_repo().await;
        let window_start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let window_end = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

        let overdue = sample_proposal("Overdue").with_window(window_start, window_end);
        let mut already_moved = sample_proposal("Moved").with_window(window_start, window_end);
        already_moved.status = ProposalStatus::InExecution;

        repo.create(&overdue).await.unwrap();
        repo.create(&already_moved).await.unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let found = repo.list_overdue(today).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, overdue.id);

        // Nothing is overdue on the window's last day.
        let found = repo.list_overdue(window_end).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_update_status() {
        let repo = setup_test_repo().await;
        let proposal = sample_proposal("Status change");
        repo.create(&proposal).await.unwrap();

        repo.update_status(proposal.id, ProposalStatus::InExecution).await.unwrap();

        let retrieved = repo.get(proposal.id).await.unwrap().unwrap();
        assert_eq!(retrieved.status, ProposalStatus::InExecution);

        let err = repo.update_status(Uuid::new_v4(), ProposalStatus::Completed).await.unwrap_err();
        assert!(matches!(err, DomainError::ProposalNotFound(_)));
    }

    #[tokio::test]
    async fn test_pagination() {
        let repo = setup_test_repo().await;
        for i in 0..5 {
            repo.create(&sample_proposal(&format!("Proposal {i}"))).await.unwrap();
        }

        let first = repo.list(ProposalFilter::default(), Page::new(1, 2)).await.unwrap();
        let second = repo.list(ProposalFilter::default(), Page::new(2, 2)).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_ne!(first[0].id, second[0].id);
        assert_eq!(repo.count(ProposalFilter::default()).await.unwrap(), 5);
    }
}
