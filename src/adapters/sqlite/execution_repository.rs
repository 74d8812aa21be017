//! SQLite implementation of the ExecutionRepository.
//!
//! The open and finalize operations write both the execution row and the
//! owning proposal's status in one transaction, so the pair can never be
//! observed half-updated.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AttendanceEntry, DocumentationEntry, ExecutionRecord, ExecutionStatus, ProposalStatus,
};
use crate::domain::ports::ExecutionRepository;

use super::{parse_datetime, parse_uuid};

#[derive(Clone)]
pub struct SqliteExecutionRepository {
    pool: SqlitePool,
}

impl SqliteExecutionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExecutionRepository for SqliteExecutionRepository {
    async fn get(&self, id: Uuid) -> DomainResult<Option<ExecutionRecord>> {
        let row: Option<ExecutionRow> = sqlx::query_as("SELECT * FROM executions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn get_by_proposal(&self, proposal_id: Uuid) -> DomainResult<Option<ExecutionRecord>> {
        let row: Option<ExecutionRow> =
            sqlx::query_as("SELECT * FROM executions WHERE proposal_id = ?")
                .bind(proposal_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn open_for_proposal(&self, record: &ExecutionRecord) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO executions (id, proposal_id, status, note, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(record.id.to_string())
        .bind(record.proposal_id.to_string())
        .bind(record.status.as_str())
        .bind(&record.note)
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("UPDATE proposals SET status = ?, updated_at = ? WHERE id = ?")
            .bind(ProposalStatus::InExecution.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(record.proposal_id.to_string())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DomainError::ProposalNotFound(record.proposal_id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn finalize(&self, record: &ExecutionRecord) -> DomainResult<()> {
        if !record.status.is_terminal() {
            return Err(DomainError::ValidationFailed(format!(
                "Cannot finalize execution in status {}",
                record.status.as_str()
            )));
        }

        let mut tx = self.pool.begin().await?;

        let current: Option<(String,)> =
            sqlx::query_as("SELECT status FROM executions WHERE id = ?")
                .bind(record.id.to_string())
                .fetch_optional(&mut *tx)
                .await?;

        let Some((current_status,)) = current else {
            tx.rollback().await?;
            return Err(DomainError::ExecutionNotFound(record.id));
        };

        // Guard on the stored status so a racing finalize cannot overwrite
        // a terminal outcome.
        let result = sqlx::query(
            r#"UPDATE executions SET status = ?, note = ?, updated_at = ?
               WHERE id = ? AND status = ?"#,
        )
        .bind(record.status.as_str())
        .bind(&record.note)
        .bind(record.updated_at.to_rfc3339())
        .bind(record.id.to_string())
        .bind(ExecutionStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DomainError::InvalidStateTransition {
                from: current_status,
                to: record.status.as_str().to_string(),
                reason: "execution already finalized".to_string(),
            });
        }

        sqlx::query("UPDATE proposals SET status = ?, updated_at = ? WHERE id = ?")
            .bind(ProposalStatus::Completed.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(record.proposal_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn replace_attendance(
        &self,
        execution_id: Uuid,
        entries: &[AttendanceEntry],
    ) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM executions WHERE id = ?")
            .bind(execution_id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            tx.rollback().await?;
            return Err(DomainError::ExecutionNotFound(execution_id));
        }

        sqlx::query("DELETE FROM attendance_entries WHERE execution_id = ?")
            .bind(execution_id.to_string())
            .execute(&mut *tx)
            .await?;

        for entry in entries {
            sqlx::query(
                r#"INSERT INTO attendance_entries (id, execution_id, member_id, member_name,
                   attended, note, created_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(entry.id.to_string())
            .bind(entry.execution_id.to_string())
            .bind(entry.member_id.to_string())
            .bind(&entry.member_name)
            .bind(i64::from(entry.attended))
            .bind(&entry.note)
            .bind(entry.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_attendance(&self, execution_id: Uuid) -> DomainResult<Vec<AttendanceEntry>> {
        let rows: Vec<AttendanceRow> = sqlx::query_as(
            "SELECT * FROM attendance_entries WHERE execution_id = ? ORDER BY member_name",
        )
        .bind(execution_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn add_documentation(&self, entry: &DocumentationEntry) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO documentation_entries (id, execution_id, title, description,
               uploader_name, uploader_email, photo_ref, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(entry.id.to_string())
        .bind(entry.execution_id.to_string())
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(&entry.uploader_name)
        .bind(&entry.uploader_email)
        .bind(&entry.photo_ref)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_documentation(&self, id: Uuid) -> DomainResult<Option<DocumentationEntry>> {
        let row: Option<DocumentationRow> =
            sqlx::query_as("SELECT * FROM documentation_entries WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_documentation(
        &self,
        execution_id: Uuid,
    ) -> DomainResult<Vec<DocumentationEntry>> {
        let rows: Vec<DocumentationRow> = sqlx::query_as(
            "SELECT * FROM documentation_entries WHERE execution_id = ? ORDER BY created_at DESC",
        )
        .bind(execution_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete_documentation(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM documentation_entries WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::DocumentationNotFound(id));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ExecutionRow {
    id: String,
    proposal_id: String,
    status: String,
    note: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ExecutionRow> for ExecutionRecord {
    type Error = DomainError;

    fn try_from(row: ExecutionRow) -> Result<Self, Self::Error> {
        let status = ExecutionStatus::from_str(&row.status)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid status: {}", row.status)))?;

        Ok(ExecutionRecord {
            id: parse_uuid(&row.id)?,
            proposal_id: parse_uuid(&row.proposal_id)?,
            status,
            note: row.note,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: String,
    execution_id: String,
    member_id: String,
    member_name: String,
    attended: i64,
    note: Option<String>,
    created_at: String,
}

impl TryFrom<AttendanceRow> for AttendanceEntry {
    type Error = DomainError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(AttendanceEntry {
            id: parse_uuid(&row.id)?,
            execution_id: parse_uuid(&row.execution_id)?,
            member_id: parse_uuid(&row.member_id)?,
            member_name: row.member_name,
            attended: row.attended != 0,
            note: row.note,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DocumentationRow {
    id: String,
    execution_id: String,
    title: String,
    description: String,
    uploader_name: String,
    uploader_email: String,
    photo_ref: Option<String>,
    created_at: String,
}

impl TryFrom<DocumentationRow> for DocumentationEntry {
    type Error = DomainError;

    fn try_from(row: DocumentationRow) -> Result<Self, Self::Error> {
        Ok(DocumentationEntry {
            id: parse_uuid(&row.id)?,
            execution_id: parse_uuid(&row.execution_id)?,
            title: row.title,
            description: row.description,
            uploader_name: row.uploader_name,
            uploader_email: row.uploader_email,
            photo_ref: row.photo_ref,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteProposalRepository};
    use crate::domain::models::Proposal;
    use crate::domain::ports::ProposalRepository;

    async fn setup() -> (SqliteExecutionRepository, SqliteProposalRepository) {
        let pool = create_migrated_test_pool().await.unwrap();
        (
            SqliteExecutionRepository::new(pool.clone()),
            SqliteProposalRepository::new(pool),
        )
    }

    async fn seed_proposal(repo: &SqliteProposalRepository) -> Proposal {
        let proposal = Proposal::new("Harbor cleanup", "Boats, gloves, bags")
            .with_proposer("Dana", "dana@example.com");
        repo.create(&proposal).await.unwrap();
        proposal
    }

    #[tokio::test]
    async fn test_open_moves_proposal_into_execution() {
        let (executions, proposals) = setup().await;
        let proposal = seed_proposal(&proposals).await;

        let record = ExecutionRecord::new(proposal.id);
        executions.open_for_proposal(&record).await.unwrap();

        let stored = executions.get_by_proposal(proposal.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ExecutionStatus::Pending);

        let proposal = proposals.get(proposal.id).await.unwrap().unwrap();
        assert_eq!(proposal.status, ProposalStatus::InExecution);
    }

    #[tokio::test]
    async fn test_second_open_hits_unique_constraint() {
        let (executions, proposals) = setup().await;
        let proposal = seed_proposal(&proposals).await;

        executions.open_for_proposal(&ExecutionRecord::new(proposal.id)).await.unwrap();
        let err = executions
            .open_for_proposal(&ExecutionRecord::new(proposal.id))
            .await
            .unwrap_err();

        assert!(err.is_constraint_violation());
    }

    #[tokio::test]
    async fn test_finalize_completes_proposal_in_same_transaction() {
        let (executions, proposals) = setup().await;
        let proposal = seed_proposal(&proposals).await;

        let mut record = ExecutionRecord::new(proposal.id);
        executions.open_for_proposal(&record).await.unwrap();

        record
            .transition_to(ExecutionStatus::Success, Some("Went well".to_string()))
            .unwrap();
        executions.finalize(&record).await.unwrap();

        let stored = executions.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ExecutionStatus::Success);
        assert_eq!(stored.note.as_deref(), Some("Went well"));

        let proposal = proposals.get(proposal.id).await.unwrap().unwrap();
        assert_eq!(proposal.status, ProposalStatus::Completed);
    }

    #[tokio::test]
    async fn test_finalize_twice_is_rejected() {
        let (executions, proposals) = setup().await;
        let proposal = seed_proposal(&proposals).await;

        let mut record = ExecutionRecord::new(proposal.id);
        executions.open_for_proposal(&record).await.unwrap();
        record.transition_to(ExecutionStatus::Failed, None).unwrap();
        executions.finalize(&record).await.unwrap();

        // Re-finalizing with a different outcome must not stick.
        let mut again = executions.get(record.id).await.unwrap().unwrap();
        again.status = ExecutionStatus::Success;
        let err = executions.finalize(&again).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));

        let stored = executions.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ExecutionStatus::Failed);
    }

    #[tokio::test]
    async fn test_replace_attendance_is_wholesale() {
        let (executions, proposals) = setup().await;
        let proposal = seed_proposal(&proposals).await;
        let record = ExecutionRecord::new(proposal.id);
        executions.open_for_proposal(&record).await.unwrap();

        let first = vec![
            AttendanceEntry::new(record.id, Uuid::new_v4(), "Ana"),
            AttendanceEntry::new(record.id, Uuid::new_v4(), "Bo"),
        ];
        executions.replace_attendance(record.id, &first).await.unwrap();
        assert_eq!(executions.list_attendance(record.id).await.unwrap().len(), 2);

        let second = vec![AttendanceEntry::new(record.id, Uuid::new_v4(), "Cleo").absent()];
        executions.replace_attendance(record.id, &second).await.unwrap();

        let roster = executions.list_attendance(record.id).await.unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].member_name, "Cleo");
        assert!(!roster[0].attended);
    }

    #[tokio::test]
    async fn test_documentation_lifecycle() {
        let (executions, proposals) = setup().await;
        let proposal = seed_proposal(&proposals).await;
        let record = ExecutionRecord::new(proposal.id);
        executions.open_for_proposal(&record).await.unwrap();

        let entry = DocumentationEntry::new(record.id, "Group photo", "All of us at the harbor")
            .with_uploader("Dana", "dana@example.com")
            .with_photo("img/abc.jpg");
        executions.add_documentation(&entry).await.unwrap();

        let listed = executions.list_documentation(record.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].photo_ref.as_deref(), Some("img/abc.jpg"));

        executions.delete_documentation(entry.id).await.unwrap();
        assert!(executions.list_documentation(record.id).await.unwrap().is_empty());

        let err = executions.delete_documentation(entry.id).await.unwrap_err();
        assert!(matches!(err, DomainError::DocumentationNotFound(_)));
    }
}
