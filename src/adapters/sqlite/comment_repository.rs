//! SQLite implementation of the CommentRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Comment, CommentSubject};
use crate::domain::ports::{CommentRepository, Page};

use super::{parse_datetime, parse_optional_uuid, parse_uuid};

#[derive(Clone)]
pub struct SqliteCommentRepository {
    pool: SqlitePool,
}

impl SqliteCommentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn create(&self, comment: &Comment) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO comments (id, subject_kind, subject_id, parent_id, author_name,
               author_id, body, likes, dislikes, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(comment.id.to_string())
        .bind(comment.subject.kind_str())
        .bind(comment.subject.subject_id().to_string())
        .bind(comment.parent_id.map(|id| id.to_string()))
        .bind(&comment.author_name)
        .bind(comment.author_id.map(|id| id.to_string()))
        .bind(&comment.body)
        .bind(comment.likes)
        .bind(comment.dislikes)
        .bind(comment.created_at.to_rfc3339())
        .bind(comment.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Comment>> {
        let row: Option<CommentRow> = sqlx::query_as("SELECT * FROM comments WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_top_level(
        &self,
        subject: CommentSubject,
        page: Page,
    ) -> DomainResult<Vec<Comment>> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            r#"SELECT * FROM comments
               WHERE subject_kind = ? AND subject_id = ? AND parent_id IS NULL
               ORDER BY created_at LIMIT ? OFFSET ?"#,
        )
        .bind(subject.kind_str())
        .bind(subject.subject_id().to_string())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_for_subject(&self, subject: CommentSubject) -> DomainResult<Vec<Comment>> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            r#"SELECT * FROM comments
               WHERE subject_kind = ? AND subject_id = ?
               ORDER BY created_at"#,
        )
        .bind(subject.kind_str())
        .bind(subject.subject_id().to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_for_subject(&self, subject: CommentSubject) -> DomainResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM comments WHERE subject_kind = ? AND subject_id = ?",
        )
        .bind(subject.kind_str())
        .bind(subject.subject_id().to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: String,
    subject_kind: String,
    subject_id: String,
    parent_id: Option<String>,
    author_name: String,
    author_id: Option<String>,
    body: String,
    likes: i64,
    dislikes: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CommentRow> for Comment {
    type Error = DomainError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        let subject_id = parse_uuid(&row.subject_id)?;
        let subject = CommentSubject::from_parts(&row.subject_kind, subject_id).ok_or_else(|| {
            DomainError::SerializationError(format!("Invalid subject kind: {}", row.subject_kind))
        })?;

        Ok(Comment {
            id: parse_uuid(&row.id)?,
            subject,
            parent_id: parse_optional_uuid(row.parent_id)?,
            author_name: row.author_name,
            author_id: parse_optional_uuid(row.author_id)?,
            body: row.body,
            likes: row.likes,
            dislikes: row.dislikes,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup_test_repo() -> SqliteCommentRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteCommentRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_comment() {
        let repo = setup_test_repo().await;
        let subject = CommentSubject::Proposal(Uuid::new_v4());
        let comment = Comment::new(subject, "Count me in").with_author("Ana");

        repo.create(&comment).await.unwrap();

        let retrieved = repo.get(comment.id).await.unwrap().unwrap();
        assert_eq!(retrieved.body, "Count me in");
        assert_eq!(retrieved.subject, subject);
        assert!(retrieved.is_top_level());
    }

    #[tokio::test]
    async fn test_top_level_excludes_replies() {
        let repo = setup_test_repo().await;
        let subject = CommentSubject::Proposal(Uuid::new_v4());

        let top = Comment::new(subject, "First").with_author("Ana");
        let reply = Comment::new(subject, "A reply").with_author("Bo").with_parent(top.id);
        repo.create(&top).await.unwrap();
        repo.create(&reply).await.unwrap();

        let tops = repo.list_top_level(subject, Page::default()).await.unwrap();
        assert_eq!(tops.len(), 1);
        assert_eq!(tops[0].id, top.id);
        assert_eq!(repo.count_for_subject(subject).await.unwrap(), 2);

        let all = repo.list_for_subject(subject).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].id, reply.id);
    }

    #[tokio::test]
    async fn test_subjects_are_isolated() {
        let repo = setup_test_repo().await;
        let proposal_subject = CommentSubject::Proposal(Uuid::new_v4());
        let execution_subject = CommentSubject::Execution(proposal_subject.subject_id());

        repo.create(&Comment::new(proposal_subject, "On the proposal").with_author("Ana"))
            .await
            .unwrap();

        // Same UUID under a different kind is a different subject.
        assert_eq!(repo.count_for_subject(proposal_subject).await.unwrap(), 1);
        assert_eq!(repo.count_for_subject(execution_subject).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_top_level_pagination_oldest_first() {
        let repo = setup_test_repo().await;
        let subject = CommentSubject::Execution(Uuid::new_v4());

        for i in 0..5 {
            let mut comment = Comment::new(subject, format!("c{i}")).with_author("Ana");
            // Space creation times out so ordering is deterministic.
            comment.created_at += chrono::Duration::seconds(i);
            comment.updated_at = comment.created_at;
            repo.create(&comment).await.unwrap();
        }

        let first = repo.list_top_level(subject, Page::new(1, 2)).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].body, "c0");

        let last = repo.list_top_level(subject, Page::new(3, 2)).await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].body, "c4");
    }
}
