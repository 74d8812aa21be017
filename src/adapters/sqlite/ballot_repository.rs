//! SQLite implementation of the BallotRepository.
//!
//! Toggles run as a single transaction: read the voter's existing ballot,
//! apply the toggle decision, recount live ballots per kind, and write the
//! counters back to the voted subject. Counters are never incremented in
//! place. A concurrent duplicate insert loses the unique race on
//! (subject, voter) and is retried once against the fresh ledger state.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    toggle_action, CommentBallot, ProposalBallot, VoteAction, VoteKind, VoteOutcome, VoteReceipt,
    VoteTally,
};
use crate::domain::ports::BallotRepository;

use super::{parse_datetime, parse_uuid};

#[derive(Clone)]
pub struct SqliteBallotRepository {
    pool: SqlitePool,
}

impl SqliteBallotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn toggle_proposal_once(
        &self,
        proposal_id: Uuid,
        voter_email: &str,
        kind: VoteKind,
    ) -> DomainResult<VoteReceipt> {
        let mut tx = self.pool.begin().await?;

        let subject: Option<(String,)> = sqlx::query_as("SELECT id FROM proposals WHERE id = ?")
            .bind(proposal_id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        if subject.is_none() {
            tx.rollback().await?;
            return Err(DomainError::ProposalNotFound(proposal_id));
        }

        let existing: Option<(String,)> = sqlx::query_as(
            "SELECT kind FROM proposal_ballots WHERE proposal_id = ? AND voter_email = ?",
        )
        .bind(proposal_id.to_string())
        .bind(voter_email)
        .fetch_optional(&mut *tx)
        .await?;

        let existing_kind = existing
            .map(|(k,)| {
                VoteKind::from_str(&k).ok_or_else(|| {
                    DomainError::SerializationError(format!("Invalid ballot kind: {k}"))
                })
            })
            .transpose()?;

        let outcome = match toggle_action(existing_kind, kind) {
            VoteAction::Insert => {
                let ballot = ProposalBallot::new(proposal_id, voter_email, kind);
                sqlx::query(
                    r#"INSERT INTO proposal_ballots (id, proposal_id, voter_email, kind, created_at)
                       VALUES (?, ?, ?, ?, ?)"#,
                )
                .bind(ballot.id.to_string())
                .bind(ballot.proposal_id.to_string())
                .bind(&ballot.voter_email)
                .bind(ballot.kind.as_str())
                .bind(ballot.created_at.to_rfc3339())
                .execute(&mut *tx)
                .await?;
                VoteOutcome::Cast(kind)
            }
            VoteAction::Withdraw => {
                sqlx::query(
                    "DELETE FROM proposal_ballots WHERE proposal_id = ? AND voter_email = ?",
                )
                .bind(proposal_id.to_string())
                .bind(voter_email)
                .execute(&mut *tx)
                .await?;
                VoteOutcome::Withdrawn
            }
            VoteAction::Flip => {
                sqlx::query(
                    r#"UPDATE proposal_ballots SET kind = ?, created_at = ?
                       WHERE proposal_id = ? AND voter_email = ?"#,
                )
                .bind(kind.as_str())
                .bind(Utc::now().to_rfc3339())
                .bind(proposal_id.to_string())
                .bind(voter_email)
                .execute(&mut *tx)
                .await?;
                VoteOutcome::Flipped(kind)
            }
        };

        let tally = count_proposal_ballots(&mut tx, proposal_id).await?;

        sqlx::query("UPDATE proposals SET upvotes = ?, downvotes = ?, updated_at = ? WHERE id = ?")
            .bind(tally.upvotes)
            .bind(tally.downvotes)
            .bind(Utc::now().to_rfc3339())
            .bind(proposal_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(VoteReceipt { outcome, tally })
    }

    async fn toggle_comment_once(
        &self,
        comment_id: Uuid,
        voter_id: Uuid,
        voter_name: &str,
        kind: VoteKind,
    ) -> DomainResult<VoteReceipt> {
        let mut tx = self.pool.begin().await?;

        let subject: Option<(String,)> = sqlx::query_as("SELECT id FROM comments WHERE id = ?")
            .bind(comment_id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        if subject.is_none() {
            tx.rollback().await?;
            return Err(DomainError::CommentNotFound(comment_id));
        }

        let existing: Option<(String,)> = sqlx::query_as(
            "SELECT kind FROM comment_ballots WHERE comment_id = ? AND voter_id = ?",
        )
        .bind(comment_id.to_string())
        .bind(voter_id.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let existing_kind = existing
            .map(|(k,)| {
                VoteKind::from_str(&k).ok_or_else(|| {
                    DomainError::SerializationError(format!("Invalid ballot kind: {k}"))
                })
            })
            .transpose()?;

        let outcome = match toggle_action(existing_kind, kind) {
            VoteAction::Insert => {
                let ballot = CommentBallot::new(comment_id, voter_id, voter_name, kind);
                sqlx::query(
                    r#"INSERT INTO comment_ballots (id, comment_id, voter_id, voter_name, kind, created_at)
                       VALUES (?, ?, ?, ?, ?, ?)"#,
                )
                .bind(ballot.id.to_string())
                .bind(ballot.comment_id.to_string())
                .bind(ballot.voter_id.to_string())
                .bind(&ballot.voter_name)
                .bind(ballot.kind.as_str())
                .bind(ballot.created_at.to_rfc3339())
                .execute(&mut *tx)
                .await?;
                VoteOutcome::Cast(kind)
            }
            VoteAction::Withdraw => {
                sqlx::query("DELETE FROM comment_ballots WHERE comment_id = ? AND voter_id = ?")
                    .bind(comment_id.to_string())
                    .bind(voter_id.to_string())
                    .execute(&mut *tx)
                    .await?;
                VoteOutcome::Withdrawn
            }
            VoteAction::Flip => {
                sqlx::query(
                    r#"UPDATE comment_ballots SET kind = ?, voter_name = ?, created_at = ?
                       WHERE comment_id = ? AND voter_id = ?"#,
                )
                .bind(kind.as_str())
                .bind(voter_name)
                .bind(Utc::now().to_rfc3339())
                .bind(comment_id.to_string())
                .bind(voter_id.to_string())
                .execute(&mut *tx)
                .await?;
                VoteOutcome::Flipped(kind)
            }
        };

        let tally = count_comment_ballots(&mut tx, comment_id).await?;

        sqlx::query("UPDATE comments SET likes = ?, dislikes = ?, updated_at = ? WHERE id = ?")
            .bind(tally.upvotes)
            .bind(tally.downvotes)
            .bind(Utc::now().to_rfc3339())
            .bind(comment_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(VoteReceipt { outcome, tally })
    }
}

#[async_trait]
impl BallotRepository for SqliteBallotRepository {
    async fn toggle_proposal_vote(
        &self,
        proposal_id: Uuid,
        voter_email: &str,
        kind: VoteKind,
    ) -> DomainResult<VoteReceipt> {
        match self.toggle_proposal_once(proposal_id, voter_email, kind).await {
            Err(e) if e.is_constraint_violation() => {
                debug!(%proposal_id, voter_email, "Lost ballot insert race, retrying toggle");
                self.toggle_proposal_once(proposal_id, voter_email, kind).await
            }
            other => other,
        }
    }

    async fn find_proposal_vote(
        &self,
        proposal_id: Uuid,
        voter_email: &str,
    ) -> DomainResult<Option<ProposalBallot>> {
        let row: Option<ProposalBallotRow> = sqlx::query_as(
            "SELECT * FROM proposal_ballots WHERE proposal_id = ? AND voter_email = ?",
        )
        .bind(proposal_id.to_string())
        .bind(voter_email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn proposal_tally(&self, proposal_id: Uuid) -> DomainResult<VoteTally> {
        let mut conn = self.pool.acquire().await?;
        count_proposal_ballots(&mut conn, proposal_id).await
    }

    async fn toggle_comment_vote(
        &self,
        comment_id: Uuid,
        voter_id: Uuid,
        voter_name: &str,
        kind: VoteKind,
    ) -> DomainResult<VoteReceipt> {
        match self.toggle_comment_once(comment_id, voter_id, voter_name, kind).await {
            Err(e) if e.is_constraint_violation() => {
                debug!(%comment_id, %voter_id, "Lost ballot insert race, retrying toggle");
                self.toggle_comment_once(comment_id, voter_id, voter_name, kind).await
            }
            other => other,
        }
    }

    async fn find_comment_vote(
        &self,
        comment_id: Uuid,
        voter_id: Uuid,
    ) -> DomainResult<Option<CommentBallot>> {
        let row: Option<CommentBallotRow> = sqlx::query_as(
            "SELECT * FROM comment_ballots WHERE comment_id = ? AND voter_id = ?",
        )
        .bind(comment_id.to_string())
        .bind(voter_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn comment_tally(&self, comment_id: Uuid) -> DomainResult<VoteTally> {
        let mut conn = self.pool.acquire().await?;
        count_comment_ballots(&mut conn, comment_id).await
    }
}

async fn count_proposal_ballots(
    conn: &mut SqliteConnection,
    proposal_id: Uuid,
) -> DomainResult<VoteTally> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT kind, COUNT(*) FROM proposal_ballots WHERE proposal_id = ? GROUP BY kind",
    )
    .bind(proposal_id.to_string())
    .fetch_all(&mut *conn)
    .await?;

    Ok(tally_from_rows(rows))
}

async fn count_comment_ballots(
    conn: &mut SqliteConnection,
    comment_id: Uuid,
) -> DomainResult<VoteTally> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT kind, COUNT(*) FROM comment_ballots WHERE comment_id = ? GROUP BY kind",
    )
    .bind(comment_id.to_string())
    .fetch_all(&mut *conn)
    .await?;

    Ok(tally_from_rows(rows))
}

fn tally_from_rows(rows: Vec<(String, i64)>) -> VoteTally {
    let mut tally = VoteTally::default();
    for (kind, count) in rows {
        match VoteKind::from_str(&kind) {
            Some(VoteKind::Up) => tally.upvotes = count,
            Some(VoteKind::Down) => tally.downvotes = count,
            None => {}
        }
    }
    tally
}

#[derive(sqlx::FromRow)]
struct ProposalBallotRow {
    id: String,
    proposal_id: String,
    voter_email: String,
    kind: String,
    created_at: String,
}

impl TryFrom<ProposalBallotRow> for ProposalBallot {
    type Error = DomainError;

    fn try_from(row: ProposalBallotRow) -> Result<Self, Self::Error> {
        let kind = VoteKind::from_str(&row.kind)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid kind: {}", row.kind)))?;

        Ok(ProposalBallot {
            id: parse_uuid(&row.id)?,
            proposal_id: parse_uuid(&row.proposal_id)?,
            voter_email: row.voter_email,
            kind,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CommentBallotRow {
    id: String,
    comment_id: String,
    voter_id: String,
    voter_name: String,
    kind: String,
    created_at: String,
}

impl TryFrom<CommentBallotRow> for CommentBallot {
    type Error = DomainError;

    fn try_from(row: CommentBallotRow) -> Result<Self, Self::Error> {
        let kind = VoteKind::from_str(&row.kind)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid kind: {}", row.kind)))?;

        Ok(CommentBallot {
            id: parse_uuid(&row.id)?,
            comment_id: parse_uuid(&row.comment_id)?,
            voter_id: parse_uuid(&row.voter_id)?,
            voter_name: row.voter_name,
            kind,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}
