//! Short ID prefix resolution for CLI commands.
//!
//! Allows users to specify any unique prefix of a UUID instead of the full
//! 36-char ID, similar to git short hashes.

use anyhow::{bail, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Resolve a proposal ID prefix to a full UUID.
pub async fn resolve_proposal_id(pool: &SqlitePool, prefix: &str) -> Result<Uuid> {
    resolve_prefix(pool, prefix, "proposal", PROPOSAL_QUERY).await
}

/// Resolve an execution ID prefix to a full UUID.
///
/// Searches both the execution `id` and `proposal_id` columns, so a
/// proposal's short id also finds its execution.
pub async fn resolve_execution_id(pool: &SqlitePool, prefix: &str) -> Result<Uuid> {
    resolve_prefix(pool, prefix, "execution", EXECUTION_QUERY).await
}

/// Resolve a comment ID prefix to a full UUID.
pub async fn resolve_comment_id(pool: &SqlitePool, prefix: &str) -> Result<Uuid> {
    resolve_prefix(pool, prefix, "comment", COMMENT_QUERY).await
}

/// Resolve a documentation entry ID prefix to a full UUID.
pub async fn resolve_documentation_id(pool: &SqlitePool, prefix: &str) -> Result<Uuid> {
    resolve_prefix(pool, prefix, "documentation entry", DOCUMENTATION_QUERY).await
}

const PROPOSAL_QUERY: &str = "SELECT id FROM proposals WHERE id LIKE ?";
const EXECUTION_QUERY: &str =
    "SELECT id FROM executions WHERE id LIKE ? UNION SELECT id FROM executions WHERE proposal_id LIKE ?";
const COMMENT_QUERY: &str = "SELECT id FROM comments WHERE id LIKE ?";
const DOCUMENTATION_QUERY: &str = "SELECT id FROM documentation_entries WHERE id LIKE ?";

fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        bail!("ID prefix must not be empty");
    }
    if !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        bail!(
            "Invalid ID prefix '{}': must contain only hex characters and dashes",
            prefix
        );
    }
    Ok(())
}

async fn resolve_prefix(
    pool: &SqlitePool,
    prefix: &str,
    entity: &str,
    query: &str,
) -> Result<Uuid> {
    // Fast path: if it parses as a full UUID, return directly
    if let Ok(uuid) = Uuid::parse_str(prefix) {
        return Ok(uuid);
    }

    validate_prefix(prefix)?;

    let pattern = format!("{prefix}%");

    let rows: Vec<(String,)> = if query == EXECUTION_QUERY {
        // Execution query has two bind params (id LIKE ? UNION proposal_id LIKE ?)
        sqlx::query_as(query)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(pool)
            .await?
    } else {
        sqlx::query_as(query).bind(&pattern).fetch_all(pool).await?
    };

    match rows.len() {
        0 => bail!("No {} found matching '{}'", entity, prefix),
        1 => Ok(Uuid::parse_str(&rows[0].0)?),
        n => {
            let mut msg = format!("Ambiguous prefix '{prefix}': matches {n} {entity}s:");
            for row in &rows {
                msg.push_str(&format!("\n  {}", row.0));
            }
            bail!("{}", msg)
        }
    }
}
