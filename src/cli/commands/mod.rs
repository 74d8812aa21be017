//! CLI command implementations.

pub mod comment;
pub mod execution;
pub mod init;
pub mod proposal;
pub mod scan;
pub mod serve;
pub mod vote;

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::adapters::media::DiskImageStore;
use crate::adapters::rest::{RestMemberDirectory, WebhookNotificationChannel};
use crate::adapters::sqlite::{
    initialize_database, PoolSettings, SqliteBallotRepository, SqliteCommentRepository,
    SqliteExecutionRepository, SqliteProposalRepository,
};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::services::EngagementService;

/// The engagement service over the SQLite adapters, as the CLI builds it.
pub type SqliteEngagement = EngagementService<
    SqliteProposalRepository,
    SqliteBallotRepository,
    SqliteCommentRepository,
    SqliteExecutionRepository,
>;

/// Load the project config and open its database.
pub(crate) async fn open_pool() -> Result<(Config, SqlitePool)> {
    let config = ConfigLoader::load()?;
    let url = format!("sqlite:{}", config.database.path);
    let pool = initialize_database(&url, PoolSettings::from(&config.database))
        .await
        .context("Failed to initialize database. Run 'agora init' first.")?;
    Ok((config, pool))
}

/// Build the engagement service with collaborators taken from config.
///
/// The directory and notifier stay at their null implementations unless a
/// URL is configured; the image store always writes to local disk.
pub(crate) fn build_service(config: &Config, pool: SqlitePool) -> Arc<SqliteEngagement> {
    let proposals = Arc::new(SqliteProposalRepository::new(pool.clone()));
    let ballots = Arc::new(SqliteBallotRepository::new(pool.clone()));
    let comments = Arc::new(SqliteCommentRepository::new(pool.clone()));
    let executions = Arc::new(SqliteExecutionRepository::new(pool));

    let mut service = EngagementService::new(proposals, ballots, comments, executions)
        .with_image_store(Arc::new(DiskImageStore::new(
            &config.collaborators.image_dir,
            &config.collaborators.image_base_url,
        )))
        .with_config(config.engagement.clone());

    if let Some(url) = &config.collaborators.directory_url {
        service = service.with_member_directory(Arc::new(RestMemberDirectory::new(url)));
    }
    if let Some(url) = &config.collaborators.notify_url {
        service = service.with_notifier(Arc::new(WebhookNotificationChannel::new(url)));
    }

    Arc::new(service)
}
