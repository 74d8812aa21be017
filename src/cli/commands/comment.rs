//! Comment CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::id_resolver::{resolve_comment_id, resolve_execution_id, resolve_proposal_id};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::CommentSubject;
use crate::domain::ports::Page;
use crate::services::engagement::{CommentView, NewComment};

#[derive(Args, Debug)]
pub struct CommentArgs {
    #[command(subcommand)]
    pub command: CommentCommands,
}

#[derive(Subcommand, Debug)]
pub enum CommentCommands {
    /// Add a comment or reply to a proposal thread
    Proposal {
        /// Proposal ID (or unique prefix)
        id: String,
        /// Comment text
        body: String,
        /// Author display name (for authors outside the directory)
        #[arg(short, long)]
        name: Option<String>,
        /// Author member ID
        #[arg(short, long)]
        member: Option<Uuid>,
        /// Parent comment ID for replies
        #[arg(short, long)]
        reply_to: Option<String>,
    },
    /// Add a comment or reply to an execution thread
    Execution {
        /// Execution ID (or unique prefix)
        id: String,
        /// Comment text
        body: String,
        /// Author display name (for authors outside the directory)
        #[arg(short, long)]
        name: Option<String>,
        /// Author member ID
        #[arg(short, long)]
        member: Option<Uuid>,
        /// Parent comment ID for replies
        #[arg(short, long)]
        reply_to: Option<String>,
    },
    /// Show the threaded comments on a proposal or execution
    List {
        /// Subject kind: proposal or execution
        kind: String,
        /// Subject ID (or unique prefix)
        id: String,
        /// Page of top-level comments
        #[arg(long, default_value = "1")]
        page: u32,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct CommentActionOutput {
    pub success: bool,
    pub message: String,
    pub comment_id: String,
}

impl CommandOutput for CommentActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CommentThreadOutput {
    pub comments: Vec<CommentView>,
    pub total: i64,
}

impl CommandOutput for CommentThreadOutput {
    fn to_human(&self) -> String {
        if self.comments.is_empty() {
            return "No comments.".to_string();
        }
        let mut lines = vec![format!("{} comment(s):", self.total)];
        for comment in &self.comments {
            super::proposal::render_comment(comment, 0, &mut lines);
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

async fn resolve_subject(
    pool: &sqlx::SqlitePool,
    kind: &str,
    id: &str,
) -> Result<CommentSubject> {
    match kind {
        "proposal" => Ok(CommentSubject::Proposal(
            resolve_proposal_id(pool, id).await?,
        )),
        "execution" => Ok(CommentSubject::Execution(
            resolve_execution_id(pool, id).await?,
        )),
        other => anyhow::bail!("Unknown subject kind: {other} (expected proposal or execution)"),
    }
}

pub async fn execute(args: CommentArgs, json_mode: bool) -> Result<()> {
    let (config, pool) = super::open_pool().await?;
    let service = super::build_service(&config, pool.clone());

    match args.command {
        CommentCommands::Proposal {
            id,
            body,
            name,
            member,
            reply_to,
        } => {
            let subject = CommentSubject::Proposal(resolve_proposal_id(&pool, &id).await?);
            add(&service, &pool, subject, body, name, member, reply_to, json_mode).await?;
        }

        CommentCommands::Execution {
            id,
            body,
            name,
            member,
            reply_to,
        } => {
            let subject = CommentSubject::Execution(resolve_execution_id(&pool, &id).await?);
            add(&service, &pool, subject, body, name, member, reply_to, json_mode).await?;
        }

        CommentCommands::List { kind, id, page } => {
            let subject = resolve_subject(&pool, &kind, &id).await?;
            let page = Page::new(page, config.engagement.comment_page_size);

            let comments = service.comment_thread(subject, page).await?;
            let total = service.comment_count(subject).await?;
            output(&CommentThreadOutput { comments, total }, json_mode);
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn add(
    service: &super::SqliteEngagement,
    pool: &sqlx::SqlitePool,
    subject: CommentSubject,
    body: String,
    name: Option<String>,
    member: Option<Uuid>,
    reply_to: Option<String>,
    json_mode: bool,
) -> Result<()> {
    let parent_id = match reply_to {
        Some(prefix) => Some(resolve_comment_id(pool, &prefix).await?),
        None => None,
    };

    let comment = service
        .add_comment(
            subject,
            NewComment {
                body,
                author_name: name,
                member_id: member,
                parent_id,
            },
        )
        .await?;

    let out = CommentActionOutput {
        success: true,
        message: format!("Comment added: {}", comment.id),
        comment_id: comment.id.to_string(),
    };
    output(&out, json_mode);
    Ok(())
}
