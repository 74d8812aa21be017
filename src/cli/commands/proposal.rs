//! Proposal CLI commands.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use crate::cli::id_resolver::resolve_proposal_id;
use crate::cli::output::{output, short_id, table_with_headers, truncate, CommandOutput};
use crate::domain::models::{Proposal, ProposalStatus};
use crate::domain::ports::{ImageUpload, Page, ProposalFilter};
use crate::services::engagement::{
    CommentView, NewProposal, ProposalChanges, ProposalDetail, ProposalPage,
};

#[derive(Args, Debug)]
pub struct ProposalArgs {
    #[command(subcommand)]
    pub command: ProposalCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProposalCommands {
    /// Submit a new proposal
    Submit {
        /// Proposal title
        title: String,
        /// Activity plan
        #[arg(short, long)]
        plan: String,
        /// First day of the voting window (defaults to today)
        #[arg(long)]
        starts_on: Option<NaiveDate>,
        /// Last day of the voting window (defaults to the start)
        #[arg(long)]
        ends_on: Option<NaiveDate>,
        /// Proposer display name
        #[arg(short = 'n', long)]
        name: String,
        /// Proposer email
        #[arg(short, long)]
        email: String,
        /// Cover image file
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// List proposals
    List {
        /// Filter by status (active, expired, in_execution, completed)
        #[arg(short, long)]
        status: Option<String>,
        /// Keyword match on title and plan
        #[arg(short, long)]
        keyword: Option<String>,
        /// Filter by proposer email
        #[arg(long)]
        proposer: Option<String>,
        /// Page number
        #[arg(long, default_value = "1")]
        page: u32,
    },
    /// Show proposal details with its comment thread
    Show {
        /// Proposal ID (or unique prefix)
        id: String,
        /// Email whose own ballot should be shown
        #[arg(long)]
        viewer: Option<String>,
        /// Comment page number
        #[arg(long, default_value = "1")]
        page: u32,
    },
    /// Edit a proposal's title, plan, window, or cover image
    Edit {
        /// Proposal ID (or unique prefix)
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New activity plan
        #[arg(long)]
        plan: Option<String>,
        /// New window start
        #[arg(long)]
        starts_on: Option<NaiveDate>,
        /// New window end
        #[arg(long)]
        ends_on: Option<NaiveDate>,
        /// Replacement cover image file
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Move a proposal into execution ahead of its deadline
    Advance {
        /// Proposal ID (or unique prefix)
        id: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct ProposalOutput {
    pub id: String,
    pub title: String,
    pub status: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub proposer: String,
    pub upvotes: i64,
    pub downvotes: i64,
}

impl From<&Proposal> for ProposalOutput {
    fn from(proposal: &Proposal) -> Self {
        Self {
            id: proposal.id.to_string(),
            title: proposal.title.clone(),
            status: proposal.status.as_str().to_string(),
            starts_on: proposal.starts_on,
            ends_on: proposal.ends_on,
            proposer: proposal.proposer_name.clone(),
            upvotes: proposal.upvotes,
            downvotes: proposal.downvotes,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ProposalListOutput {
    pub page: ProposalPage,
}

impl CommandOutput for ProposalListOutput {
    fn to_human(&self) -> String {
        if self.page.items.is_empty() {
            return "No proposals found.".to_string();
        }

        let mut table =
            table_with_headers(&["ID", "TITLE", "STATUS", "ENDS", "VOTES", "COMMENTS"]);
        for item in &self.page.items {
            table.add_row(vec![
                short_id(&item.id),
                truncate(&item.title, 32),
                item.status.as_str().to_string(),
                item.ends_on.to_string(),
                format!("+{} / -{}", item.upvotes, item.downvotes),
                item.comments.to_string(),
            ]);
        }

        format!(
            "{table}\nPage {} ({} proposal(s) total)",
            self.page.page, self.page.total
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.page).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ProposalDetailOutput {
    pub detail: ProposalDetail,
}

impl CommandOutput for ProposalDetailOutput {
    fn to_human(&self) -> String {
        let d = &self.detail;
        let mut lines = vec![
            format!("Proposal: {}", d.title),
            format!("ID: {}", d.id),
            format!("Status: {}", d.status.as_str()),
            format!("Window: {} to {}", d.starts_on, d.ends_on),
            format!("Proposer: {} <{}>", d.proposer_name, d.proposer_email),
            format!("Votes: +{} / -{}", d.upvotes, d.downvotes),
        ];

        if let Some(kind) = d.viewer_vote {
            lines.push(format!("Your ballot: {}", kind.as_str()));
        }
        if let Some(url) = &d.image_url {
            lines.push(format!("Image: {url}"));
        }
        if let Some(execution) = &d.execution {
            lines.push(format!(
                "Execution: {} ({})",
                short_id(&execution.id),
                execution.status.as_str()
            ));
        }

        lines.push(format!("\nPlan:\n{}", d.plan));

        if d.comment_total > 0 {
            lines.push(format!("\nComments ({}):", d.comment_total));
            for comment in &d.comments {
                render_comment(comment, 1, &mut lines);
            }
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.detail).unwrap_or_default()
    }
}

pub(crate) fn render_comment(comment: &CommentView, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    lines.push(format!(
        "{indent}[{}] {}: {} (+{} / -{})",
        short_id(&comment.id),
        comment.author_name,
        truncate(&comment.body, 60),
        comment.likes,
        comment.dislikes
    ));
    for reply in &comment.replies {
        render_comment(reply, depth + 1, lines);
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ProposalActionOutput {
    pub success: bool,
    pub message: String,
    pub proposal: Option<ProposalOutput>,
}

impl CommandOutput for ProposalActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Read an image file into an upload, inferring the content type from the
/// file extension.
pub(crate) async fn load_image(path: &Path) -> Result<ImageUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().to_string());
    let content_type = match path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    };
    Ok(ImageUpload::new(bytes, file_name, content_type))
}

pub async fn execute(args: ProposalArgs, json_mode: bool) -> Result<()> {
    let (config, pool) = super::open_pool().await?;
    let service = super::build_service(&config, pool.clone());

    match args.command {
        ProposalCommands::Submit {
            title,
            plan,
            starts_on,
            ends_on,
            name,
            email,
            image,
        } => {
            let image = match image {
                Some(path) => Some(load_image(&path).await?),
                None => None,
            };

            let proposal = service
                .create_proposal(NewProposal {
                    title,
                    plan,
                    starts_on,
                    ends_on,
                    proposer_name: name,
                    proposer_email: email,
                    image,
                })
                .await?;

            let out = ProposalActionOutput {
                success: true,
                message: format!("Proposal submitted: {}", proposal.id),
                proposal: Some(ProposalOutput::from(&proposal)),
            };
            output(&out, json_mode);
        }

        ProposalCommands::List {
            status,
            keyword,
            proposer,
            page,
        } => {
            let status = match status {
                Some(s) => Some(
                    ProposalStatus::from_str(&s)
                        .ok_or_else(|| anyhow::anyhow!("Invalid status: {}", s))?,
                ),
                None => None,
            };

            let filter = ProposalFilter {
                status,
                keyword,
                proposer_email: proposer,
                ..ProposalFilter::default()
            };
            let page = Page::new(page, config.engagement.proposal_page_size);

            let result = service.list_proposals(filter, page).await?;
            output(&ProposalListOutput { page: result }, json_mode);
        }

        ProposalCommands::Show { id, viewer, page } => {
            let uuid = resolve_proposal_id(&pool, &id).await?;
            let page = Page::new(page, config.engagement.comment_page_size);
            let detail = service
                .proposal_detail(uuid, viewer.as_deref(), page)
                .await?;
            output(&ProposalDetailOutput { detail }, json_mode);
        }

        ProposalCommands::Edit {
            id,
            title,
            plan,
            starts_on,
            ends_on,
            image,
        } => {
            let uuid = resolve_proposal_id(&pool, &id).await?;
            let image = match image {
                Some(path) => Some(load_image(&path).await?),
                None => None,
            };

            let proposal = service
                .update_proposal(
                    uuid,
                    ProposalChanges {
                        title,
                        plan,
                        starts_on,
                        ends_on,
                        image,
                    },
                )
                .await?;

            let out = ProposalActionOutput {
                success: true,
                message: format!("Proposal updated: {}", proposal.id),
                proposal: Some(ProposalOutput::from(&proposal)),
            };
            output(&out, json_mode);
        }

        ProposalCommands::Advance { id } => {
            let uuid = resolve_proposal_id(&pool, &id).await?;
            let record = service.move_to_execution(uuid).await?;

            let out = ProposalActionOutput {
                success: true,
                message: format!(
                    "Proposal {} is in execution (record {}, status {})",
                    short_id(&uuid),
                    record.id,
                    record.status.as_str()
                ),
                proposal: None,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
