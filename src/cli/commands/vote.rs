//! Vote CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::id_resolver::{resolve_comment_id, resolve_proposal_id};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::VoteKind;
use crate::services::engagement::VoteView;

#[derive(Args, Debug)]
pub struct VoteArgs {
    #[command(subcommand)]
    pub command: VoteCommands,
}

#[derive(Subcommand, Debug)]
pub enum VoteCommands {
    /// Cast or toggle a ballot on a proposal
    Proposal {
        /// Proposal ID (or unique prefix)
        id: String,
        /// Vote direction (up/down; repeating the same vote withdraws it)
        kind: String,
        /// Voter email
        #[arg(short, long)]
        email: String,
    },
    /// Cast or toggle a ballot on a comment
    Comment {
        /// Comment ID (or unique prefix)
        id: String,
        /// Vote direction (like/dislike; repeating the same vote withdraws it)
        kind: String,
        /// Voter member ID
        #[arg(short, long)]
        member: Uuid,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct VoteOutput {
    pub subject: String,
    pub vote: VoteView,
}

impl CommandOutput for VoteOutput {
    fn to_human(&self) -> String {
        let action = match self.vote.outcome {
            "cast" => "Ballot cast",
            "flipped" => "Ballot flipped",
            _ => "Ballot withdrawn",
        };
        format!(
            "{action} on {} (now +{} / -{})",
            self.subject, self.vote.upvotes, self.vote.downvotes
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn parse_kind(kind: &str) -> Result<VoteKind> {
    VoteKind::from_str(kind).ok_or_else(|| {
        anyhow::anyhow!("Invalid vote kind: {kind} (expected up/down or like/dislike)")
    })
}

pub async fn execute(args: VoteArgs, json_mode: bool) -> Result<()> {
    let (config, pool) = super::open_pool().await?;
    let service = super::build_service(&config, pool.clone());

    match args.command {
        VoteCommands::Proposal { id, kind, email } => {
            let uuid = resolve_proposal_id(&pool, &id).await?;
            let kind = parse_kind(&kind)?;

            let receipt = service.vote_on_proposal(uuid, &email, kind).await?;
            let out = VoteOutput {
                subject: format!("proposal {uuid}"),
                vote: VoteView::from(receipt),
            };
            output(&out, json_mode);
        }

        VoteCommands::Comment { id, kind, member } => {
            let uuid = resolve_comment_id(&pool, &id).await?;
            let kind = parse_kind(&kind)?;

            let receipt = service.vote_on_comment(uuid, member, kind).await?;
            let out = VoteOutput {
                subject: format!("comment {uuid}"),
                vote: VoteView::from(receipt),
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
