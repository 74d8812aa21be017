//! Execution CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

use crate::cli::id_resolver::{resolve_documentation_id, resolve_execution_id};
use crate::cli::output::{output, short_id, table_with_headers, truncate, CommandOutput};
use crate::domain::models::{AttendanceEntry, ExecutionStatus};
use crate::services::engagement::{
    AttendanceInput, AttendanceReport, DocumentationView, ExecutionView, NewDocumentation,
};

use super::proposal::load_image;

#[derive(Args, Debug)]
pub struct ExecutionArgs {
    #[command(subcommand)]
    pub command: ExecutionCommands,
}

#[derive(Subcommand, Debug)]
pub enum ExecutionCommands {
    /// Show an execution record (accepts the owning proposal's ID too)
    Show {
        /// Execution or proposal ID (or unique prefix)
        id: String,
    },
    /// Record the execution's outcome
    Status {
        /// Execution ID (or unique prefix)
        id: String,
        /// Outcome: success or failed
        status: String,
        /// Free-text note on the outcome
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Attendance roster commands
    #[command(subcommand)]
    Attendance(AttendanceCommands),
    /// Documentation entry commands
    #[command(subcommand)]
    Doc(DocCommands),
}

#[derive(Subcommand, Debug)]
pub enum AttendanceCommands {
    /// Replace the whole roster for an execution
    Set {
        /// Execution ID (or unique prefix)
        id: String,
        /// Member IDs who attended
        #[arg(short, long)]
        present: Vec<Uuid>,
        /// Member IDs who did not attend
        #[arg(short, long)]
        absent: Vec<Uuid>,
    },
    /// List the roster for an execution
    List {
        /// Execution ID (or unique prefix)
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DocCommands {
    /// Attach a documentation entry
    Add {
        /// Execution ID (or unique prefix)
        id: String,
        /// Entry title
        title: String,
        /// Entry description
        #[arg(short, long)]
        description: String,
        /// Uploader display name
        #[arg(short = 'n', long)]
        name: String,
        /// Uploader email
        #[arg(short, long)]
        email: String,
        /// Photo file
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Remove a documentation entry (and its stored photo)
    Remove {
        /// Documentation entry ID (or unique prefix)
        id: String,
    },
    /// List documentation entries for an execution
    List {
        /// Execution ID (or unique prefix)
        id: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct ExecutionDetailOutput {
    pub view: ExecutionView,
}

impl CommandOutput for ExecutionDetailOutput {
    fn to_human(&self) -> String {
        let v = &self.view;
        let mut lines = vec![
            format!("Execution: {}", v.id),
            format!("Proposal: {} ({})", v.proposal_title, short_id(&v.proposal_id)),
            format!("Status: {}", v.status.as_str()),
        ];
        if let Some(note) = &v.note {
            lines.push(format!("Note: {note}"));
        }
        lines.push(format!(
            "Attendance: {} entr(ies), Documentation: {}, Comments: {}",
            v.attendance.len(),
            v.documentation.len(),
            v.comment_total
        ));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.view).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct AttendanceListOutput {
    pub entries: Vec<AttendanceEntry>,
}

impl CommandOutput for AttendanceListOutput {
    fn to_human(&self) -> String {
        if self.entries.is_empty() {
            return "No attendance recorded.".to_string();
        }
        let mut table = table_with_headers(&["MEMBER", "NAME", "ATTENDED", "NOTE"]);
        for entry in &self.entries {
            table.add_row(vec![
                short_id(&entry.member_id),
                entry.member_name.clone(),
                if entry.attended { "yes" } else { "no" }.to_string(),
                entry.note.clone().unwrap_or_default(),
            ]);
        }
        table.to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.entries).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct DocumentationListOutput {
    pub entries: Vec<DocumentationView>,
}

impl CommandOutput for DocumentationListOutput {
    fn to_human(&self) -> String {
        if self.entries.is_empty() {
            return "No documentation entries.".to_string();
        }
        let mut table = table_with_headers(&["ID", "TITLE", "UPLOADER", "PHOTO"]);
        for entry in &self.entries {
            table.add_row(vec![
                short_id(&entry.id),
                truncate(&entry.title, 32),
                entry.uploader_name.clone(),
                entry.photo_url.clone().unwrap_or_default(),
            ]);
        }
        table.to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.entries).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ExecutionActionOutput {
    pub success: bool,
    pub message: String,
}

impl CommandOutput for ExecutionActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl From<AttendanceReport> for ExecutionActionOutput {
    fn from(report: AttendanceReport) -> Self {
        Self {
            success: true,
            message: format!(
                "Roster replaced: {} saved, {} skipped",
                report.saved, report.skipped
            ),
        }
    }
}

pub async fn execute(args: ExecutionArgs, json_mode: bool) -> Result<()> {
    let (config, pool) = super::open_pool().await?;
    let service = super::build_service(&config, pool.clone());

    match args.command {
        ExecutionCommands::Show { id } => {
            let uuid = resolve_execution_id(&pool, &id).await?;
            let view = service.execution_view(uuid).await?;
            output(&ExecutionDetailOutput { view }, json_mode);
        }

        ExecutionCommands::Status { id, status, note } => {
            let uuid = resolve_execution_id(&pool, &id).await?;
            let status = ExecutionStatus::from_str(&status)
                .ok_or_else(|| anyhow::anyhow!("Invalid status: {} (expected success or failed)", status))?;

            let record = service.update_execution_status(uuid, status, note).await?;
            let out = ExecutionActionOutput {
                success: true,
                message: format!(
                    "Execution {} recorded as {}; proposal completed",
                    short_id(&record.id),
                    record.status.as_str()
                ),
            };
            output(&out, json_mode);
        }

        ExecutionCommands::Attendance(AttendanceCommands::Set { id, present, absent }) => {
            let uuid = resolve_execution_id(&pool, &id).await?;
            let roster: Vec<AttendanceInput> = present
                .into_iter()
                .map(AttendanceInput::present)
                .chain(absent.into_iter().map(AttendanceInput::absent))
                .collect();

            let report = service.save_attendance(uuid, &roster).await?;
            output(&ExecutionActionOutput::from(report), json_mode);
        }

        ExecutionCommands::Attendance(AttendanceCommands::List { id }) => {
            let uuid = resolve_execution_id(&pool, &id).await?;
            let entries = service.attendance(uuid).await?;
            output(&AttendanceListOutput { entries }, json_mode);
        }

        ExecutionCommands::Doc(DocCommands::Add {
            id,
            title,
            description,
            name,
            email,
            photo,
        }) => {
            let uuid = resolve_execution_id(&pool, &id).await?;
            let photo = match photo {
                Some(path) => Some(load_image(&path).await?),
                None => None,
            };

            let entry = service
                .add_documentation(
                    uuid,
                    NewDocumentation {
                        title,
                        description,
                        uploader_name: name,
                        uploader_email: email,
                        photo,
                    },
                )
                .await?;

            let out = ExecutionActionOutput {
                success: true,
                message: format!("Documentation added: {}", entry.id),
            };
            output(&out, json_mode);
        }

        ExecutionCommands::Doc(DocCommands::Remove { id }) => {
            let uuid = resolve_documentation_id(&pool, &id).await?;
            service.remove_documentation(uuid).await?;

            let out = ExecutionActionOutput {
                success: true,
                message: format!("Documentation removed: {uuid}"),
            };
            output(&out, json_mode);
        }

        ExecutionCommands::Doc(DocCommands::List { id }) => {
            let uuid = resolve_execution_id(&pool, &id).await?;
            let entries = service.documentation(uuid).await?;
            output(&DocumentationListOutput { entries }, json_mode);
        }
    }

    Ok(())
}
