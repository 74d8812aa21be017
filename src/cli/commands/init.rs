//! Implementation of the `agora init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::{initialize_database, PoolSettings};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force reinitialization even if already initialized
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub directories_created: Vec<String>,
    pub database_initialized: bool,
    pub config_written: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if !self.directories_created.is_empty() {
            lines.push("\nCreated directories:".to_string());
            for dir in &self.directories_created {
                lines.push(format!("  - {dir}"));
            }
        }
        if self.database_initialized {
            lines.push("\nDatabase initialized at .agora/agora.db".to_string());
        }
        if self.config_written {
            lines.push("Default config written to .agora/config.yaml".to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let agora_dir = target_path.join(".agora");

    // Check if already initialized
    if agora_dir.exists() && !args.force {
        let output_data = InitOutput {
            success: false,
            message: "Project already initialized. Use --force to reinitialize.".to_string(),
            initialized_path: target_path,
            directories_created: vec![],
            database_initialized: false,
            config_written: false,
        };
        output(&output_data, json_mode);
        return Ok(());
    }

    // If forcing, remove existing
    if args.force && agora_dir.exists() {
        fs::remove_dir_all(&agora_dir)
            .await
            .context("Failed to remove existing .agora directory")?;
    }

    let mut directories_created = vec![];

    let dirs = [
        agora_dir.clone(),
        agora_dir.join("images"),
        agora_dir.join("logs"),
    ];

    for dir in &dirs {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create {dir:?}"))?;
            let relative = dir
                .strip_prefix(&target_path)
                .unwrap_or(dir)
                .to_string_lossy()
                .to_string();
            directories_created.push(relative);
        }
    }

    // Initialize database
    let db_path = agora_dir.join("agora.db");
    let db_url = format!("sqlite:{}", db_path.display());
    initialize_database(&db_url, PoolSettings::default())
        .await
        .context("Failed to initialize database")?;

    // Write a config scaffold the operator can edit
    let config_path = agora_dir.join("config.yaml");
    let config_written = if config_path.exists() {
        false
    } else {
        let yaml = serde_yaml::to_string(&Config::default())
            .context("Failed to serialize default config")?;
        fs::write(&config_path, yaml)
            .await
            .context("Failed to write .agora/config.yaml")?;
        true
    };

    let output_data = InitOutput {
        success: true,
        message: if args.force {
            "Project reinitialized successfully.".to_string()
        } else {
            "Project initialized successfully.".to_string()
        },
        initialized_path: target_path,
        directories_created,
        database_initialized: true,
        config_written,
    };
    output(&output_data, json_mode);
    Ok(())
}
