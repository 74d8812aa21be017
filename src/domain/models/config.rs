use serde::{Deserialize, Serialize};

/// Main configuration structure for Agora
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Lifecycle scheduler configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// HTTP API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// External collaborator endpoints
    #[serde(default)]
    pub collaborators: CollaboratorConfig,

    /// Engagement surface tuning
    #[serde(default)]
    pub engagement: EngagementConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            scheduler: SchedulerConfig::default(),
            api: ApiConfig::default(),
            collaborators: CollaboratorConfig::default(),
            engagement: EngagementConfig::default(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".agora/agora.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for daily-rolled log files; stderr only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            directory: None,
        }
    }
}

/// Lifecycle scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerConfig {
    /// Local wall-clock time of the daily expiry scan, HH:MM
    #[serde(default = "default_scan_time")]
    pub scan_time: String,

    /// Run a scan immediately when the daemon starts
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,

    /// Stop the daemon after this many consecutive whole-scan failures
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

fn default_scan_time() -> String {
    "03:00".to_string()
}

const fn default_run_on_startup() -> bool {
    true
}

const fn default_max_consecutive_failures() -> u32 {
    5
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scan_time: default_scan_time(),
            run_on_startup: default_run_on_startup(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiConfig {
    /// Bind host
    #[serde(default = "default_api_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Enable permissive CORS for browser clients
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_api_port() -> u16 {
    8085
}

const fn default_enable_cors() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            enable_cors: default_enable_cors(),
        }
    }
}

/// External collaborator endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CollaboratorConfig {
    /// Base URL of the member directory service; unresolved when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory_url: Option<String>,

    /// Webhook URL for outbound notifications; silent when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,

    /// Root directory for stored images
    #[serde(default = "default_image_dir")]
    pub image_dir: String,

    /// Public URL prefix that image references resolve under
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
}

fn default_image_dir() -> String {
    ".agora/images".to_string()
}

fn default_image_base_url() -> String {
    "/images".to_string()
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            directory_url: None,
            notify_url: None,
            image_dir: default_image_dir(),
            image_base_url: default_image_base_url(),
        }
    }
}

/// Engagement surface tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngagementConfig {
    /// Proposals per list page
    #[serde(default = "default_proposal_page_size")]
    pub proposal_page_size: u32,

    /// Top-level comments per thread page
    #[serde(default = "default_comment_page_size")]
    pub comment_page_size: u32,
}

const fn default_proposal_page_size() -> u32 {
    20
}

const fn default_comment_page_size() -> u32 {
    10
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            proposal_page_size: default_proposal_page_size(),
            comment_page_size: default_comment_page_size(),
        }
    }
}
