use serde::Deserialize;

use hrm_core::config::Config;

/// Personnel service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct PersonnelConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3120). Env var: `PERSONNEL_PORT`.
    #[serde(default = "default_port")]
    pub personnel_port: u16,
    /// Root directory for contract attachments. Env var: `ATTACHMENT_DIR`.
    #[serde(default = "default_attachment_dir")]
    pub attachment_dir: String,
    /// Largest accepted attachment in bytes (default 5 MiB).
    #[serde(default = "default_attachment_max_bytes")]
    pub attachment_max_bytes: usize,
}

fn default_port() -> u16 {
    3120
}

fn default_attachment_dir() -> String {
    "./storage".to_owned()
}

fn default_attachment_max_bytes() -> usize {
    5 * 1024 * 1024
}

impl Config for PersonnelConfig {}
