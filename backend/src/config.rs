//! Application configuration
//!
//! Central location for validation boundaries, pagination limits and
//! resource limits, plus the runtime settings read from the command line
//! or the environment.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

// ===== Blog Field Limits =====

/// Titles must be strictly longer than this many characters
pub const MIN_TITLE_LENGTH: usize = 5;

/// Bodies must be strictly longer than this many characters
pub const MIN_BODY_LENGTH: usize = 30;

// ===== Pagination =====

/// Page returned when the client does not ask for one
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Largest page size served. Larger requests are clamped to this value
/// so a single response cannot carry the whole table of inline images.
pub const MAX_PAGE_LIMIT: i64 = 100;

// ===== HTTP =====

/// Largest accepted request body. Images travel inline as base64.
pub const MAX_REQUEST_BODY_BYTES: usize = 10 * 1024 * 1024;

// ===== Database =====

/// Maximum pooled SQLite connections
pub const DB_MAX_CONNECTIONS: u32 = 5;

/// How long SQLite waits on a locked database before failing
pub const DB_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// How long an operation waits for a pooled connection
pub const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Runtime settings for the HTTP server
#[derive(Debug, Clone, Parser)]
#[command(name = "blog-api", version, about = "REST API for publishing blog posts")]
pub struct Settings {
    /// Path of the SQLite database file (created if missing)
    #[arg(long, env = "DATABASE_PATH", default_value = "data/blogs.db")]
    pub database_path: PathBuf,

    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Comma-separated list of allowed CORS origins. Empty allows any origin.
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Deadline for a single request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,
}

impl Settings {
    /// Address to listen on, as `host:port`. Host names are resolved on bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/blogs.db"),
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
            request_timeout_secs: 10,
        }
    }
}
