use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the analysis backend, e.g. `http://localhost:5000`.
    pub backend_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Delay before a flowchart is rendered into its container.
    pub diagram_settle: Duration,
    /// Comma-separated skill list used for job recommendations. `None` means the
    /// built-in sample profile.
    pub student_skills: Option<String>,
    /// Backend request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            backend_url: require_env("BACKEND_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            diagram_settle: Duration::from_millis(
                optional_env("DIAGRAM_SETTLE_MS")
                    .map(|v| v.parse::<u64>())
                    .transpose()
                    .context("DIAGRAM_SETTLE_MS must be a number of milliseconds")?
                    .unwrap_or(50),
            ),
            student_skills: optional_env("STUDENT_SKILLS"),
            request_timeout: optional_env("REQUEST_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("REQUEST_TIMEOUT_SECS must be a number of seconds")?
                .map(Duration::from_secs),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
