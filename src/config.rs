//! Server configuration loaded from the environment.
//!
//! | Variable                       | Default     |
//! |--------------------------------|-------------|
//! | `SCORE_RATER_HOST`             | `127.0.0.1` |
//! | `PORT`                         | `5000`      |
//! | `SCORE_RATER_MAX_UPLOAD_BYTES` | 10 MiB      |

use anyhow::{Context, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Reads the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unset keys fall back to defaults;
    /// set but unparsable numeric keys are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("SCORE_RATER_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{port}'"))?;
        }
        if let Some(limit) = lookup("SCORE_RATER_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = limit.trim().parse().with_context(|| {
                format!("SCORE_RATER_MAX_UPLOAD_BYTES must be a byte count, got '{limit}'")
            })?;
        }

        Ok(config)
    }

    /// Applies command-line overrides on top of the environment values.
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
