use std::path::PathBuf;

use anyhow::{Context, Result};

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory of `<FY>.yaml` rule files; the compiled-in rules when unset.
    pub rules_dir: Option<PathBuf>,
    pub rust_log: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(ServerConfig {
            host: lookup("TAX_ENGINE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rules_dir: lookup("TAX_RULES_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
