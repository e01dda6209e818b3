//! Configuration for the scanner and the HTTP service.

use crate::analyzers::AnalyzerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Scanner configuration that can be loaded from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP API listens on.
    pub bind_address: String,

    /// Seconds a finished job stays pollable.
    pub job_ttl_secs: u64,

    /// Seconds between sweeps of finished jobs.
    pub reap_interval_secs: u64,

    /// Largest contract source accepted, in bytes.
    pub max_source_bytes: usize,

    /// Rule IDs to disable.
    pub disabled_rules: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            job_ttl_secs: 3600,
            reap_interval_secs: 60,
            max_source_bytes: AnalyzerConfig::default().max_source_bytes,
            disabled_rules: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default locations, or return default config.
    pub fn load_default() -> Self {
        // Try current directory
        if let Ok(config) = Self::load(Path::new("rugscan.toml")) {
            return config;
        }

        // Try home directory
        if let Some(home) = dirs::home_dir() {
            if let Ok(config) = Self::load(&home.join(".rugscan.toml")) {
                return config;
            }
        }

        Self::default()
    }

    /// Check if a rule is disabled.
    pub fn is_rule_disabled(&self, rule_id: &str) -> bool {
        self.disabled_rules.iter().any(|r| r == rule_id)
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            max_source_bytes: self.max_source_bytes,
            disabled_rules: self.disabled_rules.clone(),
        }
    }

    pub fn job_ttl(&self) -> Duration {
        Duration::from_secs(self.job_ttl_secs)
    }

    /// Never zero; `tokio::time::interval` rejects a zero period.
    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs.max(1))
    }
}

/// Generate a default config file content.
pub fn generate_default_config() -> String {
    r#"# rugscan configuration
# Place this file at ./rugscan.toml or ~/.rugscan.toml

# Address the HTTP API listens on (`rugscan serve`)
bind_address = "127.0.0.1:5000"

# How long a finished job can still be polled, in seconds
job_ttl_secs = 3600

# How often finished jobs are swept, in seconds
reap_interval_secs = 60

# Contracts larger than this many bytes are rejected
max_source_bytes = 10485760

# Disable specific rules by ID
disabled_rules = [
    # "PHISH-003",  # Uncomment to stop flagging hardcoded addresses
]
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_generated_config_matches_defaults() {
        let parsed: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "job_ttl_secs = 5\ndisabled_rules = [\"MEV-003\"]").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.job_ttl(), Duration::from_secs(5));
        assert_eq!(config.bind_address, "127.0.0.1:5000");
        assert!(config.is_rule_disabled("MEV-003"));
        assert!(!config.is_rule_disabled("MEV-001"));
        assert_eq!(config.analyzer_config().disabled_rules, vec!["MEV-003".to_string()]);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "job_ttl_secs = \"soon\"").unwrap();
        assert!(Config::load(file.path()).is_err());
        assert!(Config::load(Path::new("/nonexistent/rugscan.toml")).is_err());
    }

    #[test]
    fn test_reap_interval_never_zero() {
        let config = Config {
            reap_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.reap_interval(), Duration::from_secs(1));
    }
}
