//! rugscan - Rugpull Scanner for Solidity Contracts
//!
//! Scans Solidity source for patterns associated with rugpull scams: hidden
//! owners, unlimited minting, adjustable fees, malicious approvals and more.
//!
//! # Features
//!
//! - **Static Analysis**: Regex rule catalog matched against raw source
//! - **Async Jobs**: Submit an analysis and poll its progress
//! - **HTTP API**: JSON endpoints served with axum
//! - **CLI Reports**: Terminal, JSON and Markdown output
//!
//! # Quick Start
//!
//! ```no_run
//! use rugscan::{AnalysisRequest, StaticAnalyzer};
//!
//! fn main() -> anyhow::Result<()> {
//!     let analyzer = StaticAnalyzer::new()?;
//!     let source = std::fs::read_to_string("Token.sol")?;
//!     let draft = analyzer.analyze(&AnalysisRequest::new(source))?;
//!
//!     println!("{}: {} risk", draft.contract_name, draft.overall_risk);
//!     Ok(())
//! }
//! ```

pub mod analyzers;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod jobs;
pub mod reporters;
pub mod rules;
pub mod server;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use analyzers::{AnalyzerConfig, StaticAnalyzer};
pub use config::Config;
pub use error::AnalysisError;
pub use jobs::{JobManager, JobStatus, JobStatusView};
pub use reporters::{report, OutputFormat};
pub use rules::{Rule, RuleSet};
pub use store::ResultStore;
pub use types::{
    truncate, AnalysisOptions, AnalysisRequest, AnalysisResult, Category, FileReport,
    ScanReport, Severity, Vulnerability,
};

use anyhow::Result;
use chrono::Utc;
use std::path::Path;
use std::time::Instant;
use walkdir::WalkDir;

/// Configuration for scanning files on disk.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Static analyzer configuration.
    pub static_config: AnalyzerConfig,
    /// Options applied to every file.
    pub options: AnalysisOptions,
    /// Name to report when scanning a single file.
    pub contract_name: Option<String>,
}

/// Scans `.sol` files from disk with the static analyzer.
pub struct Scanner {
    config: ScanConfig,
    analyzer: StaticAnalyzer,
}

impl Scanner {
    /// Create a new scanner with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ScanConfig::default())
    }

    /// Create a scanner with custom configuration.
    pub fn with_config(config: ScanConfig) -> Result<Self> {
        let analyzer = StaticAnalyzer::with_config(config.static_config.clone())?;
        Ok(Self { config, analyzer })
    }

    /// Scan a single file, or every `.sol` file under a directory.
    pub fn scan_path(&self, path: &Path) -> Result<ScanReport> {
        let start = Instant::now();
        let mut report = ScanReport::new(path.to_path_buf());

        if path.is_file() {
            report
                .files
                .push(self.scan_file(path, self.config.contract_name.clone())?);
        } else if path.is_dir() {
            let files: Vec<_> = WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::warn!("Skipping unreadable entry: {}", e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file() && is_solidity_file(entry.path()))
                .collect();

            tracing::info!("Discovered {} contract files to scan", files.len());

            for entry in files {
                match self.scan_file(entry.path(), None) {
                    Ok(file_report) => report.files.push(file_report),
                    Err(e) => {
                        tracing::warn!("Failed to scan {}: {}", entry.path().display(), e);
                    }
                }
            }
        } else {
            return Err(anyhow::anyhow!("Path does not exist: {}", path.display()));
        }

        report.total_time_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    fn scan_file(&self, path: &Path, contract_name: Option<String>) -> Result<FileReport> {
        tracing::debug!("Scanning: {}", path.display());

        let source = std::fs::read_to_string(path)?;
        let request = AnalysisRequest {
            contract_code: source,
            contract_name,
            options: self.config.options,
        };

        let scan_time = Utc::now();
        let start = Instant::now();
        let draft = self.analyzer.analyze(&request)?;
        let record = draft.timed(scan_time, start.elapsed().as_millis() as u64);

        Ok(FileReport {
            path: path.to_path_buf(),
            record,
        })
    }
}

fn is_solidity_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("sol"))
        .unwrap_or(false)
}
