//! Core type definitions for the rugscan analysis engine.

use crate::error::AnalysisError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for findings, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" | "med" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" | "crit" => Ok(Severity::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Category of rugpull pattern a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Hidden owners, secret mint paths, self-destruct switches
    Backdoor,
    /// Centralised control over transfers and limits
    Privileged,
    /// Fee, tax and supply manipulation
    Tokenomics,
    /// Deceptive flows that trick holders
    Phishing,
    /// Risky or hidden allowance handling
    Approvals,
    /// Sensitive operations without a second factor
    #[serde(alias = "2fa")]
    TwoFactor,
    /// Front-running and miner-extractable value exposure
    Mev,
    /// Weak multisignature wallets
    Multisig,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Backdoor,
        Category::Privileged,
        Category::Tokenomics,
        Category::Phishing,
        Category::Approvals,
        Category::TwoFactor,
        Category::Mev,
        Category::Multisig,
    ];

    /// Short machine tag, as used on the wire.
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Backdoor => "backdoor",
            Category::Privileged => "privileged",
            Category::Tokenomics => "tokenomics",
            Category::Phishing => "phishing",
            Category::Approvals => "approvals",
            Category::TwoFactor => "two-factor",
            Category::Mev => "mev",
            Category::Multisig => "multisig",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Backdoor => write!(f, "Backdoor"),
            Category::Privileged => write!(f, "Privileged Functions"),
            Category::Tokenomics => write!(f, "Tokenomics Manipulation"),
            Category::Phishing => write!(f, "Phishing"),
            Category::Approvals => write!(f, "Approvals"),
            Category::TwoFactor => write!(f, "Two-Factor Security"),
            Category::Mev => write!(f, "MEV Exposure"),
            Category::Multisig => write!(f, "Multisig"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "backdoor" | "backdoors" => Ok(Category::Backdoor),
            "privileged" => Ok(Category::Privileged),
            "tokenomics" => Ok(Category::Tokenomics),
            "phishing" => Ok(Category::Phishing),
            "approvals" | "approval" => Ok(Category::Approvals),
            "two-factor" | "2fa" => Ok(Category::TwoFactor),
            "mev" => Ok(Category::Mev),
            "multisig" => Ok(Category::Multisig),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Complete set of analysis toggles. Every field is always set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    pub detect_backdoors: bool,
    pub detect_privileged: bool,
    pub detect_tokenomics: bool,
    pub detect_phishing: bool,
    pub detect_approvals: bool,
    #[serde(rename = "detect2FA")]
    pub detect_2fa: bool,
    #[serde(rename = "detectMEV")]
    pub detect_mev: bool,
    pub detect_multisig: bool,
    pub deep_scan: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            detect_backdoors: true,
            detect_privileged: true,
            detect_tokenomics: true,
            detect_phishing: true,
            detect_approvals: true,
            detect_2fa: true,
            detect_mev: true,
            detect_multisig: true,
            deep_scan: false,
        }
    }
}

impl AnalysisOptions {
    /// Whether rules of `category` should run.
    pub fn category_enabled(&self, category: Category) -> bool {
        match category {
            Category::Backdoor => self.detect_backdoors,
            Category::Privileged => self.detect_privileged,
            Category::Tokenomics => self.detect_tokenomics,
            Category::Phishing => self.detect_phishing,
            Category::Approvals => self.detect_approvals,
            Category::TwoFactor => self.detect_2fa,
            Category::Mev => self.detect_mev,
            Category::Multisig => self.detect_multisig,
        }
    }

    /// Turn one category toggle on or off.
    pub fn set_category(&mut self, category: Category, enabled: bool) {
        let flag = match category {
            Category::Backdoor => &mut self.detect_backdoors,
            Category::Privileged => &mut self.detect_privileged,
            Category::Tokenomics => &mut self.detect_tokenomics,
            Category::Phishing => &mut self.detect_phishing,
            Category::Approvals => &mut self.detect_approvals,
            Category::TwoFactor => &mut self.detect_2fa,
            Category::Mev => &mut self.detect_mev,
            Category::Multisig => &mut self.detect_multisig,
        };
        *flag = enabled;
    }

    /// Apply a partial set of toggles on top of `self`.
    pub fn merged_with(self, patch: &AnalysisOptionsPatch) -> Self {
        Self {
            detect_backdoors: patch.detect_backdoors.unwrap_or(self.detect_backdoors),
            detect_privileged: patch.detect_privileged.unwrap_or(self.detect_privileged),
            detect_tokenomics: patch.detect_tokenomics.unwrap_or(self.detect_tokenomics),
            detect_phishing: patch.detect_phishing.unwrap_or(self.detect_phishing),
            detect_approvals: patch.detect_approvals.unwrap_or(self.detect_approvals),
            detect_2fa: patch.detect_2fa.unwrap_or(self.detect_2fa),
            detect_mev: patch.detect_mev.unwrap_or(self.detect_mev),
            detect_multisig: patch.detect_multisig.unwrap_or(self.detect_multisig),
            deep_scan: patch.deep_scan.unwrap_or(self.deep_scan),
        }
    }
}

/// Options as sent by a client; omitted toggles fall back to the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisOptionsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_backdoors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_privileged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_tokenomics: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_phishing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_approvals: Option<bool>,
    #[serde(rename = "detect2FA", skip_serializing_if = "Option::is_none")]
    pub detect_2fa: Option<bool>,
    #[serde(rename = "detectMEV", skip_serializing_if = "Option::is_none")]
    pub detect_mev: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_multisig: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_scan: Option<bool>,
}

impl AnalysisOptionsPatch {
    /// Merge with the defaults into a complete options record.
    pub fn resolve(&self) -> AnalysisOptions {
        AnalysisOptions::default().merged_with(self)
    }
}

impl From<AnalysisOptions> for AnalysisOptionsPatch {
    fn from(options: AnalysisOptions) -> Self {
        Self {
            detect_backdoors: Some(options.detect_backdoors),
            detect_privileged: Some(options.detect_privileged),
            detect_tokenomics: Some(options.detect_tokenomics),
            detect_phishing: Some(options.detect_phishing),
            detect_approvals: Some(options.detect_approvals),
            detect_2fa: Some(options.detect_2fa),
            detect_mev: Some(options.detect_mev),
            detect_multisig: Some(options.detect_multisig),
            deep_scan: Some(options.deep_scan),
        }
    }
}

/// Analysis request body as received from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInput {
    #[serde(default)]
    pub contract_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,
    /// Accepted for compatibility; analysis works on source only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<AnalysisOptionsPatch>,
}

/// A validated analysis request with fully resolved options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub contract_code: String,
    pub contract_name: Option<String>,
    pub options: AnalysisOptions,
}

impl AnalysisRequest {
    /// Build a request with default options.
    pub fn new(contract_code: impl Into<String>) -> Self {
        Self {
            contract_code: contract_code.into(),
            contract_name: None,
            options: AnalysisOptions::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.contract_name = Some(name.into());
        self
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }
}

impl TryFrom<ContractInput> for AnalysisRequest {
    type Error = AnalysisError;

    fn try_from(input: ContractInput) -> Result<Self, Self::Error> {
        let contract_code = match input.contract_code {
            Some(code) if !code.trim().is_empty() => code,
            _ => {
                return Err(AnalysisError::Validation(
                    "Contract code is required at \"contractCode\"".to_string(),
                ))
            }
        };
        Ok(Self {
            contract_code,
            contract_name: input.contract_name.filter(|n| !n.trim().is_empty()),
            options: input.options.unwrap_or_default().resolve(),
        })
    }
}

/// A single reported rule match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    /// Identifier of the rule that produced this finding.
    pub rule_id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub severity: Severity,
    /// First line of the match (1-indexed, inclusive).
    pub line_start: usize,
    /// Last line of the match (1-indexed, inclusive).
    pub line_end: usize,
    pub impact: String,
    pub recommendations: String,
}

/// Number of findings per severity bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityCounts {
    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
}

impl SeverityCounts {
    pub fn tally(findings: &[Vulnerability]) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            *counts.bucket_mut(finding.severity) += 1;
        }
        counts
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical_count,
            Severity::High => self.high_count,
            Severity::Medium => self.medium_count,
            Severity::Low => self.low_count,
        }
    }

    fn bucket_mut(&mut self, severity: Severity) -> &mut usize {
        match severity {
            Severity::Critical => &mut self.critical_count,
            Severity::High => &mut self.high_count,
            Severity::Medium => &mut self.medium_count,
            Severity::Low => &mut self.low_count,
        }
    }

    pub fn total(&self) -> usize {
        self.critical_count + self.high_count + self.medium_count + self.low_count
    }

    /// Worst severity with a non-zero count, or `Low` when there are none.
    pub fn overall_risk(&self) -> Severity {
        Severity::ALL
            .into_iter()
            .find(|s| self.get(*s) > 0)
            .unwrap_or(Severity::Low)
    }
}

/// Engine output: everything about an analysis except scan timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDraft {
    pub contract_name: String,
    pub contract_code: String,
    #[serde(flatten)]
    pub counts: SeverityCounts,
    pub overall_risk: Severity,
    pub vulnerabilities: Vec<Vulnerability>,
}

impl AnalysisDraft {
    pub fn new(contract_name: String, contract_code: String, vulnerabilities: Vec<Vulnerability>) -> Self {
        let counts = SeverityCounts::tally(&vulnerabilities);
        Self {
            contract_name,
            contract_code,
            overall_risk: counts.overall_risk(),
            counts,
            vulnerabilities,
        }
    }

    /// Attach scan timing metadata.
    pub fn timed(self, scan_time: DateTime<Utc>, scan_duration_ms: u64) -> AnalysisRecord {
        AnalysisRecord {
            draft: self,
            scan_time,
            scan_duration: scan_duration_ms,
        }
    }
}

/// A finished analysis that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    #[serde(flatten)]
    pub draft: AnalysisDraft,
    pub scan_time: DateTime<Utc>,
    /// Scan duration in milliseconds.
    pub scan_duration: u64,
}

/// A stored analysis with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: u64,
    #[serde(flatten)]
    pub record: AnalysisRecord,
}

impl AnalysisResult {
    pub fn contract_name(&self) -> &str {
        &self.record.draft.contract_name
    }

    pub fn overall_risk(&self) -> Severity {
        self.record.draft.overall_risk
    }

    pub fn counts(&self) -> &SeverityCounts {
        &self.record.draft.counts
    }

    pub fn vulnerabilities(&self) -> &[Vulnerability] {
        &self.record.draft.vulnerabilities
    }
}

/// Analysis of one contract file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub record: AnalysisRecord,
}

/// Results of scanning a file or directory from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub scan_root: PathBuf,
    pub files: Vec<FileReport>,
    /// Total scan time in milliseconds.
    pub total_time_ms: u64,
}

impl ScanReport {
    pub fn new(scan_root: PathBuf) -> Self {
        Self {
            scan_root,
            files: Vec::new(),
            total_time_ms: 0,
        }
    }

    pub fn total_findings(&self) -> usize {
        self.files.iter().map(|f| f.record.draft.vulnerabilities.len()).sum()
    }

    /// Findings per severity across every file.
    pub fn counts(&self) -> SeverityCounts {
        let mut total = SeverityCounts::default();
        for file in &self.files {
            let counts = &file.record.draft.counts;
            total.critical_count += counts.critical_count;
            total.high_count += counts.high_count;
            total.medium_count += counts.medium_count;
            total.low_count += counts.low_count;
        }
        total
    }

    /// Worst overall risk of any scanned file, `None` if nothing was scanned.
    pub fn max_risk(&self) -> Option<Severity> {
        self.files.iter().map(|f| f.record.draft.overall_risk).max()
    }
}

/// Truncate a string to a maximum number of characters (UTF-8 safe).
/// Appends "..." if truncated.
pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
