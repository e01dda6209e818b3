//! Static analysis engine: runs the rule catalog over contract source.

use crate::error::{AnalysisError, Result};
use crate::rules::{find_matches, CompiledRule, RuleSet};
use crate::types::{AnalysisDraft, AnalysisOptions, AnalysisRequest, Vulnerability};
use regex::Regex;
use std::sync::OnceLock;

/// Name used when the source has no `contract` declaration.
pub const UNNAMED_CONTRACT: &str = "UnnamedContract";

/// Configuration for the static analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Maximum source size to analyze (in bytes).
    pub max_source_bytes: usize,
    /// Rule IDs that never run.
    pub disabled_rules: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_source_bytes: 10 * 1024 * 1024, // 10 MB
            disabled_rules: Vec::new(),
        }
    }
}

/// How far an analysis has got, reported after each evaluated rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub rules_done: usize,
    pub rules_total: usize,
}

/// Static analyzer that scans contract source for rugpull patterns.
pub struct StaticAnalyzer {
    config: AnalyzerConfig,
    rules: RuleSet,
}

impl StaticAnalyzer {
    /// Create a new analyzer with the built-in catalog.
    pub fn new() -> Result<Self> {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Create an analyzer with custom configuration.
    pub fn with_config(config: AnalyzerConfig) -> Result<Self> {
        Ok(Self {
            config,
            rules: RuleSet::builtin()?,
        })
    }

    /// Create an analyzer over an explicit rule set.
    pub fn with_rules(config: AnalyzerConfig, rules: RuleSet) -> Self {
        Self { config, rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Rules that will run under `options`, in catalog order.
    pub fn active_rules<'a>(
        &'a self,
        options: &'a AnalysisOptions,
    ) -> impl Iterator<Item = &'a CompiledRule> + 'a {
        self.rules.rules().iter().filter(move |r| {
            options.category_enabled(r.rule.category)
                && (options.deep_scan || !r.rule.deep_scan)
                && !self.config.disabled_rules.iter().any(|id| *id == r.rule.id)
        })
    }

    /// Analyze a contract.
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisDraft> {
        self.analyze_with_progress(request, |_| {})
    }

    /// Analyze a contract, calling `on_progress` after each evaluated rule.
    pub fn analyze_with_progress<F>(
        &self,
        request: &AnalysisRequest,
        mut on_progress: F,
    ) -> Result<AnalysisDraft>
    where
        F: FnMut(ScanProgress),
    {
        let source = request.contract_code.as_str();

        if source.len() > self.config.max_source_bytes {
            return Err(AnalysisError::SourceTooLarge {
                size: source.len(),
                limit: self.config.max_source_bytes,
            });
        }

        let contract_name = request
            .contract_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| extract_contract_name(source));

        let active: Vec<&CompiledRule> = self.active_rules(&request.options).collect();
        let rules_total = active.len();
        let mut vulnerabilities = Vec::new();

        for (i, compiled) in active.into_iter().enumerate() {
            let rule = &compiled.rule;
            for mat in find_matches(source, &compiled.regex) {
                vulnerabilities.push(Vulnerability {
                    rule_id: rule.id.clone(),
                    name: rule.name.clone(),
                    description: rule.description.clone(),
                    category: rule.category,
                    severity: rule.severity,
                    line_start: mat.line_start,
                    line_end: mat.line_end,
                    impact: rule.impact.clone(),
                    recommendations: rule.recommendation.clone(),
                });
            }
            on_progress(ScanProgress {
                rules_done: i + 1,
                rules_total,
            });
        }

        tracing::debug!(
            "Analyzed {} with {} rules: {} findings",
            contract_name,
            rules_total,
            vulnerabilities.len()
        );

        Ok(AnalysisDraft::new(
            contract_name,
            request.contract_code.clone(),
            vulnerabilities,
        ))
    }
}

/// First identifier after the `contract` keyword, or [`UNNAMED_CONTRACT`].
pub fn extract_contract_name(source: &str) -> String {
    static CONTRACT_NAME: OnceLock<Regex> = OnceLock::new();
    let re = CONTRACT_NAME.get_or_init(|| Regex::new(r"contract\s+([a-zA-Z0-9_]+)").unwrap());
    re.captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNNAMED_CONTRACT.to_string())
}
