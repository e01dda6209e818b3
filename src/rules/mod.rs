//! Rugpull detection rules and the pattern matcher that applies them.

pub mod patterns;

use crate::error::{AnalysisError, Result};
use crate::types::{Category, Severity};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A detection rule that matches a suspicious pattern in contract source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Unique identifier for this rule.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// What this rule detects.
    pub description: String,
    pub category: Category,
    pub severity: Severity,
    /// Regex matched against the whole source; may span lines.
    pub pattern: String,
    /// Only evaluated when deep scan is requested.
    #[serde(default)]
    pub deep_scan: bool,
    /// What an attacker or owner can do with the pattern.
    pub impact: String,
    /// How to fix or mitigate it.
    pub recommendation: String,
}

impl Rule {
    /// Compile the regex pattern for this rule.
    pub fn compile(&self) -> Result<CompiledRule> {
        let regex = Regex::new(&self.pattern).map_err(|source| AnalysisError::InvalidPattern {
            rule_id: self.id.clone(),
            source,
        })?;
        Ok(CompiledRule {
            rule: self.clone(),
            regex,
        })
    }
}

/// A rule with its compiled regex.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: Rule,
    pub regex: Regex,
}

impl CompiledRule {
    pub fn is_match(&self, content: &str) -> bool {
        self.regex.is_match(content)
    }
}

/// One occurrence of a pattern in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// First line of the match (1-indexed).
    pub line_start: usize,
    /// Last line of the match (1-indexed).
    pub line_end: usize,
    pub matched_text: String,
}

/// Find every non-overlapping occurrence of `regex` in `source`.
///
/// The search runs over the whole text rather than line by line, so a single
/// match may cover several lines. Each match starts after the end of the
/// previous one.
pub fn find_matches(source: &str, regex: &Regex) -> Vec<PatternMatch> {
    let line_index = LineIndex::new(source);
    regex
        .find_iter(source)
        .map(|mat| {
            let line_start = line_index.line_of(mat.start());
            let line_end = line_start + mat.as_str().matches('\n').count();
            PatternMatch {
                line_start,
                line_end,
                matched_text: mat.as_str().to_string(),
            }
        })
        .collect()
}

/// Pre-computed line offset index for O(log n) line lookups.
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in content.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        LineIndex { line_starts }
    }

    /// 1-indexed line containing byte `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// The compiled catalog, in catalog order.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile the built-in catalog.
    pub fn builtin() -> Result<Self> {
        let mut set = Self::new();
        for rule in patterns::builtin_rules() {
            set.add_rule(rule)?;
        }
        Ok(set)
    }

    /// Append a rule at the end of the catalog.
    pub fn add_rule(&mut self, rule: Rule) -> Result<()> {
        self.rules.push(rule.compile()?);
        Ok(())
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.rule.id == id)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
