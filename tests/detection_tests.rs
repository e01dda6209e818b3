//! Integration tests for rugpull pattern detection.
//!
//! These tests ensure rugscan catches common rugpull patterns across the
//! rule categories, and stays quiet on a plain token.

use rugscan::{AnalysisOptions, AnalysisRequest, Category, Severity, StaticAnalyzer};
use std::path::PathBuf;
use std::process::Command;

fn sample_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/samples")
        .join(name)
}

fn read_sample(name: &str) -> String {
    std::fs::read_to_string(sample_path(name)).unwrap()
}

/// Rule ids and start lines reported for a sample.
fn findings(name: &str, options: AnalysisOptions) -> Vec<(String, usize)> {
    let analyzer = StaticAnalyzer::new().unwrap();
    let request = AnalysisRequest::new(read_sample(name)).with_options(options);
    analyzer
        .analyze(&request)
        .unwrap()
        .vulnerabilities
        .into_iter()
        .map(|v| (v.rule_id, v.line_start))
        .collect()
}

fn assert_detects(name: &str, rule_id: &str, line: usize) {
    let found = findings(name, AnalysisOptions::default());
    assert!(
        found.iter().any(|(id, l)| id == rule_id && *l == line),
        "{}: expected {} at line {}, got {:?}",
        name,
        rule_id,
        line,
        found
    );
}

/// Run `rugscan scan -f json` on a path and return the parsed report.
fn scan_with_binary(path: &PathBuf, extra: &[&str]) -> (Option<i32>, serde_json::Value) {
    let output = Command::new(env!("CARGO_BIN_EXE_rugscan"))
        .arg("scan")
        .arg(path)
        .args(["-f", "json"])
        .args(extra)
        .env("RUST_LOG", "error")
        .output()
        .expect("Failed to run rugscan");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("invalid JSON output ({}): {}", e, stdout));
    (output.status.code(), json)
}

// ============================================================================
// BACKDOOR TESTS
// ============================================================================

#[test]
fn test_detects_selfdestruct() {
    assert_detects("backdoor/Destructible.sol", "BACKDOOR-003", 19);
}

#[test]
fn test_detects_delegatecall() {
    assert_detects("backdoor/Destructible.sol", "BACKDOOR-004", 13);
}

#[test]
fn test_example_contract_hidden_owner() {
    let analyzer = StaticAnalyzer::new().unwrap();
    let draft = analyzer
        .analyze(&AnalysisRequest::new(rugscan::demo::EXAMPLE_CONTRACT))
        .unwrap();

    assert_eq!(draft.overall_risk, Severity::Critical);
    assert!(draft.counts.critical_count >= 2);
    assert!(draft
        .vulnerabilities
        .iter()
        .any(|v| v.rule_id == "BACKDOOR-002" && v.category == Category::Backdoor));
}

// ============================================================================
// TOKENOMICS TESTS
// ============================================================================

#[test]
fn test_detects_fee_setter() {
    assert_detects("tokenomics/FeeTrap.sol", "TOKEN-001", 13);
}

#[test]
fn test_detects_excessive_fee() {
    assert_detects("tokenomics/FeeTrap.sol", "TOKEN-002", 18);
}

#[test]
fn test_balance_overwrite_needs_deep_scan() {
    let shallow = findings("tokenomics/FeeTrap.sol", AnalysisOptions::default());
    assert!(!shallow.iter().any(|(id, _)| id == "TOKEN-006"));

    let deep = findings(
        "tokenomics/FeeTrap.sol",
        AnalysisOptions {
            deep_scan: true,
            ..Default::default()
        },
    );
    assert!(deep.contains(&("TOKEN-006".to_string(), 22)));
}

// ============================================================================
// APPROVAL TESTS
// ============================================================================

#[test]
fn test_detects_unlimited_approval() {
    assert_detects("approvals/Drainer.sol", "APPROVE-001", 15);
    assert_detects("approvals/Drainer.sol", "APPROVE-002", 15);
}

#[test]
fn test_detects_forced_transfer() {
    assert_detects("approvals/Drainer.sol", "APPROVE-003", 18);
}

// ============================================================================
// MEV TESTS
// ============================================================================

#[test]
fn test_detects_zero_slippage_swap() {
    assert_detects("mev/UnsafeSwap.sol", "MEV-001", 18);
    assert_detects("mev/UnsafeSwap.sol", "MEV-002", 18);
}

#[test]
fn test_skipping_mev_suppresses_only_mev() {
    let mut options = AnalysisOptions::default();
    options.set_category(Category::Mev, false);
    assert!(findings("mev/UnsafeSwap.sol", options).is_empty());

    let mut options = AnalysisOptions::default();
    options.set_category(Category::Mev, false);
    let other = findings("approvals/Drainer.sol", options);
    assert_eq!(other.len(), 3);
}

// ============================================================================
// MULTISIG TESTS
// ============================================================================

#[test]
fn test_detects_weak_multisig() {
    assert_detects("multisig/WeakWallet.sol", "MULTISIG-001", 13);
    assert_detects("multisig/WeakWallet.sol", "MULTISIG-002", 17);
    assert_detects("multisig/WeakWallet.sol", "MULTISIG-003", 10);
}

// ============================================================================
// FALSE POSITIVE TESTS
// ============================================================================

#[test]
fn test_plain_token_is_clean() {
    let deep = AnalysisOptions {
        deep_scan: true,
        ..Default::default()
    };
    let found = findings("clean/PlainToken.sol", deep);
    assert!(found.is_empty(), "unexpected findings: {:?}", found);
}

// ============================================================================
// CLI TESTS
// ============================================================================

#[test]
fn test_cli_scans_sample_directory() {
    let (code, json) = scan_with_binary(&sample_path(""), &[]);
    assert_eq!(code, Some(0));

    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 6);

    let total: usize = files
        .iter()
        .map(|f| f["vulnerabilities"].as_array().unwrap().len())
        .sum();
    assert_eq!(total, 12);
}

#[test]
fn test_cli_fail_on_threshold() {
    let (code, json) = scan_with_binary(
        &sample_path("backdoor/Destructible.sol"),
        &["--fail-on", "critical"],
    );
    assert_eq!(code, Some(1));
    assert_eq!(json["files"][0]["overallRisk"], "critical");

    let (code, _) = scan_with_binary(
        &sample_path("clean/PlainToken.sol"),
        &["--fail-on", "low"],
    );
    assert_eq!(code, Some(0));
}

#[test]
fn test_cli_skip_category() {
    let (_, json) = scan_with_binary(
        &sample_path("multisig/WeakWallet.sol"),
        &["--skip", "multisig", "--name", "Renamed"],
    );
    assert_eq!(json["files"][0]["contractName"], "Renamed");
    assert_eq!(json["files"][0]["vulnerabilities"].as_array().unwrap().len(), 0);
    assert_eq!(json["files"][0]["overallRisk"], "low");
}
