//! Output formatters for scan results.

use crate::types::{truncate, FileReport, ScanReport, Severity, SeverityCounts};
use anyhow::Result;
use colored::Colorize;
use std::io::Write;

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Cli,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cli" | "terminal" | "console" => Ok(OutputFormat::Cli),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Report the scan results in the specified format.
pub fn report<W: Write>(report: &ScanReport, format: OutputFormat, writer: &mut W) -> Result<()> {
    match format {
        OutputFormat::Cli => report_cli(report, writer),
        OutputFormat::Json => report_json(report, writer),
        OutputFormat::Markdown => report_markdown(report, writer),
    }
}

/// Weighted risk meter from 0 to 100.
///
/// Critical findings weigh 4, high 3, medium 2 and low 1, relative to every
/// finding being critical. Display only; the overall risk rating does not use it.
pub fn risk_score(counts: &SeverityCounts) -> u8 {
    let total = counts.total();
    if total == 0 {
        return 0;
    }
    let weighted = counts.critical_count * 4
        + counts.high_count * 3
        + counts.medium_count * 2
        + counts.low_count;
    ((weighted * 100) as f64 / (total * 4) as f64).round() as u8
}

fn severity_label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Critical => "▲ CRITICAL".bright_red().bold(),
        Severity::High => "▲ HIGH".red().bold(),
        Severity::Medium => "● MEDIUM".yellow().bold(),
        Severity::Low => "● LOW".blue(),
    }
}

fn severity_emoji(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::High => "🟠",
        Severity::Medium => "🟡",
        Severity::Low => "🔵",
    }
}

/// CLI-formatted output with colors.
fn report_cli<W: Write>(report: &ScanReport, writer: &mut W) -> Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        "═══════════════════════════════════════════════════════════════".bright_blue()
    )?;
    writeln!(writer, "{}  Rugpull Scan Report", "🔒".bright_blue())?;
    writeln!(
        writer,
        "{}",
        "═══════════════════════════════════════════════════════════════".bright_blue()
    )?;
    writeln!(writer)?;

    // Summary
    let counts = report.counts();
    writeln!(writer, "{}", "Summary".bold().underline())?;
    writeln!(writer, "  Scan root:      {}", report.scan_root.display())?;
    writeln!(writer, "  Files scanned:  {}", report.files.len())?;
    writeln!(writer, "  Total findings: {}", report.total_findings())?;
    writeln!(writer, "  Scan time:      {}ms", report.total_time_ms)?;
    writeln!(writer)?;

    writeln!(writer, "{}", "Findings by Severity".bold().underline())?;
    writeln!(writer, "  {} Critical: {}", "●".bright_red(), counts.critical_count)?;
    writeln!(writer, "  {} High:     {}", "●".red(), counts.high_count)?;
    writeln!(writer, "  {} Medium:   {}", "●".yellow(), counts.medium_count)?;
    writeln!(writer, "  {} Low:      {}", "●".blue(), counts.low_count)?;
    writeln!(writer)?;

    for file in &report.files {
        write_file_cli(file, writer)?;
    }

    writeln!(writer)?;
    match report.max_risk() {
        Some(risk) if risk >= Severity::High && report.total_findings() > 0 => {
            writeln!(
                writer,
                "{}",
                "⚠️  Rugpull patterns detected! Review findings above.".bright_red().bold()
            )?;
        }
        _ if report.total_findings() > 0 => {
            writeln!(
                writer,
                "{}",
                "⚡ Some potential issues found. Review recommended.".yellow()
            )?;
        }
        _ => {
            writeln!(writer, "{}", "✅ No rugpull patterns detected.".green().bold())?;
        }
    }
    writeln!(writer)?;

    Ok(())
}

fn write_file_cli<W: Write>(file: &FileReport, writer: &mut W) -> Result<()> {
    let draft = &file.record.draft;

    writeln!(
        writer,
        "{}",
        format!("── {} ({}) ──", draft.contract_name, file.path.display()).bright_blue()
    )?;
    writeln!(
        writer,
        "  Overall risk: {}   Risk meter: {}%",
        severity_label(draft.overall_risk),
        risk_score(&draft.counts)
    )?;

    for finding in &draft.vulnerabilities {
        writeln!(writer)?;
        writeln!(
            writer,
            "  {} [{}] {}",
            severity_label(finding.severity),
            finding.rule_id,
            finding.category.tag().dimmed()
        )?;
        writeln!(writer, "  {}", finding.name.bold())?;
        writeln!(
            writer,
            "  Location: line {}-{}",
            finding.line_start, finding.line_end
        )?;
        writeln!(writer, "  {}", truncate(&finding.description, 120).dimmed())?;
        writeln!(writer, "  Impact: {}", finding.impact)?;
        writeln!(writer, "  Fix: {}", finding.recommendations.green())?;
    }
    writeln!(writer)?;

    Ok(())
}

/// JSON output format.
fn report_json<W: Write>(report: &ScanReport, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, report)?;
    writeln!(writer)?;
    Ok(())
}

/// Markdown output format.
fn report_markdown<W: Write>(report: &ScanReport, writer: &mut W) -> Result<()> {
    writeln!(writer, "# Rugpull Scan Report")?;
    writeln!(writer)?;
    writeln!(writer, "## Summary")?;
    writeln!(writer)?;
    writeln!(writer, "| Metric | Value |")?;
    writeln!(writer, "|--------|-------|")?;
    writeln!(writer, "| Scan Root | `{}` |", report.scan_root.display())?;
    writeln!(writer, "| Files Scanned | {} |", report.files.len())?;
    writeln!(writer, "| Total Findings | {} |", report.total_findings())?;
    writeln!(writer, "| Scan Time | {}ms |", report.total_time_ms)?;
    writeln!(writer)?;

    for file in &report.files {
        let draft = &file.record.draft;

        writeln!(writer, "## {} (`{}`)", draft.contract_name, file.path.display())?;
        writeln!(writer)?;
        writeln!(
            writer,
            "**Overall risk:** {} {} | **Risk meter:** {}%",
            severity_emoji(draft.overall_risk),
            draft.overall_risk,
            risk_score(&draft.counts)
        )?;
        writeln!(writer)?;
        writeln!(writer, "- 🔴 Critical: {}", draft.counts.critical_count)?;
        writeln!(writer, "- 🟠 High: {}", draft.counts.high_count)?;
        writeln!(writer, "- 🟡 Medium: {}", draft.counts.medium_count)?;
        writeln!(writer, "- 🔵 Low: {}", draft.counts.low_count)?;
        writeln!(writer)?;

        for finding in &draft.vulnerabilities {
            writeln!(
                writer,
                "### {} {} [{}]",
                severity_emoji(finding.severity),
                finding.name,
                finding.rule_id
            )?;
            writeln!(writer)?;
            writeln!(
                writer,
                "**Location:** Line {}-{} | **Category:** {}",
                finding.line_start,
                finding.line_end,
                finding.category.tag()
            )?;
            writeln!(writer)?;
            writeln!(writer, "{}", finding.description)?;
            writeln!(writer)?;
            writeln!(writer, "**Impact:** {}", finding.impact)?;
            writeln!(writer)?;
            writeln!(writer, "**Recommendation:** {}", finding.recommendations)?;
            writeln!(writer)?;
        }
    }

    Ok(())
}
