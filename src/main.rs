//! CLI entry point for the rugpull scanner.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rugscan::{
    cli::{Cli, Commands},
    config::{generate_default_config, Config},
    demo::EXAMPLE_CONTRACT,
    reporters::{report, OutputFormat},
    rules::patterns::builtin_rules,
    AnalysisOptions, Category, ScanConfig, Scanner, Severity,
};
use std::io;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    // Load config file if specified, otherwise use defaults
    let mut config = if let Some(ref config_path) = cli.config {
        Config::load(config_path)?
    } else {
        Config::load_default()
    };

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            rugscan::server::serve(&config).await?;
        }

        Commands::Scan {
            path,
            deep,
            skip,
            name,
            output,
            fail_on,
        } => {
            let fail_on_severity: Option<Severity> = fail_on
                .as_ref()
                .map(|s| s.parse())
                .transpose()
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            let mut options = AnalysisOptions {
                deep_scan: deep,
                ..Default::default()
            };
            for category in &skip {
                let category: Category = category.parse().map_err(|e| anyhow::anyhow!("{}", e))?;
                options.set_category(category, false);
            }

            let format: OutputFormat = cli.format.parse().map_err(|e| anyhow::anyhow!("{}", e))?;

            let scanner = Scanner::with_config(ScanConfig {
                static_config: config.analyzer_config(),
                options,
                contract_name: name,
            })?;
            let scan_report = scanner.scan_path(&path)?;

            // Write output
            if let Some(output_path) = output {
                let mut file = std::fs::File::create(&output_path)?;
                report(&scan_report, format, &mut file)?;
                eprintln!("Report written to: {}", output_path.display());
            } else {
                let mut stdout = io::stdout().lock();
                report(&scan_report, format, &mut stdout)?;
            }

            // Check fail condition
            if let Some(fail_severity) = fail_on_severity {
                if let Some(max_risk) = scan_report.max_risk() {
                    if scan_report.total_findings() > 0 && max_risk >= fail_severity {
                        std::process::exit(1);
                    }
                }
            }
        }

        Commands::Rules { rule, json } => {
            let rules = builtin_rules();

            if let Some(rule_id) = rule {
                // Show specific rule
                if let Some(r) = rules.iter().find(|r| r.id == rule_id) {
                    if json {
                        println!("{}", serde_json::to_string_pretty(r)?);
                    } else {
                        println!("{}", format!("Rule: {}", r.id).bold());
                        println!("Name:           {}", r.name);
                        println!("Severity:       {}", r.severity);
                        println!("Category:       {}", r.category.tag());
                        println!("Deep scan only: {}", r.deep_scan);
                        println!("Description:    {}", r.description);
                        println!("Pattern:        {}", r.pattern);
                        println!("Impact:         {}", r.impact);
                        println!("Recommendation: {}", r.recommendation);
                    }
                } else {
                    eprintln!("Rule not found: {}", rule_id);
                    std::process::exit(1);
                }
            } else if json {
                println!("{}", serde_json::to_string_pretty(&rules)?);
            } else {
                println!("{}", "Available Rules".bold().underline());

                for category in Category::ALL {
                    println!("\n{}", category.to_string().bold());

                    for r in rules.iter().filter(|r| r.category == category) {
                        let severity_color = match r.severity {
                            Severity::Critical => r.severity.to_string().bright_red(),
                            Severity::High => r.severity.to_string().red(),
                            Severity::Medium => r.severity.to_string().yellow(),
                            Severity::Low => r.severity.to_string().blue(),
                        };
                        let deep = if r.deep_scan { " (deep)".dimmed().to_string() } else { String::new() };

                        println!(
                            "  {} [{}] - {}{}",
                            r.id.bright_cyan(),
                            severity_color,
                            r.name,
                            deep
                        );
                    }
                }
                println!();
                println!("Total: {} rules", rules.len());
            }
        }

        Commands::Example => {
            println!("{}", EXAMPLE_CONTRACT);
        }

        Commands::Init { output } => {
            if output.exists() {
                eprintln!(
                    "{}",
                    format!("Config file already exists: {}", output.display()).yellow()
                );
                eprintln!("Use a different path or remove the existing file.");
                std::process::exit(1);
            }

            std::fs::write(&output, generate_default_config())?;
            println!(
                "{}",
                format!("Created config file: {}", output.display()).green()
            );
            println!("Edit this file to change the listen address, job retention and disabled rules.");
        }
    }

    Ok(())
}
