//! Command-line interface for the rugpull scanner.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rugpull pattern scanner for Solidity smart contracts.
#[derive(Parser, Debug)]
#[command(name = "rugscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (cli, json, markdown)
    #[arg(short = 'f', long, global = true, default_value = "cli")]
    pub format: String,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Scan a contract file or directory of contracts
    Scan {
        /// Path to scan (file or directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Also run the slower deep-scan rules
        #[arg(long)]
        deep: bool,

        /// Category to skip (can be used multiple times)
        #[arg(long = "skip", value_name = "CATEGORY")]
        skip: Vec<String>,

        /// Contract name to report (single-file scans only)
        #[arg(short, long)]
        name: Option<String>,

        /// Output file (writes to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail with exit code 1 if any contract's risk is at this severity or above
        #[arg(long)]
        fail_on: Option<String>,
    },

    /// Show information about available rules
    Rules {
        /// Show details for a specific rule ID
        #[arg(short, long)]
        rule: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the example vulnerable contract
    Example,

    /// Generate a default configuration file
    Init {
        /// Output path for config file
        #[arg(default_value = "rugscan.toml")]
        output: PathBuf,
    },
}
