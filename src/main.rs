// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Salpa - Content Security Policy Analyzer
 * Standalone CLI for CSP assessment
 *
 * Features:
 * - Parses single and multi-header policy input
 * - Version-specific effective policy computation (CSP1-CSP3)
 * - Syntax, security and strict-CSP check set
 * - Text and JSON output
 *
 * (c) 2026 Bountyy Oy
 */

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, Level};

use salpa_csp::evaluator::Evaluator;
use salpa_csp::finding::{Finding, Severity};
use salpa_csp::parser::parse_headers;
use salpa_csp::policy::{PolicyCollection, Version};

/// Salpa - Content Security Policy Analyzer
#[derive(Parser)]
#[command(name = "salpa")]
#[command(author = "Bountyy Oy <info@bountyy.fi>")]
#[command(version = "1.2.0")]
#[command(about = "CSP analyzer built for actual pentests. Parses policies, finds the gaps.", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Quiet mode - only show findings
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one or more policies and report findings
    Check {
        /// Policy string(s), one per header instance (reads stdin if omitted)
        policies: Vec<String>,

        /// Read policy strings from a file, one header per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// CSP version to evaluate against: 1, 2 or 3
        #[arg(long, default_value_t = 3)]
        csp_version: u32,

        /// Output format
        #[arg(short = 'F', long, default_value = "text")]
        format: OutputFormat,

        /// Exit non-zero when a finding reaches this severity or worse
        #[arg(long)]
        fail_on: Option<SeverityArg>,
    },

    /// Print the effective policy a browser of the given version enforces
    Effective {
        /// Policy string(s), one per header instance (reads stdin if omitted)
        policies: Vec<String>,

        /// Read policy strings from a file, one header per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// CSP version to resolve for: 1, 2 or 3
        #[arg(long, default_value_t = 3)]
        csp_version: u32,

        /// Output format
        #[arg(short = 'F', long, default_value = "text")]
        format: OutputFormat,
    },

    /// Parse policies and print the normalized round-trip form
    Parse {
        /// Policy string(s), one per header instance (reads stdin if omitted)
        policies: Vec<String>,

        /// Read policy strings from a file, one header per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output format
        #[arg(short = 'F', long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SeverityArg {
    High,
    Syntax,
    Medium,
    HighMaybe,
    StrictCsp,
    MediumMaybe,
    Info,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::High => Severity::High,
            SeverityArg::Syntax => Severity::Syntax,
            SeverityArg::Medium => Severity::Medium,
            SeverityArg::HighMaybe => Severity::HighMaybe,
            SeverityArg::StrictCsp => Severity::StrictCsp,
            SeverityArg::MediumMaybe => Severity::MediumMaybe,
            SeverityArg::Info => Severity::Info,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport {
    csp_version: u32,
    policies: PolicyCollection,
    effective_policies: PolicyCollection,
    findings: Vec<Finding>,
    worst_severity: Severity,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            policies,
            file,
            csp_version,
            format,
            fail_on,
        } => {
            let headers = collect_headers(policies, file)?;
            let version = Version::from_ordinal(csp_version)?;
            let csps = parse_headers(&headers);
            debug!(policies = csps.len(), %version, "parsed policy collection");

            let evaluation = Evaluator::new(version).evaluate(&csps);
            let worst = evaluation.worst_severity();

            match format {
                OutputFormat::Json => {
                    let report = CheckReport {
                        csp_version: version.ordinal(),
                        policies: csps,
                        effective_policies: evaluation.effective.clone(),
                        findings: evaluation.findings.clone(),
                        worst_severity: worst,
                    };
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                OutputFormat::Text => print_findings(&evaluation.findings, version, worst),
            }

            if let Some(threshold) = fail_on {
                if worst <= Severity::from(threshold) {
                    std::process::exit(2);
                }
            }
        }

        Commands::Effective {
            policies,
            file,
            csp_version,
            format,
        } => {
            let headers = collect_headers(policies, file)?;
            let version = Version::from_ordinal(csp_version)?;
            let csps = parse_headers(&headers);
            let (effective, _ignored) = salpa_csp::effective::effective_collection(&csps, version);

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&effective)?),
                OutputFormat::Text => println!("{}", effective),
            }
        }

        Commands::Parse { policies, file, format } => {
            let headers = collect_headers(policies, file)?;
            let csps = parse_headers(&headers);

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&csps)?),
                OutputFormat::Text => println!("{}", csps),
            }
        }
    }

    Ok(())
}

/// Gather policy strings from args, a file, or stdin (one header per line).
fn collect_headers(policies: Vec<String>, file: Option<PathBuf>) -> Result<Vec<String>> {
    let mut headers = policies;

    if let Some(path) = file {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read policy file {}", path.display()))?;
        headers.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }

    if headers.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("failed to read policy from stdin")?;
        headers.extend(
            input
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }

    Ok(headers)
}

fn print_findings(findings: &[Finding], version: Version, worst: Severity) {
    println!("Evaluated against {}", version);
    println!();

    if findings.is_empty() {
        println!("No findings.");
        return;
    }

    // Engine order is check order; severity order reads better on a terminal
    let mut sorted: Vec<&Finding> = findings.iter().collect();
    sorted.sort_by_key(|f| f.severity);

    for finding in sorted {
        println!("{}", finding);
    }

    println!();
    println!("{} finding(s), worst severity: {}", findings.len(), worst);
}
