use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bankrec_core::{Statement, Transaction};
use bankrec_ingest::batch::{ScanOptions, scan_directory};
use bankrec_ingest::parser::parse_file;
use bankrec_recon::{ReconciliationReport, Tolerance, reconcile};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bankrec", version, about = "Bank statement parsing and reconciliation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a single statement file and print the normalized JSON
    Parse {
        /// Path to a PDF/CSV/XLS/XLSX statement
        file: PathBuf,
    },

    /// Scan a statements directory tree and write grouped statement JSON
    Scan {
        /// Root directory (bank/account-type folder convention)
        dir: PathBuf,

        /// Output directory for statement_data_*.json files
        #[arg(long, default_value = "statements-out")]
        out: PathBuf,

        /// Stop after this many files (partial results are still written)
        #[arg(long)]
        max_files: Option<usize>,
    },

    /// Reconcile statement transactions against email transactions
    Reconcile {
        /// Statement-side input: statement JSON (array of statements or
        /// transactions)
        #[arg(long)]
        statements: PathBuf,

        /// Email-side input: transaction JSON in the same shape
        #[arg(long)]
        emails: PathBuf,

        /// Maximum amount difference for a match, in currency units
        #[arg(long, default_value_t = 1.0)]
        tolerance_amount: f64,

        /// Maximum date difference for a match, in days
        #[arg(long, default_value_t = 3)]
        tolerance_days: i64,

        /// Minimum description similarity for a fuzzy match
        #[arg(long, default_value_t = 0.5)]
        similarity_threshold: f64,

        /// Write the full report JSON here (defaults to stdout summary only)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Parse { file } => {
            let statement = parse_file(&file)?;
            println!("{}", serde_json::to_string_pretty(&statement)?);
            for warning in &statement.warnings {
                eprintln!("warning: {warning}");
            }
        }

        Command::Scan { dir, out, max_files } => {
            let options = ScanOptions { max_files };
            let report = scan_directory(&dir, &out, &options)?;
            println!(
                "Processed {} file(s), wrote {} output file(s)",
                report.processed,
                report.outputs.len()
            );
            for path in &report.outputs {
                println!("  {}", path.display());
            }
            if !report.skipped.is_empty() {
                println!("Skipped {} file(s):", report.skipped.len());
                for skip in &report.skipped {
                    println!("  {}: {}", skip.path.display(), skip.reason);
                }
            }
            if report.files_not_processed > 0 {
                println!(
                    "Budget reached; {} file(s) not processed",
                    report.files_not_processed
                );
            }
        }

        Command::Reconcile {
            statements,
            emails,
            tolerance_amount,
            tolerance_days,
            similarity_threshold,
            out,
        } => {
            let statement_txns = load_transactions(&statements)
                .with_context(|| format!("loading {}", statements.display()))?;
            let email_txns = load_transactions(&emails)
                .with_context(|| format!("loading {}", emails.display()))?;
            let tolerance = Tolerance {
                amount: tolerance_amount,
                days: tolerance_days,
                similarity_threshold,
            };
            let report = reconcile(&statement_txns, &email_txns, &tolerance)?;
            print_summary(&report);
            if let Some(out) = out {
                fs::write(&out, serde_json::to_string_pretty(&report)?)
                    .with_context(|| format!("writing {}", out.display()))?;
                println!("Report written to {}", out.display());
            }
        }
    }

    Ok(())
}

/// Accepts either grouped statement JSON (as written by `scan`) or a flat
/// transaction array, so both sides of a reconciliation load the same way.
fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;

    if let Ok(statements) = serde_json::from_value::<Vec<Statement>>(value.clone()) {
        return Ok(statements
            .into_iter()
            .flat_map(|s| s.transactions)
            .collect());
    }
    if let Ok(statement) = serde_json::from_value::<Statement>(value.clone()) {
        return Ok(statement.transactions);
    }
    if let Ok(txns) = serde_json::from_value::<Vec<Transaction>>(value) {
        return Ok(txns);
    }
    bail!("unrecognized transaction JSON shape in {}", path.display())
}

fn print_summary(report: &ReconciliationReport) {
    println!("Reconciliation summary");
    println!("  exact:   {}", report.summary.exact);
    println!("  fuzzy:   {}", report.summary.fuzzy);
    println!("  partial: {}", report.summary.partial);
    println!(
        "  unmatched: {} statement-side, {} email-side",
        report.summary.unmatched_statement, report.summary.unmatched_email
    );
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
}
