//! Directory-batch statement processing.
//!
//! Walks a statements tree (bank/account-type folder convention), parses
//! every supported file, and writes one JSON per distinct
//! (bank, account_type, statement period). Per-file failures are recorded
//! and never abort sibling work. Output contains no timestamps, so a rerun
//! over an unchanged tree is byte-identical.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bankrec_core::Statement;
use chrono::Datelike;
use serde::Serialize;

use crate::extract::DocumentKind;
use crate::parser::parse_file;

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Stop after this many files; remaining files are counted, not
    /// silently truncated.
    pub max_files: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub outputs: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
    /// Files left untouched because the scan budget ran out.
    pub files_not_processed: usize,
}

/// Scan `root` for statement files and write grouped statement JSON into
/// `out_dir`. A directory with zero parseable files is not an error.
pub fn scan_directory(root: &Path, out_dir: &Path, options: &ScanOptions) -> Result<BatchReport> {
    let mut files = Vec::new();
    collect_files(root, &mut files)
        .with_context(|| format!("scanning {}", root.display()))?;
    files.sort();

    let budget = options.max_files.unwrap_or(usize::MAX);
    let files_not_processed = files.len().saturating_sub(budget);
    let mut processed = 0;
    let mut skipped = Vec::new();
    // BTreeMap keeps output grouping (and file order) deterministic.
    let mut groups: BTreeMap<(String, String, String), Vec<Statement>> = BTreeMap::new();

    for path in files.into_iter().take(budget) {
        match parse_file(&path) {
            Ok(statement) => {
                processed += 1;
                groups
                    .entry(group_key(&statement))
                    .or_default()
                    .push(statement);
            }
            Err(err) => skipped.push(SkippedFile {
                path,
                reason: err.to_string(),
            }),
        }
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output dir {}", out_dir.display()))?;
    let mut outputs = Vec::new();
    for ((bank, account_type, period), statements) in &groups {
        let out_path = out_dir.join(format!("statement_data_{bank}_{account_type}_{period}.json"));
        let json = serde_json::to_string_pretty(statements)
            .context("serializing statement group")?;
        fs::write(&out_path, json)
            .with_context(|| format!("writing {}", out_path.display()))?;
        outputs.push(out_path);
    }

    Ok(BatchReport {
        processed,
        outputs,
        skipped,
        files_not_processed,
    })
}

fn group_key(statement: &Statement) -> (String, String, String) {
    let period = statement
        .statement_period
        .map(|p| format!("{:04}{:02}", p.start.year(), p.start.month()))
        .unwrap_or_else(|| "unknown".to_string());
    (
        slug(&statement.bank),
        statement.account_type.as_str().to_string(),
        period,
    )
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else if DocumentKind::from_path(&path).is_some() {
            out.push(path);
        }
    }
    Ok(())
}
