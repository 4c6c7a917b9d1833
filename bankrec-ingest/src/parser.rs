//! Statement parsing: orchestrates extraction, bank detection, pattern
//! matching with multi-line assembly, and summary computation.

use std::path::Path;
use std::sync::OnceLock;

use bankrec_core::dates::{anchor_year, parse_date};
use bankrec_core::money::{approx_eq, parse_amount};
use bankrec_core::{
    ParseDiagnostics, ParseError, Statement, StatementPeriod, Transaction, TxnSource,
};
use chrono::Datelike;
use regex::Regex;

use crate::assemble::{FeedOutcome, RawTxn, TxnAssembler};
use crate::detect::{detect_account_type, detect_bank};
use crate::extract::{ExtractedDocument, extract_document};
use crate::patterns::{AmountConvention, BankConfig};

/// Parse one statement file into a normalized [`Statement`].
pub fn parse_file(path: &Path) -> Result<Statement, ParseError> {
    let doc = extract_document(path)?;
    parse_document(&doc, &path.to_string_lossy())
}

/// Parse an already-extracted document. `file_hint` is the source path or
/// filename; folder names in it feed account-type detection.
pub fn parse_document(doc: &ExtractedDocument, file_hint: &str) -> Result<Statement, ParseError> {
    let text = doc.text();
    let config = detect_bank(&text).ok_or_else(|| ParseError::BankNotDetected {
        path: file_hint.into(),
    })?;
    let account_type = detect_account_type(&text, file_hint, config);

    let account_number = extract_account_number(&text, config);
    let ifsc = ifsc_re()
        .captures(&text)
        .map(|c| c[1].to_string());
    let statement_period = extract_period(&text);
    // Two-digit-year rows are re-anchored onto the statement year.
    let anchor = if config
        .date_formats
        .iter()
        .any(|f| f.contains("%y") && !f.contains("%Y"))
    {
        statement_period.map(|p| p.start.year())
    } else {
        None
    };

    let mut diagnostics = ParseDiagnostics::default();
    let mut raws: Vec<RawTxn> = Vec::new();
    let mut assembler = TxnAssembler::new(config);
    let mut in_section = config.section_start.is_none();

    'lines: for line in &doc.lines {
        diagnostics.lines_seen += 1;
        if !in_section {
            if let Some(start) = &config.section_start {
                if start.is_match(&line.text) {
                    in_section = true;
                }
            }
            continue;
        }
        if let Some(end) = &config.section_end {
            if end.is_match(&line.text) {
                raws.extend(assembler.finish());
                if config.section_start.is_some() {
                    // Sections can reopen on later pages.
                    in_section = false;
                    continue;
                }
                break 'lines;
            }
        }
        match assembler.feed(&line.text) {
            FeedOutcome::Start(previous) => {
                diagnostics.lines_matched += 1;
                raws.extend(previous);
            }
            FeedOutcome::Continuation => diagnostics.lines_matched += 1,
            FeedOutcome::Skipped => diagnostics.lines_skipped_unclassified += 1,
        }
    }
    raws.extend(assembler.finish());

    let source = TxnSource {
        bank: config.name.to_string(),
        account_type,
        file: file_name_of(file_hint),
    };
    let mut transactions = Vec::with_capacity(raws.len());
    for raw in &raws {
        match normalize_txn(raw, config, anchor) {
            Some(txn) => transactions.push(txn.with_source(source.clone())),
            // Unparseable date/amount drops just this transaction.
            None => diagnostics.transactions_dropped += 1,
        }
    }

    let stated_opening = stated_balance(&text, opening_re());
    let stated_closing = stated_balance(&text, closing_re());
    let summary = Statement::summarize(&transactions, stated_opening);
    let mut warnings = Statement::balance_warnings(&transactions, summary.opening_balance);
    if let (Some(stated), Some(computed)) = (stated_closing, summary.closing_balance) {
        if !approx_eq(stated, computed) {
            warnings.push(format!(
                "stated closing balance {stated:.2} disagrees with computed {computed:.2}"
            ));
        }
    }

    Ok(Statement {
        bank: config.name.to_string(),
        account_type,
        account_number,
        ifsc,
        statement_period,
        transactions,
        summary,
        warnings,
        diagnostics,
    })
}

/// Resolve captured fields into a normalized transaction. Returns `None`
/// when the date or amount cannot be parsed; the caller counts the drop.
fn normalize_txn(raw: &RawTxn, config: &BankConfig, anchor: Option<i32>) -> Option<Transaction> {
    let mut date = parse_date(&raw.date, config.date_formats)?;
    if anchor.is_some() {
        date = anchor_year(date, anchor);
    }

    let magnitude = parse_amount(&raw.amount)?;
    // Positive = credit, negative = debit, whatever the source encoding.
    let signed = match config.amount_convention {
        AmountConvention::CrSuffix => {
            if raw.suffix.is_some() {
                magnitude.abs()
            } else {
                -magnitude.abs()
            }
        }
        AmountConvention::CrDrWord => match raw.suffix.as_deref() {
            Some("CR") => magnitude.abs(),
            _ => -magnitude.abs(),
        },
        AmountConvention::CdLetter => match raw.suffix.as_deref() {
            Some("C") => magnitude.abs(),
            _ => -magnitude.abs(),
        },
        AmountConvention::SignedWithBalance => magnitude,
    };

    let balance = raw.balance.as_deref().and_then(parse_amount);
    let mut desc = raw.desc.clone();
    let mut reference = raw.reference.clone();
    if reference.is_none() {
        if let Some(ref_re) = &config.reference_in_desc {
            let found = ref_re
                .captures(&desc)
                .and_then(|c| c.get(1))
                .map(|m| (m.range(), m.as_str().to_string()));
            if let Some((range, text)) = found {
                reference = Some(text);
                desc.replace_range(range, " ");
            }
        }
    }

    Some(
        Transaction::new(date, &desc, signed)
            .with_balance(balance)
            .with_reference(reference),
    )
}

fn extract_account_number(text: &str, config: &BankConfig) -> String {
    for pattern in &config.account_patterns {
        if let Some(caps) = pattern.captures(text) {
            return mask_account(&caps[1]);
        }
    }
    "XXXX".to_string()
}

/// Mask an account/card number to its last 4 characters.
fn mask_account(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if compact.len() <= 4 {
        return compact;
    }
    format!("XXXX{}", &compact[compact.len() - 4..])
}

fn extract_period(text: &str) -> Option<StatementPeriod> {
    static RANGE: OnceLock<Regex> = OnceLock::new();
    static SINGLE: OnceLock<Regex> = OnceLock::new();
    let range = RANGE.get_or_init(|| {
        Regex::new(r"(\d{2}/\d{2}/\d{4})\s+[Tt]o\s+(\d{2}/\d{2}/\d{4})").expect("static pattern")
    });
    let single = SINGLE.get_or_init(|| {
        Regex::new(r"Statement Date[:\s]*(\d{2}/\d{2}/\d{4})").expect("static pattern")
    });

    if let Some(caps) = range.captures(text) {
        let start = parse_date(&caps[1], &[])?;
        let end = parse_date(&caps[2], &[])?;
        return Some(StatementPeriod { start, end });
    }
    if let Some(caps) = single.captures(text) {
        let date = parse_date(&caps[1], &[])?;
        return Some(StatementPeriod {
            start: date,
            end: date,
        });
    }
    None
}

fn stated_balance(text: &str, re: &Regex) -> Option<f64> {
    re.captures(text).and_then(|c| parse_amount(&c[1]))
}

fn opening_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)opening balance[^\d]*([\d,]+\.\d{2})").expect("static pattern")
    })
}

fn closing_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)closing balance[^\d]*([\d,]+\.\d{2})").expect("static pattern")
    })
}

fn ifsc_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bIFSC[:\s]*([A-Z]{4}0[A-Z0-9]{6})").expect("static pattern"))
}

fn file_name_of(hint: &str) -> String {
    hint.replace('\\', "/")
        .rsplit('/')
        .next()
        .unwrap_or(hint)
        .to_string()
}
