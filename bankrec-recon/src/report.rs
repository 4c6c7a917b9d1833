use std::collections::BTreeMap;

use bankrec_core::Transaction;
use serde::{Deserialize, Serialize};

use crate::tolerance::Tolerance;

/// Confidence classification of a reconciliation match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Exact,
    Fuzzy,
    Partial,
    Unmatched,
}

/// A field that differed between the two sides, within tolerance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub expected: String,
    pub observed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationMatch {
    /// `None` only for email-side unmatched entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_transaction: Option<Transaction>,
    /// `None` only for statement-side unmatched entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_transaction: Option<Transaction>,
    pub tier: MatchTier,
    /// Composite confidence in 0.0..=1.0.
    pub score: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub discrepancies: BTreeMap<String, FieldDiff>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub exact: usize,
    pub fuzzy: usize,
    pub partial: usize,
    pub unmatched_statement: usize,
    pub unmatched_email: usize,
}

/// One reconciliation run's full output. Fresh per run; `parameters` echoes
/// the tolerances so the run is reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub matches: Vec<ReconciliationMatch>,
    pub summary: ReportSummary,
    pub parameters: Tolerance,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ReconciliationReport {
    pub fn new(
        matches: Vec<ReconciliationMatch>,
        parameters: Tolerance,
        warnings: Vec<String>,
    ) -> Self {
        let mut summary = ReportSummary::default();
        for m in &matches {
            match m.tier {
                MatchTier::Exact => summary.exact += 1,
                MatchTier::Fuzzy => summary.fuzzy += 1,
                MatchTier::Partial => summary.partial += 1,
                MatchTier::Unmatched => {
                    if m.statement_transaction.is_some() {
                        summary.unmatched_statement += 1;
                    } else {
                        summary.unmatched_email += 1;
                    }
                }
            }
        }
        ReconciliationReport {
            matches,
            summary,
            parameters,
            warnings,
        }
    }
}
