use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::{AMOUNT_EPSILON, approx_eq};
use crate::transaction::{AccountType, Transaction, TxnKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Totals computed from the transaction list itself. Figures stated on the
/// document are only used as a cross-check, never trusted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatementSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_balance: Option<f64>,
    pub total_credits: f64,
    pub total_debits: f64,
}

/// Per-document parse counters, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseDiagnostics {
    pub lines_seen: usize,
    pub lines_matched: usize,
    /// Lines skipped without being classified as header/footer.
    pub lines_skipped_unclassified: usize,
    /// Transactions dropped for an unparseable date or amount.
    pub transactions_dropped: usize,
}

/// One bank account's transactions over one period, from one source
/// document. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub bank: String,
    pub account_type: AccountType,
    /// Masked to the last 4 digits.
    pub account_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifsc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_period: Option<StatementPeriod>,
    /// Document order; generally chronological but not guaranteed sorted.
    pub transactions: Vec<Transaction>,
    pub summary: StatementSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub diagnostics: ParseDiagnostics,
}

impl Statement {
    /// Total credits, total debits and a derived closing balance from the
    /// transaction list. `opening` comes from the document when stated, else
    /// it is back-derived from the first running balance.
    pub fn summarize(transactions: &[Transaction], opening: Option<f64>) -> StatementSummary {
        let total_credits: f64 = transactions
            .iter()
            .filter(|t| t.kind == TxnKind::Credit)
            .map(|t| t.amount)
            .sum();
        let total_debits: f64 = transactions
            .iter()
            .filter(|t| t.kind == TxnKind::Debit)
            .map(|t| t.amount.abs())
            .sum();

        let opening = opening.or_else(|| {
            transactions
                .first()
                .and_then(|t| t.balance.map(|b| b - t.amount))
        });
        let closing = transactions
            .iter()
            .rev()
            .find_map(|t| t.balance)
            .or_else(|| opening.map(|o| o + total_credits - total_debits));

        StatementSummary {
            opening_balance: opening,
            closing_balance: closing,
            total_credits,
            total_debits,
        }
    }

    /// Soft invariant: each running balance must equal opening plus the
    /// signed sum of transactions so far, within 0.01. Violations are
    /// reported as warnings, never raised.
    pub fn balance_warnings(transactions: &[Transaction], opening: Option<f64>) -> Vec<String> {
        let Some(opening) = opening else {
            return Vec::new();
        };
        let mut warnings = Vec::new();
        let mut running = opening;
        for (i, t) in transactions.iter().enumerate() {
            running += t.amount;
            if let Some(stated) = t.balance {
                if !approx_eq(stated, running) {
                    warnings.push(format!(
                        "balance mismatch at transaction {}: stated {:.2}, computed {:.2} (tolerance {AMOUNT_EPSILON})",
                        i + 1,
                        stated,
                        running,
                    ));
                    // Re-anchor so one gap does not cascade into a warning per row.
                    running = stated;
                }
            }
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(day: u32, amount: f64, balance: Option<f64>) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            "TEST",
            amount,
        )
        .with_balance(balance)
    }

    #[test]
    fn test_summarize_totals() {
        let txns = vec![txn(1, 100.0, None), txn(2, -40.0, None), txn(3, -10.0, None)];
        let s = Statement::summarize(&txns, Some(500.0));
        assert_eq!(s.total_credits, 100.0);
        assert_eq!(s.total_debits, 50.0);
        assert_eq!(s.opening_balance, Some(500.0));
        assert_eq!(s.closing_balance, Some(550.0));
    }

    #[test]
    fn test_opening_back_derived_from_first_balance() {
        let txns = vec![txn(1, -15.0, Some(85.0)), txn(2, 10.0, Some(95.0))];
        let s = Statement::summarize(&txns, None);
        assert_eq!(s.opening_balance, Some(100.0));
        assert_eq!(s.closing_balance, Some(95.0));
    }

    #[test]
    fn test_balance_chain_consistent() {
        let txns = vec![txn(1, -15.0, Some(85.0)), txn(2, 10.0, Some(95.0))];
        assert!(Statement::balance_warnings(&txns, Some(100.0)).is_empty());
    }

    #[test]
    fn test_balance_chain_violation_is_warning() {
        let txns = vec![txn(1, -15.0, Some(85.0)), txn(2, 10.0, Some(99.0))];
        let warnings = Statement::balance_warnings(&txns, Some(100.0));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("transaction 2"));
    }

    #[test]
    fn test_statement_round_trip() {
        let txns = vec![txn(1, 100.0, None), txn(2, -40.5, None)];
        let summary = Statement::summarize(&txns, None);
        let st = Statement {
            bank: "HDFC Bank".into(),
            account_type: AccountType::CreditCard,
            account_number: "XXXX7469".into(),
            ifsc: None,
            statement_period: Some(StatementPeriod {
                start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            }),
            transactions: txns,
            summary,
            warnings: vec![],
            diagnostics: ParseDiagnostics::default(),
        };
        let json = serde_json::to_string(&st).unwrap();
        let back: Statement = serde_json::from_str(&json).unwrap();
        assert_eq!(back.transactions.len(), st.transactions.len());
        assert!(approx_eq(back.summary.total_credits, st.summary.total_credits));
        assert!(approx_eq(back.summary.total_debits, st.summary.total_debits));
    }
}
