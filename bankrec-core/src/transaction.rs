use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Savings,
    Salary,
    CreditCard,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "savings",
            AccountType::Salary => "salary",
            AccountType::CreditCard => "credit_card",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnKind {
    Credit,
    Debit,
}

/// Provenance of a parsed transaction, kept for audit/debug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnSource {
    pub bank: String,
    pub account_type: AccountType,
    pub file: String,
}

/// Normalized output of statement parsers (bank-agnostic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    /// Positive = credit, negative = debit. Sign is fixed at parse time
    /// regardless of how the source document encodes direction.
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TxnKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<TxnSource>,
}

impl Transaction {
    /// Build a transaction from a signed amount; `kind` always follows the sign.
    pub fn new(date: NaiveDate, description: &str, amount: f64) -> Self {
        let kind = if amount >= 0.0 {
            TxnKind::Credit
        } else {
            TxnKind::Debit
        };
        Transaction {
            date,
            description: normalize_whitespace(description),
            amount,
            kind,
            balance: None,
            reference: None,
            source: None,
        }
    }

    pub fn with_balance(mut self, balance: Option<f64>) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_reference(mut self, reference: Option<String>) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_source(mut self, source: TxnSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Lowercased, whitespace-collapsed description used for matching.
    pub fn normalized_description(&self) -> String {
        normalize_whitespace(&self.description).to_lowercase()
    }
}

/// Collapse runs of whitespace and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_sign() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(Transaction::new(d, "PAYROLL", 100.0).kind, TxnKind::Credit);
        assert_eq!(Transaction::new(d, "SWIGGY", -1200.0).kind, TxnKind::Debit);
    }

    #[test]
    fn test_description_whitespace_normalized() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let t = Transaction::new(d, "  AMAZON   PAY \t INDIA ", -50.0);
        assert_eq!(t.description, "AMAZON PAY INDIA");
        assert_eq!(t.normalized_description(), "amazon pay india");
    }

    #[test]
    fn test_json_shape() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let t = Transaction::new(d, "UPI-SWIGGY", -431.0);
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["date"], "2024-03-05");
        assert_eq!(v["type"], "debit");
        assert!(v.get("balance").is_none());
    }
}
