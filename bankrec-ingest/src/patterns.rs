//! Per-bank pattern configuration.
//!
//! Each supported bank gets one immutable [`BankConfig`] in a registry.
//! Declaration order is the detection priority: when a document satisfies
//! several banks' keyword sets (co-branded cards do), the earliest
//! registered bank wins. Keep that order stable.

use std::sync::OnceLock;

use bankrec_core::AccountType;
use regex::Regex;

/// How a bank encodes transaction direction on a statement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountConvention {
    /// Optional trailing `Cr` marks a credit; no suffix means debit (HDFC).
    CrSuffix,
    /// Trailing `CR`/`DR` word; a bare amount defaults to debit (ICICI,
    /// IndusInd).
    CrDrWord,
    /// Trailing single `C`/`D` letter (SBI card).
    CdLetter,
    /// Amount carries its own sign and a running balance column follows
    /// (Kotak savings). The sign is authoritative.
    SignedWithBalance,
}

pub struct BankConfig {
    pub id: &'static str,
    pub name: &'static str,
    /// Keyword groups, matched against lowercased text. Every group must be
    /// satisfied; within a group any one alternative suffices.
    pub keywords: &'static [&'static [&'static str]],
    /// Account/card number patterns, tried in order.
    pub account_patterns: Vec<Regex>,
    /// Transaction line patterns, tried in order per line; first match wins.
    /// Named groups: `date`, `desc`, `amount`, and optionally `suffix`,
    /// `balance`, `reference`, `category`, `points`.
    pub txn_patterns: Vec<Regex>,
    /// Date formats declared by this bank, tried before the generic set.
    pub date_formats: &'static [&'static str],
    pub amount_convention: AmountConvention,
    /// Transactions only appear between these section markers, when set.
    pub section_start: Option<Regex>,
    pub section_end: Option<Regex>,
    /// Whether wrapped descriptions continue onto following lines.
    pub multiline: bool,
    /// Pulls an embedded transfer reference (IMPS/NEFT/UPI id) out of the
    /// description, when the bank buries it there.
    pub reference_in_desc: Option<Regex>,
    pub default_account_type: AccountType,
}

impl BankConfig {
    /// True when every keyword group has at least one hit in `lower_text`.
    pub fn matches_keywords(&self, lower_text: &str) -> bool {
        self.keywords
            .iter()
            .all(|group| group.iter().any(|kw| lower_text.contains(kw)))
    }
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static bank pattern")
}

static REGISTRY: OnceLock<Vec<BankConfig>> = OnceLock::new();

/// The bank registry, in detection-priority order.
pub fn registry() -> &'static [BankConfig] {
    REGISTRY.get_or_init(build_registry)
}

pub fn bank_by_id(id: &str) -> Option<&'static BankConfig> {
    registry().iter().find(|b| b.id == id)
}

fn build_registry() -> Vec<BankConfig> {
    vec![
        // HDFC credit card: DD/MM/YYYY DESC AMOUNT[Cr], inside the
        // "Domestic Transactions" section.
        BankConfig {
            id: "hdfc",
            name: "HDFC Bank",
            keywords: &[&["hdfc bank", "hdfc credit card"]],
            account_patterns: vec![
                re(r"Card No:\s*(\d{4}\s+\d{4}\s+XXXX\s+\d{4})"),
                re(r"Card No:\s*(\d{4}\s+\d+XXXX\s+\d+)"),
                re(r"(\d{4}X{4,}\d+)"),
            ],
            txn_patterns: vec![re(concat!(
                r"^\s*(?P<date>\d{2}/\d{2}/\d{4})\s+",
                r"(?P<desc>.+?)\s+",
                r"(?P<amount>[\d,]+\.?\d*)(?P<suffix>Cr)?\s*$"
            ))],
            date_formats: &["%d/%m/%Y"],
            amount_convention: AmountConvention::CrSuffix,
            section_start: Some(re(r"Domestic\s+Transactions")),
            section_end: Some(re(r"Reward\s+Points|^\s*Page\b")),
            multiline: false,
            reference_in_desc: None,
            default_account_type: AccountType::CreditCard,
        },
        // IndusInd credit card: DD/MM/YYYY DESC [CATEGORY] POINTS AMOUNT CR|DR.
        BankConfig {
            id: "indusind",
            name: "IndusInd Bank",
            keywords: &[&["indusind"]],
            account_patterns: vec![re(r"(\d{4}X{4,}\d{4})"), re(r"Card No[:\s]+(\d+)")],
            txn_patterns: vec![
                re(concat!(
                    r"^\s*(?P<date>\d{2}/\d{2}/\d{4})\s+",
                    r"(?P<desc>.+?)\s+",
                    r"(?P<category>[A-Z][A-Z\s&]*[A-Z])\s+",
                    r"(?P<points>\d+)\s+",
                    r"(?P<amount>[\d,]+\.\d{2})\s+(?P<suffix>CR|DR)\s*$"
                )),
                re(concat!(
                    r"^\s*(?P<date>\d{2}/\d{2}/\d{4})\s+",
                    r"(?P<desc>.+?)\s+",
                    r"(?P<points>\d+)\s+",
                    r"(?P<amount>[\d,]+\.\d{2})\s+(?P<suffix>CR|DR)\s*$"
                )),
            ],
            date_formats: &["%d/%m/%Y"],
            amount_convention: AmountConvention::CrDrWord,
            section_start: None,
            section_end: None,
            multiline: false,
            reference_in_desc: None,
            default_account_type: AccountType::CreditCard,
        },
        // SBI card: DD MMM YY DESC AMOUNT C|D.
        BankConfig {
            id: "sbi",
            name: "State Bank of India",
            keywords: &[&["state bank of india", "sbi card", "regular sb chq", "sbi"]],
            account_patterns: vec![
                re(r"(XXXX XXXX XXXX \w+)"),
                re(r"Account No[:\s]+(\d+)"),
            ],
            txn_patterns: vec![re(concat!(
                r"^\s*(?P<date>\d{2}\s+[A-Za-z]{3}\s+\d{2})\s+",
                r"(?P<desc>.+?)\s+",
                r"(?P<amount>[\d,]+\.?\d*)\s+(?P<suffix>[CD])\s*$"
            ))],
            date_formats: &["%d %b %y"],
            amount_convention: AmountConvention::CdLetter,
            section_start: None,
            section_end: None,
            multiline: false,
            reference_in_desc: None,
            default_account_type: AccountType::CreditCard,
        },
        // Kotak savings: SER DD MMM YYYY DD MMM YYYY DESC ±AMOUNT BALANCE,
        // with wrapped descriptions on continuation lines.
        BankConfig {
            id: "kotak",
            name: "Kotak Mahindra Bank",
            keywords: &[&["kotak"]],
            account_patterns: vec![
                re(r"Account No[.:\s]+(\d+)"),
                re(r"CRN[:\s]+(\d+)"),
            ],
            txn_patterns: vec![re(concat!(
                r"^\s*\d+\s+",
                r"(?P<date>\d{2}\s+[A-Za-z]{3}\s+\d{4})\s+",
                r"\d{2}\s+[A-Za-z]{3}\s+\d{4}\s+",
                r"(?P<desc>.+?)\s+",
                r"(?P<amount>[+-]?[\d,]+\.\d{2})\s+",
                r"(?P<balance>[+-]?[\d,]+\.\d{2})\s*$"
            ))],
            date_formats: &["%d %b %Y"],
            amount_convention: AmountConvention::SignedWithBalance,
            section_start: None,
            section_end: Some(re(r"Statement\s+generated")),
            multiline: true,
            reference_in_desc: Some(re(r"\b((?:IMPS|NEFT|RTGS|NACHCR)-\d[\w-]*)")),
            default_account_type: AccountType::Savings,
        },
        // ICICI credit card: DD/MM/YYYY SERIAL DESC POINTS AMOUNT [CR].
        BankConfig {
            id: "icici",
            name: "ICICI Bank",
            keywords: &[&["icici"]],
            account_patterns: vec![re(r"(\d{4}X{4,}\d{4})")],
            txn_patterns: vec![re(concat!(
                r"^\s*(?P<date>\d{2}/\d{2}/\d{4})\s+",
                r"(?P<reference>\d+)\s+",
                r"(?P<desc>.+?)\s+",
                r"(?P<points>\d+)\s+",
                r"(?P<amount>[\d,]+\.\d{2})\s*(?P<suffix>CR)?\s*$"
            ))],
            date_formats: &["%d/%m/%Y"],
            amount_convention: AmountConvention::CrDrWord,
            section_start: None,
            section_end: None,
            multiline: false,
            reference_in_desc: None,
            default_account_type: AccountType::CreditCard,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_is_stable() {
        let ids: Vec<&str> = registry().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["hdfc", "indusind", "sbi", "kotak", "icici"]);
    }

    #[test]
    fn test_keyword_groups() {
        let hdfc = bank_by_id("hdfc").unwrap();
        assert!(hdfc.matches_keywords("your hdfc bank statement"));
        assert!(hdfc.matches_keywords("hdfc credit card"));
        assert!(!hdfc.matches_keywords("icici bank"));
    }

    #[test]
    fn test_hdfc_line_matches() {
        let hdfc = bank_by_id("hdfc").unwrap();
        let line = "01/08/2024  AMAZON PAY INDIA BANGALORE  1,299.00";
        let caps = hdfc.txn_patterns[0].captures(line).unwrap();
        assert_eq!(&caps["date"], "01/08/2024");
        assert_eq!(&caps["amount"], "1,299.00");
        assert!(caps.name("suffix").is_none());

        let credit = "05/08/2024  PAYMENT RECEIVED  5,000.00Cr";
        let caps = hdfc.txn_patterns[0].captures(credit).unwrap();
        assert_eq!(caps.name("suffix").unwrap().as_str(), "Cr");
    }

    #[test]
    fn test_indusind_alternative_patterns() {
        let bank = bank_by_id("indusind").unwrap();
        let with_category =
            "12/07/2024  SWIGGY BANGALORE  RESTAURANTS  12  1,240.00  DR";
        assert!(bank.txn_patterns[0].is_match(with_category));

        let payment = "15/07/2024  PAYMENT RECEIVED THANK YOU  0  10,000.00  CR";
        assert!(bank.txn_patterns[1].is_match(payment));
    }

    #[test]
    fn test_kotak_signed_line() {
        let bank = bank_by_id("kotak").unwrap();
        let line = "12  04 Aug 2024  04 Aug 2024  UPI/SWIGGY/2210  -431.00  12,569.00";
        let caps = bank.txn_patterns[0].captures(line).unwrap();
        assert_eq!(&caps["amount"], "-431.00");
        assert_eq!(&caps["balance"], "12,569.00");
    }
}
