//! Keyword-based bank and account-type detection.

use bankrec_core::AccountType;

use crate::patterns::{BankConfig, registry};

/// Return the first registered bank whose keyword set the text satisfies.
/// Registry declaration order breaks ties, so detection is deterministic
/// even for co-branded statements that mention several issuers.
pub fn detect_bank(text: &str) -> Option<&'static BankConfig> {
    let lower = text.to_lowercase();
    registry().iter().find(|bank| bank.matches_keywords(&lower))
}

/// Classify the account type from document text plus a filename/folder hint.
/// Filename hints win, then content keywords, then the bank's default.
pub fn detect_account_type(text: &str, file_hint: &str, bank: &BankConfig) -> AccountType {
    let file_lower = file_hint.to_lowercase().replace('\\', "/");
    const CC_FILE_HINTS: &[&str] = &[
        "cc_stmt",
        "credit_card",
        "credit card",
        "diners",
        "millenia",
        "platinum",
    ];
    if CC_FILE_HINTS.iter().any(|h| file_lower.contains(h)) {
        return AccountType::CreditCard;
    }
    if file_lower.contains("salary") {
        return AccountType::Salary;
    }

    let text_lower = text.to_lowercase();
    const CC_TEXT_HINTS: &[&str] = &[
        "credit card",
        "card statement",
        "card no:",
        "total dues",
        "minimum amount due",
    ];
    if CC_TEXT_HINTS.iter().any(|h| text_lower.contains(h)) {
        return AccountType::CreditCard;
    }
    if text_lower.contains("salary account") || text_lower.contains("salary credit") {
        return AccountType::Salary;
    }
    if text_lower.contains("savings account")
        || text_lower.contains("saving account")
        || text_lower.contains("regular sb")
    {
        return AccountType::Savings;
    }

    bank.default_account_type
}
