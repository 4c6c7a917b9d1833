//! Three-tier greedy matching of statement vs. email transactions.
//!
//! Tiers are claimed in order (exact, fuzzy, partial); once a transaction
//! from either side is claimed it leaves both pools. This is a greedy
//! bipartite match, not a globally-optimal assignment: determinism and
//! explainability are the point. Statement-side iteration order and
//! explicit tie-breaks (score, then date delta, then amount delta) make
//! every run reproducible.

use std::collections::BTreeMap;

use bankrec_core::Transaction;

use crate::report::{FieldDiff, MatchTier, ReconciliationMatch, ReconciliationReport};
use crate::similarity::description_similarity;
use crate::tolerance::{Tolerance, ToleranceError};

const AMOUNT_EXACT_EPS: f64 = 1e-9;

/// Reconcile two transaction collections. Malformed tolerances are
/// rejected before any matching work.
pub fn reconcile(
    statement: &[Transaction],
    email: &[Transaction],
    tolerance: &Tolerance,
) -> Result<ReconciliationReport, ToleranceError> {
    tolerance.validate()?;

    let warnings = input_warnings(statement, email);
    let mut stmt_claimed = vec![false; statement.len()];
    let mut email_claimed = vec![false; email.len()];
    let mut matches = Vec::new();

    // Tier 1: exact — identical amount, date and normalized description.
    for (si, s) in statement.iter().enumerate() {
        let s_norm = s.normalized_description();
        let hit = email.iter().enumerate().find(|(ei, e)| {
            !email_claimed[*ei]
                && (s.amount - e.amount).abs() < AMOUNT_EXACT_EPS
                && s.date == e.date
                && s_norm == e.normalized_description()
        });
        if let Some((ei, e)) = hit {
            stmt_claimed[si] = true;
            email_claimed[ei] = true;
            matches.push(ReconciliationMatch {
                statement_transaction: Some(s.clone()),
                email_transaction: Some(e.clone()),
                tier: MatchTier::Exact,
                score: 1.0,
                discrepancies: BTreeMap::new(),
            });
        }
    }

    // Tier 2: fuzzy — within tolerances and similar enough descriptions.
    claim_tier(
        statement,
        email,
        &mut stmt_claimed,
        &mut email_claimed,
        tolerance,
        MatchTier::Fuzzy,
        |sim| sim >= tolerance.similarity_threshold,
        &mut matches,
    );

    // Tier 3: partial — within tolerances, nonzero but weak overlap.
    claim_tier(
        statement,
        email,
        &mut stmt_claimed,
        &mut email_claimed,
        tolerance,
        MatchTier::Partial,
        |sim| sim > 0.0 && sim < tolerance.similarity_threshold,
        &mut matches,
    );

    // Whatever survived all tiers is unmatched, on either side.
    for (si, s) in statement.iter().enumerate() {
        if !stmt_claimed[si] {
            matches.push(ReconciliationMatch {
                statement_transaction: Some(s.clone()),
                email_transaction: None,
                tier: MatchTier::Unmatched,
                score: 0.0,
                discrepancies: BTreeMap::new(),
            });
        }
    }
    for (ei, e) in email.iter().enumerate() {
        if !email_claimed[ei] {
            matches.push(ReconciliationMatch {
                statement_transaction: None,
                email_transaction: Some(e.clone()),
                tier: MatchTier::Unmatched,
                score: 0.0,
                discrepancies: BTreeMap::new(),
            });
        }
    }

    Ok(ReconciliationReport::new(matches, tolerance.clone(), warnings))
}

struct Candidate {
    ei: usize,
    score: f64,
    date_delta: i64,
    amount_delta: f64,
    similarity: f64,
}

#[allow(clippy::too_many_arguments)]
fn claim_tier(
    statement: &[Transaction],
    email: &[Transaction],
    stmt_claimed: &mut [bool],
    email_claimed: &mut [bool],
    tolerance: &Tolerance,
    tier: MatchTier,
    accepts: impl Fn(f64) -> bool,
    matches: &mut Vec<ReconciliationMatch>,
) {
    for (si, s) in statement.iter().enumerate() {
        if stmt_claimed[si] {
            continue;
        }
        let mut best: Option<Candidate> = None;
        for (ei, e) in email.iter().enumerate() {
            if email_claimed[ei] {
                continue;
            }
            let amount_delta = (s.amount - e.amount).abs();
            let date_delta = (s.date - e.date).num_days().abs();
            if amount_delta > tolerance.amount || date_delta > tolerance.days {
                continue;
            }
            let similarity = description_similarity(&s.description, &e.description);
            if !accepts(similarity) {
                continue;
            }
            let candidate = Candidate {
                ei,
                score: composite_score(amount_delta, date_delta, similarity, tolerance),
                date_delta,
                amount_delta,
                similarity,
            };
            if better(&candidate, best.as_ref()) {
                best = Some(candidate);
            }
        }
        if let Some(winner) = best {
            let e = &email[winner.ei];
            stmt_claimed[si] = true;
            email_claimed[winner.ei] = true;
            matches.push(ReconciliationMatch {
                statement_transaction: Some(s.clone()),
                email_transaction: Some(e.clone()),
                tier,
                score: winner.score,
                discrepancies: discrepancies(s, e, winner.similarity),
            });
        }
    }
}

/// Weighted blend of amount closeness, date closeness and description
/// similarity.
fn composite_score(
    amount_delta: f64,
    date_delta: i64,
    similarity: f64,
    tolerance: &Tolerance,
) -> f64 {
    let amount_closeness = if tolerance.amount > 0.0 {
        (1.0 - amount_delta / tolerance.amount).clamp(0.0, 1.0)
    } else if amount_delta < AMOUNT_EXACT_EPS {
        1.0
    } else {
        0.0
    };
    let date_closeness = if tolerance.days > 0 {
        (1.0 - date_delta as f64 / tolerance.days as f64).clamp(0.0, 1.0)
    } else if date_delta == 0 {
        1.0
    } else {
        0.0
    };
    0.4 * amount_closeness + 0.3 * date_closeness + 0.3 * similarity
}

/// Highest score wins; exact score ties fall back to the smaller date
/// delta, then the smaller amount delta, then the earlier email index.
fn better(candidate: &Candidate, current: Option<&Candidate>) -> bool {
    let Some(current) = current else {
        return true;
    };
    if (candidate.score - current.score).abs() > AMOUNT_EXACT_EPS {
        return candidate.score > current.score;
    }
    if candidate.date_delta != current.date_delta {
        return candidate.date_delta < current.date_delta;
    }
    if (candidate.amount_delta - current.amount_delta).abs() > AMOUNT_EXACT_EPS {
        return candidate.amount_delta < current.amount_delta;
    }
    false
}

fn discrepancies(s: &Transaction, e: &Transaction, similarity: f64) -> BTreeMap<String, FieldDiff> {
    let mut out = BTreeMap::new();
    if s.date != e.date {
        out.insert(
            "date".to_string(),
            FieldDiff {
                expected: s.date.to_string(),
                observed: e.date.to_string(),
            },
        );
    }
    if (s.amount - e.amount).abs() >= AMOUNT_EXACT_EPS {
        out.insert(
            "amount".to_string(),
            FieldDiff {
                expected: format!("{:.2}", s.amount),
                observed: format!("{:.2}", e.amount),
            },
        );
    }
    if similarity < 1.0 && s.normalized_description() != e.normalized_description() {
        out.insert(
            "description".to_string(),
            FieldDiff {
                expected: s.description.clone(),
                observed: e.description.clone(),
            },
        );
    }
    out
}

/// The two inputs should describe the same account. A bank mismatch between
/// their provenance tags is surfaced as a warning, never a hard failure.
fn input_warnings(statement: &[Transaction], email: &[Transaction]) -> Vec<String> {
    let bank_of = |txns: &[Transaction]| {
        txns.iter()
            .find_map(|t| t.source.as_ref().map(|s| s.bank.clone()))
    };
    match (bank_of(statement), bank_of(email)) {
        (Some(a), Some(b)) if a != b => {
            vec![format!("input banks differ: statement side '{a}', email side '{b}'")]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankrec_core::{AccountType, TxnSource};
    use chrono::NaiveDate;

    fn txn(date: &str, amount: f64, desc: &str) -> Transaction {
        Transaction::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            desc,
            amount,
        )
    }

    fn tiers_of(report: &ReconciliationReport) -> Vec<MatchTier> {
        report.matches.iter().map(|m| m.tier).collect()
    }

    #[test]
    fn test_identical_pair_is_exact_with_no_discrepancies() {
        let s = vec![txn("2024-03-05", -1200.0, "SWIGGY BANGALORE")];
        let e = vec![txn("2024-03-05", -1200.0, "swiggy  bangalore")];
        let report = reconcile(&s, &e, &Tolerance::default()).unwrap();
        assert_eq!(tiers_of(&report), vec![MatchTier::Exact]);
        assert!(report.matches[0].discrepancies.is_empty());
        assert_eq!(report.matches[0].score, 1.0);
    }

    #[test]
    fn test_exact_takes_precedence_over_fuzzy() {
        // The pair also satisfies every fuzzy criterion; tier must be exact.
        let s = vec![txn("2024-03-05", -500.0, "UBER INDIA RIDE")];
        let e = vec![txn("2024-03-05", -500.0, "UBER INDIA RIDE")];
        let report = reconcile(&s, &e, &Tolerance::default()).unwrap();
        assert_eq!(report.matches[0].tier, MatchTier::Exact);
    }

    #[test]
    fn test_swiggy_scenario_is_fuzzy_with_date_discrepancy() {
        let s = vec![txn("2024-03-05", -1200.0, "SWIGGY BANGALORE")];
        let e = vec![txn("2024-03-07", -1200.0, "Swiggy*Bangalore Order")];
        let tol = Tolerance { amount: 1.0, days: 3, ..Tolerance::default() };
        let report = reconcile(&s, &e, &tol).unwrap();

        assert_eq!(report.matches[0].tier, MatchTier::Fuzzy);
        assert!(report.matches[0].discrepancies.contains_key("date"));
        let diff = &report.matches[0].discrepancies["date"];
        assert_eq!(diff.expected, "2024-03-05");
        assert_eq!(diff.observed, "2024-03-07");
    }

    #[test]
    fn test_weak_overlap_is_partial() {
        let s = vec![txn("2024-03-05", -90.0, "DELHI METRO CARD")];
        let e = vec![txn("2024-03-06", -90.0, "metro recharge station outlet delhi")];
        let report = reconcile(&s, &e, &Tolerance::default()).unwrap();
        assert_eq!(report.matches[0].tier, MatchTier::Partial);
        assert!(report.matches[0].discrepancies.contains_key("description"));
        assert!(report.matches[0].score < 0.9);
    }

    #[test]
    fn test_zero_overlap_within_tolerance_is_unmatched() {
        let s = vec![txn("2024-03-05", -90.0, "PETROL PUMP")];
        let e = vec![txn("2024-03-05", -90.0, "BOOKSTORE")];
        let report = reconcile(&s, &e, &Tolerance::default()).unwrap();
        assert_eq!(report.summary.unmatched_statement, 1);
        assert_eq!(report.summary.unmatched_email, 1);
    }

    #[test]
    fn test_statement_with_no_candidate_is_unmatched() {
        let s = vec![txn("2024-03-05", -1200.0, "SWIGGY BANGALORE")];
        let report = reconcile(&s, &[], &Tolerance::default()).unwrap();
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].tier, MatchTier::Unmatched);
        assert!(report.matches[0].email_transaction.is_none());
    }

    #[test]
    fn test_one_to_one_claiming() {
        // Two equal statement txns, one email txn: only one may claim it.
        let s = vec![
            txn("2024-03-05", -100.0, "COFFEE SHOP"),
            txn("2024-03-05", -100.0, "COFFEE SHOP"),
        ];
        let e = vec![txn("2024-03-05", -100.0, "COFFEE SHOP")];
        let report = reconcile(&s, &e, &Tolerance::default()).unwrap();

        let claimed: usize = report
            .matches
            .iter()
            .filter(|m| m.tier != MatchTier::Unmatched)
            .count();
        assert_eq!(claimed, 1);
        assert_eq!(report.summary.unmatched_statement, 1);
        assert_eq!(report.summary.unmatched_email, 0);
    }

    #[test]
    fn test_tie_break_prefers_smaller_date_delta() {
        let s = vec![txn("2024-03-05", -250.0, "OLA CABS TRIP")];
        let e = vec![
            txn("2024-03-08", -250.0, "OLA CABS TRIP"),
            txn("2024-03-06", -250.0, "OLA CABS TRIP"),
        ];
        let report = reconcile(&s, &e, &Tolerance::default()).unwrap();
        let m = &report.matches[0];
        assert_eq!(m.tier, MatchTier::Fuzzy);
        assert_eq!(
            m.email_transaction.as_ref().unwrap().date,
            NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
        );
    }

    #[test]
    fn test_negative_tolerance_rejected_before_work() {
        let tol = Tolerance { days: -1, ..Tolerance::default() };
        let err = reconcile(&[], &[], &tol).unwrap_err();
        assert_eq!(err, ToleranceError::NegativeDays(-1));
    }

    #[test]
    fn test_bank_mismatch_is_warning_not_failure() {
        let src = |bank: &str| TxnSource {
            bank: bank.to_string(),
            account_type: AccountType::CreditCard,
            file: "stmt.pdf".to_string(),
        };
        let s = vec![txn("2024-03-05", -100.0, "COFFEE").with_source(src("HDFC Bank"))];
        let e = vec![txn("2024-03-05", -100.0, "COFFEE").with_source(src("ICICI Bank"))];
        let report = reconcile(&s, &e, &Tolerance::default()).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("differ"));
        // Matching still ran.
        assert_eq!(report.matches[0].tier, MatchTier::Exact);
    }

    #[test]
    fn test_summary_counts_per_tier() {
        let s = vec![
            txn("2024-03-01", -10.0, "ALPHA STORE"),
            txn("2024-03-02", -20.0, "SWIGGY BANGALORE"),
            txn("2024-03-03", -30.0, "GAMMA PETROL"),
        ];
        let e = vec![
            txn("2024-03-01", -10.0, "ALPHA STORE"),
            txn("2024-03-03", -20.0, "Swiggy*Bangalore Order"),
        ];
        let report = reconcile(&s, &e, &Tolerance::default()).unwrap();
        assert_eq!(report.summary.exact, 1);
        assert_eq!(report.summary.fuzzy, 1);
        assert_eq!(report.summary.unmatched_statement, 1);
        assert_eq!(report.summary.unmatched_email, 0);
        assert_eq!(report.parameters, Tolerance::default());
    }
}
