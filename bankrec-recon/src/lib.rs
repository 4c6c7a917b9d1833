//! bankrec-recon: tolerance-based reconciliation of two independently
//! sourced transaction sets (statement-derived vs. email-derived).

pub mod matcher;
pub mod report;
pub mod similarity;
pub mod tolerance;

pub use matcher::reconcile;
pub use report::{FieldDiff, MatchTier, ReconciliationMatch, ReconciliationReport, ReportSummary};
pub use similarity::description_similarity;
pub use tolerance::{Tolerance, ToleranceError};
