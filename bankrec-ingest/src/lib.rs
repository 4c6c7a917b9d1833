//! bankrec-ingest: statement extraction (PDF/CSV/XLSX), per-bank pattern
//! registry, bank detection, and the statement/batch parsers.

pub mod assemble;
pub mod batch;
pub mod detect;
pub mod extract;
pub mod parser;
pub mod patterns;

pub use batch::{BatchReport, ScanOptions, SkippedFile, scan_directory};
pub use detect::{detect_account_type, detect_bank};
pub use extract::{DocumentKind, ExtractedDocument, extract_document};
pub use parser::{parse_document, parse_file};
pub use patterns::{AmountConvention, BankConfig, bank_by_id, registry};
