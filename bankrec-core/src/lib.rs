//! bankrec-core: normalized transaction/statement model and parsing primitives.

pub mod dates;
pub mod error;
pub mod money;
pub mod statement;
pub mod transaction;

pub use error::ParseError;
pub use statement::{ParseDiagnostics, Statement, StatementPeriod, StatementSummary};
pub use transaction::{AccountType, Transaction, TxnKind, TxnSource};
