//! Multi-line transaction assembly.
//!
//! A logical transaction may span several physical lines (wrapped merchant
//! descriptions). The continuation rule is an explicit two-state machine so
//! it can be tested without running full-document parsing: a line matching a
//! transaction pattern starts a new transaction; while accumulating, any
//! non-matching line extends the current description (for banks that wrap).

use regex::Captures;

use crate::patterns::BankConfig;

/// Captured-but-not-yet-normalized transaction fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTxn {
    pub date: String,
    pub desc: String,
    pub amount: String,
    pub suffix: Option<String>,
    pub balance: Option<String>,
    pub reference: Option<String>,
    pub category: Option<String>,
}

impl RawTxn {
    fn from_captures(caps: &Captures<'_>) -> RawTxn {
        let group = |name: &str| caps.name(name).map(|m| m.as_str().trim().to_string());
        RawTxn {
            date: caps["date"].trim().to_string(),
            desc: caps["desc"].trim().to_string(),
            amount: caps["amount"].trim().to_string(),
            suffix: group("suffix"),
            balance: group("balance"),
            reference: group("reference"),
            category: group("category"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekingStart,
    Accumulating,
}

#[derive(Debug, PartialEq, Eq)]
pub enum FeedOutcome {
    /// The line started a new transaction; any previously accumulating one
    /// is returned complete.
    Start(Option<RawTxn>),
    /// The line extended the current transaction's description.
    Continuation,
    /// The line matched nothing (header, footer, disclaimer).
    Skipped,
}

pub struct TxnAssembler<'a> {
    config: &'a BankConfig,
    state: State,
    current: Option<RawTxn>,
}

impl<'a> TxnAssembler<'a> {
    pub fn new(config: &'a BankConfig) -> Self {
        TxnAssembler {
            config,
            state: State::SeekingStart,
            current: None,
        }
    }

    pub fn feed(&mut self, line: &str) -> FeedOutcome {
        for pattern in &self.config.txn_patterns {
            if let Some(caps) = pattern.captures(line) {
                let finished = self.current.take();
                self.current = Some(RawTxn::from_captures(&caps));
                self.state = State::Accumulating;
                return FeedOutcome::Start(finished);
            }
        }

        if self.config.multiline && self.state == State::Accumulating && !line.trim().is_empty() {
            if let Some(current) = self.current.as_mut() {
                current.desc.push(' ');
                current.desc.push_str(line.trim());
                return FeedOutcome::Continuation;
            }
        }
        FeedOutcome::Skipped
    }

    /// Flush the transaction still being accumulated, if any. Also resets
    /// the machine, so the parser can call it at section boundaries.
    pub fn finish(&mut self) -> Option<RawTxn> {
        self.state = State::SeekingStart;
        self.current.take()
    }
}
