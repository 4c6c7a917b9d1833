use std::path::PathBuf;

/// Per-file parse failures. Each is fatal for its file only; batch
/// processing records the failure and moves on.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// No extractable text layer (scanned image, corrupt file). Distinct
    /// from an empty statement so callers can tell "no transactions" from
    /// "could not read".
    #[error("no extractable text in {path}")]
    UnsupportedDocument { path: PathBuf },

    #[error("unsupported file format: {path}")]
    UnknownFormat { path: PathBuf },

    #[error("could not detect issuing bank for {path}")]
    BankNotDetected { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
