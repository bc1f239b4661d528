use thiserror::Error;

/// Errors surfaced by the ledger engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The chain has no blocks. Genesis is seeded on construction, so this
    /// means an internal invariant was broken.
    #[error("chain is empty")]
    EmptyChain,
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("proof search cancelled after {tried} attempts")]
    SearchCancelled { tried: u64 },
    #[error("proof search gave up after {tried} attempts")]
    SearchExhausted { tried: u64 },
    #[error("invalid block #{index}: {reason}")]
    InvalidBlock { index: u64, reason: String },
    #[error("ledger mutex poisoned")]
    LockPoisoned,
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
