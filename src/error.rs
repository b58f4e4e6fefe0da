use thiserror::Error;

use crate::names::NameError;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors surfaced by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input was rejected; nothing was written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A targeted record does not exist; nothing was written.
    #[error("{0} not found")]
    NotFound(String),

    /// Balances cannot be split over an empty household.
    #[error("no members to split expenses across")]
    NoMembers,

    /// The display-name generator failed.
    #[error("could not generate member name: {0}")]
    NameSource(#[from] NameError),

    /// The backing store failed.
    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}
