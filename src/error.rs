//! Error types

use thiserror::Error;

/// Errors raised while building a quoting configuration.
///
/// Quoting itself never fails: malformed input is escaped, replaced or
/// passed through, so only configuration can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    /// The style name does not match any known quoting style
    #[error("unknown quoting style '{0}'")]
    UnknownStyle(String),

    /// Custom quote marks must not contain NUL
    #[error("quote mark {0:?} contains a NUL byte")]
    InvalidQuoteMark(String),
}

pub type Result<T> = std::result::Result<T, QuoteError>;
