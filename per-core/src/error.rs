use thiserror::Error;

/// Error type for PER decoding operations
///
/// Every decoder returns one of these instead of panicking. A failure at any
/// nesting level propagates unchanged to the top-level caller; the only
/// recovery the engine performs itself is skipping unknown extensions by
/// their declared length.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PerError {
    /// Ran out of bits
    #[error("Truncated: need {needed} bits, have {available}")]
    Truncated { needed: u64, available: u64 },

    /// Length/offset inconsistency or invalid encoding
    #[error("Malformed encoding: {0}")]
    Malformed(String),

    /// Encoding form that the engine does not implement
    #[error("Unsupported encoding: {0}")]
    Unsupported(String),

    /// Integer arithmetic overflow during decoding
    #[error("Integer overflow: {0}")]
    Overflow(String),
}

impl PerError {
    /// Shorthand for a `Truncated` error
    pub fn truncated(needed: u64, available: u64) -> Self {
        PerError::Truncated { needed, available }
    }

    /// Whether the error means the input ended early
    pub fn is_truncated(&self) -> bool {
        matches!(self, PerError::Truncated { .. })
    }
}

/// Result type alias for PER decoding operations
pub type PerResult<T> = Result<T, PerError>;
