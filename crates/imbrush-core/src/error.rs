//! Error types for imbrush-core

use thiserror::Error;

/// Errors from filter synthesis
#[derive(Debug, Error)]
pub enum SynthError {
    /// Caller contract violation: callers normalize with min/max before
    /// calling, so an inverted range is a bug, not an input to repair.
    #[error("invalid bin range: first bin {first} > last bin {last}")]
    InvalidBinRange { first: usize, last: usize },

    /// No histogram widget is registered for the attribute
    #[error("unknown attribute: {attribute}")]
    UnknownAttribute { attribute: String },

    /// The stats provider has no snapshot for the attribute
    #[error("no global stats for attribute '{attribute}'")]
    MissingStats { attribute: String },

    /// Bin position beyond the declared buckets
    #[error("bin {bin} out of range for attribute '{attribute}'")]
    BinOutOfRange { attribute: String, bin: usize },

    /// Histogram-strategy stats without numeric bounds
    #[error("histogram stats for '{attribute}' are missing numeric bounds")]
    NonNumericStats { attribute: String },
}

/// Result type alias for synthesis operations
pub type SynthResult<T> = Result<T, SynthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SynthError::InvalidBinRange { first: 5, last: 2 };
        assert!(err.to_string().contains("5"));
        assert!(err.to_string().contains("2"));
    }
}
