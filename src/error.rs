//! Error types for the binary entropy coders.

use thiserror::Error;

/// Error variants for coder configuration and table management.
#[derive(Debug, Error)]
pub enum Error {
    /// Provided probability is invalid (non-finite, or outside `[0, 1]`).
    #[error("invalid probability: {0}")]
    InvalidProbability(f64),

    /// Requested range bit width is outside the supported `[2, 23]` span.
    #[error("range bit width out of bounds: {0}")]
    InvalidRangeBits(u32),

    /// Provided fraction is outside `[0, 1]`.
    #[error("invalid fraction: {0}")]
    InvalidFraction(f64),

    /// Divisor does not fit in 31 bits.
    #[error("divisor too large for 31-bit division: {0}")]
    DivisorTooLarge(u32),

    /// A table-mode call was made before the corresponding table was built.
    #[error("state transition table has not been built")]
    TableNotBuilt,
}

/// A specialized Result type for coder operations.
pub type Result<T> = std::result::Result<T, Error>;
