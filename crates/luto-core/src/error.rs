//! Unified error types for the LUTO engine.
//!
//! [`LutoError`] gives every crate in the workspace one error representation,
//! matching the four kinds of failure the run loop distinguishes: invalid
//! configuration (fatal at start), bad tensor data (fatal for one year), a
//! non-optimal solver outcome (year skipped), and a post-solve invariant
//! violation (fatal).

use thiserror::Error;

/// Unified error type for all LUTO operations.
#[derive(Error, Debug)]
pub enum LutoError {
    /// Invalid configuration: unknown land-use/AM name, inconsistent enum
    /// combination, bad year ordering. Fatal at run start.
    #[error("configuration error: {0}")]
    Config(String),

    /// Bad tensor data: NaN surviving into a builder output, shape mismatch,
    /// a region with zero cells. Fatal for the affected year.
    #[error("data error: {0}")]
    Data(String),

    /// Non-optimal solver status, or a solver-process failure. The year is
    /// skipped; the run may continue only if configured to do so.
    #[error("solve error: {0}")]
    Solve(String),

    /// A post-solve invariant (area conservation, AM subordination) was
    /// violated beyond tolerance. Fatal.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// I/O errors from the data provider or solver process boundary.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors, for wrapping external errors at a boundary.
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using [`LutoError`].
pub type LutoResult<T> = Result<T, LutoError>;

impl From<anyhow::Error> for LutoError {
    fn from(err: anyhow::Error) -> Self {
        LutoError::Other(err.to_string())
    }
}

impl From<String> for LutoError {
    fn from(s: String) -> Self {
        LutoError::Other(s)
    }
}

impl From<&str> for LutoError {
    fn from(s: &str) -> Self {
        LutoError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for LutoError {
    fn from(err: serde_json::Error) -> Self {
        LutoError::Data(err.to_string())
    }
}
