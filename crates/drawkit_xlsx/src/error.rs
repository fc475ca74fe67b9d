//! Error taxonomy for the layout core.

use std::path::PathBuf;

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

/// Errors surfaced by drawers, elements and their containers.
///
/// Every variant is terminal: nothing in this crate retries or substitutes
/// fallback values. The only tolerated no-ops are the documented column-sizing
/// skips, which are not errors.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Invalid constructor argument or attribute assignment.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Requested a draw-history step beyond the recorded depth.
    #[error("draw history underflow: step {requested} exceeds recorded depth {depth}.")]
    HistoryUnderflow {
        /// Requested step count (0 = most recent).
        requested: usize,
        /// Number of draws currently recorded.
        depth: usize,
    },

    /// Referenced a checkpoint name that was never added.
    #[error("unknown checkpoint: {0:?}.")]
    UnknownCheckpoint(String),

    /// Structure-config file failed to read or parse; nothing partial is kept.
    #[error("failed to load structure config {path:?}: {reason}")]
    ConfigLoad {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying read/parse failure.
        reason: String,
    },

    /// Deferred `@eval@` expression failed to tokenize, parse or evaluate.
    #[error("expression evaluation failed: {0}")]
    Expression(String),

    /// Backend write failure from `rust_xlsxwriter`.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),

    /// Cell access failure from a polars frame or series.
    #[error("dataframe access error: {0}")]
    Frame(String),
}
