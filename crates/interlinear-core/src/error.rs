//! Error taxonomy for the reader core.
//!
//! Input-boundary failures are returned to the host for display. Layout
//! invariant breaks are programming errors and are asserted instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    /// Upstream extraction/segmentation produced no sentences.
    #[error("no content: the document produced zero sentences")]
    EmptyInput,
    /// The translator returned a different number of strings than it was given.
    #[error("translation length mismatch: {sources} source sentences, {translations} translations")]
    LengthMismatch { sources: usize, translations: usize },
    #[error("translator failed: {0}")]
    Translation(String),
    #[error("operation cancelled at stage={stage}")]
    Cancelled { stage: &'static str },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
