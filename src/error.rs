//! Error types for the pagemark library.

use std::io;
use thiserror::Error;

/// Result type alias for pagemark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during structure reconstruction.
///
/// Detection ambiguity is never an error: detectors that find nothing
/// return empty results and the pipeline falls through to the next
/// strategy. Only provider-level failures and rendering faults surface.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The layout provider failed to extract primitives for a page.
    #[error("Layout provider error: {0}")]
    Provider(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Error during rendering (Markdown, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap a provider-side failure.
    pub fn provider(msg: impl Into<String>) -> Self {
        Error::Provider(msg.into())
    }
}
