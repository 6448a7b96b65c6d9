//! Error types for clipboard conversion
//!
//! The taxonomy separates failures that end a conversion from failures that
//! are contained inside one pipeline stage and degrade gracefully.

use thiserror::Error;

/// Result type alias for conversion operations
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Error types for clipboard → Markdown conversion
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Neither an HTML nor a plain-text representation was present
    #[error("Clipboard is empty: copy some rich text content first")]
    EmptyClipboard,

    /// Text is present but is neither HTML nor tabular data
    #[error("No rich text or HTML found: clipboard contains plain text only")]
    PlainTextOnly { preview: String },

    /// One table could not be turned into a cell grid
    #[error("Table could not be parsed: {0}")]
    TableParseFailure(String),

    /// Tree-based normalization failed
    #[error("HTML normalization failed: {0}")]
    NormalizationFailure(String),

    /// The Markdown renderer itself failed
    #[error("Markdown rendering failed: {0}")]
    RenderFailure(String),
}

impl ConversionError {
    /// Length of the text preview carried by [`ConversionError::PlainTextOnly`]
    pub const PREVIEW_CHARS: usize = 200;

    /// Build a `PlainTextOnly` error carrying a short preview of the text
    #[must_use]
    pub fn plain_text_only(text: &str) -> Self {
        Self::PlainTextOnly {
            preview: text.chars().take(Self::PREVIEW_CHARS).collect(),
        }
    }

    /// Check if the failure is contained by the pipeline rather than fatal
    ///
    /// Table and normalization failures degrade to a best-effort conversion,
    /// and plain text can degrade to paragraph-per-line output.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ConversionError::PlainTextOnly { .. }
                | ConversionError::TableParseFailure(_)
                | ConversionError::NormalizationFailure(_)
        )
    }
}

impl From<anyhow::Error> for ConversionError {
    fn from(error: anyhow::Error) -> Self {
        ConversionError::NormalizationFailure(format!("{error:#}"))
    }
}
