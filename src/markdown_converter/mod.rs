//! Clipboard → Markdown conversion pipeline.
//!
//! 1. [`classify_clipboard`] picks or synthesizes one HTML document
//! 2. [`html_preprocessing::preprocess_html`] normalizes it and handles tables
//! 3. htmd renders it with the rules in [`custom_handlers`]
//! 4. [`markdown_postprocessing::post_process`] cleans the Markdown up

pub mod custom_handlers;
pub mod html_preprocessing;
pub mod markdown_postprocessing;
pub mod table_classification;
pub mod table_rendering;

use tracing::debug;

use crate::config::ConversionOptions;
use crate::content_classifier::{ClipboardPayload, classify_clipboard};
use crate::error::{ConversionError, ConversionResult};

pub use custom_handlers::create_converter;
pub use html_preprocessing::{normalize_structure, preprocess_html};
pub use markdown_postprocessing::{clean_markdown, post_process};
pub use table_classification::{TableClassification, TableProfile, classify_table};
pub use table_rendering::CellGrid;

/// Convert an HTML fragment to Markdown
///
/// # Errors
///
/// Returns `RenderFailure` if htmd fails, or `NormalizationFailure` if both
/// normalization paths fail.
pub fn convert_html_to_markdown_sync(
    html: &str,
    options: &ConversionOptions,
) -> ConversionResult<String> {
    let normalized = preprocess_html(html, options)?;

    let converter = create_converter();
    let markdown = converter
        .convert(&normalized)
        .map_err(|e| ConversionError::RenderFailure(e.to_string()))?;
    debug!("Rendered {} bytes of HTML into {} bytes of Markdown", normalized.len(), markdown.len());

    Ok(post_process(&markdown, options))
}

/// Convert a clipboard payload to Markdown
///
/// # Errors
///
/// - `EmptyClipboard` / `PlainTextOnly` from classification
/// - `RenderFailure` if htmd fails
pub fn convert_clipboard_to_markdown(
    payload: &ClipboardPayload,
    options: &ConversionOptions,
) -> ConversionResult<String> {
    let classified = classify_clipboard(payload, options)?;
    debug!("Clipboard classified as {:?}", classified.source);
    convert_html_to_markdown_sync(&classified.html, options)
}
