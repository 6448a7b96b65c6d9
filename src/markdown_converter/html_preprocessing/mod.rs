//! HTML normalization before Markdown rendering.
//!
//! Clipboard HTML is turned into a small, semantic subset the renderer can
//! handle faithfully. The structural steps run in a fixed order, each
//! assuming the previous ones ran:
//!
//! 1. colspan/rowspan expansion ([`span_expansion`])
//! 2. inline style → `<strong>`/`<em>` ([`style_inference`])
//! 3. attribute stripping, keeping link targets ([`attribute_stripping`])
//! 4. wrapper removal to a fixed point ([`wrapper_removal`])
//! 5. table-cell interior cleanup ([`cell_cleanup`])
//! 6. first-row header promotion ([`header_promotion`])
//!
//! Table classification and pre-rendering ([`table_preprocessing`]) follow.
//! Documents above the size threshold take the string path in
//! [`lightweight`] instead of building one tree for the whole input.

pub mod attribute_stripping;
pub mod cell_cleanup;
pub mod dom;
pub mod header_promotion;
pub mod html_cleaning;
pub mod lightweight;
pub mod span_expansion;
pub mod style_inference;
pub mod table_preprocessing;
pub mod wrapper_removal;

use anyhow::Result;
use kuchiki::NodeRef;
use tracing::{debug, warn};

use crate::config::ConversionOptions;
use crate::content_classifier::is_spreadsheet_content;
use crate::error::ConversionResult;

pub use attribute_stripping::{LinkPlaceholders, strip_attributes, strip_attributes_str};
pub use html_cleaning::{pre_clean, strip_media_elements};
pub use table_preprocessing::{TableStats, process_tables};

/// Run the six structural steps on a parsed tree
///
/// # Errors
///
/// Returns an error if a selector cannot be compiled or a replacement element
/// cannot be created.
pub fn normalize_tree(root: &NodeRef, spreadsheet: bool, options: &ConversionOptions) -> Result<()> {
    let thresholds = &options.thresholds;

    span_expansion::expand_colspans(root, thresholds)?;
    span_expansion::expand_rowspans(root)?;
    style_inference::infer_emphasis(root, options.class_bold_heuristics)?;
    strip_attributes(root);
    wrapper_removal::remove_wrappers(root, thresholds.max_unwrap_depth)?;
    cell_cleanup::clean_cells(root, thresholds)?;
    header_promotion::promote_headers(root, spreadsheet)?;

    Ok(())
}

/// Structurally normalize an HTML fragment (tree path, no table rendering)
///
/// Running this on its own output changes nothing.
///
/// # Errors
///
/// Returns `NormalizationFailure` if the tree cannot be built or serialized.
pub fn normalize_structure(html: &str, options: &ConversionOptions) -> ConversionResult<String> {
    let spreadsheet = is_spreadsheet_content(html);
    let cleaned = pre_clean(html, options.strip_media);
    let body = dom::parse_body(&cleaned)?;
    normalize_tree(&body, spreadsheet, options)?;
    Ok(dom::serialize_children(&body)?)
}

/// Normalize and table-process HTML for the Markdown renderer
///
/// The path is chosen by size (see [`ConversionOptions::use_lightweight_path`]).
/// A tree-path failure falls back to the lightweight path.
///
/// # Errors
///
/// Returns `NormalizationFailure` only if the lightweight path fails as well.
pub fn preprocess_html(html: &str, options: &ConversionOptions) -> ConversionResult<String> {
    let spreadsheet = is_spreadsheet_content(html);
    let cleaned = pre_clean(html, options.strip_media);

    if options.use_lightweight_path(html.len()) {
        debug!("Using lightweight normalization for {} bytes", html.len());
        return lightweight::normalize(&cleaned, spreadsheet, options);
    }

    debug!("Using tree normalization for {} bytes", html.len());
    match tree_path(&cleaned, spreadsheet, options) {
        Ok(normalized) => Ok(normalized),
        Err(e) => {
            warn!("Tree normalization failed, falling back to lightweight path: {e:#}");
            lightweight::normalize(&cleaned, spreadsheet, options)
        }
    }
}

fn tree_path(html: &str, spreadsheet: bool, options: &ConversionOptions) -> Result<String> {
    let body = dom::parse_body(html)?;
    normalize_tree(&body, spreadsheet, options)?;
    let stats = process_tables(&body, options)?;
    debug!(
        "Tables: {} unwrapped, {} rendered, {} left unconverted",
        stats.unwrapped, stats.rendered, stats.failed
    );
    dom::serialize_children(&body)
}
