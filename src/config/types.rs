//! Core configuration types for clipboard conversion
//!
//! Every heuristic threshold used by the pipeline lives in [`Thresholds`] so it
//! can be tuned in one place and pinned by tests.

use serde::{Deserialize, Serialize};

/// Default byte size above which the lightweight string path is used
pub const DEFAULT_LARGE_DOCUMENT_THRESHOLD: usize = 300 * 1024;

/// Which normalization path the pipeline takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    /// Tree path below `large_document_threshold`, lightweight path above it
    #[default]
    Auto,
    /// Always materialize a DOM tree
    Tree,
    /// Always use the string/regex path
    Lightweight,
}

/// How strictly plain text must look tabular before it becomes a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TsvDetection {
    /// Tab counts must be consistent across tabbed lines
    #[default]
    Strict,
    /// Two consecutive tab-bearing lines are enough
    Consecutive,
}

/// Named, tunable constants for every heuristic in the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// A colspan at or above this count marks a full-width section header
    pub section_header_colspan: usize,

    /// Bold/heading cell content longer than this (in HTML chars) is a section header
    pub section_header_min_len: usize,

    /// Average cells per row at which a table is considered wide enough for data
    pub data_min_avg_cells: f64,

    /// Row count at which a wide table is considered tall enough for data
    pub data_min_rows: usize,

    /// A cell with more block-level children than this is layout composition
    pub layout_max_block_children: usize,

    /// Minimum fraction of lines that must contain a tab for TSV
    pub tsv_min_tab_line_fraction: f64,

    /// Average line length above which text is treated as prose
    pub tsv_max_avg_line_len: usize,

    /// Fraction of tabbed lines whose tab count must sit near the mean
    pub tsv_min_consistency: f64,

    /// Allowed distance from the mean tab count for a line to be consistent
    pub tsv_tab_tolerance: f64,

    /// Depth guard for the wrapper-removal fixed point
    pub max_unwrap_depth: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            section_header_colspan: 4,
            section_header_min_len: 30,
            data_min_avg_cells: 3.0,
            data_min_rows: 2,
            layout_max_block_children: 2,
            tsv_min_tab_line_fraction: 0.5,
            tsv_max_avg_line_len: 200,
            tsv_min_consistency: 0.8,
            tsv_tab_tolerance: 1.0,
            max_unwrap_depth: 512,
        }
    }
}

/// Configuration options for clipboard → Markdown conversion
///
/// Feature flags select behavior inside one pipeline instead of keeping
/// parallel conversion flows around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Tree vs. lightweight normalization (default: `Auto`)
    pub normalization: NormalizationMode,

    /// Input size in bytes above which `Auto` picks the lightweight path
    pub large_document_threshold: usize,

    /// Classify tables as layout/data and unwrap layout tables (default: true)
    ///
    /// When disabled every table is treated as a data table.
    pub heuristic_table_unwrap: bool,

    /// Pre-render data tables into Markdown placeholders (default: true)
    ///
    /// When disabled, data tables are left to the renderer's GFM table rule.
    pub prerender_tables: bool,

    /// Infer bold from opaque class names (default: false)
    ///
    /// Multi-class spans and `c10`..`c19` style class suffixes are treated as
    /// bold. These signals are tied to one document generator and over-fit.
    pub class_bold_heuristics: bool,

    /// Remove images, video, audio and iframes (default: false)
    pub strip_media: bool,

    /// Strictness of tab-separated text detection (default: `Strict`)
    pub tsv_detection: TsvDetection,

    /// Convert prose mixed with tab-separated blocks (default: true)
    pub relaxed_mixed_text: bool,

    /// Turn unconvertible plain text into paragraphs instead of failing (default: false)
    pub plain_text_fallback: bool,

    /// Run the line-oriented Markdown cleanup pass (default: true)
    pub post_process: bool,

    /// Heuristic thresholds
    pub thresholds: Thresholds,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            normalization: NormalizationMode::Auto,
            large_document_threshold: DEFAULT_LARGE_DOCUMENT_THRESHOLD,
            heuristic_table_unwrap: true,
            prerender_tables: true,
            class_bold_heuristics: false,
            strip_media: false,
            tsv_detection: TsvDetection::Strict,
            relaxed_mixed_text: true,
            plain_text_fallback: false,
            post_process: true,
            thresholds: Thresholds::default(),
        }
    }
}
