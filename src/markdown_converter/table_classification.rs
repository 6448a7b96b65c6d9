//! Layout vs. data table classification.
//!
//! Document exports use tables to position content as often as they use them
//! for tabular data. A layout table rendered as a Markdown grid is nonsense,
//! so each table is classified before rendering and layout tables are
//! unwrapped instead.
//!
//! Classification works on a [`TableProfile`], a plain summary of the
//! table's shape, so the rules can be tested without building HTML.

use kuchiki::NodeRef;

use super::html_preprocessing::dom;
use crate::config::Thresholds;

/// Layout or data, decided once per table per conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableClassification {
    /// Positions content; unwrapped, children kept in order
    Layout,
    /// Genuine rows and columns; rendered as a pipe table
    Data,
}

/// Shape summary of one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableProfile {
    /// Rows owned by the table (not by nested tables)
    pub rows: usize,
    /// Cells in the first row
    pub first_row_cells: usize,
    /// Cells across all owned rows
    pub total_cells: usize,
    /// A heading or list appears anywhere inside the table
    pub has_heading_or_list: bool,
    /// Some cell contains another table
    pub has_nested_table: bool,
    /// Largest number of block-level children in a single cell
    pub max_cell_blocks: usize,
}

impl TableProfile {
    /// Measure a `<table>` element
    #[must_use]
    pub fn from_table(table: &NodeRef) -> Self {
        let rows = dom::table_rows(table);
        let cells: Vec<Vec<NodeRef>> = rows.iter().map(dom::row_cells).collect();

        let has_heading_or_list = table
            .descendants()
            .any(|d| dom::is_tag(&d, dom::HEADING_TAGS) || dom::is_tag(&d, dom::LIST_TAGS));

        let all_cells = || cells.iter().flatten();

        Self {
            rows: rows.len(),
            first_row_cells: cells.first().map_or(0, Vec::len),
            total_cells: cells.iter().map(Vec::len).sum(),
            has_heading_or_list,
            has_nested_table: all_cells()
                .any(|c| c.descendants().any(|d| dom::is_tag(&d, &["table"]))),
            max_cell_blocks: all_cells().map(dom::block_children).max().unwrap_or(0),
        }
    }

    #[must_use]
    pub fn avg_cells_per_row(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.total_cells as f64 / self.rows as f64
        }
    }
}

/// Classify a table profile; the first matching rule wins
///
/// 1. No rows: `Data` (nothing to unwrap)
/// 2. Single-cell first row: `Layout`
/// 3. Heading or list inside: `Layout`
/// 4. Wide and tall (avg cells ≥ `data_min_avg_cells`, rows ≥ `data_min_rows`): `Data`
/// 5. Nested table, or a cell with more than `layout_max_block_children` blocks: `Layout`
/// 6. Otherwise: `Data`
#[must_use]
pub fn classify_profile(profile: &TableProfile, thresholds: &Thresholds) -> TableClassification {
    if profile.rows == 0 {
        return TableClassification::Data;
    }
    if profile.first_row_cells == 1 {
        return TableClassification::Layout;
    }
    if profile.has_heading_or_list {
        return TableClassification::Layout;
    }
    if profile.avg_cells_per_row() >= thresholds.data_min_avg_cells
        && profile.rows >= thresholds.data_min_rows
    {
        return TableClassification::Data;
    }
    if profile.has_nested_table || profile.max_cell_blocks > thresholds.layout_max_block_children {
        return TableClassification::Layout;
    }
    TableClassification::Data
}

#[must_use]
pub fn classify_table(table: &NodeRef, thresholds: &Thresholds) -> TableClassification {
    classify_profile(&TableProfile::from_table(table), thresholds)
}
