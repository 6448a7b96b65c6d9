//! Layout unwrapping and data-table pre-rendering.
//!
//! Every table is classified first, while the tree still holds the structure
//! the classifier looks at. Tables are then handled innermost first (reverse
//! document order), so an outer table never sees an inner table that was
//! already flattened:
//!
//! - **Layout**: table, row group, row and cell tags are removed and their
//!   children stay in place. Cells holding only inline content become
//!   paragraphs so neighbouring cells do not run together.
//! - **Data**: the cell grid is rendered to a pipe table and the table is
//!   replaced with a placeholder block. A table whose grid cannot be built
//!   is left as it is for the renderer's own table rule.

use anyhow::Result;
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;
use tracing::{debug, warn};

use super::dom;
use crate::config::ConversionOptions;
use crate::markdown_converter::table_classification::{TableClassification, classify_table};
use crate::markdown_converter::table_rendering::{CellGrid, placeholder_html};

/// Counts of what [`process_tables`] did, for logging and tests
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    pub unwrapped: usize,
    pub rendered: usize,
    pub failed: usize,
}

/// Classify every table under `root` and unwrap or pre-render it
///
/// With `heuristic_table_unwrap` off every table counts as data. With
/// `prerender_tables` off data tables are left in place.
///
/// # Errors
///
/// Returns an error if the table selector cannot be compiled or a paragraph
/// element cannot be created. Per-table grid failures are not errors.
pub fn process_tables(root: &NodeRef, options: &ConversionOptions) -> Result<TableStats> {
    let tables = dom::select_all(root, "table")?;
    let classified: Vec<(NodeRef, TableClassification)> = tables
        .into_iter()
        .map(|table| {
            let class = if options.heuristic_table_unwrap {
                classify_table(&table, &options.thresholds)
            } else {
                TableClassification::Data
            };
            (table, class)
        })
        .collect();

    let mut stats = TableStats::default();
    for (index, (table, class)) in classified.iter().enumerate().rev() {
        debug!("Table {index} classified as {class:?}");
        match class {
            TableClassification::Layout => {
                unwrap_layout_table(table)?;
                stats.unwrapped += 1;
            }
            TableClassification::Data if options.prerender_tables => {
                match CellGrid::from_table(table) {
                    Ok(grid) => {
                        replace_with_placeholder(table, &grid.to_markdown());
                        stats.rendered += 1;
                    }
                    Err(e) => {
                        warn!("Leaving table {index} unconverted: {e}");
                        stats.failed += 1;
                    }
                }
            }
            TableClassification::Data => {}
        }
    }
    Ok(stats)
}

/// Remove a layout table's scaffolding, keeping its content in order
fn unwrap_layout_table(table: &NodeRef) -> Result<()> {
    let parts: Vec<NodeRef> = table.children().collect();
    for part in parts {
        if dom::is_tag(&part, &["thead", "tbody", "tfoot"]) {
            let rows: Vec<NodeRef> = part.children().collect();
            for row in rows {
                unwrap_row(&row)?;
            }
            dom::unwrap_node(&part);
        } else if dom::is_tag(&part, &["tr"]) {
            unwrap_row(&part)?;
        } else if dom::is_tag(&part, &["caption"]) {
            dom::rename_element(&part, "p")?;
        }
    }
    dom::unwrap_node(table);
    Ok(())
}

fn unwrap_row(row: &NodeRef) -> Result<()> {
    if !dom::is_tag(row, &["tr"]) {
        return Ok(());
    }
    for cell in dom::row_cells(row) {
        if dom::holds_only_inline_content(&cell) {
            dom::rename_element(&cell, "p")?;
        } else {
            dom::unwrap_node(&cell);
        }
    }
    dom::unwrap_node(row);
    Ok(())
}

fn replace_with_placeholder(table: &NodeRef, markdown: &str) {
    let fragment = kuchiki::parse_html().one(placeholder_html(markdown));
    let placeholder = fragment
        .descendants()
        .find(dom::is_placeholder)
        .unwrap_or_else(|| NodeRef::new_text(markdown));
    placeholder.detach();
    table.insert_before(placeholder);
    table.detach();
}
