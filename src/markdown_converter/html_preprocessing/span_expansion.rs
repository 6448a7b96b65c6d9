//! Colspan/rowspan expansion into explicit cells.
//!
//! Markdown tables have no spans, so a spanned cell is copied into every
//! column or row it covers. Section-header cells that span (most of) the
//! table width are the exception: repeating a banner once per column reads
//! as noise, so those are kept as a single cell.

use anyhow::Result;
use kuchiki::NodeRef;
use tracing::debug;

use super::{dom, style_inference};
use crate::config::Thresholds;
use crate::markdown_converter::table_rendering::{MAX_GRID_COLS, MAX_GRID_ROWS};

fn span_value(cell: &NodeRef, name: &str, max: usize) -> usize {
    dom::get_attr(cell, name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, max)
}

fn remove_attr(cell: &NodeRef, name: &str) {
    if let Some(el) = cell.as_element() {
        el.attributes.borrow_mut().remove(name);
    }
}

/// Whether a spanned cell reads as a section header rather than data
///
/// Either it spans at least `section_header_colspan` columns, or it carries
/// bold/heading markup and more than `section_header_min_len` characters of
/// HTML content.
pub fn is_section_header(cell: &NodeRef, colspan: usize, thresholds: &Thresholds) -> Result<bool> {
    if colspan >= thresholds.section_header_colspan {
        return Ok(true);
    }

    let emphasized = cell
        .descendants()
        .any(|d| dom::is_tag(&d, &["strong", "b", "h1", "h2", "h3", "h4", "h5", "h6"]))
        || style_inference::has_bold_style(cell);
    if !emphasized {
        return Ok(false);
    }

    let content = dom::serialize_children(cell)?;
    Ok(content.chars().count() > thresholds.section_header_min_len)
}

/// Expand every `colspan` in the tree
///
/// Tables nested inside cells are handled too; each cell is independent.
pub fn expand_colspans(root: &NodeRef, thresholds: &Thresholds) -> Result<()> {
    for cell in dom::select_all(root, "td[colspan], th[colspan]")? {
        let colspan = span_value(&cell, "colspan", MAX_GRID_COLS);
        remove_attr(&cell, "colspan");
        if colspan <= 1 {
            continue;
        }

        if is_section_header(&cell, colspan, thresholds)? {
            debug!("Keeping section header cell spanning {colspan} columns once");
            continue;
        }

        for _ in 1..colspan {
            let copy = dom::clone_subtree(&cell)?;
            cell.insert_after(copy);
        }
    }
    Ok(())
}

/// A spanned cell still owed to rows below it
struct Carry {
    col: usize,
    remaining: usize,
    template: NodeRef,
}

/// Expand every `rowspan`, copying the cell into the rows it covers
///
/// Runs after colspan expansion so each cell occupies one logical column.
pub fn expand_rowspans(root: &NodeRef) -> Result<()> {
    for table in dom::select_all(root, "table")? {
        let rows = dom::table_rows(&table);
        let spanned = rows
            .iter()
            .flat_map(dom::row_cells)
            .any(|c| dom::get_attr(&c, "rowspan").is_some());
        if !spanned {
            continue;
        }
        expand_table_rowspans(&rows)?;
    }
    Ok(())
}

fn expand_table_rowspans(rows: &[NodeRef]) -> Result<()> {
    let mut carries: Vec<Carry> = Vec::new();

    for (row_index, row) in rows.iter().enumerate() {
        let rows_left = rows.len() - row_index - 1;
        carries.sort_by_key(|c| c.col);

        let mut existing = dom::row_cells(row).into_iter().peekable();
        let mut pending = carries.drain(..).peekable();
        let mut next_carries = Vec::new();
        let mut col = 0;

        loop {
            if let Some(carry) = pending.next_if(|c| c.col <= col) {
                let copy = dom::clone_subtree(&carry.template)?;
                match existing.peek() {
                    Some(cell) => cell.insert_before(copy),
                    None => row.append(copy),
                }
                if carry.remaining > 1 {
                    next_carries.push(Carry {
                        col,
                        remaining: carry.remaining - 1,
                        template: carry.template,
                    });
                }
            } else if let Some(cell) = existing.next() {
                let rowspan = span_value(&cell, "rowspan", MAX_GRID_ROWS).min(rows_left + 1);
                remove_attr(&cell, "rowspan");
                if rowspan > 1 {
                    next_carries.push(Carry {
                        col,
                        remaining: rowspan - 1,
                        template: cell.clone(),
                    });
                }
            } else if pending.peek().is_none() {
                break;
            } else {
                // Gap before the next carried column: close it up
                if let Some(carry) = pending.peek() {
                    col = carry.col;
                }
                continue;
            }
            col += 1;
        }

        drop(pending);
        carries = next_carries;
    }
    Ok(())
}
