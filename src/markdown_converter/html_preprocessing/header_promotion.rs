//! First-row-to-header promotion.
//!
//! Pipe tables need a header row. Spreadsheet pastes and most copied tables
//! carry no `<thead>`, so the first row is promoted: its cells become `<th>`
//! and the row moves into a new `<thead>`. Tables that already mark a header
//! are never touched.

use anyhow::Result;
use kuchiki::NodeRef;
use tracing::debug;

use super::dom;

/// Whether `table` owns a `<thead>` (not one of a nested table)
fn has_own_thead(table: &NodeRef) -> bool {
    table.children().any(|c| dom::is_tag(&c, &["thead"]))
}

/// Promote first rows to headers where the table lacks header markup
///
/// A table qualifies when its first row is already all `<th>`, when it has
/// no `<th>` at all, or when the document is spreadsheet-like (where `<th>`
/// cells are row labels, not column headers).
///
/// # Errors
///
/// Returns an error if a `<th>` or `<thead>` element cannot be created.
pub fn promote_headers(root: &NodeRef, spreadsheet: bool) -> Result<()> {
    for table in dom::select_all(root, "table")? {
        if has_own_thead(&table) {
            continue;
        }

        let rows = dom::table_rows(&table);
        let Some(first_row) = rows.first() else {
            continue;
        };

        let first_cells = dom::row_cells(first_row);
        if first_cells.is_empty() {
            continue;
        }

        let first_all_th = first_cells.iter().all(|c| dom::is_tag(c, &["th"]));
        let any_th = rows
            .iter()
            .flat_map(dom::row_cells)
            .any(|c| dom::is_tag(&c, &["th"]));

        if !(first_all_th || !any_th || spreadsheet) {
            continue;
        }

        promote_row(first_row, &first_cells)?;
    }
    Ok(())
}

fn promote_row(row: &NodeRef, cells: &[NodeRef]) -> Result<()> {
    for cell in cells {
        if dom::is_tag(cell, &["td"]) {
            dom::rename_element(cell, "th")?;
        }
    }

    let thead = dom::new_element("thead")?;
    // The row sits either directly in the table or in a row group
    let anchor = match row.parent() {
        Some(parent) if !dom::is_tag(&parent, &["table"]) => parent,
        _ => row.clone(),
    };
    anchor.insert_before(thead.clone());
    thead.append(row.clone());

    // A row group emptied by the move is dropped
    if !dom::is_tag(&anchor, &["tr"]) && !anchor.children().any(|c| dom::is_tag(&c, &["tr"])) {
        anchor.detach();
    }

    debug!("Promoted first row of {} cells to header", cells.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str, spreadsheet: bool) -> Result<String> {
        let body = dom::parse_body(html)?;
        promote_headers(&body, spreadsheet)?;
        dom::serialize_children(&body)
    }

    #[test]
    fn test_plain_table_promoted() -> Result<()> {
        assert_eq!(
            run("<table><tr><td>A</td><td>B</td></tr><tr><td>1</td><td>2</td></tr></table>", false)?,
            "<table><thead><tr><th>A</th><th>B</th></tr></thead><tbody><tr><td>1</td><td>2</td></tr></tbody></table>"
        );
        Ok(())
    }

    #[test]
    fn test_existing_thead_never_overridden() -> Result<()> {
        let source = "<table><thead><tr><th>H</th></tr></thead><tbody><tr><td>x</td></tr></tbody></table>";
        assert_eq!(run(source, true)?, source);
        Ok(())
    }

    #[test]
    fn test_row_header_tables_need_spreadsheet_signal() -> Result<()> {
        let source = "<table><tbody><tr><th>Q1</th><td>5</td></tr><tr><th>Q2</th><td>6</td></tr></tbody></table>";
        assert_eq!(run(source, false)?, source);
        assert!(run(source, true)?.starts_with("<table><thead><tr><th>Q1</th><th>5</th></tr></thead>"));
        Ok(())
    }

    #[test]
    fn test_single_row_table_drops_empty_body() -> Result<()> {
        assert_eq!(
            run("<table><tr><td>only</td></tr></table>", false)?,
            "<table><thead><tr><th>only</th></tr></thead></table>"
        );
        Ok(())
    }

    #[test]
    fn test_idempotent() -> Result<()> {
        let once = run("<table><tr><td>A</td></tr><tr><td>1</td></tr></table>", false)?;
        assert_eq!(run(&once, false)?, once);
        Ok(())
    }
}
