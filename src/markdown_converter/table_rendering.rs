//! Data table → Markdown pipe table.
//!
//! A data table's cells are rendered to inline Markdown, collected into a
//! rectangular [`CellGrid`] and written out as a GitHub-flavored pipe table.
//! The result is wrapped in a placeholder block that the Markdown renderer
//! passes through verbatim.

use html_escape::encode_text;
use kuchiki::NodeRef;
use regex::Regex;
use std::sync::LazyLock;

use super::html_preprocessing::dom;
use crate::error::{ConversionError, ConversionResult};

// ============================================================================
// Grid Limits
// ============================================================================

/// Maximum grid rows; larger tables are left to the generic renderer
pub const MAX_GRID_ROWS: usize = 1000;

/// Maximum grid columns; also the clamp for `colspan`
pub const MAX_GRID_COLS: usize = 100;

/// Maximum total cells in one grid
pub const MAX_TOTAL_CELLS: usize = 100_000;

/// `&` that would start a character reference when read back as Markdown
static ENTITY_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#?[A-Za-z0-9]+;)").expect("ENTITY_START: hardcoded regex is valid")
});

/// Row-major cell text of one table, first row is the header
///
/// Every row has the same column count; short rows are padded and blank
/// cells hold a single space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    rows: Vec<Vec<String>>,
    columns: usize,
}

impl CellGrid {
    /// Build a grid from raw cell text, escaping and padding each row
    ///
    /// # Errors
    ///
    /// Returns `TableParseFailure` if the grid has no cells or exceeds the
    /// size limits.
    pub fn new(raw_rows: Vec<Vec<String>>) -> ConversionResult<Self> {
        check_limits(raw_rows.len(), raw_rows.iter().map(Vec::len))?;

        let columns = raw_rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return Err(ConversionError::TableParseFailure(
                "table has no cells".to_string(),
            ));
        }

        let rows = raw_rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
                cells.resize(columns, " ".to_string());
                cells
            })
            .collect();

        Ok(Self { rows, columns })
    }

    /// Extract the grid of a `<table>` element (its own rows only)
    ///
    /// # Errors
    ///
    /// Returns `TableParseFailure` if the table has no cells or is too large.
    pub fn from_table(table: &NodeRef) -> ConversionResult<Self> {
        let rows = dom::table_rows(table);
        let cells: Vec<Vec<NodeRef>> = rows.iter().map(dom::row_cells).collect();
        check_limits(cells.len(), cells.iter().map(Vec::len))?;

        let raw = cells
            .iter()
            .map(|row| row.iter().map(render_cell_inline).collect())
            .collect();
        Self::new(raw)
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Render as a pipe table: header row, divider, body rows
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        for (index, row) in self.rows.iter().enumerate() {
            lines.push(format!("| {} |", row.join(" | ")));
            if index == 0 {
                lines.push(format!("| {} |", vec!["---"; self.columns].join(" | ")));
            }
        }
        lines.join("\n")
    }
}

fn check_limits(rows: usize, row_lengths: impl Iterator<Item = usize>) -> ConversionResult<()> {
    if rows > MAX_GRID_ROWS {
        return Err(ConversionError::TableParseFailure(format!(
            "table has {rows} rows (maximum {MAX_GRID_ROWS})"
        )));
    }
    let mut total = 0usize;
    for len in row_lengths {
        if len > MAX_GRID_COLS {
            return Err(ConversionError::TableParseFailure(format!(
                "table row has {len} cells (maximum {MAX_GRID_COLS})"
            )));
        }
        total = total.saturating_add(len);
    }
    if total > MAX_TOTAL_CELLS {
        return Err(ConversionError::TableParseFailure(format!(
            "table has {total} cells (maximum {MAX_TOTAL_CELLS})"
        )));
    }
    Ok(())
}

/// Make cell text safe for a pipe table
///
/// Whitespace (including `&nbsp;`) collapses to single spaces, literal pipes
/// are escaped, and an empty cell becomes a single space.
#[must_use]
pub fn escape_cell(text: &str) -> String {
    let collapsed = dom::collapse_whitespace(text);
    if collapsed.is_empty() {
        return " ".to_string();
    }
    collapsed.replace('|', "\\|")
}

/// Render a cell's content as single-line inline Markdown
#[must_use]
pub fn render_cell_inline(cell: &NodeRef) -> String {
    let mut out = String::new();
    render_inline(cell, &mut out);
    dom::collapse_whitespace(&out)
}

fn render_inline(node: &NodeRef, out: &mut String) {
    for child in node.children() {
        if let Some(text) = child.as_text() {
            out.push_str(&escape_inline_text(&text.borrow()));
            continue;
        }
        let Some(tag) = dom::tag_name(&child) else {
            continue;
        };
        match tag.as_str() {
            "strong" | "b" => wrap_inline(&child, "**", out),
            "em" | "i" => wrap_inline(&child, "_", out),
            "s" | "del" | "strike" => wrap_inline(&child, "~~", out),
            "code" => {
                let code = dom::collapse_whitespace(&child.text_contents());
                if !code.is_empty() {
                    out.push('`');
                    out.push_str(&code);
                    out.push('`');
                }
            }
            "a" => {
                let mut label = String::new();
                render_inline(&child, &mut label);
                let label = dom::collapse_whitespace(&label);
                match dom::get_attr(&child, "href").filter(|h| !h.trim().is_empty()) {
                    Some(href) => {
                        let text = if label.is_empty() { href.clone() } else { label };
                        out.push_str(&format!("[{text}]({})", href.trim()));
                    }
                    None => out.push_str(&label),
                }
            }
            "img" => {
                if let Some(src) = dom::get_attr(&child, "src") {
                    let alt = dom::get_attr(&child, "alt").unwrap_or_default();
                    out.push_str(&format!("![{}]({})", alt.trim(), src.trim()));
                }
            }
            "br" => out.push(' '),
            _ if dom::is_tag(&child, dom::BLOCK_TAGS) || tag == "li" => {
                out.push(' ');
                render_inline(&child, out);
                out.push(' ');
            }
            _ => render_inline(&child, out),
        }
    }
}

/// Keep decoded cell text literal once it is pasted into Markdown
///
/// Pre-rendered cells bypass the renderer's own escaping, so emphasis,
/// code, link and HTML syntax in the text is neutralized here.
#[must_use]
fn escape_inline_text(text: &str) -> String {
    let text = ENTITY_START.replace_all(text, "&amp;$1");
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '*' | '_' | '`' | '[' | ']' => {
                out.push('\\');
                out.push(c);
            }
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Emphasis with surrounding whitespace kept outside the markers
fn wrap_inline(node: &NodeRef, marker: &str, out: &mut String) {
    let mut inner = String::new();
    render_inline(node, &mut inner);
    let body = dom::collapse_whitespace(&inner);
    let leading = inner.starts_with(char::is_whitespace);
    let trailing = inner.ends_with(char::is_whitespace);

    if leading {
        out.push(' ');
    }
    if !body.is_empty() {
        out.push_str(marker);
        out.push_str(&body);
        out.push_str(marker);
    }
    if trailing {
        out.push(' ');
    }
}

/// HTML for a placeholder block carrying pre-rendered Markdown
#[must_use]
pub fn placeholder_html(markdown: &str) -> String {
    format!(
        "<div {}=\"true\">{}</div>",
        dom::PLACEHOLDER_ATTR,
        encode_text(markdown)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid_of(html: &str) -> anyhow::Result<ConversionResult<CellGrid>> {
        let body = dom::parse_body(html)?;
        let table = dom::select_all(&body, "table")?.remove(0);
        Ok(CellGrid::from_table(&table))
    }

    #[test]
    fn test_pipe_table_layout() -> anyhow::Result<()> {
        let grid = grid_of(
            "<table><thead><tr><th>h1</th><th>h2</th></tr></thead><tbody><tr><td>a</td><td>b</td></tr></tbody></table>",
        )??;
        assert_eq!(grid.to_markdown(), "| h1 | h2 |\n| --- | --- |\n| a | b |");
        Ok(())
    }

    #[test]
    fn test_jagged_rows_padded() -> anyhow::Result<()> {
        let grid = grid_of("<table><tr><td>a</td><td>b</td><td>c</td></tr><tr><td>1</td></tr></table>")??;
        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.rows()[1], vec!["1", " ", " "]);
        Ok(())
    }

    #[test]
    fn test_pipe_escaped() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
        assert_eq!(escape_cell(" \u{a0} "), " ");
        assert_eq!(escape_cell("  x \n y "), "x y");
    }

    #[test]
    fn test_inline_formatting_in_cells() -> anyhow::Result<()> {
        let grid = grid_of(
            r#"<table><tr><td><strong>bold </strong>and <em>it</em></td><td><a href="https://e.com/a|b">link</a></td><td><code>x  y</code></td></tr></table>"#,
        )??;
        assert_eq!(
            grid.rows()[0],
            vec!["**bold** and _it_", "[link](https://e.com/a\\|b)", "`x y`"]
        );
        Ok(())
    }

    #[test]
    fn test_cell_text_stays_literal() -> anyhow::Result<()> {
        let grid = grid_of(
            "<table><tr><td>*x*</td><td>&lt;b&gt;y&lt;/b&gt;</td><td>snake_case [n]</td><td><b>AT&amp;T &amp;amp;</b></td></tr></table>",
        )??;
        assert_eq!(
            grid.rows()[0],
            vec![r"\*x\*", "&lt;b>y&lt;/b>", r"snake\_case \[n\]", "**AT&T &amp;amp;**"]
        );
        Ok(())
    }

    #[test]
    fn test_block_content_joined_with_spaces() -> anyhow::Result<()> {
        let grid = grid_of("<table><tr><td><p>one</p><p>two</p></td></tr></table>")??;
        assert_eq!(grid.rows()[0], vec!["one two"]);
        Ok(())
    }

    #[test]
    fn test_empty_table_is_parse_failure() -> anyhow::Result<()> {
        assert!(matches!(
            grid_of("<table><tr></tr></table>")?,
            Err(ConversionError::TableParseFailure(_))
        ));
        Ok(())
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let rows = vec![vec!["x".to_string(); 2]; MAX_GRID_ROWS + 1];
        assert!(matches!(
            CellGrid::new(rows),
            Err(ConversionError::TableParseFailure(_))
        ));
        let wide = vec![vec!["x".to_string(); MAX_GRID_COLS + 1]];
        assert!(CellGrid::new(wide).is_err());
    }

    #[test]
    fn test_placeholder_escapes_markdown() {
        assert_eq!(
            placeholder_html("| a<b |"),
            "<div data-markdown-placeholder=\"true\">| a&lt;b |</div>"
        );
    }

    proptest! {
        #[test]
        fn prop_divider_matches_header_width(
            rows in prop::collection::vec(prop::collection::vec("[a-z|]{0,6}", 1..8), 1..10)
        ) {
            let grid = CellGrid::new(rows).expect("non-empty grid");
            let markdown = grid.to_markdown();
            let lines: Vec<&str> = markdown.lines().collect();
            let divider_cols = lines[1].matches("---").count();
            prop_assert_eq!(divider_cols, grid.columns());
            for row in grid.rows() {
                prop_assert_eq!(row.len(), grid.columns());
                for cell in row {
                    prop_assert!(!cell.is_empty());
                    // every pipe inside a cell is escaped
                    prop_assert_eq!(cell.matches('|').count(), cell.matches("\\|").count());
                }
            }
        }
    }
}
