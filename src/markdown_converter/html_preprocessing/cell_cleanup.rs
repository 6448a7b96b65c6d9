//! Table-cell interior cleanup.
//!
//! A Markdown table cell is a single line, so paragraphs and line breaks
//! inside `<td>`/`<th>` are flattened into whitespace-joined text. Cells that
//! hold headings, lists, nested tables or several blocks are layout
//! composition; they are left intact so table classification can see them.

use anyhow::Result;
use kuchiki::NodeRef;

use super::dom;
use crate::config::Thresholds;

/// Whether a cell holds structure that marks its table as layout
#[must_use]
pub fn holds_layout_composition(cell: &NodeRef, thresholds: &Thresholds) -> bool {
    let nested = cell.descendants().any(|d| {
        dom::is_tag(&d, dom::HEADING_TAGS)
            || dom::is_tag(&d, dom::LIST_TAGS)
            || dom::is_tag(&d, &["table"])
    });
    nested || dom::block_children(cell) > thresholds.layout_max_block_children
}

/// Flatten the interior of every simple cell
///
/// # Errors
///
/// Returns an error if the cell selector cannot be compiled.
pub fn clean_cells(root: &NodeRef, thresholds: &Thresholds) -> Result<()> {
    for cell in dom::select_all(root, "td, th")? {
        if holds_layout_composition(&cell, thresholds) {
            continue;
        }
        flatten_cell(&cell);
    }
    Ok(())
}

fn flatten_cell(cell: &NodeRef) {
    let inner: Vec<NodeRef> = cell.descendants().collect();
    for node in inner {
        if dom::is_tag(&node, &["br"]) {
            node.insert_before(NodeRef::new_text(" "));
            node.detach();
        } else if dom::is_tag(&node, &["p", "div", "span", "font", "blockquote", "pre"]) {
            node.insert_before(NodeRef::new_text(" "));
            node.insert_after(NodeRef::new_text(" "));
            dom::unwrap_node(&node);
        }
    }

    collapse_text(cell);
}

/// Collapse whitespace across the cell's text nodes and trim its edges
///
/// Separating spaces stay in their own text nodes so they never end up
/// inside an inline element next to its content.
fn collapse_text(cell: &NodeRef) {
    let texts: Vec<NodeRef> = cell
        .descendants()
        .filter(|n| n.as_text().is_some())
        .collect();

    let mut last_was_space = true;
    for node in &texts {
        let Some(text) = node.as_text() else {
            continue;
        };
        let mut collapsed = String::new();
        for c in text.borrow().chars() {
            if c.is_whitespace() {
                if !last_was_space {
                    collapsed.push(' ');
                    last_was_space = true;
                }
            } else {
                collapsed.push(c);
                last_was_space = false;
            }
        }
        *text.borrow_mut() = collapsed;
    }

    for node in texts.iter().rev() {
        let Some(text) = node.as_text() else {
            continue;
        };
        let trimmed = text.borrow().trim_end().to_string();
        let done = !trimmed.is_empty();
        *text.borrow_mut() = trimmed;
        if done {
            break;
        }
    }

    for node in texts {
        if node.as_text().is_some_and(|t| t.borrow().is_empty()) {
            node.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> Result<String> {
        let body = dom::parse_body(html)?;
        clean_cells(&body, &Thresholds::default())?;
        dom::serialize_children(&body)
    }

    #[test]
    fn test_paragraphs_and_breaks_flattened() -> Result<()> {
        let html = run("<table><tr><td><p>one</p><p>two<br>three</p></td></tr></table>")?;
        assert!(html.contains("<td>one two three</td>"), "{html}");
        Ok(())
    }

    #[test]
    fn test_inline_markup_kept() -> Result<()> {
        let html = run(
            "<table><tr><td>\n  <span>a</span>  <strong>bold</strong>\n <a href=\"/x\">link</a> </td></tr></table>",
        )?;
        assert!(
            html.contains(r#"<td>a <strong>bold</strong> <a href="/x">link</a></td>"#),
            "{html}"
        );
        Ok(())
    }

    #[test]
    fn test_layout_cells_untouched() -> Result<()> {
        let source = "<table><tbody><tr><td><h1>Title</h1><p>x</p></td></tr></tbody></table>";
        assert_eq!(run(source)?, source);
        Ok(())
    }

    #[test]
    fn test_many_blocks_is_layout() {
        let body = dom::parse_body("<table><tr><td><p>a</p><p>b</p><p>c</p></td></tr></table>")
            .expect("parse");
        let cell = dom::select_all(&body, "td").expect("select").remove(0);
        assert!(holds_layout_composition(&cell, &Thresholds::default()));
    }

    #[test]
    fn test_nbsp_only_cell_becomes_empty() -> Result<()> {
        let html = run("<table><tr><td>&nbsp;</td><td>x</td></tr></table>")?;
        assert!(html.contains("<td></td><td>x</td>"), "{html}");
        Ok(())
    }
}
