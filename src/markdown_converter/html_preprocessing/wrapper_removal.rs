//! Removal of non-semantic wrapper elements.
//!
//! Editors nest content in layers of `<div>`, `<span>` and `<font>` that the
//! Markdown renderer would either ignore or turn into stray blank lines.
//! Each wrapper is replaced by its children. A `<div>` that directly holds a
//! run of inline content becomes a `<p>` instead, so sibling lines stay
//! separate paragraphs.

use anyhow::Result;
use kuchiki::NodeRef;
use tracing::{debug, warn};

use super::dom;

pub const WRAPPER_TAGS: &[&str] = &["div", "span", "font", "center"];

/// Contexts where a `<p>` cannot appear, so inline divs are plain unwrapped
const INLINE_CONTEXTS: &[&str] = &[
    "p", "li", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "a", "strong", "em", "code", "dt", "dd",
    "caption", "span", "font",
];

fn remove_wrapper(node: &NodeRef) -> Result<()> {
    if dom::is_tag(node, &["div", "center"])
        && !dom::has_ancestor(node, INLINE_CONTEXTS)
        && dom::holds_only_inline_content(node)
    {
        dom::rename_element(node, "p")?;
    } else {
        dom::unwrap_node(node);
    }
    Ok(())
}

/// Remove wrappers until a traversal finds none, up to `max_rounds` traversals
///
/// Returns the number of wrappers removed. Running it again on its own
/// output removes nothing.
///
/// # Errors
///
/// Returns an error if a replacement paragraph cannot be created.
pub fn remove_wrappers(root: &NodeRef, max_rounds: usize) -> Result<usize> {
    let mut removed = 0;

    for _ in 0..max_rounds {
        // Document order: an outer div is judged before its children are lifted
        let worklist: Vec<NodeRef> = root
            .descendants()
            .filter(|n| dom::is_tag(n, WRAPPER_TAGS) && !dom::is_placeholder(n))
            .collect();

        if worklist.is_empty() {
            if removed > 0 {
                debug!("Removed {removed} wrapper elements");
            }
            return Ok(removed);
        }

        for node in &worklist {
            remove_wrapper(node)?;
        }
        removed += worklist.len();
    }

    warn!("Wrapper removal stopped after {max_rounds} rounds; some wrappers remain");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_wrappers(root: &NodeRef) -> bool {
        root.descendants()
            .any(|n| dom::is_tag(&n, WRAPPER_TAGS) && !dom::is_placeholder(&n))
    }

    fn run(html: &str) -> Result<String> {
        let body = dom::parse_body(html)?;
        remove_wrappers(&body, 512)?;
        assert!(!has_wrappers(&body));
        dom::serialize_children(&body)
    }

    #[test]
    fn test_nested_wrappers_removed() -> Result<()> {
        assert_eq!(
            run("<div><div><div><h2>Title</h2><p>a<span><font>b</font></span></p></div></div></div>")?,
            "<h2>Title</h2><p>ab</p>"
        );
        Ok(())
    }

    #[test]
    fn test_inline_divs_become_paragraphs() -> Result<()> {
        assert_eq!(
            run("<div>first line</div><div>second <strong>line</strong></div>")?,
            "<p>first line</p><p>second <strong>line</strong></p>"
        );
        Ok(())
    }

    #[test]
    fn test_div_of_spans_becomes_paragraph() -> Result<()> {
        assert_eq!(
            run("<div><span>one</span></div><div><span>two</span></div>")?,
            "<p>one</p><p>two</p>"
        );
        Ok(())
    }

    #[test]
    fn test_div_in_list_item_unwrapped() -> Result<()> {
        assert_eq!(run("<ul><li><div>item</div></li></ul>")?, "<ul><li>item</li></ul>");
        Ok(())
    }

    #[test]
    fn test_deep_nesting_reaches_fixed_point() -> Result<()> {
        let depth = 300;
        let html = format!("{}<p>deep</p>{}", "<div>".repeat(depth), "</div>".repeat(depth));
        assert_eq!(run(&html)?, "<p>deep</p>");
        Ok(())
    }

    #[test]
    fn test_idempotent() -> Result<()> {
        let once = run("<div><span>x</span><div>y</div></div>")?;
        assert_eq!(run(&once)?, once);
        Ok(())
    }
}
