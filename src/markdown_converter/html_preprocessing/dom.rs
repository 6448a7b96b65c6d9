//! Small helpers over kuchiki's mutable DOM.
//!
//! kuchiki selectors return `Result<_, ()>` and iterators that break when the
//! tree is mutated underneath them, so every query here collects first.

use anyhow::{Context, Result, anyhow};
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;

/// Block-level tags counted when judging cell composition
pub const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "table", "blockquote", "pre",
    "section", "article", "hr",
];

pub const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

pub const LIST_TAGS: &[&str] = &["ul", "ol"];

/// Marker attribute of a block holding pre-rendered Markdown
pub const PLACEHOLDER_ATTR: &str = "data-markdown-placeholder";

/// Parse an HTML fragment and return its `<body>` element
///
/// The parser wraps fragments in `html`/`body`; the body is where the
/// fragment's nodes end up.
pub fn parse_body(html: &str) -> Result<NodeRef> {
    let document = kuchiki::parse_html().one(html.to_string());
    let body = document
        .select_first("body")
        .map_err(|()| anyhow!("Parsed document has no <body> element"))?;
    Ok(body.as_node().clone())
}

/// Serialize the children of `node` (not the node itself)
pub fn serialize_children(node: &NodeRef) -> Result<String> {
    let mut output = Vec::new();
    for child in node.children() {
        child
            .serialize(&mut output)
            .context("Failed to serialize normalized HTML")?;
    }
    String::from_utf8(output).context("Serialized HTML is not valid UTF-8")
}

/// Select every node under `root` matching `selector`, collected up front
pub fn select_all(root: &NodeRef, selector: &str) -> Result<Vec<NodeRef>> {
    Ok(root
        .select(selector)
        .map_err(|()| anyhow!("Invalid CSS selector: {selector}"))?
        .map(|m| m.as_node().clone())
        .collect())
}

/// Lowercase local tag name, `None` for non-element nodes
pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.as_element().map(|el| el.name.local.to_lowercase())
}

pub fn is_tag(node: &NodeRef, tags: &[&str]) -> bool {
    node.as_element().is_some_and(|el| {
        let name: &str = &el.name.local;
        tags.iter().any(|t| name.eq_ignore_ascii_case(t))
    })
}

pub fn get_attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()
        .and_then(|el| el.attributes.borrow().get(name).map(String::from))
}

pub fn has_ancestor(node: &NodeRef, tags: &[&str]) -> bool {
    node.ancestors().any(|a| is_tag(&a, tags))
}

/// Replace `node` with its children, keeping them in document order
pub fn unwrap_node(node: &NodeRef) {
    // Snapshot the children: moving them mutates the sibling links
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        node.insert_before(child);
    }
    node.detach();
}

/// Create a detached, attribute-free element
///
/// Table parts only survive parsing inside a table context, so they are
/// parsed within a scaffold and lifted out.
pub fn new_element(tag: &str) -> Result<NodeRef> {
    let snippet = match tag {
        "thead" | "tbody" | "tfoot" => format!("<table><{tag}></{tag}></table>"),
        "tr" => "<table><tbody><tr></tr></tbody></table>".to_string(),
        "td" | "th" => format!("<table><tbody><tr><{tag}></{tag}></tr></tbody></table>"),
        _ => format!("<{tag}></{tag}>"),
    };
    let document = kuchiki::parse_html().one(snippet);
    let element = document
        .select_first(tag)
        .map_err(|()| anyhow!("Could not create <{tag}> element"))?;
    let node = element.as_node().clone();
    node.detach();
    Ok(node)
}

/// Wrap `node`'s children in a fresh `tag` element that takes its place
///
/// Attributes are carried over.
pub fn rename_element(node: &NodeRef, tag: &str) -> Result<NodeRef> {
    let replacement = new_element(tag)?;
    if let (Some(old), Some(new)) = (node.as_element(), replacement.as_element()) {
        let old_attrs = old.attributes.borrow();
        let mut new_attrs = new.attributes.borrow_mut();
        for (name, attr) in &old_attrs.map {
            new_attrs.insert(name.local.to_string(), attr.value.clone());
        }
    }
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        replacement.append(child);
    }
    node.insert_before(replacement.clone());
    node.detach();
    Ok(replacement)
}

/// Deep copy of `node` as a new detached subtree
pub fn clone_subtree(node: &NodeRef) -> Result<NodeRef> {
    let tag = tag_name(node).ok_or_else(|| anyhow!("Only elements can be cloned"))?;
    let mut output = Vec::new();
    node.serialize(&mut output)
        .context("Failed to serialize element for cloning")?;
    let markup = String::from_utf8(output).context("Serialized HTML is not valid UTF-8")?;

    let snippet = match tag.as_str() {
        "td" | "th" => format!("<table><tbody><tr>{markup}</tr></tbody></table>"),
        "tr" => format!("<table><tbody>{markup}</tbody></table>"),
        _ => markup,
    };
    let document = kuchiki::parse_html().one(snippet);
    // Pre-order: the first match is the outermost copy
    let copy = document
        .select_first(&tag)
        .map_err(|()| anyhow!("Cloned <{tag}> did not survive reparsing"))?;
    let copy = copy.as_node().clone();
    copy.detach();
    Ok(copy)
}

/// Rows belonging to `table` itself, not to tables nested in its cells
pub fn table_rows(table: &NodeRef) -> Vec<NodeRef> {
    let mut rows = Vec::new();
    for child in table.children() {
        if is_tag(&child, &["tr"]) {
            rows.push(child);
        } else if is_tag(&child, &["thead", "tbody", "tfoot"]) {
            rows.extend(child.children().filter(|c| is_tag(c, &["tr"])));
        }
    }
    rows
}

pub fn row_cells(row: &NodeRef) -> Vec<NodeRef> {
    row.children().filter(|c| is_tag(c, &["td", "th"])).collect()
}

/// Whether an element holds nothing but whitespace and `<br>`
pub fn is_blank_or_breaks(node: &NodeRef) -> bool {
    node.children().all(|child| {
        if let Some(text) = child.as_text() {
            return text.borrow().trim().is_empty();
        }
        is_tag(&child, &["br"])
    })
}

/// Whether an element directly holds inline content and no blocks
pub fn holds_only_inline_content(node: &NodeRef) -> bool {
    let mut has_content = false;
    for child in node.children() {
        if let Some(text) = child.as_text() {
            has_content |= !text.borrow().trim().is_empty();
        } else if child.as_element().is_some() {
            if is_tag(&child, BLOCK_TAGS) || is_tag(&child, &["center"]) {
                return false;
            }
            has_content = true;
        }
    }
    has_content
}

/// Whether `node` is a pre-rendered Markdown placeholder block
pub fn is_placeholder(node: &NodeRef) -> bool {
    is_tag(node, &["div"]) && get_attr(node, PLACEHOLDER_ATTR).is_some()
}

/// Element children that are block-level
pub fn block_children(node: &NodeRef) -> usize {
    node.children().filter(|c| is_tag(c, BLOCK_TAGS)).count()
}

/// Collapse runs of whitespace (including `&nbsp;`) to single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize_fragment() -> Result<()> {
        let body = parse_body("<p>one</p><p>two</p>")?;
        assert_eq!(serialize_children(&body)?, "<p>one</p><p>two</p>");
        Ok(())
    }

    #[test]
    fn test_is_tag_matches_local_name() -> Result<()> {
        let body = parse_body("<p>x<B>y</B><span>z</span></p>")?;
        let bold: Vec<NodeRef> = body.descendants().filter(|n| is_tag(n, &["strong", "b"])).collect();
        assert_eq!(bold.len(), 1);
        assert_eq!(bold[0].text_contents(), "y");
        assert!(!body.descendants().any(|n| is_tag(&n, &["em"])));
        Ok(())
    }

    #[test]
    fn test_unwrap_keeps_order() -> Result<()> {
        let body = parse_body("<p>a<span>b<em>c</em></span>d</p>")?;
        for span in select_all(&body, "span")? {
            unwrap_node(&span);
        }
        assert_eq!(serialize_children(&body)?, "<p>ab<em>c</em>d</p>");
        Ok(())
    }

    #[test]
    fn test_new_table_parts() -> Result<()> {
        for tag in ["thead", "tr", "th", "td", "strong"] {
            let node = new_element(tag)?;
            assert_eq!(tag_name(&node).as_deref(), Some(tag));
            assert!(node.parent().is_none());
        }
        Ok(())
    }

    #[test]
    fn test_rename_keeps_children_and_attrs() -> Result<()> {
        let body = parse_body(r#"<table><tr><td colspan="2">x <b>y</b></td></tr></table>"#)?;
        let td = select_all(&body, "td")?;
        let th = rename_element(&td[0], "th")?;
        assert_eq!(get_attr(&th, "colspan").as_deref(), Some("2"));
        assert!(serialize_children(&body)?.contains(r#"<th colspan="2">x <b>y</b></th>"#));
        Ok(())
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \u{a0}\n b\t"), "a b");
    }
}
