//! Custom handlers for htmd HTML-to-Markdown conversion
//!
//! The normalized HTML is mostly rendered by htmd's defaults. These handlers
//! cover the cases where clipboard output needs something else:
//! - `<div data-markdown-placeholder>`: pre-rendered Markdown, emitted verbatim
//! - `<br>`: two trailing spaces and a newline
//! - `<em>`/`<i>` and `<strong>`/`<b>`: `_x_` and `**x**`, with surrounding
//!   whitespace kept outside the delimiters

use htmd::{
    Element, HtmlToMarkdown,
    element_handler::{HandlerResult, Handlers},
    options::{BrStyle, BulletListMarker, CodeBlockStyle, HeadingStyle, HrStyle, Options},
};
use std::rc::Rc;

use super::html_preprocessing::dom::PLACEHOLDER_ATTR;

/// Create an htmd converter with the clipboard rendering rules
pub fn create_converter() -> HtmlToMarkdown {
    HtmlToMarkdown::builder()
        .options(Options {
            heading_style: HeadingStyle::Atx,
            hr_style: HrStyle::Dashes,
            br_style: BrStyle::TwoSpaces,
            code_block_style: CodeBlockStyle::Fenced,
            bullet_list_marker: BulletListMarker::Dash,
            ..Default::default()
        })
        .skip_tags(vec!["script", "style", "meta", "noscript"])
        // Placeholder passthrough takes precedence over default div handling
        .add_handler(vec!["div"], div_handler)
        .add_handler(vec!["br"], br_handler)
        .add_handler(vec!["em", "i"], em_handler)
        .add_handler(vec!["strong", "b"], strong_handler)
        .build()
}

/// Handle `<div>`: placeholders pass through, other divs are blocks
fn div_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    if get_attr(element.attrs, PLACEHOLDER_ATTR).is_some() {
        let markdown = extract_raw_text(element.node);
        return Some(HandlerResult::from(format!("\n\n{}\n\n", markdown.trim_matches('\n'))));
    }

    let content = handlers.walk_children(element.node).content;
    let content = content.trim_matches('\n');
    if content.trim().is_empty() {
        return Some(HandlerResult::from(String::new()));
    }
    Some(HandlerResult::from(format!("\n\n{content}\n\n")))
}

fn br_handler(_handlers: &dyn Handlers, _element: Element) -> Option<HandlerResult> {
    Some(HandlerResult::from("  \n".to_string()))
}

fn em_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let content = handlers.walk_children(element.node).content;
    Some(HandlerResult::from(wrap_emphasis(&content, "_")))
}

fn strong_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let content = handlers.walk_children(element.node).content;
    Some(HandlerResult::from(wrap_emphasis(&content, "**")))
}

/// Wrap content in emphasis delimiters, moving edge whitespace outside
///
/// `** bold **` is not emphasis in CommonMark; ` **bold** ` is.
fn wrap_emphasis(content: &str, delimiter: &str) -> String {
    let body = content.trim();
    if body.is_empty() {
        return content.to_string();
    }
    let leading = &content[..content.len() - content.trim_start().len()];
    let trailing = &content[content.trim_end().len()..];
    format!("{leading}{delimiter}{body}{delimiter}{trailing}")
}

// === Helper Functions ===

/// Extract raw text content from a node tree, bypassing Markdown escaping
fn extract_raw_text(node: &Rc<markup5ever_rcdom::Node>) -> String {
    use markup5ever_rcdom::NodeData;

    let mut text = String::new();
    match &node.data {
        NodeData::Text { contents } => text.push_str(&contents.borrow()),
        NodeData::Element { .. } | NodeData::Document | NodeData::Doctype { .. } => {
            for child in node.children.borrow().iter() {
                text.push_str(&extract_raw_text(child));
            }
        }
        NodeData::Comment { .. } | NodeData::ProcessingInstruction { .. } => {}
    }
    text
}

/// Get attribute value from element
fn get_attr(attrs: &[html5ever::Attribute], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|a| &*a.name.local == name)
        .map(|a| a.value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(html: &str) -> String {
        create_converter().convert(html).expect("htmd conversion")
    }

    #[test]
    fn test_wrap_emphasis_keeps_whitespace_outside() {
        assert_eq!(wrap_emphasis(" bold ", "**"), " **bold** ");
        assert_eq!(wrap_emphasis("x", "_"), "_x_");
        assert_eq!(wrap_emphasis("  ", "**"), "  ");
    }

    #[test]
    fn test_placeholder_passes_through_verbatim() {
        let md = convert(
            "<p>before</p><div data-markdown-placeholder=\"true\">| a_b | c*d |\n| --- | --- |\n| 1 | x\\|y |</div><p>after</p>",
        );
        assert!(md.contains("| a_b | c*d |\n| --- | --- |\n| 1 | x\\|y |"), "{md}");
        assert!(md.contains("before"));
        assert!(md.contains("after"));
    }

    #[test]
    fn test_emphasis_delimiters() {
        let md = convert("<p><strong>bold </strong>and <em>italic</em></p>");
        assert_eq!(md.trim(), "**bold** and _italic_");
    }

    #[test]
    fn test_line_break_is_two_spaces() {
        let md = convert("<p>one<br>two</p>");
        assert!(md.contains("one  \ntwo"), "{md:?}");
    }

    #[test]
    fn test_heading_style_is_atx() {
        assert_eq!(convert("<h1>Title</h1>").trim(), "# Title");
    }
}
