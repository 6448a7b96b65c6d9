//! String-based normalization for large documents.
//!
//! Materializing a DOM for a multi-megabyte paste is expensive, so above the
//! size threshold the document is normalized as text:
//!
//! 1. Each top-level `<table>` block is cut out and swapped for a marker.
//!    Tables are small relative to the document, so each one is parsed on
//!    its own and run through the same tree steps as the tree path.
//! 2. The rest of the document goes through token and regex passes:
//!    emphasis inference, attribute stripping with link placeholders, and
//!    wrapper removal.
//! 3. The processed tables are spliced back in place of their markers.
//!
//! For documents small enough to take either path the rendered Markdown is
//! the same up to whitespace.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

use super::attribute_stripping::strip_attributes_str;
use super::style_inference::{Weight, class_suggests_bold, declared_weight, declares_italic};
use super::{dom, normalize_tree, table_preprocessing};
use crate::config::ConversionOptions;
use crate::error::ConversionResult;

/// Brackets table markers; private-use characters never occur in clipboard HTML
const MARKER_OPEN: char = '\u{E000}';
const MARKER_CLOSE: char = '\u{E001}';

// ============================================================================
// Regex Patterns
// ============================================================================

static TABLE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(/?)table\b[^>]*>").expect("TABLE_TAG: hardcoded regex is valid")
});

static TABLE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("\u{E000}(\\d+)\u{E001}").expect("TABLE_MARKER: hardcoded regex is valid")
});

static EMPHASIS_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(/?)(span|b|i|strong|em)\b([^>]*)>")
        .expect("EMPHASIS_TAG: hardcoded regex is valid")
});

static STYLE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bstyle\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("STYLE_ATTR: hardcoded regex is valid")
});

static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("CLASS_ATTR: hardcoded regex is valid")
});

/// Emphasis holding only whitespace and line breaks
static BLANK_EMPHASIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:strong|em)>((?:\s|<br\s*/?>)*)</(?:strong|em)>")
        .expect("BLANK_EMPHASIS: hardcoded regex is valid")
});

static INLINE_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:span|font)\b[^>]*>").expect("INLINE_WRAPPER: hardcoded regex is valid")
});

/// A div holding only text and inline tags (and no table marker)
static INLINE_DIV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "(?i)<(?:div|center)\\b[^>]*>([^<\u{E000}]*(?:</?(?:a|strong|em|b|i|u|s|del|strike|code|sub|sup|mark|small|kbd|br|img)\\b[^>]*>[^<\u{E000}]*)*)</(?:div|center)>",
    )
    .expect("INLINE_DIV: hardcoded regex is valid")
});

static BLOCK_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:div|center)\b[^>]*>").expect("BLOCK_WRAPPER: hardcoded regex is valid")
});

static BREAK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>").expect("BREAK_TAG: hardcoded regex is valid")
});

// ============================================================================
// Entry Point
// ============================================================================

/// Normalize pre-cleaned HTML without building a tree for the whole document
///
/// # Errors
///
/// Returns `NormalizationFailure` if a table block cannot be parsed or
/// serialized.
pub fn normalize(html: &str, spreadsheet: bool, options: &ConversionOptions) -> ConversionResult<String> {
    let (rest, tables) = cut_tables(html);
    debug!("Lightweight normalization: {} bytes, {} table blocks", html.len(), tables.len());

    let processed: Vec<String> = tables
        .iter()
        .map(|table| normalize_table_block(table, spreadsheet, options))
        .collect::<ConversionResult<_>>()?;

    let rest = convert_emphasis(&rest, options.class_bold_heuristics);
    let rest = strip_attributes_str(&rest);
    let rest = remove_wrappers_str(&rest, options.thresholds.max_unwrap_depth);

    Ok(splice_tables(&rest, &processed))
}

fn normalize_table_block(
    table: &str,
    spreadsheet: bool,
    options: &ConversionOptions,
) -> ConversionResult<String> {
    let body = dom::parse_body(table)?;
    normalize_tree(&body, spreadsheet, options)?;
    table_preprocessing::process_tables(&body, options)?;
    Ok(dom::serialize_children(&body)?)
}

// ============================================================================
// Table Blocks
// ============================================================================

/// Replace every balanced top-level `<table>…</table>` with a numbered marker
///
/// An unclosed table is left in the text.
fn cut_tables(html: &str) -> (String, Vec<String>) {
    let mut rest = String::with_capacity(html.len());
    let mut tables = Vec::new();
    let mut copied_to = 0;
    let mut depth = 0usize;
    let mut start = 0;

    for tag in TABLE_TAG.captures_iter(html) {
        let Some(whole) = tag.get(0) else {
            continue;
        };
        let closing = tag.get(1).is_some_and(|m| !m.as_str().is_empty());
        if !closing {
            if depth == 0 {
                start = whole.start();
            }
            depth += 1;
        } else if depth > 0 {
            depth -= 1;
            if depth == 0 {
                rest.push_str(&html[copied_to..start]);
                rest.push(MARKER_OPEN);
                rest.push_str(&tables.len().to_string());
                rest.push(MARKER_CLOSE);
                tables.push(html[start..whole.end()].to_string());
                copied_to = whole.end();
            }
        }
    }

    rest.push_str(&html[copied_to..]);
    (rest, tables)
}

fn splice_tables(html: &str, tables: &[String]) -> String {
    TABLE_MARKER
        .replace_all(html, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| tables.get(i))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

// ============================================================================
// Emphasis
// ============================================================================

fn attr_value(re: &Regex, attrs: &str) -> String {
    re.captures(attrs)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// One open `<span>`/`<b>`/`<i>` and what its closing tag becomes
struct OpenRun {
    tag: String,
    closer: &'static str,
    strong: bool,
    em: bool,
}

/// Rewrite styled spans and `<b>`/`<i>` as `<strong>`/`<em>` in one token pass
///
/// Matches the tree path: a bold run nested in another bold run adds no
/// second `<strong>`, and unstyled spans disappear.
#[must_use]
pub fn convert_emphasis(html: &str, class_heuristics: bool) -> String {
    let mut out = String::with_capacity(html.len());
    let mut open: Vec<OpenRun> = Vec::new();
    let mut strong_depth = 0usize;
    let mut em_depth = 0usize;
    let mut copied_to = 0;

    for caps in EMPHASIS_TAG.captures_iter(html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&html[copied_to..whole.start()]);
        copied_to = whole.end();

        let closing = !caps[1].is_empty();
        let tag = caps[2].to_ascii_lowercase();
        let attrs = &caps[3];

        match (closing, tag.as_str()) {
            (false, "strong") => {
                strong_depth += 1;
                out.push_str(whole.as_str());
            }
            (true, "strong") => {
                strong_depth = strong_depth.saturating_sub(1);
                out.push_str(whole.as_str());
            }
            (false, "em") => {
                em_depth += 1;
                out.push_str(whole.as_str());
            }
            (true, "em") => {
                em_depth = em_depth.saturating_sub(1);
                out.push_str(whole.as_str());
            }
            (false, _) => {
                let style = attr_value(&STYLE_ATTR, attrs);
                let (strong, em) = match tag.as_str() {
                    "b" => (declared_weight(&style) != Weight::Normal && strong_depth == 0, false),
                    "i" => (false, em_depth == 0),
                    _ => {
                        let bold = match declared_weight(&style) {
                            Weight::Bold => true,
                            Weight::Normal => false,
                            Weight::Unspecified => {
                                class_heuristics && class_suggests_bold(&attr_value(&CLASS_ATTR, attrs))
                            }
                        };
                        (
                            bold && strong_depth == 0,
                            declares_italic(&style) && em_depth == 0,
                        )
                    }
                };
                let closer = match (strong, em) {
                    (true, true) => {
                        out.push_str("<strong><em>");
                        "</em></strong>"
                    }
                    (true, false) => {
                        out.push_str("<strong>");
                        "</strong>"
                    }
                    (false, true) => {
                        out.push_str("<em>");
                        "</em>"
                    }
                    (false, false) => "",
                };
                strong_depth += usize::from(strong);
                em_depth += usize::from(em);
                open.push(OpenRun { tag, closer, strong, em });
            }
            (true, _) => {
                // Close the innermost run of the same tag
                if let Some(pos) = open.iter().rposition(|run| run.tag == tag) {
                    let run = open.remove(pos);
                    out.push_str(run.closer);
                    strong_depth = strong_depth.saturating_sub(usize::from(run.strong));
                    em_depth = em_depth.saturating_sub(usize::from(run.em));
                }
            }
        }
    }
    out.push_str(&html[copied_to..]);

    drop_blank_emphasis(out)
}

fn drop_blank_emphasis(mut html: String) -> String {
    // Each round peels one level of nested blank emphasis
    while BLANK_EMPHASIS.is_match(&html) {
        html = BLANK_EMPHASIS.replace_all(&html, "$1").into_owned();
    }
    html
}

// ============================================================================
// Wrappers
// ============================================================================

/// Remove span/font/div/center wrappers from an HTML string
///
/// Innermost divs holding only inline content become paragraphs, one
/// nesting level per round; remaining divs wrap blocks and are dropped.
#[must_use]
pub fn remove_wrappers_str(html: &str, max_rounds: usize) -> String {
    let mut html = INLINE_WRAPPER.replace_all(html, "").into_owned();

    for _ in 0..max_rounds {
        if !INLINE_DIV.is_match(&html) {
            break;
        }
        html = INLINE_DIV
            .replace_all(&html, |caps: &Captures| {
                let content = &caps[1];
                if BREAK_TAG.replace_all(content, "").trim().is_empty() {
                    content.to_string()
                } else {
                    format!("<p>{content}</p>")
                }
            })
            .into_owned();
    }

    BLOCK_WRAPPER.replace_all(&html, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_and_splice_nested_tables() {
        let html = "<p>a</p><table><tr><td><table><tr><td>x</td></tr></table></td></tr></table><p>b</p>";
        let (rest, tables) = cut_tables(html);
        assert_eq!(tables.len(), 1);
        assert_eq!(rest, "<p>a</p>\u{E000}0\u{E001}<p>b</p>");
        assert_eq!(splice_tables(&rest, &tables), html);
    }

    #[test]
    fn test_unclosed_table_left_in_text() {
        let (rest, tables) = cut_tables("<table><tr><td>x");
        assert!(tables.is_empty());
        assert_eq!(rest, "<table><tr><td>x");
    }

    #[test]
    fn test_styled_spans_become_emphasis() {
        assert_eq!(
            convert_emphasis(
                r#"<span style="font-weight:700">bold <span style="font-weight:bold">inner</span></span> <span style="font-style:italic">it</span> <span class="x">plain</span>"#,
                false
            ),
            "<strong>bold inner</strong> <em>it</em> plain"
        );
    }

    #[test]
    fn test_presentational_tags_become_emphasis() {
        assert_eq!(
            convert_emphasis(r#"<b>x</b> <i>y</i> <b style="font-weight:normal">z</b>"#, false),
            "<strong>x</strong> <em>y</em> z"
        );
    }

    #[test]
    fn test_blank_emphasis_dropped() {
        assert_eq!(
            convert_emphasis(r#"a<span style="font-weight:700;font-style:italic"> <br></span>b"#, false),
            "a <br>b"
        );
    }

    #[test]
    fn test_class_heuristics_opt_in() {
        let html = r#"<span class="c1 c2">x</span>"#;
        assert_eq!(convert_emphasis(html, false), "x");
        assert_eq!(convert_emphasis(html, true), "<strong>x</strong>");
    }

    #[test]
    fn test_wrapper_removal_matches_tree_shape() {
        assert_eq!(
            remove_wrappers_str("<div><div>first</div><div>second <strong>x</strong></div></div>", 512),
            "<p>first</p><p>second <strong>x</strong></p>"
        );
        assert_eq!(
            remove_wrappers_str("<div>a<div>b</div></div><font>c</font>", 512),
            "a<p>b</p>c"
        );
    }

    #[test]
    fn test_div_around_table_marker_is_dropped() {
        let html = format!("<div>{MARKER_OPEN}0{MARKER_CLOSE}</div>");
        assert_eq!(remove_wrappers_str(&html, 512), format!("{MARKER_OPEN}0{MARKER_CLOSE}"));
    }

    #[test]
    fn test_full_pass_keeps_links() -> anyhow::Result<()> {
        let html = r#"<div class="w"><span style="font-weight:700"><a class="l" href="https://e.com">e</a></span></div>"#;
        let out = normalize(html, false, &ConversionOptions::default())?;
        assert_eq!(out, r#"<p><strong><a href="https://e.com">e</a></strong></p>"#);
        Ok(())
    }

    #[test]
    fn test_tables_processed_with_tree_steps() -> anyhow::Result<()> {
        let html = "<p>intro</p><table><tr><td><h1>Title</h1></td></tr></table>";
        let out = normalize(html, false, &ConversionOptions::default())?;
        assert_eq!(out, "<p>intro</p><h1>Title</h1>");
        Ok(())
    }

    #[test]
    fn test_bold_tag_inside_bold_not_doubled() {
        assert_eq!(
            convert_emphasis("<strong>a <b>b</b> c</strong>", false),
            "<strong>a b c</strong>"
        );
        assert_eq!(
            convert_emphasis(r#"<span style="font-weight:700">a <b>b</b></span> <em>x <i>y</i></em>"#, false),
            "<strong>a b</strong> <em>x y</em>"
        );
    }
}
