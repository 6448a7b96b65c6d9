//! Markdown → styled rich text.
//!
//! The reverse direction: Markdown is rendered to HTML with GitHub-flavored
//! extensions and wrapped in a small standalone document whose inline
//! stylesheet keeps the formatting intact when pasted into editors.

use pulldown_cmark::{Event, Options, Parser, html};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static MARKDOWN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?m)^#{1,6}\s+",        // heading
        r"\*\*[^*]+\*\*",         // bold
        r"\*[^*\s][^*]*\*",       // italic
        r"\b_[^_]+_\b",           // italic
        r"\[[^\]]+\]\([^)]+\)",   // link
        r"(?m)^[-*+]\s+",         // bullet list
        r"(?m)^\d+\.\s+",         // ordered list
        r"(?m)^>\s+",             // quote
        r"`[^`]+`",               // inline code
        r"(?m)^```",              // code fence
        r"(?m)^\|.+\|\s*$",       // table row
        r"(?m)^[-*_]{3,}\s*$",    // rule
    ]
    .iter()
    .map(|p| Regex::new(p).expect("BUG: hardcoded Markdown pattern is invalid"))
    .collect()
});

const STYLESHEET: &str = "\
body { font-family: -apple-system, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; line-height: 1.5; }
h1, h2, h3, h4, h5, h6 { font-weight: 600; margin: 1em 0 0.5em; }
p, ul, ol, blockquote { margin: 0.5em 0; }
ul, ol { padding-left: 2em; }
code { font-family: Menlo, Consolas, 'Courier New', monospace; background: #f4f4f4; padding: 0.1em 0.3em; border-radius: 3px; }
pre { background: #f4f4f4; padding: 0.8em; border-radius: 4px; }
pre code { background: none; padding: 0; }
blockquote { border-left: 4px solid #ddd; padding-left: 1em; color: #555; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 0.3em 0.8em; text-align: left; }
th { background: #f4f4f4; font-weight: 600; }
hr { border: none; border-top: 1px solid #ddd; }";

/// Check whether text shows any common Markdown syntax
///
/// Informational only: plain text still converts, it just renders as
/// paragraphs.
#[must_use]
pub fn looks_like_markdown(text: &str) -> bool {
    MARKDOWN_PATTERNS.iter().any(|re| re.is_match(text))
}

/// Render Markdown to an HTML fragment
///
/// Tables, strikethrough and task lists are enabled, and single newlines
/// become `<br>` so pasted line structure survives.
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// Render Markdown to a standalone, inline-styled HTML document
#[must_use]
pub fn markdown_to_rich_text(markdown: &str) -> String {
    if !looks_like_markdown(markdown) {
        debug!("Input shows no Markdown syntax, rendering as plain paragraphs");
    }
    let body = markdown_to_html(markdown);
    format!("<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{STYLESHEET}\n</style>\n</head>\n<body>\n{body}</body>\n</html>")
}
