//! Clipboard payload classification.
//!
//! Decides which representation of a clipboard payload feeds the normalizer
//! and synthesizes HTML when only text is available. Pure function of its
//! inputs; nothing here touches the clipboard itself.

pub mod mixed_text;
pub mod tsv;

use html_escape::encode_text;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::config::ConversionOptions;
use crate::error::{ConversionError, ConversionResult};

pub use mixed_text::{has_tab_block, mixed_text_to_html};
pub use tsv::{TsvStats, is_tsv_content, tsv_to_html_table};

/// Opening-tag syntax: `<p>`, `<table class="x">`, `<br/>`
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<([a-z][a-z0-9]*)(?:\s[^<>]*)?/?>")
        .expect("BUG: hardcoded HTML_TAG regex is invalid")
});

static SHEETS_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)data-sheets-|xmlns:x="urn:schemas-microsoft-com:office:excel"|google-sheets-html-origin"#)
        .expect("BUG: hardcoded SHEETS_MARKER regex is invalid")
});

static PROSE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:p|div|h[1-6]|article|section)[\s>]")
        .expect("BUG: hardcoded PROSE_BLOCK regex is invalid")
});

static TABLE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<table[\s>]").expect("BUG: hardcoded TABLE_OPEN regex is invalid")
});

/// The two representations a clipboard can offer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub html: Option<String>,
    pub text: Option<String>,
}

impl ClipboardPayload {
    #[must_use]
    pub fn new(html: Option<String>, text: Option<String>) -> Self {
        Self { html, text }
    }

    #[must_use]
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            text: None,
        }
    }

    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            html: None,
            text: Some(text.into()),
        }
    }

    /// True when neither representation carries non-whitespace content
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().is_none_or(|v| v.trim().is_empty());
        blank(&self.html) && blank(&self.text)
    }
}

/// Where the HTML handed to the normalizer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// The payload's HTML representation
    Html,
    /// Plain text that is itself HTML markup
    HtmlInText,
    /// A table synthesized from tab-separated text
    Tsv,
    /// Prose with embedded tab-separated blocks
    MixedText,
    /// Paragraph-per-line degradation of plain text
    PlainText,
}

/// Classifier output: exactly one HTML document and its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedContent {
    pub html: String,
    pub source: ContentSource,
}

/// Pick or synthesize the HTML document for a clipboard payload
///
/// # Errors
///
/// - `EmptyClipboard` when neither representation has content
/// - `PlainTextOnly` when text is present but is neither HTML nor tabular,
///   unless `plain_text_fallback` is enabled
pub fn classify_clipboard(
    payload: &ClipboardPayload,
    options: &ConversionOptions,
) -> ConversionResult<ClassifiedContent> {
    if let Some(html) = payload.html.as_deref()
        && !html.trim().is_empty()
    {
        return Ok(ClassifiedContent {
            html: html.to_string(),
            source: ContentSource::Html,
        });
    }

    let Some(text) = payload.text.as_deref().filter(|t| !t.trim().is_empty()) else {
        return Err(ConversionError::EmptyClipboard);
    };

    if looks_like_html(text) {
        debug!("Plain text contains HTML markup, treating it as HTML");
        return Ok(ClassifiedContent {
            html: text.to_string(),
            source: ContentSource::HtmlInText,
        });
    }

    if is_tsv_content(text, options.tsv_detection, &options.thresholds) {
        debug!("Plain text detected as tab-separated values");
        return Ok(ClassifiedContent {
            html: tsv_to_html_table(text),
            source: ContentSource::Tsv,
        });
    }

    if options.relaxed_mixed_text && has_tab_block(text) {
        debug!("Plain text contains tab-separated blocks, converting line by line");
        return Ok(ClassifiedContent {
            html: mixed_text_to_html(text),
            source: ContentSource::MixedText,
        });
    }

    if options.plain_text_fallback {
        warn!("No HTML found, degrading plain text to paragraphs");
        return Ok(ClassifiedContent {
            html: plain_text_to_html(text),
            source: ContentSource::PlainText,
        });
    }

    Err(ConversionError::plain_text_only(text))
}

/// Check whether text contains opening-tag syntax
#[must_use]
pub fn looks_like_html(text: &str) -> bool {
    HTML_TAG.is_match(text)
}

/// Detect spreadsheet-origin HTML
///
/// Google Sheets and Excel tag their exports; otherwise HTML that is a table
/// with no prose blocks around it is treated as a spreadsheet paste.
#[must_use]
pub fn is_spreadsheet_content(html: &str) -> bool {
    if SHEETS_MARKER.is_match(html) {
        return true;
    }
    TABLE_OPEN.is_match(html) && !PROSE_BLOCK.is_match(html)
}

/// One `<p>` per non-empty line
#[must_use]
pub fn plain_text_to_html(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<p>{}</p>\n", encode_text(line)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(payload: ClipboardPayload) -> ConversionResult<ClassifiedContent> {
        classify_clipboard(&payload, &ConversionOptions::default())
    }

    #[test]
    fn test_html_representation_wins() -> ConversionResult<()> {
        let payload = ClipboardPayload::new(
            Some("<p>rich</p>".into()),
            Some("Name\tAge\nAlice\t30".into()),
        );
        let classified = classify(payload)?;
        assert_eq!(classified.source, ContentSource::Html);
        assert_eq!(classified.html, "<p>rich</p>");
        Ok(())
    }

    #[test]
    fn test_blank_html_falls_through_to_text() -> ConversionResult<()> {
        let payload = ClipboardPayload::new(Some("  \n".into()), Some("<b>x</b>".into()));
        assert_eq!(classify(payload)?.source, ContentSource::HtmlInText);
        Ok(())
    }

    #[test]
    fn test_tsv_text() -> ConversionResult<()> {
        let classified = classify(ClipboardPayload::from_text("Name\tAge\nAlice\t30\nBob\t25"))?;
        assert_eq!(classified.source, ContentSource::Tsv);
        assert!(classified.html.contains("<th>Name</th>"));
        Ok(())
    }

    #[test]
    fn test_mixed_text() -> ConversionResult<()> {
        let text = "Intro paragraph that explains the table below in some detail.\n\
                    Another paragraph of prose.\n\
                    Closing words here.\n\
                    A\tB\n1\t2";
        let classified = classify(ClipboardPayload::from_text(text))?;
        assert_eq!(classified.source, ContentSource::MixedText);
        Ok(())
    }

    #[test]
    fn test_empty_and_plain_are_distinct() {
        assert_eq!(
            classify(ClipboardPayload::default()),
            Err(ConversionError::EmptyClipboard)
        );
        assert_eq!(
            classify(ClipboardPayload::from_text("   ")),
            Err(ConversionError::EmptyClipboard)
        );
        assert!(matches!(
            classify(ClipboardPayload::from_text("just some words")),
            Err(ConversionError::PlainTextOnly { .. })
        ));
    }

    #[test]
    fn test_plain_text_fallback() -> ConversionResult<()> {
        let options = ConversionOptions::default().with_plain_text_fallback(true);
        let classified =
            classify_clipboard(&ClipboardPayload::from_text("one\n\ntwo"), &options)?;
        assert_eq!(classified.source, ContentSource::PlainText);
        assert_eq!(classified.html, "<p>one</p>\n<p>two</p>\n");
        Ok(())
    }

    #[test]
    fn test_comparison_operators_are_not_html() {
        assert!(!looks_like_html("if a < b and c > d"));
        assert!(looks_like_html("<div class=\"x\">hi</div>"));
        assert!(looks_like_html("line<br/>break"));
    }

    #[test]
    fn test_spreadsheet_detection() {
        assert!(is_spreadsheet_content(
            r#"<google-sheets-html-origin><table data-sheets-root="1"><tr><td>a</td></tr></table>"#
        ));
        assert!(is_spreadsheet_content("<table><tr><td>a</td></tr></table>"));
        assert!(!is_spreadsheet_content(
            "<h1>Report</h1><table><tr><td>a</td></tr></table>"
        ));
        assert!(!is_spreadsheet_content("<p>no table</p>"));
    }
}
