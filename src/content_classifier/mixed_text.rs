//! Relaxed conversion of prose mixed with tab-separated blocks.
//!
//! Document exports often put a real table between paragraphs of prose.
//! Whole-payload TSV detection rejects those, so this scanner walks the text
//! line by line, opens a table for each run of tab-bearing lines and turns
//! heading-like lines into semantic tags.

use html_escape::encode_text;
use regex::Regex;
use std::sync::LazyLock;

use super::tsv::{split_lines, tsv_to_html_table};

/// `1 Introduction`, `2.3 Results`, `4. Summary`
static NUMBERED_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}(?:\.\d{1,2})*)\.?\s+(\S.{0,78})$")
        .expect("BUG: hardcoded NUMBERED_HEADING regex is invalid")
});

static BULLET_GLYPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[●•◦▪▸‣]\s*(\S.*)$").expect("BUG: hardcoded BULLET_GLYPH regex is invalid")
});

/// Longest line still treated as a heading
const MAX_HEADING_CHARS: usize = 80;

/// Semantic role of one non-tabular line
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineRole<'a> {
    Blank,
    Heading { level: u8, text: &'a str },
    Bullet(&'a str),
    Paragraph(&'a str),
}

fn classify_line(line: &str) -> LineRole<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineRole::Blank;
    }

    if let Some(caps) = BULLET_GLYPH.captures(trimmed)
        && let Some(text) = caps.get(1)
    {
        return LineRole::Bullet(text.as_str());
    }

    if let Some(caps) = NUMBERED_HEADING.captures(trimmed)
        && let (Some(number), Some(_)) = (caps.get(1), caps.get(2))
        && !trimmed.ends_with(['.', ',', ';'])
    {
        let depth = number.as_str().matches('.').count() as u8;
        return LineRole::Heading {
            level: (2 + depth).min(6),
            text: trimmed,
        };
    }

    if trimmed.ends_with(':') && trimmed.chars().count() <= MAX_HEADING_CHARS / 2 {
        return LineRole::Heading {
            level: 3,
            text: trimmed.trim_end_matches(':'),
        };
    }

    LineRole::Paragraph(trimmed)
}

/// Check whether any two consecutive lines both contain a tab
#[must_use]
pub fn has_tab_block(text: &str) -> bool {
    split_lines(text)
        .windows(2)
        .any(|pair| pair[0].contains('\t') && pair[1].contains('\t'))
}

/// Convert mixed prose and tab-separated blocks into HTML
///
/// Runs of two or more consecutive tab-bearing lines become tables. A lone
/// tab-bearing line is treated as prose with its tabs replaced by spaces.
#[must_use]
pub fn mixed_text_to_html(text: &str) -> String {
    let lines = split_lines(text);
    let mut html = String::new();
    let mut in_list = false;
    let mut i = 0;

    while i < lines.len() {
        if lines[i].contains('\t') {
            let start = i;
            while i < lines.len() && lines[i].contains('\t') {
                i += 1;
            }

            close_list(&mut html, &mut in_list);
            if i - start >= 2 {
                html.push_str(&tsv_to_html_table(&lines[start..i].join("\n")));
                html.push('\n');
            } else {
                let flattened = lines[start].replace('\t', " ");
                push_paragraph(&mut html, flattened.trim());
            }
            continue;
        }

        match classify_line(lines[i]) {
            LineRole::Blank => close_list(&mut html, &mut in_list),
            LineRole::Bullet(item) => {
                if !in_list {
                    html.push_str("<ul>\n");
                    in_list = true;
                }
                html.push_str("<li>");
                html.push_str(&encode_text(item));
                html.push_str("</li>\n");
            }
            LineRole::Heading { level, text } => {
                close_list(&mut html, &mut in_list);
                html.push_str(&format!("<h{level}>{}</h{level}>\n", encode_text(text)));
            }
            LineRole::Paragraph(body) => {
                close_list(&mut html, &mut in_list);
                push_paragraph(&mut html, body);
            }
        }
        i += 1;
    }

    close_list(&mut html, &mut in_list);
    html
}

fn push_paragraph(html: &mut String, body: &str) {
    if body.is_empty() {
        return;
    }
    html.push_str("<p>");
    html.push_str(&encode_text(body));
    html.push_str("</p>\n");
}

fn close_list(html: &mut String, in_list: &mut bool) {
    if *in_list {
        html.push_str("</ul>\n");
        *in_list = false;
    }
}
