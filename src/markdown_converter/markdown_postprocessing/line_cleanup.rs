//! Per-line cleanup of rendered Markdown outside code fences.
//!
//! - `\-` escapes become plain dashes (outside inline code spans)
//! - ordered-list items with no content are dropped; a bare `3.` only
//!   counts as one inside a block that holds a real ordered item
//! - `●` bullets become Markdown list items

use regex::Regex;
use std::sync::LazyLock;

static EMPTY_ORDERED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+\.\s+$").expect("EMPTY_ORDERED_ITEM: hardcoded regex is valid")
});

static BARE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+\.$").expect("BARE_NUMBER: hardcoded regex is valid")
});

static ORDERED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+\.\s+\S").expect("ORDERED_ITEM: hardcoded regex is valid")
});

static BULLET_GLYPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)●\s*").expect("BULLET_GLYPH: hardcoded regex is valid")
});

/// Whether a line opens or closes a fenced code block
pub(super) fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Apply the line rules to every line outside fenced code
#[must_use]
pub fn clean_lines(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let in_list = ordered_list_blocks(&lines);
    let mut out: Vec<String> = Vec::new();
    let mut in_fence = false;

    for (index, &line) in lines.iter().enumerate() {
        if is_fence(line) {
            in_fence = !in_fence;
            out.push(line.to_string());
            continue;
        }
        if in_fence {
            out.push(line.to_string());
            continue;
        }
        if EMPTY_ORDERED_ITEM.is_match(line) || (in_list[index] && BARE_NUMBER.is_match(line)) {
            continue;
        }
        let line = unescape_dashes(line);
        out.push(BULLET_GLYPH.replace(&line, "${1}- ").into_owned());
    }

    out.join("\n")
}

/// Mark the lines of every block (run of non-blank lines between blank or
/// fence lines) that holds an ordered-list item with content
fn ordered_list_blocks(lines: &[&str]) -> Vec<bool> {
    let mut marks = vec![false; lines.len()];
    let mut start = 0;
    for end in 0..=lines.len() {
        let boundary = lines
            .get(end)
            .is_none_or(|line| line.trim().is_empty() || is_fence(line));
        if boundary {
            let has_item = lines[start..end].iter().any(|line| ORDERED_ITEM.is_match(line));
            marks[start..end].fill(has_item);
            start = end + 1;
        }
    }
    marks
}

/// Turn `\-` into `-` outside backtick code spans
///
/// An escaped backslash (`\\`) is copied as a pair so the dash after it
/// keeps its escape.
#[must_use]
pub fn unescape_dashes(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_code = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '`' => {
                in_code = !in_code;
                out.push(c);
            }
            '\\' if !in_code => match chars.peek() {
                Some('-') => {
                    out.push('-');
                    chars.next();
                }
                Some('\\') => {
                    out.push_str("\\\\");
                    chars.next();
                }
                _ => out.push(c),
            },
            _ => out.push(c),
        }
    }
    out
}
