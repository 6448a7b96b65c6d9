//! Whitespace normalization for rendered Markdown.
//!
//! Trailing whitespace is trimmed except for the two-space hard line break,
//! and long runs of blank lines are collapsed. Lines inside fenced code keep
//! their trailing whitespace.

use regex::Regex;
use std::sync::LazyLock;

use super::line_cleanup::is_fence;

static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n{4,}").expect("BLANK_RUN: hardcoded regex is valid")
});

/// Hard line break marker
const HARD_BREAK: &str = "  ";

/// Normalize one line's trailing whitespace
///
/// Whitespace-only lines become empty. A trailing run of two or more
/// whitespace characters becomes exactly the two-space hard break; a single
/// trailing space or tab is dropped.
#[must_use]
pub fn trim_trailing(line: &str) -> String {
    let content = line.trim_end();
    if content.is_empty() {
        return String::new();
    }
    let trailing = line[content.len()..].chars().count();
    if trailing >= 2 {
        format!("{content}{HARD_BREAK}")
    } else {
        content.to_string()
    }
}

/// Trim trailing whitespace per line, collapse blank runs, trim the document
#[must_use]
pub fn normalize_whitespace(markdown: &str) -> String {
    let mut in_fence = false;
    let lines: Vec<String> = markdown
        .split('\n')
        .map(|line| {
            if is_fence(line) {
                in_fence = !in_fence;
                return trim_trailing(line);
            }
            if in_fence {
                line.to_string()
            } else {
                trim_trailing(line)
            }
        })
        .collect();

    let joined = lines.join("\n");
    let collapsed = BLANK_RUN.replace_all(&joined, "\n\n\n");
    collapsed.trim_start_matches('\n').trim_end().to_string()
}
