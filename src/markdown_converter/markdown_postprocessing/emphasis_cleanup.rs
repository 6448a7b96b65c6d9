//! Orphaned emphasis markers.
//!
//! Bold runs that spanned block boundaries in the source leave `**` on a
//! line of its own, or a lone opener/closer at the very start or end of the
//! document.

use regex::Regex;
use std::sync::LazyLock;

use super::line_cleanup::is_fence;

static MARKER_ONLY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\*\*|__)\s*$").expect("MARKER_ONLY_LINE: hardcoded regex is valid")
});

/// Drop marker-only lines and unbalanced markers at the document edges
#[must_use]
pub fn remove_orphaned_emphasis(markdown: &str) -> String {
    let mut in_fence = false;
    let mut lines: Vec<String> = Vec::new();
    for line in markdown.split('\n') {
        if is_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence && MARKER_ONLY_LINE.is_match(line) {
            continue;
        }
        lines.push(line.to_string());
    }

    if let Some(first) = lines.iter_mut().find(|l| !l.trim().is_empty()) {
        *first = strip_leading_orphan(first);
    }
    if let Some(last) = lines.iter_mut().rev().find(|l| !l.trim().is_empty()) {
        *last = strip_trailing_orphan(last);
    }

    lines.join("\n")
}

fn has_odd_markers(line: &str) -> bool {
    line.matches("**").count() % 2 == 1
}

fn strip_leading_orphan(line: &str) -> String {
    let mut line = line.to_string();
    while line.trim_start().starts_with("**") && has_odd_markers(&line) {
        let indent = line.len() - line.trim_start().len();
        line.replace_range(indent..indent + 2, "");
    }
    line
}

fn strip_trailing_orphan(line: &str) -> String {
    let mut line = line.to_string();
    while line.trim_end().ends_with("**") && has_odd_markers(&line) {
        let end = line.trim_end().len();
        line.replace_range(end - 2..end, "");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_only_lines_dropped() {
        assert_eq!(
            remove_orphaned_emphasis("Intro\n**\ntext\n  __  \nend"),
            "Intro\ntext\nend"
        );
    }

    #[test]
    fn test_edge_orphans_removed() {
        assert_eq!(remove_orphaned_emphasis("**Title\n\nbody**"), "Title\n\nbody");
    }

    #[test]
    fn test_balanced_edges_kept() {
        let md = "**Bold** start\n\nend **bold**";
        assert_eq!(remove_orphaned_emphasis(md), md);
    }

    #[test]
    fn test_thematic_breaks_kept() {
        let md = "above\n\n****\n\nbelow\n\n____";
        assert_eq!(remove_orphaned_emphasis(md), md);
    }

    #[test]
    fn test_marker_lines_in_code_kept() {
        let md = "```\n**\n```";
        assert_eq!(remove_orphaned_emphasis(md), md);
    }
}
