//! Line-oriented cleanup of rendered Markdown.
//!
//! Each rule is a pure string → string pass and safe to re-run. Rules can
//! expose work for one another (dropping an empty list item can leave an
//! orphaned `**` at the document start), so the passes repeat until the
//! text stops changing.

mod emphasis_cleanup;
mod line_cleanup;
mod media_removal;
mod whitespace_normalization;

#[cfg(test)]
mod tests;

pub use emphasis_cleanup::remove_orphaned_emphasis;
pub use line_cleanup::{clean_lines, unescape_dashes};
pub use media_removal::remove_media;
pub use whitespace_normalization::{normalize_whitespace, trim_trailing};

use crate::config::ConversionOptions;

/// Upper bound on cleanup rounds; real documents settle in one or two
const MAX_CLEANUP_ROUNDS: usize = 8;

/// Run every cleanup rule until the Markdown is stable
#[must_use]
pub fn clean_markdown(markdown: &str) -> String {
    let mut current = markdown.to_string();
    for _ in 0..MAX_CLEANUP_ROUNDS {
        let next = cleanup_round(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn cleanup_round(markdown: &str) -> String {
    let result = clean_lines(markdown);
    let result = remove_orphaned_emphasis(&result);
    normalize_whitespace(&result)
}

/// Post-process rendered Markdown according to the conversion options
///
/// Media removal follows `strip_media`; the cleanup rules follow
/// `post_process`.
#[must_use]
pub fn post_process(markdown: &str, options: &ConversionOptions) -> String {
    let markdown = if options.strip_media {
        remove_media(markdown)
    } else {
        markdown.to_string()
    };

    if options.post_process {
        clean_markdown(&markdown)
    } else {
        markdown
    }
}
