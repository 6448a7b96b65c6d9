//! Image removal for plain Markdown output.
//!
//! Media tags are stripped from the HTML before rendering; this pass catches
//! image syntax that reached the Markdown anyway (inline and reference
//! images, bare image URLs on a line of their own).

use regex::Regex;
use std::sync::LazyLock;

static INLINE_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    // Bounded quantifiers prevent catastrophic backtracking
    Regex::new(r"!\[[^\]]{0,200}\]\([^)]{1,2000}\)").expect("INLINE_IMAGE: hardcoded regex is valid")
});

static REFERENCE_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[[^\]]{0,200}\]\[[^\]]{0,200}\]")
        .expect("REFERENCE_IMAGE: hardcoded regex is valid")
});

static BARE_IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*https?://\S+\.(?:png|jpe?g|gif|webp|svg|bmp)(?:\?\S*)?[ \t]*$")
        .expect("BARE_IMAGE_URL: hardcoded regex is valid")
});

static EXTRA_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n{3,}").expect("EXTRA_BLANK_LINES: hardcoded regex is valid")
});

/// Remove image syntax and bare image URLs
///
/// Blank lines left behind are collapsed only when something was removed.
#[must_use]
pub fn remove_media(markdown: &str) -> String {
    let mut text = markdown.to_string();
    let mut changed = false;
    for pattern in [&*INLINE_IMAGE, &*REFERENCE_IMAGE, &*BARE_IMAGE_URL] {
        if pattern.is_match(&text) {
            text = pattern.replace_all(&text, "").into_owned();
            changed = true;
        }
    }

    if changed {
        EXTRA_BLANK_LINES.replace_all(&text, "\n\n").into_owned()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images_removed() {
        assert_eq!(
            remove_media("Intro ![logo](https://e.com/a.png) text\n\n![x][ref]\n\nhttps://e.com/pic.jpg?w=2\n\n\n\nend"),
            "Intro  text\n\nend"
        );
    }

    #[test]
    fn test_links_kept() {
        let md = "[site](https://e.com/page.png.html) and https://e.com/a.png inline";
        assert_eq!(remove_media(md), md);
    }

    #[test]
    fn test_untouched_text_keeps_blank_lines() {
        assert_eq!(remove_media("a\n\n\n\nb"), "a\n\n\n\nb");
    }
}
