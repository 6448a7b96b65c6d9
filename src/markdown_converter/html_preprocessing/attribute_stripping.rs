//! Attribute stripping with link and image preservation.
//!
//! Style, class, id and `data-*` attributes carry nothing the Markdown
//! renderer can use. Link targets and image sources must survive.
//!
//! The tree path simply skips the attributes it keeps. The string path
//! cannot tell a kept attribute from a stripped one inside a blanket
//! `<tag attrs>` → `<tag>` rewrite, so it swaps each link and image for an
//! opaque marker first and restores them afterwards ([`LinkPlaceholders`]).

use kuchiki::NodeRef;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Attributes kept per tag; everything else is dropped
const KEPT_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href"]),
    ("img", &["src", "alt"]),
];

fn kept_for(tag: &str) -> &'static [&'static str] {
    for (name, attrs) in KEPT_ATTRIBUTES {
        if *name == tag {
            return *attrs;
        }
    }
    &[]
}

/// Strip every attribute except link targets and image sources
pub fn strip_attributes(root: &NodeRef) {
    for node in root.inclusive_descendants() {
        let Some(element) = node.as_element() else {
            continue;
        };
        let kept = kept_for(&element.name.local.to_ascii_lowercase());
        element
            .attributes
            .borrow_mut()
            .map
            .retain(|name, _| {
                let local: &str = &name.local;
                kept.iter().any(|k| local.eq_ignore_ascii_case(k))
            });
    }
}

// ============================================================================
// String path
// ============================================================================

static LINK_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\s[^>]*?\bhref\s*=\s*("[^"]*"|'[^']*'|[^\s"'>]+)[^>]*>"#)
        .expect("LINK_OPEN: hardcoded regex is valid")
});

static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<img\b[^>]*>").expect("IMG_TAG: hardcoded regex is valid")
});

static IMG_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(src|alt)\s*=\s*("[^"]*"|'[^']*'|[^\s"'>]+)"#)
        .expect("IMG_ATTR: hardcoded regex is valid")
});

static ANY_ATTRS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([A-Za-z][A-Za-z0-9]*)\s[^>]*?(/?)>").expect("ANY_ATTRS: hardcoded regex is valid")
});

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<a>___LINK_(\d+)___|___IMG_(\d+)___").expect("MARKER: hardcoded regex is valid")
});

/// Marker → preserved markup, alive for one attribute-stripping pass
#[derive(Debug, Default)]
pub struct LinkPlaceholders {
    hrefs: Vec<String>,
    images: Vec<String>,
}

impl LinkPlaceholders {
    /// Replace link openings and image tags with opaque markers
    #[must_use]
    pub fn protect(html: &str) -> (String, Self) {
        let mut placeholders = Self::default();

        let html = LINK_OPEN.replace_all(html, |caps: &Captures| {
            let marker = format!("<a>___LINK_{}___", placeholders.hrefs.len());
            placeholders.hrefs.push(quoted(&caps[1]));
            marker
        });

        let html = IMG_TAG.replace_all(&html, |caps: &Captures| {
            let attrs: Vec<String> = IMG_ATTR
                .captures_iter(&caps[0])
                .map(|a| format!("{}={}", a[1].to_ascii_lowercase(), quoted(&a[2])))
                .collect();
            let marker = format!("___IMG_{}___", placeholders.images.len());
            placeholders.images.push(if attrs.is_empty() {
                "<img>".to_string()
            } else {
                format!("<img {}>", attrs.join(" "))
            });
            marker
        });

        (html.into_owned(), placeholders)
    }

    /// Put the preserved markup back in place of each marker
    #[must_use]
    pub fn restore(&self, html: &str) -> String {
        MARKER
            .replace_all(html, |caps: &Captures| {
                if let Some(index) = caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok())
                    && let Some(href) = self.hrefs.get(index)
                {
                    return format!("<a href={href}>");
                }
                if let Some(index) = caps.get(2).and_then(|m| m.as_str().parse::<usize>().ok())
                    && let Some(img) = self.images.get(index)
                {
                    return img.clone();
                }
                caps[0].to_string()
            })
            .into_owned()
    }
}

/// Attribute value as written, or double-quoted if it was bare
fn quoted(value: &str) -> String {
    if value.starts_with('"') || value.starts_with('\'') {
        value.to_string()
    } else {
        format!("\"{value}\"")
    }
}

/// Strip all attributes from an HTML string, preserving links and images
#[must_use]
pub fn strip_attributes_str(html: &str) -> String {
    let (protected, placeholders) = LinkPlaceholders::protect(html);
    let stripped = ANY_ATTRS.replace_all(&protected, "<$1$2>");
    placeholders.restore(&stripped)
}
