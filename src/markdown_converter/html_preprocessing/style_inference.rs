//! Inline style → semantic emphasis.
//!
//! Word processors and web editors express bold and italic as
//! `<span style="font-weight:700">` runs. Those styles are about to be
//! stripped, so the emphasis is turned into `<strong>`/`<em>` first.

use anyhow::Result;
use kuchiki::NodeRef;
use regex::Regex;
use std::sync::LazyLock;

use super::dom;

static FONT_WEIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)font-weight\s*:\s*([a-z0-9]+)")
        .expect("BUG: hardcoded FONT_WEIGHT regex is invalid")
});

static FONT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)font-style\s*:\s*([a-z]+)").expect("BUG: hardcoded FONT_STYLE regex is invalid")
});

/// `c12`, `s15`: generated class names some editors reuse for bold runs
static NUMBERED_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]+-?(\d+)$").expect("BUG: hardcoded NUMBERED_CLASS regex is invalid")
});

/// Declared font weight of an inline style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Bold,
    Normal,
    Unspecified,
}

/// Read the `font-weight` declaration of a style attribute
///
/// `bold`, `bolder` and numeric weights of 500 and above count as bold.
#[must_use]
pub fn declared_weight(style: &str) -> Weight {
    let Some(value) = FONT_WEIGHT.captures(style).and_then(|c| c.get(1)) else {
        return Weight::Unspecified;
    };
    let value = value.as_str().to_ascii_lowercase();
    match value.as_str() {
        "bold" | "bolder" => Weight::Bold,
        "normal" | "lighter" => Weight::Normal,
        numeric => match numeric.parse::<u16>() {
            Ok(n) if n >= 500 => Weight::Bold,
            Ok(_) => Weight::Normal,
            Err(_) => Weight::Unspecified,
        },
    }
}

#[must_use]
pub fn declares_italic(style: &str) -> bool {
    FONT_STYLE
        .captures(style)
        .and_then(|c| c.get(1))
        .is_some_and(|v| matches!(v.as_str().to_ascii_lowercase().as_str(), "italic" | "oblique"))
}

/// Class-name bold signal: several classes, or a numbered class in 10..=19
#[must_use]
pub fn class_suggests_bold(class: &str) -> bool {
    let classes: Vec<&str> = class.split_whitespace().collect();
    if classes.len() >= 2 {
        return true;
    }
    classes.iter().any(|c| {
        NUMBERED_CLASS
            .captures(c)
            .and_then(|caps| caps.get(1))
            .and_then(|n| n.as_str().parse::<u32>().ok())
            .is_some_and(|n| (10..=19).contains(&n))
    })
}

/// Whether any element under `node` (or `node` itself) declares a bold weight
#[must_use]
pub fn has_bold_style(node: &NodeRef) -> bool {
    node.inclusive_descendants().any(|d| {
        dom::get_attr(&d, "style").is_some_and(|s| declared_weight(&s) == Weight::Bold)
    })
}

/// Rewrite styled runs and presentational tags as `<strong>`/`<em>`
///
/// # Errors
///
/// Returns an error if a CSS selector cannot be compiled or a replacement
/// element cannot be created.
pub fn infer_emphasis(root: &NodeRef, class_heuristics: bool) -> Result<()> {
    // Document order: an outer bold run becomes <strong> before its inner runs are seen
    for node in dom::select_all(root, "b, i, span")? {
        match dom::tag_name(&node).as_deref() {
            Some("b") => convert_bold_tag(&node)?,
            Some("i") => convert_italic_tag(&node)?,
            _ => convert_span(&node, class_heuristics)?,
        }
    }
    Ok(())
}

fn convert_bold_tag(b: &NodeRef) -> Result<()> {
    let style = dom::get_attr(b, "style").unwrap_or_default();
    if declared_weight(&style) == Weight::Normal || dom::has_ancestor(b, &["strong", "b"]) {
        dom::unwrap_node(b);
    } else {
        dom::rename_element(b, "strong")?;
    }
    Ok(())
}

fn convert_italic_tag(i: &NodeRef) -> Result<()> {
    if dom::has_ancestor(i, &["em", "i"]) {
        dom::unwrap_node(i);
    } else {
        dom::rename_element(i, "em")?;
    }
    Ok(())
}

fn convert_span(span: &NodeRef, class_heuristics: bool) -> Result<()> {
    let style = dom::get_attr(span, "style").unwrap_or_default();
    let class = dom::get_attr(span, "class").unwrap_or_default();

    let bold = match declared_weight(&style) {
        Weight::Bold => true,
        Weight::Normal => false,
        Weight::Unspecified => class_heuristics && class_suggests_bold(&class),
    };
    let italic = declares_italic(&style);

    if !bold && !italic {
        if class.trim().is_empty() {
            dom::unwrap_node(span);
        }
        return Ok(());
    }

    if dom::is_blank_or_breaks(span) {
        dom::unwrap_node(span);
        return Ok(());
    }

    let wants_strong = bold && !dom::has_ancestor(span, &["strong", "b"]);
    let wants_em = italic && !dom::has_ancestor(span, &["em", "i"]);

    match (wants_strong, wants_em) {
        (false, false) => dom::unwrap_node(span),
        (true, false) => {
            dom::rename_element(span, "strong")?;
        }
        (false, true) => {
            dom::rename_element(span, "em")?;
        }
        (true, true) => {
            let strong = dom::rename_element(span, "strong")?;
            let em = dom::new_element("em")?;
            let children: Vec<NodeRef> = strong.children().collect();
            for child in children {
                em.append(child);
            }
            strong.append(em);
        }
    }
    Ok(())
}
