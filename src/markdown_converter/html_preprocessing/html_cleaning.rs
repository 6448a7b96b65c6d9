//! Source cleanup run before any structural normalization.
//!
//! Removes markup that never carries content in clipboard HTML:
//! - `<meta>`, comments, `<script>`/`<style>` blocks
//! - `<colgroup>`/`<col>` column scaffolding
//! - empty icon-font elements (Font Awesome, `icon` classes)
//! - the Google Docs `docs-internal-guid` bold wrapper
//! - media elements when plain Markdown is requested
//!
//! Both normalization paths share this step so they start from the same text.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

// ============================================================================
// Regex Patterns
// ============================================================================

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("COMMENT_RE: hardcoded regex is valid"));

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("SCRIPT_RE: hardcoded regex is valid")
});

static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("STYLE_RE: hardcoded regex is valid")
});

static META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:meta|link)\b[^>]*>").expect("META_RE: hardcoded regex is valid")
});

static COLGROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<colgroup[^>]*>.*?</colgroup>|<col\b[^>]*>")
        .expect("COLGROUP_RE: hardcoded regex is valid")
});

/// Empty `<i>`/`<span>` carrying an icon-font class
static ICON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<i\b[^>]*class="[^"]*\b(?:fa|fas|far|fab|fa-[\w-]+|icon[\w-]*|material-icons)\b[^"]*"[^>]*>\s*</i>|<span\b[^>]*class="[^"]*\bicon[\w-]*\b[^"]*"[^>]*>\s*</span>"#,
    )
    .expect("ICON_RE: hardcoded regex is valid")
});

static DOCS_GUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<b\b[^>]*docs-internal-guid[^>]*>")
        .expect("DOCS_GUID_RE: hardcoded regex is valid")
});

static MEDIA_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(video|audio|iframe|picture|object)\b[^>]*>.*?</(?:video|audio|iframe|picture|object)>")
        .expect("MEDIA_BLOCK_RE: hardcoded regex is valid")
});

static MEDIA_VOID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:img|source|embed|track)\b[^>]*>|</?(?:video|audio|iframe|picture|object)\b[^>]*>")
        .expect("MEDIA_VOID_RE: hardcoded regex is valid")
});

/// Remove non-content markup shared by every clipboard source
#[must_use]
pub fn pre_clean(html: &str, strip_media: bool) -> String {
    let result = Cow::Borrowed(html);
    let result = COMMENT_RE.replace_all(&result, "");
    let result = SCRIPT_RE.replace_all(&result, "");
    let result = STYLE_RE.replace_all(&result, "");
    let result = META_RE.replace_all(&result, "");
    let result = COLGROUP_RE.replace_all(&result, "");
    let result = ICON_RE.replace_all(&result, "");

    let mut result = remove_docs_guid_wrapper(&result);

    if strip_media {
        result = strip_media_elements(&result);
    }

    result
}

/// Drop the bold wrapper Google Docs puts around a whole copied selection
///
/// The wrapper is `<b style="font-weight:normal" id="docs-internal-guid-...">`
/// and is not bold at all; its closing tag is the last `</b>` in the payload.
fn remove_docs_guid_wrapper(html: &str) -> String {
    let Some(open) = DOCS_GUID_RE.find(html) else {
        return html.to_string();
    };

    let mut result = String::with_capacity(html.len());
    result.push_str(&html[..open.start()]);
    let rest = &html[open.end()..];

    match rest.to_ascii_lowercase().rfind("</b>") {
        Some(close) => {
            result.push_str(&rest[..close]);
            result.push_str(&rest[close + "</b>".len()..]);
        }
        None => result.push_str(rest),
    }
    result
}

/// Remove images, video, audio and embedded frames
#[must_use]
pub fn strip_media_elements(html: &str) -> String {
    let result = MEDIA_BLOCK_RE.replace_all(html, "");
    MEDIA_VOID_RE.replace_all(&result, "").into_owned()
}
