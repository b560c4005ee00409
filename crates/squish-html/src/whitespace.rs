//! Whitespace passes over markup whose sensitive blocks are already hidden

use regex::{Captures, Regex};
use std::sync::LazyLock;

// `(?-u:\s)` throughout: a non-breaking space is content, not whitespace
static LINE_EDGES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?-u:\s)+|(?-u:\s)+$").unwrap());

const BLOCK_TAGS: &str = "area|article|aside|base(?:font)?|blockquote|body|canvas|caption|center|col(?:group)?|dd|dir|div|dl|dt|fieldset|figcaption|figure|footer|form|frame(?:set)?|h[1-6]|head|header|hgroup|hr|html|legend|li|link|main|map|menu|meta|nav|ol|opt(?:group|ion)|output|p|param|section|t(?:able|body|head|d|h|r|foot|itle)|ul|video";

static BEFORE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?-u:\s)+(</?(?:{BLOCK_TAGS})\b[^>]*>)")).unwrap()
});

static AFTER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(</?(?:{BLOCK_TAGS})\b[^>]*>)(?-u:\s)+")).unwrap()
});

static TEXT_NODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">([^<]+)<").unwrap());

static TEXT_EDGES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?-u:\s)+|(?-u:\s)+$").unwrap());

static ANY_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?-u:\s)+").unwrap());

static TAG_ATTRIBUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(<[a-z][a-z0-9\-]*)(?-u:\s)+([^>]+>)").unwrap()
});

/// Trim every line and drop the whitespace next to block-level tags
pub(crate) fn trim_structure(html: &str) -> String {
    let html = LINE_EDGES.replace_all(html, "");
    let html = BEFORE_BLOCK.replace_all(&html, "$1");
    AFTER_BLOCK.replace_all(&html, "$1").into_owned()
}

/// Shrink the whitespace at either end of each text node to one space
pub(crate) fn collapse_text(html: &str) -> String {
    TEXT_NODE
        .replace_all(html, |caps: &Captures<'_>| {
            format!(">{}<", TEXT_EDGES.replace_all(&caps[1], " "))
        })
        .into_owned()
}

/// In max mode every whitespace run becomes one space. Otherwise the gap
/// after a tag name becomes a newline, which keeps long tags diffable.
pub(crate) fn final_pass(html: &str, max: bool) -> String {
    if max {
        ANY_WHITESPACE.replace_all(html, " ").into_owned()
    } else {
        TAG_ATTRIBUTES.replace_all(html, "$1\n$2").into_owned()
    }
}
