//! HTML minification
//!
//! Blocks whose whitespace matters (`<script>`, `<style>`, `<pre>`,
//! `<textarea>`, retained comments) are minified or copied into a
//! placeholder table first. The remaining markup then goes through a few
//! whitespace passes, and the placeholders are swapped back at the end.
//!
//! Inline style sheets go through [`squish_css`] and inline scripts through
//! [`squish_js`]. Client-side template scripts (`type="text/x-template"`
//! and friends) hold markup, so they are minified as markup, recursively.

mod error;
mod whitespace;

pub use error::{MarkupError, Result};

use regex::{Captures, Regex};
use squish_core::{Marker, PlaceholderTable, try_replace_all};
use squish_css::CssOptions;
use squish_js::JsOptions;
use std::sync::LazyLock;
use tracing::{debug, warn};

static SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)((?-u:\s)*)<script(\b[^>]*?>)((?s:.*?))</script>((?-u:\s)*)").unwrap()
});

static STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?-u:\s)*<style(\b[^>]*>)((?s:.*?))</style>(?-u:\s)*").unwrap()
});

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--(.*?)-->").unwrap());

static PRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?-u:\s)*<pre(\b[^>]*?>(?s:.*?)</pre>)(?-u:\s)*").unwrap()
});

static TEXTAREA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?-u:\s)*<textarea(\b[^>]*?>(?s:.*?)</textarea>)(?-u:\s)*").unwrap()
});

/// HTML comment wrappers around a script body, with an optional `//` before `-->`
static SCRIPT_COMMENT_WRAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?-u:\s)*<!--(?-u:\s)*|(?-u:\s)*(?://)?(?-u:\s)*-->(?-u:\s)*$").unwrap()
});

static STYLE_COMMENT_WRAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?-u:\s)*<!--|-->(?-u:\s)*$").unwrap());

static KNOCKOUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|(?-u:\s))/?ko(?:(?-u:\s)|$)").unwrap());

static TYPE_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\btype(?-u:\s)*=(?-u:\s)*["']?([^"'\s>]+)"#).unwrap()
});

static NEEDS_CDATA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[<&]|--|\]\]>").unwrap());

const XHTML_DOCTYPE: &str = "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML";

/// Script types whose body is markup for a client-side template engine
const TEMPLATE_TYPES: &[&str] = &[
    "text/template",
    "text/x-magento-template",
    "text/x-template",
    "text/html",
    "text/x-handlebars-template",
    "text/ng-template",
];

/// Options for [`minify`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Force XHTML handling on or off; sniffed from the doctype when `None`
    pub xhtml: Option<bool>,
    /// Strip `<!--` / `-->` wrappers from inline scripts
    pub clean_script_comments: bool,
    /// Drop flagged comments inside embedded CSS and JS
    pub remove_comments: bool,
    /// Also keep ESI and full-page-cache marker comments
    pub compatibility_comments: bool,
    /// Collapse all remaining whitespace to single spaces
    pub max_minification: bool,
    /// Nested template scripts deeper than this are copied through as-is
    pub max_template_depth: usize,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            xhtml: None,
            clean_script_comments: true,
            remove_comments: true,
            compatibility_comments: false,
            max_minification: false,
            max_template_depth: 8,
        }
    }
}

/// Minify an HTML document or fragment
pub fn minify(html: &str, options: &HtmlOptions) -> Result<String> {
    minify_at_depth(html, options, 0)
}

fn minify_at_depth(html: &str, options: &HtmlOptions, depth: usize) -> Result<String> {
    let html = html.trim().replace("\r\n", "\n");
    let xhtml = options
        .xhtml
        .unwrap_or_else(|| html.contains(XHTML_DOCTYPE));

    let mut minifier = MarkupMinifier {
        options,
        xhtml,
        depth,
        placeholders: PlaceholderTable::new(Marker::for_input("html", &html)),
    };

    let html = minifier.extract_scripts(&html)?;
    let html = minifier.extract_styles(&html);
    let html = minifier.strip_comments(&html);
    let html = minifier.extract_verbatim(&html, &PRE, "<pre");
    let html = minifier.extract_verbatim(&html, &TEXTAREA, "<textarea");

    let html = whitespace::trim_structure(&html);
    let html = whitespace::collapse_text(&html);
    let html = whitespace::final_pass(&html, options.max_minification);

    debug!(
        depth,
        xhtml,
        placeholders = minifier.placeholders.len(),
        "restoring markup placeholders"
    );
    Ok(minifier.placeholders.restore_passes(&html, 2))
}

struct MarkupMinifier<'o> {
    options: &'o HtmlOptions,
    xhtml: bool,
    depth: usize,
    placeholders: PlaceholderTable,
}

impl MarkupMinifier<'_> {
    fn extract_scripts(&mut self, html: &str) -> Result<String> {
        try_replace_all(&SCRIPT, html, |caps| self.script(caps))
    }

    fn script(&mut self, caps: &Captures<'_>) -> Result<String> {
        let lead = if caps[1].is_empty() { "" } else { " " };
        let trail = if caps[4].is_empty() { "" } else { " " };
        let open = format!("<script{}", &caps[2]);

        let mut body = caps[3].to_string();
        if self.options.clean_script_comments {
            body = SCRIPT_COMMENT_WRAP.replace_all(&body, "").into_owned();
        }
        let body = remove_cdata(&body);

        let body = if is_template(&open) {
            self.template(&body)?
        } else {
            let options = JsOptions {
                flagged_comments: !self.options.remove_comments,
            };
            squish_js::minify(&body, &options)?
        };

        let block = if self.needs_cdata(&body) {
            format!("{lead}{open}/*<![CDATA[*/{body}/*]]>*/</script>{trail}")
        } else {
            format!("{lead}{open}{body}</script>{trail}")
        };
        Ok(self.placeholders.reserve(block))
    }

    fn template(&self, body: &str) -> Result<String> {
        let depth = self.depth + 1;
        if depth > self.options.max_template_depth {
            warn!(
                depth,
                limit = self.options.max_template_depth,
                "template scripts nested too deep, leaving body as-is"
            );
            return Ok(body.to_string());
        }
        minify_at_depth(body, self.options, depth)
    }

    fn extract_styles(&mut self, html: &str) -> String {
        STYLE
            .replace_all(html, |caps: &Captures<'_>| {
                let open = format!("<style{}", &caps[1]);
                let body = STYLE_COMMENT_WRAP.replace_all(&caps[2], "");
                let body = remove_cdata(&body);
                let options = CssOptions {
                    remove_comments: self.options.remove_comments,
                    ..CssOptions::default()
                };
                let body = squish_css::minify(&body, &options);
                let block = if self.needs_cdata(&body) {
                    format!("{open}/*<![CDATA[*/{body}/*]]>*/</style>")
                } else {
                    format!("{open}{body}</style>")
                };
                self.placeholders.reserve(block)
            })
            .into_owned()
    }

    /// Drop comments, except conditional comments, comments holding
    /// `<![` sections, Knockout containerless bindings and (in
    /// compatibility mode) cache markers
    fn strip_comments(&mut self, html: &str) -> String {
        COMMENT
            .replace_all(html, |caps: &Captures<'_>| {
                if self.keeps_comment(&caps[1]) {
                    self.placeholders.reserve(&caps[0])
                } else {
                    String::new()
                }
            })
            .into_owned()
    }

    fn keeps_comment(&self, body: &str) -> bool {
        if body.starts_with('[') || body.contains("<![") || KNOCKOUT.is_match(body) {
            return true;
        }
        if !self.options.compatibility_comments {
            return false;
        }
        let body = body.to_ascii_lowercase();
        body.contains("esi <") || body.contains(" fpc")
    }

    fn extract_verbatim(&mut self, html: &str, re: &Regex, open: &str) -> String {
        re.replace_all(html, |caps: &Captures<'_>| {
            self.placeholders.reserve(format!("{open}{}", &caps[1]))
        })
        .into_owned()
    }

    fn needs_cdata(&self, body: &str) -> bool {
        self.xhtml && NEEDS_CDATA.is_match(body)
    }
}

fn is_template(open_tag: &str) -> bool {
    TYPE_ATTRIBUTE.captures(open_tag).is_some_and(|caps| {
        let kind = caps[1].to_ascii_lowercase();
        TEMPLATE_TYPES.contains(&kind.as_str())
    })
}

fn remove_cdata(body: &str) -> String {
    if body.contains("<![CDATA[") {
        body.replace("<![CDATA[", "").replace("]]>", "")
    } else {
        body.to_string()
    }
}
