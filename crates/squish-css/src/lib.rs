//! Style sheet minification
//!
//! A regex pipeline in the tradition of YUI cssmin. Regions that must come
//! through untouched (strings, data URLs, `calc()` bodies, flagged comments)
//! are swapped for placeholder tokens first and put back at the very end.
//!
//! The minifier never fails: input it does not understand passes through
//! the pipeline more or less unchanged.

mod chunk;
mod color;
mod comments;
mod extract;
mod passes;

use regex::Regex;
use squish_core::{Marker, PlaceholderTable};
use std::sync::LazyLock;
use tracing::debug;

static CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(@charset)( [^;]+;)").unwrap());

/// Any comment marker; group 1 is the run prefix, group 2 the comment id
static COMMENT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"___(SQZ[A-Z]{16})C([0-9]+)___").unwrap());

/// Options for [`minify`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssOptions {
    /// Drop `/*! ... */` comments along with all the others
    pub remove_comments: bool,
    /// Break the line after a `}` once it runs past this column
    pub line_break_column: Option<usize>,
}

impl Default for CssOptions {
    fn default() -> Self {
        Self {
            remove_comments: true,
            line_break_column: None,
        }
    }
}

/// Minify a style sheet
pub fn minify(css: &str, options: &CssOptions) -> String {
    if css.is_empty() {
        return String::new();
    }
    StyleMinifier::new(css, options).run(css)
}

pub(crate) struct StyleMinifier<'o> {
    options: &'o CssOptions,
    marker: Marker,
    /// Comment bodies, indexed by their marker number
    comments: Vec<String>,
    tokens: PlaceholderTable,
    newline: String,
    class_colon: String,
    fraction: String,
}

impl<'o> StyleMinifier<'o> {
    fn new(css: &str, options: &'o CssOptions) -> Self {
        let marker = Marker::for_input("css", css);
        Self {
            options,
            comments: Vec::new(),
            tokens: PlaceholderTable::new(marker.clone()),
            newline: marker.label("NL"),
            class_colon: marker.label("CC"),
            fraction: marker.label("QF"),
            marker,
        }
    }

    pub(crate) fn comment_marker(&self, id: usize) -> String {
        self.marker.token("C", id)
    }

    fn run(mut self, css: &str) -> String {
        let css = extract::data_urls(css, &mut self.tokens);
        let css = self.extract_comments(&css);
        let css = self.protect_strings(&css);

        let chunks = chunk::split(&css, chunk::CHUNK_LEN);
        debug!(
            bytes = css.len(),
            chunks = chunks.len(),
            comments = self.comments.len(),
            "minifying style sheet"
        );

        let mut charset = None;
        let mut body = String::with_capacity(css.len());
        for chunk in chunks {
            let minified = self.minify_chunk(chunk);
            if charset.is_none() {
                charset = CHARSET
                    .captures(&minified)
                    .map(|caps| format!("{}{}", caps[1].to_ascii_lowercase(), &caps[2]));
            }
            let minified = CHARSET.replace_all(&minified, "");
            body.push_str(minified.trim_start());
        }

        let mut out = charset.unwrap_or_default();
        out.push_str(&body);
        if let Some(column) = self.options.line_break_column {
            out = break_lines(&out, column);
        }

        let out = self.tokens.restore(&out);
        debug!(tokens = self.tokens.len(), "restored protected regions");
        out.trim().to_string()
    }

    fn minify_chunk(&mut self, chunk: &str) -> String {
        let css = self.dispose_comments(chunk.to_string());
        let css = passes::collapse_whitespace(&css);
        let css = passes::protect_matrix_filter(&css, &mut self.tokens);
        let css = passes::protect_calc(&css, &mut self.tokens);
        let css = passes::shorten_numbers(&css);
        let css = passes::tighten_before(&css, &self.class_colon);
        let css = passes::lowercase_keywords(&css);
        let css = passes::tighten_after(&css);
        let css = passes::shorten_zeros(&css);
        let css = color::rgb_to_hex(&css);
        let css = color::hsl_to_hex(&css);
        let css = color::compress_hex(&css);
        let css = passes::border_none(&css);
        let css = extract::ALPHA_OPACITY.replace_all(&css, "alpha(opacity=");
        let css = passes::remove_empty_rules(&css, &self.fraction);
        let css = css.replace(&self.newline, "\n");
        passes::lowercase_properties(&css)
    }
}

/// Ids of `marker`'s comment markers in `css`, in order of appearance
pub(crate) fn comment_ids<'t>(marker: &'t Marker, css: &'t str) -> impl Iterator<Item = usize> + 't {
    COMMENT_MARKER
        .captures_iter(css)
        .filter(|caps| &caps[1] == marker.prefix())
        .filter_map(|caps| caps[2].parse().ok())
}

/// Insert a newline after the first `}` past `column` on each line
fn break_lines(css: &str, column: usize) -> String {
    let mut out = String::with_capacity(css.len() + css.len() / column.max(1));
    let mut line_start = 0;
    for (i, ch) in css.char_indices() {
        out.push(ch);
        if ch == '}' && i + 1 - line_start > column {
            out.push('\n');
            line_start = i + 1;
        }
    }
    out
}
