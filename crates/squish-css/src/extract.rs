//! Up-front protection of regions the passes must not touch

use regex::Regex;
use squish_core::PlaceholderTable;
use std::sync::LazyLock;

use crate::{StyleMinifier, comment_ids};

static DATA_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)url\(\s*(["']?)data:"#).unwrap());

static STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:[^\\"]|\\.|\\)*"|'(?:[^\\']|\\.|\\)*'"#).unwrap()
});

pub(crate) static ALPHA_OPACITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)progid:DXImageTransform\.Microsoft\.Alpha\(Opacity=").unwrap()
});

/// Swap every `url(data:...)` body for a token, with its whitespace removed.
///
/// A data URL whose terminator never shows up is passed through as-is.
pub(crate) fn data_urls(css: &str, tokens: &mut PlaceholderTable) -> String {
    let mut out = String::with_capacity(css.len());
    let mut cursor = 0;
    let mut search = 0;
    while let Some(caps) = DATA_URL.captures_at(css, search) {
        let Some(whole) = caps.get(0) else { break };
        let terminator = caps
            .get(1)
            .and_then(|m| m.as_str().chars().next())
            .unwrap_or(')');

        out.push_str(&css[cursor..whole.start()]);
        match closing_paren(css, whole.end(), terminator) {
            Some(close) => {
                let body_start = whole.start() + "url(".len();
                let body: String = css[body_start..close]
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                out.push_str("url(");
                out.push_str(&tokens.reserve(body));
                out.push(')');
                cursor = close + 1;
            }
            None => {
                out.push_str(whole.as_str());
                cursor = whole.end();
            }
        }
        search = cursor;
    }
    out.push_str(&css[cursor..]);
    out
}

/// Find the `)` closing a data URL, skipping backslash-escaped terminators
fn closing_paren(css: &str, from: usize, terminator: char) -> Option<usize> {
    let bytes = css.as_bytes();
    let mut search = from;
    loop {
        let pos = search + css[search..].find(terminator)?;
        if pos == 0 || bytes[pos - 1] != b'\\' {
            if terminator == ')' {
                return Some(pos);
            }
            return css[pos..].find(')').map(|rel| pos + rel);
        }
        search = pos + 1;
    }
}

impl StyleMinifier<'_> {
    /// Replace every comment body with a numbered marker.
    ///
    /// An unterminated comment runs to the end of the input.
    pub(crate) fn extract_comments(&mut self, css: &str) -> String {
        let mut out = String::with_capacity(css.len());
        let mut cursor = 0;
        while let Some(rel) = css[cursor..].find("/*") {
            let open = cursor + rel;
            let body_start = open + 2;
            let (body_end, after) = match css[body_start..].find("*/") {
                Some(rel) => (body_start + rel, body_start + rel + 2),
                None => (css.len(), css.len()),
            };
            out.push_str(&css[cursor..open]);
            out.push_str("/*");
            out.push_str(&self.comment_marker(self.comments.len()));
            out.push_str("*/");
            self.comments.push(css[body_start..body_end].to_string());
            cursor = after;
        }
        out.push_str(&css[cursor..]);
        out
    }

    /// Swap every quoted string's contents for a token.
    ///
    /// Comment markers caught inside a string belong to the string, so they
    /// are put back before the contents are stored.
    pub(crate) fn protect_strings(&mut self, css: &str) -> String {
        let Self {
            marker,
            comments,
            tokens,
            ..
        } = self;
        STRING
            .replace_all(css, |caps: &regex::Captures<'_>| {
                let quoted = &caps[0];
                let quote = &quoted[..1];
                let mut inner = quoted[1..quoted.len() - 1].to_string();
                let ids: Vec<usize> = comment_ids(marker, &inner).collect();
                for id in ids {
                    if let Some(body) = comments.get(id) {
                        inner = inner.replacen(&marker.token("C", id), body, 1);
                    }
                }
                let inner = ALPHA_OPACITY.replace_all(&inner, "alpha(opacity=");
                format!("{quote}{}{quote}", tokens.reserve(inner))
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squish_core::Marker;

    fn table() -> PlaceholderTable {
        PlaceholderTable::new(Marker::for_input("css", ""))
    }

    #[test]
    fn test_data_url_whitespace_removed() {
        let mut tokens = table();
        let css = "a{background:url( \"data:image/png;base64, AAAA\n BBBB\" )}";
        let out = data_urls(css, &mut tokens);
        assert_eq!(out, format!("a{{background:url({})}}", tokens.token(0)));
        assert_eq!(tokens.get(0), Some("\"data:image/png;base64,AAAABBBB\""));
    }

    #[test]
    fn test_unquoted_data_url() {
        let mut tokens = table();
        let out = data_urls("b{x:url(data:a b)}", &mut tokens);
        assert_eq!(out, format!("b{{x:url({})}}", tokens.token(0)));
        assert_eq!(tokens.get(0), Some("data:ab"));
    }

    #[test]
    fn test_unterminated_data_url_passes_through() {
        let mut tokens = table();
        let css = "a{x:url('data:abc";
        assert_eq!(data_urls(css, &mut tokens), css);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_escaped_quote_inside_data_url() {
        let mut tokens = table();
        let out = data_urls(r#"a{x:url("data:a\"b")}"#, &mut tokens);
        assert!(out.starts_with("a{x:url("));
        assert_eq!(tokens.get(0), Some(r#""data:a\"b""#));
    }
}
