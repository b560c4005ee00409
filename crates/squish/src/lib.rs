//! Minify HTML, CSS and JavaScript
//!
//! This crate ties the three engines together behind one [`Minifier`]:
//!
//! - [`squish_css`] for style sheets
//! - [`squish_js`] for scripts
//! - [`squish_html`] for markup, with inline styles and scripts handed to
//!   the other two
//!
//! [`Minifier::minify_or_original`] is the fail-open entry point: anything
//! that goes wrong is logged and the input comes back unchanged.

pub mod config;

use camino::Utf8Path;
use squish_core::Limits;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

pub use squish_css::CssOptions;
pub use squish_html::{HtmlOptions, MarkupError};
pub use squish_js::{JsOptions, ScriptError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("input of {len} bytes exceeds the {limit} byte limit")]
    InputTooLarge { len: usize, limit: usize },

    #[error("unknown asset kind `{0}` (expected html, css or js)")]
    UnknownKind(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Which engine an asset goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Html,
    Css,
    Js,
}

impl AssetKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" | "phtml" | "xhtml" => Some(Self::Html),
            "css" => Some(Self::Css),
            "js" | "mjs" | "cjs" => Some(Self::Js),
            _ => None,
        }
    }

    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        path.extension().and_then(Self::from_extension)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Js => "js",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s.trim_start_matches('.'))
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}

/// Engine options plus resource limits, ready to minify any asset kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Minifier {
    pub css: CssOptions,
    pub js: JsOptions,
    pub html: HtmlOptions,
    pub limits: Limits,
}

impl Minifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &config::ResolvedConfig) -> Self {
        Self {
            css: config.css_options(),
            js: config.js_options(),
            html: config.html_options(),
            limits: config.limits(),
        }
    }

    /// Minify `input`, reporting any failure
    pub fn try_minify(&self, kind: AssetKind, input: &str) -> Result<String> {
        self.limits
            .check(input)
            .map_err(|e| Error::InputTooLarge {
                len: e.len,
                limit: e.limit,
            })?;

        let output = match kind {
            AssetKind::Html => squish_html::minify(input, &self.html)?,
            AssetKind::Css => squish_css::minify(input, &self.css),
            AssetKind::Js => squish_js::minify(input, &self.js)?,
        };
        debug!(
            %kind,
            bytes_in = input.len(),
            bytes_out = output.len(),
            "minified"
        );
        Ok(output)
    }

    /// Minify `input`, or hand it back untouched if minification fails
    pub fn minify_or_original(&self, kind: AssetKind, input: &str) -> String {
        match self.try_minify(kind, input) {
            Ok(output) => output,
            Err(e) => {
                warn!(
                    %kind,
                    len = input.len(),
                    error = %e,
                    "minification failed, keeping original"
                );
                input.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_kind_from_path() {
        assert_eq!(AssetKind::from_path(Utf8Path::new("a/b.HTM")), Some(AssetKind::Html));
        assert_eq!(AssetKind::from_path(Utf8Path::new("x.mjs")), Some(AssetKind::Js));
        assert_eq!(AssetKind::from_path(Utf8Path::new("x.css")), Some(AssetKind::Css));
        assert_eq!(AssetKind::from_path(Utf8Path::new("README")), None);
    }

    #[test]
    fn test_asset_kind_parse() {
        assert_eq!("CSS".parse::<AssetKind>().unwrap(), AssetKind::Css);
        assert_eq!(".js".parse::<AssetKind>().unwrap(), AssetKind::Js);
        assert!(matches!("png".parse::<AssetKind>(), Err(Error::UnknownKind(_))));
    }

    #[test]
    fn test_try_minify_dispatches() {
        let minifier = Minifier::new();
        assert_eq!(
            minifier.try_minify(AssetKind::Css, "a { color: #ff0000; }").unwrap(),
            "a{color:red}"
        );
        assert_eq!(
            minifier.try_minify(AssetKind::Js, "var a = 1 / 2;").unwrap(),
            "var a=1/2;"
        );
    }
}
