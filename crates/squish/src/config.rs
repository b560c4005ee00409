//! Configuration file discovery and parsing
//!
//! Searches for `.config/squish.yaml` walking up from the current directory.
//! Every setting is optional; a missing file means all defaults.

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result, eyre};
use facet::Facet;
use squish_core::Limits;
use std::env;

use crate::{CssOptions, HtmlOptions, JsOptions};

const CONFIG_DIR: &str = ".config";
const CONFIG_FILE: &str = "squish.yaml";

/// Squish configuration from `.config/squish.yaml`
#[derive(Debug, Clone, Default, Facet)]
#[facet(rename_all = "snake_case")]
pub struct SquishConfig {
    /// Drop `/*! */` comments in style sheets and scripts (default: true)
    #[facet(default)]
    pub remove_comments: Option<bool>,

    /// Keep ESI and full-page-cache marker comments in markup (default: false)
    #[facet(default)]
    pub compatibility_comments: Option<bool>,

    /// Collapse all markup whitespace to single spaces (default: false)
    #[facet(default)]
    pub max_minification: Option<bool>,

    /// Strip `<!--` / `-->` wrappers from inline scripts (default: true)
    #[facet(default)]
    pub clean_script_comments: Option<bool>,

    /// Force XHTML handling; sniffed from the doctype when unset
    #[facet(default)]
    pub xhtml: Option<bool>,

    /// Break style sheet lines after this column
    #[facet(default)]
    pub line_break_column: Option<usize>,

    /// Leave inputs larger than this untouched
    #[facet(default)]
    pub max_input_bytes: Option<usize>,

    /// How deep template scripts may nest before they are copied as-is
    /// (default: 8)
    #[facet(default)]
    pub max_template_depth: Option<usize>,
}

/// Configuration with every default filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// The file this came from, if any
    pub path: Option<Utf8PathBuf>,
    pub remove_comments: bool,
    pub compatibility_comments: bool,
    pub max_minification: bool,
    pub clean_script_comments: bool,
    pub xhtml: Option<bool>,
    pub line_break_column: Option<usize>,
    pub max_input_bytes: Option<usize>,
    pub max_template_depth: usize,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self::resolve(SquishConfig::default(), None)
    }
}

impl ResolvedConfig {
    fn resolve(config: SquishConfig, path: Option<Utf8PathBuf>) -> Self {
        Self {
            path,
            remove_comments: config.remove_comments.unwrap_or(true),
            compatibility_comments: config.compatibility_comments.unwrap_or(false),
            max_minification: config.max_minification.unwrap_or(false),
            clean_script_comments: config.clean_script_comments.unwrap_or(true),
            xhtml: config.xhtml,
            line_break_column: config.line_break_column,
            max_input_bytes: config.max_input_bytes,
            max_template_depth: config.max_template_depth.unwrap_or(8),
        }
    }

    /// Discover configuration from the current directory, falling back to
    /// defaults when there is no config file
    pub fn discover() -> Result<Self> {
        let cwd = env::current_dir()?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
            eyre!(
                "Current directory is not valid UTF-8: {}",
                e.as_path().display()
            )
        })?;
        Self::discover_from(&cwd)
    }

    /// Discover configuration walking up from `start`
    pub fn discover_from(start: &Utf8Path) -> Result<Self> {
        match find_config_file(start) {
            Some(path) => Self::load(&path),
            None => {
                tracing::debug!(%start, "no {CONFIG_DIR}/{CONFIG_FILE} found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from an explicit file
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)?;
        let config: SquishConfig = facet_yaml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse {}: {}", path, e))?;
        tracing::debug!(%path, "loaded configuration");
        Ok(Self::resolve(config, Some(path.to_owned())))
    }

    pub fn css_options(&self) -> CssOptions {
        CssOptions {
            remove_comments: self.remove_comments,
            line_break_column: self.line_break_column,
        }
    }

    pub fn js_options(&self) -> JsOptions {
        JsOptions {
            flagged_comments: !self.remove_comments,
        }
    }

    pub fn html_options(&self) -> HtmlOptions {
        HtmlOptions {
            xhtml: self.xhtml,
            clean_script_comments: self.clean_script_comments,
            remove_comments: self.remove_comments,
            compatibility_comments: self.compatibility_comments,
            max_minification: self.max_minification,
            max_template_depth: self.max_template_depth,
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_input_bytes: self.max_input_bytes,
        }
    }
}

/// Search for `.config/squish.yaml` in `start` and its ancestors
fn find_config_file(start: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}
