//! Placeholder tables
//!
//! Content that must survive a series of regex passes untouched is swapped
//! for a token up front and swapped back at the end.

use crate::Marker;

/// Ordered store of protected content, addressed by insertion index
#[derive(Debug)]
pub struct PlaceholderTable {
    marker: Marker,
    kind: &'static str,
    entries: Vec<String>,
}

impl PlaceholderTable {
    pub fn new(marker: Marker) -> Self {
        Self::with_kind(marker, "T")
    }

    /// A table whose tokens use a distinct kind tag, so several tables can
    /// share one marker
    pub fn with_kind(marker: Marker, kind: &'static str) -> Self {
        Self {
            marker,
            kind,
            entries: Vec::new(),
        }
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Store `content` and return the token that stands in for it
    pub fn reserve(&mut self, content: impl Into<String>) -> String {
        let id = self.entries.len();
        self.entries.push(content.into());
        self.token(id)
    }

    pub fn token(&self, id: usize) -> String {
        self.marker.token(self.kind, id)
    }

    pub fn get(&self, id: usize) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Substitute every token with its content, newest first.
    ///
    /// Newest first matters: a later entry may contain an earlier token, and
    /// restoring the later one first exposes the earlier token to its own
    /// substitution.
    pub fn restore(&self, text: &str) -> String {
        self.restore_passes(text, 1)
    }

    /// Like [`restore`](Self::restore), but makes up to `passes` sweeps.
    ///
    /// A sweep only touches ids not yet found, which handles an earlier
    /// entry holding a later token.
    pub fn restore_passes(&self, text: &str, passes: usize) -> String {
        let mut text = text.to_string();
        let mut restored = vec![false; self.entries.len()];
        for _ in 0..passes {
            let mut progressed = false;
            for id in (0..self.entries.len()).rev() {
                if restored[id] {
                    continue;
                }
                let token = self.token(id);
                if let Some(pos) = text.find(&token) {
                    text.replace_range(pos..pos + token.len(), &self.entries[id]);
                    restored[id] = true;
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
        text
    }
}
