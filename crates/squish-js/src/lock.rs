//! Protection for whitespace between adjacent signs
//!
//! `a + +b` must not collapse to `a++b`, so before lexing each such gap is
//! swapped for a quoted tag the lexer copies through like any string.

use regex::{Captures, Regex};
use squish_core::Marker;
use std::sync::LazyLock;

static SIGN_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([+-])(\s+)([+-])").unwrap());

#[derive(Debug)]
pub(crate) struct Locks {
    marker: Marker,
    gaps: Vec<String>,
}

impl Locks {
    pub(crate) fn new(marker: Marker) -> Self {
        Self {
            marker,
            gaps: Vec::new(),
        }
    }

    /// Tag every whitespace gap between two signs.
    ///
    /// Gaps holding a line break are left alone: the lexer keeps that
    /// newline anyway, and tagging it would pull the next line into a
    /// trailing `//` comment. Matches cannot overlap, so `+ + +` takes a
    /// second sweep to tag its second gap.
    pub(crate) fn lock(&mut self, js: &str) -> String {
        let Self { marker, gaps } = self;
        let mut js = js.to_string();
        loop {
            let before = gaps.len();
            js = SIGN_GAP
                .replace_all(&js, |caps: &Captures<'_>| {
                    if caps[2].contains(['\n', '\r']) {
                        return caps[0].to_string();
                    }
                    let tag = tag(marker, gaps.len());
                    gaps.push(caps[2].to_string());
                    format!("{}{tag}{}", &caps[1], &caps[3])
                })
                .into_owned();
            if gaps.len() == before {
                return js;
            }
        }
    }

    pub(crate) fn unlock(&self, js: &str) -> String {
        let mut js = js.to_string();
        for (id, gap) in self.gaps.iter().enumerate() {
            js = js.replacen(&tag(&self.marker, id), gap, 1);
        }
        js
    }

    pub(crate) fn len(&self) -> usize {
        self.gaps.len()
    }
}

fn tag(marker: &Marker, id: usize) -> String {
    format!("\"{}\"", marker.token("L", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_round_trip() {
        let mut locks = Locks::new(Marker::for_input("js", ""));
        let locked = locks.lock("a + +b; c - -d");
        assert!(!locked.contains("+ +"));
        assert!(!locked.contains("- -"));
        assert_eq!(locks.len(), 2);
        assert_eq!(locks.unlock(&locked), "a + +b; c - -d");
    }

    #[test]
    fn test_line_break_gaps_stay_untagged() {
        let mut locks = Locks::new(Marker::for_input("js", ""));
        let js = "x = 1; // ----\n--y;";
        assert_eq!(locks.lock(js), js);
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn test_runs_of_signs_are_fully_tagged() {
        let mut locks = Locks::new(Marker::for_input("js", ""));
        let locked = locks.lock("a + + +b");
        assert_eq!(locks.len(), 2);
        assert!(!locked.contains("+ +"));
        assert_eq!(locks.unlock(&locked), "a + + +b");
    }
}
