//! What happens to each comment inside a chunk

use crate::{StyleMinifier, comment_ids};

impl StyleMinifier<'_> {
    /// Keep, token-protect or delete every comment marker in `css`.
    ///
    /// - `/*! ... */` survives unless comments are being removed, along with
    ///   one newline on either side
    /// - a body ending in `\` opens the Mac IE5 hack: it becomes `/*\*/` and
    ///   the comment right after it becomes `/**/`
    /// - an empty comment right after `>` stays, for the IE child selector hack
    /// - everything else is deleted
    pub(crate) fn dispose_comments(&mut self, css: String) -> String {
        let mut present: Vec<usize> = comment_ids(&self.marker, &css).collect();
        present.sort_unstable();
        present.dedup();

        let mut css = css;
        let mut ids = present.iter().copied().peekable();
        while let Some(id) = ids.next() {
            let Some(body) = self.comments.get(id).cloned() else {
                continue;
            };
            let marker = self.comment_marker(id);

            if !self.options.remove_comments && body.starts_with('!') {
                let token = self.tokens.reserve(body);
                css = css.replacen(&marker, &token, 1);
                css = keep_adjacent_newlines(&css, &token, &self.newline);
                continue;
            }

            if body.ends_with('\\') {
                let token = self.tokens.reserve("\\");
                css = css.replacen(&marker, &token, 1);
                if ids.peek() == Some(&(id + 1)) {
                    ids.next();
                    let token = self.tokens.reserve("");
                    css = css.replacen(&self.comment_marker(id + 1), &token, 1);
                }
                continue;
            }

            if body.is_empty() {
                let after_child_combinator = css
                    .find(&marker)
                    .is_some_and(|pos| pos > 2 && css.as_bytes()[pos - 3] == b'>');
                if after_child_combinator {
                    let token = self.tokens.reserve("");
                    css = css.replacen(&marker, &token, 1);
                    continue;
                }
            }

            css = css.replacen(&format!("/*{marker}*/"), "", 1);
        }
        css
    }
}

/// Collapse the whitespace around a preserved comment, turning a run that
/// holds a line break into a single newline sentinel
fn keep_adjacent_newlines(css: &str, token: &str, newline: &str) -> String {
    let comment = format!("/*{token}*/");
    let Some(start) = css.find(&comment) else {
        return css.to_string();
    };
    let end = start + comment.len();

    let lead = &css[..start];
    let kept_lead = lead.trim_end();
    let tail = &css[end..];
    let kept_tail = tail.trim_start();

    let mut out = String::with_capacity(css.len());
    out.push_str(kept_lead);
    push_gap(&mut out, &lead[kept_lead.len()..], newline);
    out.push_str(&comment);
    push_gap(&mut out, &tail[..tail.len() - kept_tail.len()], newline);
    out.push_str(kept_tail);
    out
}

fn push_gap(out: &mut String, gap: &str, newline: &str) {
    if gap.contains(['\n', '\r', '\x0C']) {
        out.push_str(newline);
    } else {
        out.push_str(gap);
    }
}
