//! The character lexer
//!
//! Works on a sliding pair of characters: `a` is the one waiting to be
//! emitted, `b` the next meaningful one. Strings, template literals and
//! regex literals are copied through verbatim, comments are dropped unless
//! flagged, and whitespace survives only where removing it would merge two
//! tokens or break automatic semicolon insertion.

use crate::error::{Result, ScriptError};

/// Characters after which a `/` starts a regex literal rather than a division
const REGEX_PRECEDERS: &str = "(,=:[!&|?";

/// A newline before one of these may be load-bearing for semicolon insertion
const NEWLINE_BEFORE: &str = "(-+{[@";

/// A newline after one of these may be load-bearing for semicolon insertion
const NEWLINE_AFTER: &str = "}])+-\"'`/";

fn is_identifier(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '\\') || !c.is_ascii()
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    index: usize,
    a: Option<char>,
    b: Option<char>,
    /// A character read ahead and pushed back
    c: Option<char>,
    output: String,
    flagged_comments: bool,
    /// The next `/` emitted closes a regex literal
    closing_regex: bool,
    /// Output length right after the last regex literal's closing `/`
    regex_end: Option<usize>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str, flagged_comments: bool) -> Self {
        Self {
            input,
            index: 0,
            a: None,
            b: None,
            c: None,
            output: String::with_capacity(input.len()),
            flagged_comments,
            closing_regex: false,
            regex_end: None,
        }
    }

    pub(crate) fn run(mut self) -> Result<String> {
        self.a = Some('\n');
        self.b = self.next_real()?;

        while let Some(a) = self.a {
            match a {
                '\n' if self.b.is_some_and(|b| NEWLINE_BEFORE.contains(b)) => {
                    self.emit(a);
                    self.save_string()?;
                }
                '\n' if self.b == Some(' ') => {}
                '\n' | ' ' => {
                    if self.keeps_gap(a) {
                        self.emit(a);
                    }
                    self.save_string()?;
                }
                _ => match self.b {
                    Some('\n') => {
                        if NEWLINE_AFTER.contains(a) || is_identifier(a) {
                            self.emit(a);
                            self.save_string()?;
                        }
                    }
                    Some(' ') if !is_identifier(a) && a != '/' => {}
                    Some('\'' | '"') if a == '/' => {
                        self.save_regex()?;
                        continue;
                    }
                    _ => {
                        self.emit(a);
                        self.save_string()?;
                    }
                },
            }

            self.b = self.next_real()?;
            if self.b == Some('/') && self.a.is_some_and(|a| REGEX_PRECEDERS.contains(a)) {
                self.save_regex()?;
            }
        }

        Ok(self.output)
    }

    /// Whether the whitespace `gap` in front of `b` has to stay.
    ///
    /// Spaces only separate identifier characters, with two exceptions
    /// around slashes: `a / /re/` keeps the space that stops `//` from
    /// starting a comment, and a division drops the space before an
    /// identifier while a regex literal keeps it so `in` is not read as a
    /// flag. Newlines are kept in front of anything identifier-like, for ASI.
    fn keeps_gap(&self, gap: char) -> bool {
        let after_slash = self.output.ends_with('/');
        let after_division = after_slash && self.regex_end != Some(self.output.len());
        match self.b {
            Some('/') => gap == '\n' || after_slash,
            Some(b) if is_identifier(b) => gap == '\n' || !after_division,
            _ => false,
        }
    }

    fn emit(&mut self, ch: char) {
        self.output.push(ch);
        if self.closing_regex && ch == '/' {
            self.regex_end = Some(self.output.len());
        }
        self.closing_regex = false;
    }

    /// The next raw character, with control characters other than `\n`
    /// read as a space
    fn next_char(&mut self) -> Option<char> {
        let ch = match self.c.take() {
            Some(ch) => ch,
            None => {
                let ch = self.input[self.index..].chars().next()?;
                self.index += ch.len_utf8();
                ch
            }
        };
        if ch != '\n' && ch.is_ascii_control() && ch != '\x7f' {
            Some(' ')
        } else {
            Some(ch)
        }
    }

    /// The next character that is not part of a comment
    fn next_real(&mut self) -> Result<Option<char>> {
        let start = self.index - self.c.map_or(0, char::len_utf8);
        let ch = self.next_char();
        if ch != Some('/') {
            return Ok(ch);
        }
        self.c = self.next_char();
        match self.c {
            Some('/') => Ok(self.line_comment(start)),
            Some('*') => self.block_comment(start),
            _ => Ok(ch),
        }
    }

    /// Skip a `//` comment, keeping `//@` conditional comments on a line of
    /// their own
    fn line_comment(&mut self, start: usize) -> Option<char> {
        self.c = None;
        let eol = self.input[self.index..]
            .find('\n')
            .map_or(self.input.len(), |rel| self.index + rel);
        if self.input[self.index..].starts_with('@') {
            if let Some(a) = self.a.filter(|a| !a.is_whitespace()) {
                self.output.push(a);
            }
            self.a = Some('\n');
            self.output.push('\n');
            self.output.push_str(&self.input[start..eol]);
        }
        self.index = eol;
        self.next_char()
    }

    /// Skip a `/* */` comment, copying it through when it is a `/*!` license
    /// block (and those are wanted) or a `/*@` conditional comment
    fn block_comment(&mut self, start: usize) -> Result<Option<char>> {
        self.c = None;
        let body = self.index;
        let third = self.input[body..].chars().next();
        let search = body + third.map_or(0, char::len_utf8);
        let close = self.input[search..]
            .find("*/")
            .map(|rel| search + rel)
            .ok_or(ScriptError::UnterminatedBlockComment { position: start })?;
        let end = close + 2;
        self.index = end;

        let keep = (self.flagged_comments && third == Some('!')) || third == Some('@');
        if keep {
            if start > 0 {
                if let Some(a) = self.a {
                    self.output.push(a);
                }
                self.a = Some(' ');
                if self.input[..start].ends_with('\n') {
                    self.output.push('\n');
                }
            }
            self.output.push_str(&self.input[start..end]);
            return Ok(self.next_char());
        }

        // `var/* c */x` must not become `varx`
        let next = self.next_char();
        if self.a.is_some_and(is_identifier) && next.is_some_and(is_identifier) {
            self.c = next;
            return Ok(Some(' '));
        }
        Ok(next)
    }

    /// Promote `b` to `a`; if it opens a string or template literal, copy
    /// the literal through up to (not including) its closing quote
    fn save_string(&mut self) -> Result<()> {
        let position = self.index;
        self.a = self.b;
        let Some(quote @ ('\'' | '"' | '`')) = self.a else {
            return Ok(());
        };
        self.output.push(quote);
        loop {
            let ch = self
                .next_char()
                .ok_or(ScriptError::UnterminatedString { position })?;
            self.a = Some(ch);
            match ch {
                c if c == quote => return Ok(()),
                '\n' if quote != '`' => return Err(ScriptError::UnterminatedString { position }),
                '\\' => {
                    self.b = self.next_char();
                    match self.b {
                        // line continuation
                        Some('\n') => {}
                        Some(escaped) => {
                            self.output.push('\\');
                            self.output.push(escaped);
                        }
                        None => return Err(ScriptError::UnterminatedString { position }),
                    }
                }
                _ => self.output.push(ch),
            }
        }
    }

    /// Copy a regex literal through, up to (not including) its closing `/`
    fn save_regex(&mut self) -> Result<()> {
        let position = self.index;
        if let Some(a) = self.a {
            self.output.push(a);
        }
        if let Some(b) = self.b {
            self.output.push(b);
        }
        loop {
            let mut ch = self
                .next_char()
                .ok_or(ScriptError::UnterminatedRegex { position })?;
            self.a = Some(ch);
            if ch == '/' {
                break;
            }
            if ch == '\\' {
                self.output.push(ch);
                ch = self
                    .next_char()
                    .ok_or(ScriptError::UnterminatedRegex { position })?;
                self.a = Some(ch);
            }
            if ch == '\n' {
                return Err(ScriptError::UnterminatedRegex { position });
            }
            self.output.push(ch);
        }
        self.closing_regex = true;
        self.b = self.next_real()?;
        Ok(())
    }
}
