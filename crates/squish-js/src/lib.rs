//! JavaScript minification
//!
//! A single-pass character lexer in the style of JSMin/JShrink. It knows
//! just enough JavaScript to tell strings, template literals, regex
//! literals and comments apart from code, and drops whitespace that does
//! not separate tokens or carry a statement boundary.

mod error;
mod lexer;
mod lock;

pub use error::{Result, ScriptError};

use squish_core::Marker;
use tracing::debug;

/// Options for [`minify`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsOptions {
    /// Keep `/*! ... */` comments
    pub flagged_comments: bool,
}

impl Default for JsOptions {
    fn default() -> Self {
        Self {
            flagged_comments: true,
        }
    }
}

/// Minify a script
pub fn minify(js: &str, options: &JsOptions) -> Result<String> {
    let mut locks = lock::Locks::new(Marker::for_input("js", js));
    let locked = locks.lock(js);
    let input = normalize(&locked);

    let output = lexer::Lexer::new(&input, options.flagged_comments).run()?;
    debug!(
        bytes_in = js.len(),
        bytes_out = output.len(),
        locks = locks.len(),
        "minified script"
    );
    Ok(locks.unlock(output.trim_start_matches([' ', '\t', '\n', '\r', '\0', '\x0B'])))
}

/// Unix line endings, no empty `/**/` comments, and a trailing newline so
/// the lexer always sees the end of the last line
fn normalize(js: &str) -> String {
    let mut out = js.replace("\r\n", "\n").replace("/**/", "").replace('\r', "\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min(js: &str) -> Result<String> {
        minify(js, &JsOptions::default())
    }

    #[test]
    fn test_division_stays_division() {
        assert_eq!(min("var a = 1 / 2;").unwrap(), "var a=1/2;");
    }

    #[test]
    fn test_regex_literal_verbatim() {
        assert_eq!(min("x = /abc/;").unwrap(), "x=/abc/;");
        assert_eq!(min("s.replace( /[ ]+\\//g , '' )").unwrap(), "s.replace(/[ ]+\\//g,'')");
    }

    #[test]
    fn test_regex_keeps_space_before_keyword() {
        assert_eq!(
            min("x = /a/ instanceof RegExp").unwrap(),
            "x=/a/ instanceof RegExp"
        );
    }

    #[test]
    fn test_adjacent_signs_stay_apart() {
        assert_eq!(min("a\n+\n+b").unwrap(), "a\n+\n+b");
        assert_eq!(min("x = a - -b;").unwrap(), "x=a- -b;");
    }

    #[test]
    fn test_comments_dropped() {
        assert_eq!(min("a = 1; // note\nb = 2; /* block */").unwrap(), "a=1;b=2;");
    }

    #[test]
    fn test_newline_kept_for_asi() {
        assert_eq!(min("a = b\nc = d").unwrap(), "a=b\nc=d");
        assert_eq!(min("a = b\n(c)").unwrap(), "a=b\n(c)");
    }

    #[test]
    fn test_strings_verbatim() {
        assert_eq!(
            min(r#"say( "a  b\"c" , 'd  e' );"#).unwrap(),
            r#"say("a  b\"c",'d  e');"#
        );
    }

    #[test]
    fn test_template_literal_spans_lines() {
        assert_eq!(min("let t = `a\n  ${b}`;").unwrap(), "let t=`a\n  ${b}`;");
    }

    #[test]
    fn test_crlf_normalized() {
        assert_eq!(min("a = 1;\r\nb = 2;\r").unwrap(), "a=1;b=2;");
    }

    #[test]
    fn test_flagged_comment_kept() {
        assert_eq!(min("/*! hi */\nfoo();").unwrap(), "/*! hi */\nfoo();");
        let options = JsOptions {
            flagged_comments: false,
        };
        assert_eq!(minify("/*! hi */\nfoo();", &options).unwrap(), "foo();");
    }

    #[test]
    fn test_flagged_comment_mid_script() {
        assert_eq!(
            min("foo();\n/*! license */\nbar();").unwrap(),
            "foo();\n/*! license */\nbar();"
        );
    }

    #[test]
    fn test_signs_after_line_comment_survive() {
        assert_eq!(
            min("var a = 1; // ----\n--b;\nfoo();").unwrap(),
            "var a=1;--b;foo();"
        );
    }

    #[test]
    fn test_sign_runs_stay_apart() {
        assert_eq!(min("x = a + + +b;").unwrap(), "x=a+ + +b;");
    }

    #[test]
    fn test_dropped_comment_keeps_identifiers_apart() {
        assert_eq!(min("var/* c */x = 1;").unwrap(), "var x=1;");
        assert_eq!(min("a/* c */+b").unwrap(), "a+b");
    }

    #[test]
    fn test_conditional_block_comment_always_kept() {
        let options = JsOptions {
            flagged_comments: false,
        };
        assert_eq!(
            minify("/*@cc_on @*/\nfoo();", &options).unwrap(),
            "/*@cc_on @*/\nfoo();"
        );
    }

    #[test]
    fn test_conditional_line_comment_kept() {
        assert_eq!(
            min("x();\n//@cc_on\ny();").unwrap(),
            "x();\n//@cc_on\ny();"
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(
            min("var s = \"abc"),
            Err(ScriptError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn test_unterminated_regex() {
        assert!(matches!(
            min("x = /abc"),
            Err(ScriptError::UnterminatedRegex { .. })
        ));
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert_eq!(
            min("a; /* b"),
            Err(ScriptError::UnterminatedBlockComment { position: 3 })
        );
    }

    #[test_log::test]
    fn test_idempotent() {
        let js = "function f ( a , b ) {\n  return a + b ; // sum\n}\nvar x = f( 1 , 2 )\n";
        let once = min(js).unwrap();
        assert_eq!(once, "function f(a,b){return a+b;}\nvar x=f(1,2)");
        assert_eq!(min(&once).unwrap(), once);
    }
}
