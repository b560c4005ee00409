//! The per-chunk rewrite passes
//!
//! Each pass is a plain `&str -> String` function so the order they run in
//! is visible in one place, [`StyleMinifier::minify_chunk`](crate::StyleMinifier).

use regex::{Captures, Regex};
use squish_core::PlaceholderTable;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($re).unwrap());
    };
}

regex!(WHITESPACE, r"\s+");
regex!(
    MATRIX_FILTER,
    r"\s*filter:\s*progid:DXImageTransform\.Microsoft\.Matrix\(([^)]+)\)"
);
regex!(CALC_OPEN, r"(?i)calc\(");
regex!(CALC_OPERATOR, r"\s*([*/(),])\s*");
regex!(PLUS_SIGN, r"(:|\s)\+(\.?[0-9]+)");
regex!(LEADING_ZEROS, r"(:|\s)(-?)0+(\.?[0-9]+)");
regex!(TRAILING_ZEROS, r"(:|\s)(-?)([0-9]?\.[0-9]+?)0+([^0-9])");
regex!(POINT_ZERO, r"(:|\s)(-?[0-9]+)\.0([^0-9])");
regex!(ZERO_VALUE, r"(:|\s)-?\.?0+([^0-9])");
regex!(SELECTOR_COLON, r"[^{};]*\s+:[^{};]*\{");
regex!(SPACE_BEFORE, r"\s+([!{};:>+()\]~=,])");
regex!(IMPORTANT, r"(?i)!important");
regex!(FIRST_LINE_LETTER, r"(?i):first-(line|letter)(\{|,)");
regex!(
    DIRECTIVE,
    r"(?i)@(font-face|import|(?:-(?:atsc|khtml|moz|ms|o|wap|webkit)-)?keyframe|media|page|namespace)"
);
regex!(
    PSEUDO_CLASS,
    r"(?i):(active|after|before|checked|disabled|empty|enabled|first-(?:child|of-type)|focus|hover|last-(?:child|of-type)|link|only-(?:child|of-type)|root|:selection|target|visited)"
);
regex!(
    PSEUDO_FUNCTION,
    r"(?i):(lang|not|nth-child|nth-last-child|nth-last-of-type|nth-of-type|(?:-(?:moz|webkit)-)?any)\("
);
regex!(
    VALUE_FUNCTION,
    r"(?i)([:,( ]\s*)(attr|color-stop|from|rgba|to|url|(?:-(?:atsc|khtml|moz|ms|o|wap|webkit)-)?(?:calc|max|min|(?:repeating-)?(?:linear|radial)-gradient)|-webkit-gradient)"
);
regex!(AND_PAREN, r"(?i)\band\(");
regex!(SPACE_AFTER, r"([!{}:;>+(\[~=,])\s+");
regex!(SEMICOLON_BRACE, r";+\}");
regex!(STAR_HACK, r"(\*[a-z0-9\-]+\s*:[^;}]+)(\})");
regex!(
    ZERO_UNIT,
    r"(?i)([^\\]:|\s)0(?:em|ex|ch|rem|vw|vh|vmin|vmax|vm|cm|mm|in|px|pt|pc|%)"
);
regex!(KEYFRAMES, r"(?i)(@[a-z\-]*?keyframes[^{]+\{)(.*?)(\}\})");
regex!(KEYFRAME_ZERO, r"0(\{|,[^){]+\{)");
regex!(ZERO_SHORTHAND, r":0(?: 0){1,3}(;|\}| !)");
regex!(TEXT_SHADOW_ZERO, r"(?i)(text-shadow:0)(;|\}| !)");
regex!(
    POSITION_ZERO,
    r"(?i)(background-position|webkit-mask-position|(?:webkit|moz|o|ms|)-?transform-origin):0(;|\}| !)"
);
regex!(
    BORDER_NONE,
    r"(?i)(border-?(?:top|right|bottom|left|)|outline):none(;|\}| !)"
);
regex!(QUERY_FRACTION, r"(?i)\(([a-z\-]+):([0-9]+)/([0-9]+)\)");
regex!(EMPTY_RULE, r"[^};{/]+\{\}");
regex!(SEMICOLONS, r";;+");
regex!(UPPERCASE_PROPERTY, r"(\{|;)([A-Z\-]+)(:)");

/// True when group 1 is a `:` preceded by a backslash, i.e. an escaped
/// colon inside a selector such as `.sm\:flex`
fn escaped_colon(css: &str, caps: &Captures<'_>) -> bool {
    caps.get(1)
        .is_some_and(|m| m.as_str() == ":" && css[..m.start()].ends_with('\\'))
}

/// Run `re` over `css`, skipping matches whose group 1 is an escaped colon
fn replace_unescaped(css: &str, re: &Regex, replacement: &str) -> String {
    re.replace_all(css, |caps: &Captures<'_>| {
        let mut out = String::new();
        if escaped_colon(css, caps) {
            out.push_str(&caps[0]);
        } else {
            caps.expand(replacement, &mut out);
        }
        out
    })
    .into_owned()
}

pub(crate) fn collapse_whitespace(css: &str) -> String {
    WHITESPACE.replace_all(css, " ").into_owned()
}

/// IE matrix filters keep their exact argument text
pub(crate) fn protect_matrix_filter(css: &str, tokens: &mut PlaceholderTable) -> String {
    MATRIX_FILTER
        .replace_all(css, |caps: &Captures<'_>| {
            format!(
                "filter:progid:DXImageTransform.Microsoft.Matrix({})",
                tokens.reserve(&caps[1])
            )
        })
        .into_owned()
}

/// Protect `calc()` bodies, which need their spaces around `+` and `-`.
///
/// Nested parentheses are matched by counting; an unbalanced `calc(` is
/// left for the other passes.
pub(crate) fn protect_calc(css: &str, tokens: &mut PlaceholderTable) -> String {
    let mut out = String::with_capacity(css.len());
    let mut cursor = 0;
    let mut search = 0;
    while let Some(m) = CALC_OPEN.find_at(css, search) {
        let open = m.end() - 1;
        let Some(close) = matching_paren(css, open) else {
            search = m.end();
            continue;
        };
        let body = CALC_OPERATOR.replace_all(&css[open + 1..close], "$1");
        out.push_str(&css[cursor..m.start()]);
        out.push_str("calc(");
        out.push_str(&tokens.reserve(body.trim()));
        out.push(')');
        cursor = close + 1;
        search = cursor;
    }
    out.push_str(&css[cursor..]);
    out
}

fn matching_paren(css: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in css.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// `+.5` to `.5`, `007` to `7`, `1.50` to `1.5`, `1.0` to `1`, `-0.0` to `0`
pub(crate) fn shorten_numbers(css: &str) -> String {
    let css = replace_unescaped(css, &PLUS_SIGN, "$1$2");
    let css = replace_unescaped(&css, &LEADING_ZEROS, "$1$2$3");
    let css = replace_unescaped(&css, &TRAILING_ZEROS, "$1$2$3$4");
    let css = replace_unescaped(&css, &POINT_ZERO, "$1$2$3");
    replace_unescaped(&css, &ZERO_VALUE, "${1}0$2")
}

/// Remove spaces around punctuation.
///
/// A space before `:` in a selector (`a :hover`) is a descendant combinator
/// and must stay, so those colons hide behind `class_colon` meanwhile. A
/// selector is any run without `{`, `}` or `;` that is followed by `{`.
pub(crate) fn tighten_before(css: &str, class_colon: &str) -> String {
    let css = SELECTOR_COLON.replace_all(css, |caps: &Captures<'_>| caps[0].replace(':', class_colon));
    let css = SPACE_BEFORE.replace_all(&css, "$1");
    let css = IMPORTANT.replace_all(&css, " !important");
    let css = css.replace(class_colon, ":");
    let css = FIRST_LINE_LETTER.replace_all(&css, |caps: &Captures<'_>| {
        format!(":first-{} {}", caps[1].to_ascii_lowercase(), &caps[2])
    });
    css.replace("*/ ", "*/")
}

/// Lowercase at-rules, pseudo-classes and common value functions
pub(crate) fn lowercase_keywords(css: &str) -> String {
    let css = DIRECTIVE.replace_all(css, |caps: &Captures<'_>| {
        format!("@{}", caps[1].to_ascii_lowercase())
    });
    let css = PSEUDO_CLASS.replace_all(&css, |caps: &Captures<'_>| {
        format!(":{}", caps[1].to_ascii_lowercase())
    });
    let css = PSEUDO_FUNCTION.replace_all(&css, |caps: &Captures<'_>| {
        format!(":{}(", caps[1].to_ascii_lowercase())
    });
    let css = VALUE_FUNCTION.replace_all(&css, |caps: &Captures<'_>| {
        format!("{}{}", &caps[1], caps[2].to_ascii_lowercase())
    });
    // `and (` in media queries needs its space back
    AND_PAREN.replace_all(&css, "and (").into_owned()
}

pub(crate) fn tighten_after(css: &str) -> String {
    let css = SPACE_AFTER.replace_all(css, "$1");
    let css = SEMICOLON_BRACE.replace_all(&css, "}");
    STAR_HACK.replace_all(&css, "$1;$2").into_owned()
}

/// Zero lengths lose their unit, zero shorthands collapse
pub(crate) fn shorten_zeros(css: &str) -> String {
    let css = ZERO_UNIT.replace_all(css, "${1}0");
    let css = KEYFRAMES.replace_all(&css, |caps: &Captures<'_>| {
        format!(
            "{}{}{}",
            &caps[1],
            KEYFRAME_ZERO.replace_all(&caps[2], "0%$1"),
            &caps[3]
        )
    });
    let css = ZERO_SHORTHAND.replace_all(&css, ":0$1");
    let css = TEXT_SHADOW_ZERO.replace_all(&css, "$1 0 0$2");
    POSITION_ZERO.replace_all(&css, "$1:0 0$2").into_owned()
}

pub(crate) fn border_none(css: &str) -> String {
    BORDER_NONE.replace_all(css, "$1:0$2").into_owned()
}

/// Drop empty rules, without mistaking `(min-resolution:3/2)` for one
pub(crate) fn remove_empty_rules(css: &str, fraction: &str) -> String {
    let css = QUERY_FRACTION.replace_all(css, |caps: &Captures<'_>| {
        format!("({}:{}{fraction}{})", &caps[1], &caps[2], &caps[3])
    });
    let css = EMPTY_RULE.replace_all(&css, "");
    let css = css.replace(fraction, "/");
    SEMICOLONS.replace_all(&css, ";").into_owned()
}

pub(crate) fn lowercase_properties(css: &str) -> String {
    UPPERCASE_PROPERTY
        .replace_all(css, |caps: &Captures<'_>| {
            format!("{}{}{}", &caps[1], caps[2].to_ascii_lowercase(), &caps[3])
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use squish_core::Marker;

    #[test]
    fn test_shorten_numbers() {
        assert_eq!(shorten_numbers("a:+.5em;"), "a:.5em;");
        assert_eq!(shorten_numbers("a:007px;"), "a:7px;");
        assert_eq!(shorten_numbers("a:0.50em;"), "a:.5em;");
        assert_eq!(shorten_numbers("a:1.0;"), "a:1;");
        assert_eq!(shorten_numbers("a:-0.0;"), "a:0;");
    }

    #[test]
    fn test_escaped_colon_is_not_a_value() {
        assert_eq!(shorten_numbers(r".sm\:0.50{"), r".sm\:0.50{");
    }

    #[test]
    fn test_calc_keeps_additive_spaces() {
        let mut tokens = PlaceholderTable::new(Marker::for_input("css", ""));
        let out = protect_calc("a:calc( 100% - (2px * 3) );", &mut tokens);
        assert_eq!(out, format!("a:calc({});", tokens.token(0)));
        assert_eq!(tokens.get(0), Some("100% -(2px*3)"));
    }

    #[test]
    fn test_unbalanced_calc_left_alone() {
        let mut tokens = PlaceholderTable::new(Marker::for_input("css", ""));
        assert_eq!(protect_calc("a:calc(1px", &mut tokens), "a:calc(1px");
    }

    #[test]
    fn test_descendant_pseudo_class_keeps_space() {
        assert_eq!(tighten_before("a :hover{color : red }", "<C>"), "a :hover{color: red}");
    }

    #[test]
    fn test_important_spacing() {
        assert_eq!(tighten_before("a{b:c!IMPORTANT}", "<C>"), "a{b:c !important}");
    }

    #[test]
    fn test_lowercase_keywords() {
        assert_eq!(
            lowercase_keywords("@MEDIA screen and(max-width:1px){A:HOVER{b:URL(x)}}"),
            "@media screen and (max-width:1px){A:hover{b:url(x)}}"
        );
    }

    #[test]
    fn test_shorten_zeros() {
        assert_eq!(shorten_zeros("a{margin:0px 0em 0 0}"), "a{margin:0}");
        assert_eq!(shorten_zeros("a{text-shadow:0}"), "a{text-shadow:0 0 0}");
        assert_eq!(
            shorten_zeros("a{background-position:0 0 0 0;}"),
            "a{background-position:0 0;}"
        );
    }

    #[test]
    fn test_keyframe_zero_step_keeps_percent() {
        assert_eq!(
            shorten_zeros("@keyframes spin{0{a:b}to{c:d}}"),
            "@keyframes spin{0%{a:b}to{c:d}}"
        );
        assert_eq!(
            shorten_zeros("@keyframes x{0,50%{a:b}}"),
            "@keyframes x{0%,50%{a:b}}"
        );
    }

    #[test]
    fn test_matrix_filter_arguments_protected() {
        let mut tokens = PlaceholderTable::new(Marker::for_input("css", ""));
        let out = protect_matrix_filter(
            "a{ filter: progid:DXImageTransform.Microsoft.Matrix(M11=1, M12=0)}",
            &mut tokens,
        );
        assert_eq!(
            out,
            format!(
                "a{{filter:progid:DXImageTransform.Microsoft.Matrix({})}}",
                tokens.token(0)
            )
        );
        assert_eq!(tokens.get(0), Some("M11=1, M12=0"));
    }

    #[test]
    fn test_star_hack_keeps_semicolon() {
        assert_eq!(tighten_after("a{*zoom:1;}"), "a{*zoom:1;}");
        assert_eq!(tighten_after("a{b:c;}"), "a{b:c}");
    }

    #[test]
    fn test_first_letter_and_line_get_a_space() {
        assert_eq!(
            tighten_before("p:first-letter {color:red}", "<C>"),
            "p:first-letter {color:red}"
        );
        assert_eq!(tighten_before("p:FIRST-LINE,a{b:c}", "<C>"), "p:first-line ,a{b:c}");
    }

    #[test]
    fn test_border_none() {
        assert_eq!(border_none("a{border-top:none;outline:none}"), "a{border-top:0;outline:0}");
    }

    #[test]
    fn test_remove_empty_rules() {
        assert_eq!(remove_empty_rules("a{}b{c:d;;}", "<F>"), "b{c:d;}");
        assert_eq!(
            remove_empty_rules("@media (min-resolution:3/2){a{b:c}}", "<F>"),
            "@media (min-resolution:3/2){a{b:c}}"
        );
    }

    #[test]
    fn test_lowercase_properties() {
        assert_eq!(lowercase_properties("a{COLOR:Red;FONT-SIZE:1px}"), "a{color:Red;font-size:1px}");
    }
}
