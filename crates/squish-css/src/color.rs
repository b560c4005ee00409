//! Color shortening: `rgb()`/`hsl()` to hex, six-digit hex to three

use regex::{Captures, Regex};
use std::sync::LazyLock;

static RGB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)rgb\s*\(\s*([0-9,\s\-.%]+)\s*\)(.)").unwrap()
});

static HSL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)hsl\s*\(\s*([0-9,\s\-.%]+)\s*\)(.)").unwrap()
});

static HEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?i)(=\s*?["']?)?"#,
        r"#([0-9a-f])([0-9a-f])([0-9a-f])([0-9a-f])([0-9a-f])([0-9a-f])",
        r"(\}|[^0-9a-f{][^{]*?\})",
    ))
    .unwrap()
});

/// Hex values with a shorter keyword that every browser understands
const SHORT_NAMES: &[(&str, &str)] = &[
    ("#808080", "gray"),
    ("#008000", "green"),
    ("#800000", "maroon"),
    ("#000080", "navy"),
    ("#808000", "olive"),
    ("#ffa500", "orange"),
    ("#800080", "purple"),
    ("#c0c0c0", "silver"),
    ("#008080", "teal"),
    ("#f00", "red"),
];

pub(crate) fn rgb_to_hex(css: &str) -> String {
    RGB.replace_all(css, |caps: &Captures<'_>| {
        rgb_args_to_hex(&caps[1], &caps[2]).unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

pub(crate) fn hsl_to_hex(css: &str) -> String {
    HSL.replace_all(css, |caps: &Captures<'_>| {
        hsl_args_to_hex(&caps[1], &caps[2]).unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// `None` unless there are exactly three components
fn rgb_args_to_hex(args: &str, next: &str) -> Option<String> {
    let values: Vec<i64> = if args.contains('%') {
        args.replace('%', "")
            .split(',')
            .map(|v| round_half_up(leading_number(v) * 2.55))
            .collect()
    } else {
        args.split(',').map(|v| leading_number(v) as i64).collect()
    };
    if values.len() != 3 {
        return None;
    }

    let mut out = String::with_capacity(8 + next.len());
    out.push('#');
    for v in values {
        out.push_str(&format!("{:02x}", v.clamp(0, 255)));
    }
    if !matches!(next, " " | "\t" | "\n" | "\r" | "\x0C" | "," | ")" | ";" | "}") {
        out.push(' ');
    }
    out.push_str(next);
    Some(out)
}

fn hsl_args_to_hex(args: &str, next: &str) -> Option<String> {
    let values: Vec<f64> = args.replace('%', "").split(',').map(leading_number).collect();
    let &[h, s, l] = values.as_slice() else {
        return None;
    };
    let h = (h as i64).rem_euclid(360) as f64 / 360.0;
    let s = s.clamp(0.0, 100.0) / 100.0;
    let l = l.clamp(0.0, 100.0) / 100.0;

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let v2 = if l < 0.5 { l * (1.0 + s) } else { (l + s) - (s * l) };
        let v1 = 2.0 * l - v2;
        (
            hue_to_rgb(v1, v2, h + 1.0 / 3.0),
            hue_to_rgb(v1, v2, h),
            hue_to_rgb(v1, v2, h - 1.0 / 3.0),
        )
    };
    let args = format!(
        "{},{},{}",
        round_half_up(r * 255.0),
        round_half_up(g * 255.0),
        round_half_up(b * 255.0)
    );
    rgb_args_to_hex(&args, next)
}

fn hue_to_rgb(v1: f64, v2: f64, mut h: f64) -> f64 {
    if h < 0.0 {
        h += 1.0;
    }
    if h > 1.0 {
        h -= 1.0;
    }
    if h * 6.0 < 1.0 {
        return v1 + (v2 - v1) * 6.0 * h;
    }
    if h * 2.0 < 1.0 {
        return v2;
    }
    if h * 3.0 < 2.0 {
        return v1 + (v2 - v1) * (2.0 / 3.0 - h) * 6.0;
    }
    v1
}

/// Round halves up, after snapping away float noise such as 127.49999999999999
fn round_half_up(v: f64) -> i64 {
    let v = (v * 1e6).round() / 1e6;
    (v + 0.5).floor() as i64
}

/// Numeric value of the leading number in `s`, or 0 if there is none
fn leading_number(s: &str) -> f64 {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().unwrap_or(0.0)
}

/// Shorten `#aabbcc` to `#abc` (or a keyword) outside of filter values.
///
/// A color that cannot be shortened is lowercased. Colors inside
/// `filter: chroma(color="#FFFFFF")` style values are left untouched
/// because IE refuses the short form there.
pub(crate) fn compress_hex(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut cursor = 0;
    let mut search = 0;
    while let Some(caps) = HEX.captures_at(css, search) {
        let Some(whole) = caps.get(0) else { break };
        let tail_len = caps.get(8).map_or(0, |m| m.len());
        let color_end = whole.end() - tail_len;
        out.push_str(&css[cursor..whole.start()]);

        if caps.get(1).is_some() {
            out.push_str(&css[whole.start()..color_end]);
        } else {
            let digits: Vec<char> = (2..=7)
                .filter_map(|i| caps.get(i))
                .flat_map(|m| m.as_str().chars())
                .map(|c| c.to_ascii_lowercase())
                .collect();
            let hex = if digits[0] == digits[1] && digits[2] == digits[3] && digits[4] == digits[5]
            {
                format!("#{}{}{}", digits[0], digits[2], digits[4])
            } else {
                digits.iter().fold(String::from("#"), |mut s, c| {
                    s.push(*c);
                    s
                })
            };
            let short = SHORT_NAMES
                .iter()
                .find(|(long, _)| *long == hex)
                .map_or(hex.as_str(), |(_, name)| name);
            out.push_str(short);
        }
        cursor = color_end;
        search = color_end;
    }
    out.push_str(&css[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_hex() {
        assert_eq!(rgb_to_hex("color:rgb(0,0,0)}"), "color:#000000}");
        assert_eq!(rgb_to_hex("color:rgb(255, 128 ,1);"), "color:#ff8001;");
    }

    #[test]
    fn test_rgb_percentages_scale() {
        assert_eq!(rgb_to_hex("c:rgb(100%,0%,50%);"), "c:#ff0080;");
    }

    #[test]
    fn test_rgb_out_of_range_clamps() {
        assert_eq!(rgb_to_hex("c:rgb(300,-5,0);"), "c:#ff0000;");
    }

    #[test]
    fn test_rgb_inserts_space_before_glued_token() {
        assert_eq!(rgb_to_hex("border:rgb(0,0,0)solid}"), "border:#000000 solid}");
    }

    #[test]
    fn test_rgb_wrong_arity_untouched() {
        assert_eq!(rgb_to_hex("c:rgb(1,2);"), "c:rgb(1,2);");
    }

    #[test]
    fn test_hsl_to_hex() {
        assert_eq!(hsl_to_hex("c:hsl(0,100%,50%);"), "c:#ff0000;");
        assert_eq!(hsl_to_hex("c:hsl(480,100%,25%);"), "c:#008000;");
        assert_eq!(hsl_to_hex("c:hsl(0,0%,100%);"), "c:#ffffff;");
    }

    #[test]
    fn test_compress_hex() {
        assert_eq!(compress_hex("a{color:#AABBCC}"), "a{color:#abc}");
        assert_eq!(compress_hex("a{color:#ff0000}"), "a{color:red}");
        assert_eq!(compress_hex("a{color:#808080;b:c}"), "a{color:gray;b:c}");
        assert_eq!(compress_hex("a{color:#A1B2C3}"), "a{color:#a1b2c3}");
    }

    #[test]
    fn test_compress_hex_leaves_filters_and_selectors() {
        let css = "a{filter:chroma(color=#FFFFFF)}";
        assert_eq!(compress_hex(css), css);
        let css = "#aabbcc{color:red}";
        assert_eq!(compress_hex(css), css);
    }

    #[test]
    fn test_compress_hex_consecutive_colors() {
        assert_eq!(
            compress_hex("a{border-color:#FFFFFF #000000}"),
            "a{border-color:#fff #000}"
        );
    }
}
