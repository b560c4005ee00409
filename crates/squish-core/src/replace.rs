use regex::{Captures, Regex};

/// Replace every match of `re`, stopping at the first callback error.
///
/// [`Regex::replace_all`] has no way to bail out of a closure, which the
/// markup engine needs when an embedded script fails to minify.
pub fn try_replace_all<E, F>(re: &Regex, haystack: &str, mut replacement: F) -> Result<String, E>
where
    F: FnMut(&Captures<'_>) -> Result<String, E>,
{
    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for caps in re.captures_iter(haystack) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&haystack[last..whole.start()]);
        out.push_str(&replacement(&caps)?);
        last = whole.end();
    }
    out.push_str(&haystack[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_every_match() {
        let re = Regex::new(r"[0-9]+").unwrap();
        let out: Result<String, ()> =
            try_replace_all(&re, "a1b22c", |caps| Ok(format!("<{}>", &caps[0])));
        assert_eq!(out.unwrap(), "a<1>b<22>c");
    }

    #[test]
    fn test_stops_on_error() {
        let re = Regex::new(r"[0-9]+").unwrap();
        let out = try_replace_all(&re, "a1b22c", |caps| {
            if &caps[0] == "22" {
                Err("bad")
            } else {
                Ok(String::new())
            }
        });
        assert_eq!(out, Err("bad"));
    }
}
