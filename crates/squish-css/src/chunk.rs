/// Inputs longer than this are split near rule boundaries
pub(crate) const CHUNK_LEN: usize = 5000;

/// Split `css` into chunks of roughly `target` bytes.
///
/// Each chunk ends on a `}`, and runs of `}` separated only by whitespace
/// stay in the same chunk so nested blocks are never torn apart. The chunks
/// always concatenate back to the input.
pub(crate) fn split(css: &str, target: usize) -> Vec<&str> {
    let bytes = css.as_bytes();
    let mut chunks = Vec::new();
    let mut start = 0;
    while css.len() - start > target {
        let Some(rel) = bytes[start + target..].iter().position(|&b| b == b'}') else {
            break;
        };
        let mut end = start + target + rel + 1;
        loop {
            let ws = bytes[end..]
                .iter()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            if bytes.get(end + ws) == Some(&b'}') {
                end += ws + 1;
            } else {
                break;
            }
        }
        chunks.push(&css[start..end]);
        start = end;
    }
    if start < css.len() || chunks.is_empty() {
        chunks.push(&css[start..]);
    }
    debug_assert_eq!(chunks.concat(), css);
    chunks
}
