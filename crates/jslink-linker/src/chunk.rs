//! Splitting a primary script into several `<script>` chunks.

use jslink_types::StatementRanges;
use tracing::warn;

/// Re-emit `js` statement by statement, starting a new chunk (introduced by
/// `separator`) whenever the next statement would push a non-empty chunk
/// past `chars_per_chunk` bytes.
///
/// Returns `js` unchanged when `chars_per_chunk` is negative, when `ranges`
/// is `None`, or when a range does not fit the text.
pub fn split_primary_javascript(
    ranges: Option<&StatementRanges>,
    js: &str,
    chars_per_chunk: i64,
    separator: &str,
) -> String {
    let Some(ranges) = ranges else {
        return js.to_string();
    };
    if chars_per_chunk < 0 {
        return js.to_string();
    }

    let mut out = String::with_capacity(js.len() + separator.len());
    let mut in_chunk: i64 = 0;
    for (start, end) in ranges.iter() {
        let Some(statement) = js.get(start..end) else {
            warn!(start, end, len = js.len(), "statement range outside script; not chunking");
            return js.to_string();
        };
        let length = statement.len() as i64;
        if in_chunk > 0 && in_chunk + length > chars_per_chunk {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(separator);
            in_chunk = 0;
        }
        if in_chunk > 0 && !(out.ends_with('\n') || out.ends_with(';') || out.ends_with('}')) {
            out.push(';');
        }
        out.push_str(statement);
        in_chunk += length;
    }
    out
}
