//! Sanitizer for user-supplied text interpolated into drawtext filters.
//!
//! Backslash, single-quote, colon, percent and comma are structurally
//! significant to ffmpeg's filter syntax; unescaped they corrupt the
//! filter graph or let text break out of the quoted value. All escaping
//! lives here so no call site builds its own variant.

pub fn escape_drawtext(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            ':' => escaped.push_str("\\:"),
            '%' => escaped.push_str("\\%"),
            ',' => escaped.push_str("\\,"),
            _ => escaped.push(c),
        }
    }
    escaped
}
