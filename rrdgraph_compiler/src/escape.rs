//! Colon escaping for free text placed into colon-delimited renderer fields

use std::borrow::Cow;

/// Prefix every `:` in `text` with a backslash
///
/// Returns `Cow::Borrowed` when the text holds no colon, so callers can tell
/// that nothing needed escaping.
pub fn escape_colons(text: &str) -> Cow<'_, str> {
    let colons = text.matches(':').count();
    if colons == 0 {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + colons);
    for ch in text.chars() {
        if ch == ':' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    Cow::Owned(escaped)
}

/// Path variant used for matched file names
pub fn escape_path(path: &std::path::Path) -> String {
    escape_colons(&path.to_string_lossy()).into_owned()
}
