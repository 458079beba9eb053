//! String helpers shared by log previews and tool result handling.

/// Shorten `s` for log previews, appending `...` when cut.
///
/// The cut never splits a UTF-8 character.
pub fn preview(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3).min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Unwrap a tool result that was serialized as a JSON string literal.
///
/// Tools frequently hand back `"\"line one\\nline two\""`; the quoted form
/// is decoded so memory and records carry the plain text. Anything that is
/// not a JSON string literal is returned untouched.
pub fn unquote_json_string(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        if let Ok(serde_json::Value::String(inner)) = serde_json::from_str(trimmed) {
            return inner;
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_is_unchanged() {
        assert_eq!(preview("hello", 10), "hello");
    }

    #[test]
    fn test_preview_ascii() {
        assert_eq!(preview("hello world", 8), "hello...");
    }

    #[test]
    fn test_preview_multibyte_boundary() {
        // "é" is 2 bytes; a cut at byte 3 would split the second one
        assert_eq!(preview("éééé", 6), "é...");
    }

    #[test]
    fn test_unquote_json_string() {
        assert_eq!(unquote_json_string("\"a\\nb\""), "a\nb");
        assert_eq!(unquote_json_string("\"quoted \\\"text\\\"\""), "quoted \"text\"");
    }

    #[test]
    fn test_unquote_leaves_other_payloads() {
        assert_eq!(unquote_json_string("plain text"), "plain text");
        assert_eq!(unquote_json_string("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(unquote_json_string("\"broken"), "\"broken");
    }
}
