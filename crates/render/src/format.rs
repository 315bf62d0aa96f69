//! Small display formatters for portaria ids and snippets.

/// Default length used when truncating snippets.
pub const DEFAULT_TRUNCATE_CHARS: usize = 150;

/// Suffix appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Cut `text` to at most `max_chars` characters, appending `...` when cut.
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}{}", &text[..byte_index], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Display form of a portaria id: drops a trailing `.txt`, then `_page1`.
pub fn format_portaria_id(id: &str) -> &str {
    let id = id.strip_suffix(".txt").unwrap_or(id);
    id.strip_suffix("_page1").unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("curto", 150), "curto");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("abc", 3), "abc");
        assert_eq!(truncate_text("", 10), "");
    }

    #[test]
    fn test_truncate_text_multibyte() {
        assert_eq!(truncate_text("ação às três", 4), "ação...");
    }

    #[test]
    fn test_format_portaria_id() {
        assert_eq!(format_portaria_id("portaria_12_2023_page1.txt"), "portaria_12_2023");
        assert_eq!(format_portaria_id("portaria_12_2023.txt"), "portaria_12_2023");
        assert_eq!(format_portaria_id("portaria_12_2023_page1"), "portaria_12_2023");
        assert_eq!(format_portaria_id("portaria_page2.txt"), "portaria_page2");
        assert_eq!(format_portaria_id(""), "");
    }
}
