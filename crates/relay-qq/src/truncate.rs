//! Reply excerpt truncation.
//!
//! Counts characters, not bytes, so CJK text is cut at the same visual
//! length as ASCII and multi-byte sequences are never split.

/// Maximum characters of a quoted reply body.
pub const REPLY_EXCERPT_CHARS: usize = 10;

const ELLIPSIS: &str = "...";

/// Strip newlines from `text`, then cut it to at most `max_chars` characters.
///
/// Text longer than `max_chars` keeps `max_chars - 3` characters followed by
/// `...`, so the result is exactly `max_chars` long.
pub fn truncate(text: &str, max_chars: usize) -> String {
    let flat: String = text.chars().filter(|&c| c != '\n').collect();

    if flat.chars().count() <= max_chars {
        return flat;
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = flat.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_boundary_returned_as_is() {
        assert_eq!(truncate("0123456789", REPLY_EXCERPT_CHARS), "0123456789");
    }

    #[test]
    fn one_over_boundary_is_truncated() {
        let result = truncate("0123456789A", REPLY_EXCERPT_CHARS);
        assert_eq!(result, "0123456...");
        assert_eq!(result.chars().count(), 10);
    }

    #[test]
    fn newlines_removed_before_measuring() {
        // 10 visible characters plus two newlines: fits once flattened.
        assert_eq!(truncate("01234\n\n56789", REPLY_EXCERPT_CHARS), "0123456789");
    }

    #[test]
    fn cjk_counts_characters_not_bytes() {
        let result = truncate("我們今天晚上一起去吃火鍋吧", REPLY_EXCERPT_CHARS);
        assert_eq!(result, "我們今天晚上一...");
    }

    #[test]
    fn short_and_empty_input() {
        assert_eq!(truncate("hi", REPLY_EXCERPT_CHARS), "hi");
        assert_eq!(truncate("", REPLY_EXCERPT_CHARS), "");
    }
}
