//! Shared utility functions

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// First `n` characters (Unicode scalar values) of `s`
///
/// An exact cut: no ellipsis, no word-boundary handling.
///
/// ```
/// use chatline::util::take_chars;
/// assert_eq!(take_chars("hello world", 5), "hello");
/// assert_eq!(take_chars("日本語", 2), "日本");
/// ```
pub fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Truncate to at most `max_width` terminal columns, adding `…` when cut
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width - 1 {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push('…');
    out
}

/// Word-wrap `text` to lines of at most `width` columns
///
/// Explicit newlines are kept. Words longer than a line are split by
/// character. Always returns at least one line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0;

        for word in paragraph.split(' ') {
            let word_width = word.width();
            let sep = usize::from(!line.is_empty());

            if line_width + sep + word_width <= width {
                if sep == 1 {
                    line.push(' ');
                }
                line.push_str(word);
                line_width += sep + word_width;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }

            if word_width <= width {
                line.push_str(word);
                line_width = word_width;
                continue;
            }

            for ch in word.chars() {
                let w = ch.width().unwrap_or(0);
                if line_width + w > width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push(ch);
                line_width += w;
            }
        }
        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_chars_shorter_than_n() {
        assert_eq!(take_chars("hi", 20), "hi");
    }

    #[test]
    fn test_take_chars_multibyte() {
        assert_eq!(take_chars("café au lait", 4), "café");
    }

    #[test]
    fn test_truncate_fits() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK character takes two columns
        assert_eq!(truncate_to_width("日本語です", 5), "日本…");
    }

    #[test]
    fn test_truncate_to_zero() {
        assert_eq!(truncate_to_width("hello", 0), "");
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        assert_eq!(
            wrap_text("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn test_wrap_keeps_newlines() {
        assert_eq!(wrap_text("a\nb", 10), vec!["a", "b"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_wrap_empty_is_one_line() {
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }
}
