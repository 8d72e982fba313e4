// src/utils/text.rs

//! Text normalization shared by all extractors.

use std::sync::LazyLock;

use regex::Regex;

/// Characters outside word characters, whitespace and basic punctuation.
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s.,():\-/]").expect("static pattern is valid")
});

/// Same as [`DISALLOWED`] but also keeps `·`, `~` and `•`.
static DISALLOWED_EXTENDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s.,():\-/·~•]").expect("static pattern is valid")
});

/// Punctuation whitelist applied during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whitelist {
    Standard,
    /// Keeps middle dots, tildes and bullets (HWPX sections use them for ranges and lists)
    Extended,
}

/// Normalize extracted text.
///
/// Strips symbols and control characters, collapses whitespace runs within each line,
/// and collapses runs of blank lines into one.
pub fn normalize(text: &str, whitelist: Whitelist) -> String {
    let pattern = match whitelist {
        Whitelist::Standard => &*DISALLOWED,
        Whitelist::Extended => &*DISALLOWED_EXTENDED,
    };
    let stripped = pattern.replace_all(text, "");

    let mut out = String::with_capacity(stripped.len());
    let mut pending_blank = false;
    for line in stripped.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if pending_blank {
                out.push('\n');
            }
        }
        out.push_str(&collapsed);
        pending_blank = false;
    }
    out
}

/// First `max_chars` characters of `text`.
pub fn prefix_cap(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Truncate to `max_chars` characters, appending `...` when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut = prefix_cap(text, max_chars);
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_and_blank_lines() {
        let raw = "  사업   개요 \n\n\n\n 지원\t내용  \n";
        assert_eq!(normalize(raw, Whitelist::Standard), "사업 개요\n\n지원 내용");
    }

    #[test]
    fn test_strips_symbols_keeps_punctuation() {
        let raw = "□ 지원규모: 1,000백만원 (3년) ※ 변동 가능\u{0007}";
        assert_eq!(
            normalize(raw, Whitelist::Standard),
            "지원규모: 1,000백만원 (3년) 변동 가능"
        );
    }

    #[test]
    fn test_extended_whitelist() {
        let raw = "2026.3.2 ~ 4.1 • 대상 · 기업";
        assert_eq!(normalize(raw, Whitelist::Standard), "2026.3.2 4.1 대상 기업");
        assert_eq!(normalize(raw, Whitelist::Extended), raw);
    }

    #[test]
    fn test_prefix_cap_counts_chars() {
        assert_eq!(prefix_cap("가나다라", 2), "가나");
        assert_eq!(prefix_cap("ab", 10), "ab");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc...");
        assert_eq!(truncate_with_ellipsis("abc", 3), "abc");
    }
}
