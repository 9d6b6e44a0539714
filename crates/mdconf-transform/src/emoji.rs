//! Emoji stripping over fixed Unicode ranges.

/// Code point ranges removed by the pass: emoticons, symbols and
/// pictographs, transport and map symbols, flag indicators.
const EMOJI_RANGES: [(u32, u32); 4] = [
    (0x1F600, 0x1F64F),
    (0x1F300, 0x1F5FF),
    (0x1F680, 0x1F6FF),
    (0x1F1E0, 0x1F1FF),
];

fn is_emoji(c: char) -> bool {
    let cp = u32::from(c);
    EMOJI_RANGES.iter().any(|&(lo, hi)| cp >= lo && cp <= hi)
}

/// Remove all characters within the enabled ranges.
///
/// Removal is unconditional, surrounding text (including whitespace) is
/// preserved exactly. Runs late in the pipeline so macro-internal text is
/// eligible too.
pub(crate) fn strip_emojis(html: &str) -> String {
    html.chars().filter(|c| !is_emoji(*c)).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_emoticon_removed_spacing_preserved() {
        assert_eq!(strip_emojis("Hello \u{1F600} World"), "Hello  World");
    }

    #[test]
    fn test_all_ranges_removed() {
        assert_eq!(strip_emojis("a\u{1F300}b"), "ab"); // pictograph
        assert_eq!(strip_emojis("a\u{1F680}b"), "ab"); // transport
        assert_eq!(strip_emojis("a\u{1F1E9}\u{1F1EA}b"), "ab"); // flag pair
    }

    #[test]
    fn test_non_emoji_unicode_kept() {
        assert_eq!(strip_emojis("naïve — résumé"), "naïve — résumé");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(strip_emojis("plain ascii"), "plain ascii");
    }
}
