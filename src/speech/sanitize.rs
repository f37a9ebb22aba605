use std::sync::LazyLock;

use regex::Regex;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:https?://|www\.)\S+").unwrap());

const JA_PUNCTUATION: &str = "。、．，・！？";

/// Reduce text to what a speech engine should read: URLs are dropped first,
/// then everything except ASCII alphanumerics, kana, CJK ideographs, the
/// Japanese punctuation marks and whitespace. Applying it twice changes nothing.
pub fn sanitize_for_speech(text: &str) -> String {
    let without_urls = URL.replace_all(text, "");
    without_urls.chars().filter(|&c| is_speakable(c)).collect()
}

fn is_speakable(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || matches!(c,
            '\u{3040}'..='\u{309F}'     // hiragana
            | '\u{30A0}'..='\u{30FF}'   // katakana
            | '\u{3400}'..='\u{4DBF}'   // CJK extension A
            | '\u{4E00}'..='\u{9FFF}')  // CJK unified
        || JA_PUNCTUATION.contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_and_symbols_removed() {
        let out = sanitize_for_speech("Check http://x.com/y now! 😀 こんにちは。");
        assert_eq!(out, "Check  now  こんにちは。");
    }

    #[test]
    fn www_and_https_urls_removed() {
        let out = sanitize_for_speech("see www.example.com/a?b=1 and HTTPS://x.y/z\nend");
        assert_eq!(out, "see  and \nend");
    }

    #[test]
    fn japanese_punctuation_kept() {
        let s = "本日、セール開催！詳細は？　ポイント・還元．１，２";
        assert_eq!(sanitize_for_speech(s), "本日、セール開催！詳細は？　ポイント・還元．，");
    }

    #[test]
    fn already_sanitized_is_unchanged() {
        let inputs = [
            "Check http://x.com/y now! 😀 こんにちは。",
            "Sale 50% off!!! <b>today</b> → www.shop.example",
            "wwwX. http:/ / 漢字カナかな",
        ];
        for input in inputs {
            let once = sanitize_for_speech(input);
            assert_eq!(sanitize_for_speech(&once), once);
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(sanitize_for_speech(""), "");
    }
}
