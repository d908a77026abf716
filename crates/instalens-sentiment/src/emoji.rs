//! Emoji detection, naming, and removal.

use std::sync::LazyLock;

use regex::Regex;

/// Pictographs plus the joiners, variation selectors, skin-tone modifiers,
/// regional indicators, and keycap marks that glue multi-codepoint emoji.
static EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Extended_Pictographic}\u{FE0F}\u{200D}\u{20E3}\u{1F3FB}-\u{1F3FF}\u{1F1E6}-\u{1F1FF}]")
        .expect("valid emoji regex")
});

/// One whole emoji: a flag pair, a keycap, or a pictograph with its
/// modifiers and any zero-width-joined continuation.
static EMOJI_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\u{1F1E6}-\u{1F1FF}]{2}|[0-9#*]\u{FE0F}?\u{20E3}|\p{Extended_Pictographic}[\u{FE0F}\u{1F3FB}-\u{1F3FF}]*(?:\u{200D}\p{Extended_Pictographic}[\u{FE0F}\u{1F3FB}-\u{1F3FF}]*)*",
    )
    .expect("valid emoji sequence regex")
});

/// Every emoji in `text`, in order.
pub fn sequences(text: &str) -> impl Iterator<Item = &str> {
    EMOJI_SEQUENCE.find_iter(text).map(|m| m.as_str())
}

/// Unicode name followed by the `:shortcode:` names of `emoji`, for example
/// `"cat with tears of joy joy_cat"`. Skin tones resolve to the base emoji.
#[must_use]
pub fn describe(emoji: &str) -> Option<String> {
    let bare: String = emoji
        .chars()
        .filter(|c| !matches!(c, '\u{FE0F}' | '\u{1F3FB}'..='\u{1F3FF}'))
        .collect();
    let found = emojis::get(emoji)
        .or_else(|| emojis::get(&bare))
        .or_else(|| emojis::get(&format!("{bare}\u{FE0F}")))?;
    let base = found
        .with_skin_tone(emojis::SkinTone::Default)
        .unwrap_or(found);

    let mut description = base.name().to_string();
    for code in base.shortcodes() {
        description.push(' ');
        description.push_str(code);
    }
    Some(description)
}

/// Remove every emoji from `text` and trim the result.
#[must_use]
pub fn strip_emoji(text: &str) -> String {
    EMOJI.replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_simple_and_composed_emoji() {
        assert_eq!(strip_emoji("super 🔥🔥"), "super");
        assert_eq!(strip_emoji("❤️ love"), "love");
        assert_eq!(strip_emoji("👍🏽 nice"), "nice");
        assert_eq!(strip_emoji("👨‍👩‍👧 family"), "family");
        assert_eq!(strip_emoji("🇮🇳 jai hind"), "jai hind");
    }

    #[test]
    fn emoji_only_text_strips_to_empty() {
        assert_eq!(strip_emoji("😍😍😍"), "");
        assert_eq!(strip_emoji("  🙏  "), "");
    }

    #[test]
    fn plain_text_and_telugu_survive() {
        assert_eq!(strip_emoji("  chaala bagundi  "), "chaala bagundi");
        assert_eq!(strip_emoji("చాలా బాగుంది"), "చాలా బాగుంది");
        assert_eq!(strip_emoji("price 100?"), "price 100?");
    }

    #[test]
    fn sequences_keep_composed_emoji_whole() {
        let found: Vec<&str> = sequences("ok 👍🏽 👨‍👩‍👧 🇮🇳 ❤️!").collect();
        assert_eq!(found, ["👍🏽", "👨‍👩‍👧", "🇮🇳", "❤️"]);
        assert_eq!(sequences("no emoji here").count(), 0);
    }

    #[test]
    fn descriptions_carry_names_and_shortcodes() {
        assert!(describe("👍").unwrap().contains("thumbsup"));
        assert!(describe("😂").unwrap().contains("joy"));
        assert!(describe("😡").unwrap().contains("rage"));
        assert!(describe("😹").unwrap().contains("joy"));
        assert_eq!(describe("a"), None);
    }

    #[test]
    fn skin_tones_and_variation_selectors_resolve_to_the_base() {
        assert!(describe("👎🏻").unwrap().contains("thumbsdown"));
        assert!(describe("❤").unwrap().contains("heart"));
        assert!(describe("❤️").unwrap().contains("heart"));
    }
}
