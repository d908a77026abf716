//! Text normalization applied before classification.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::emoji;
use crate::error::SentimentError;
use crate::rules::Rules;

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation regex"));

const NEGATION_TOKEN: &str = "not";

/// Telugu block, U+0C00 to U+0C7F.
#[must_use]
pub fn contains_telugu(text: &str) -> bool {
    text.chars().any(|c| ('\u{0C00}'..='\u{0C7F}').contains(&c))
}

/// Compiled form of a [`Rules`] set.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    translit: Vec<(Regex, String)>,
    negations: Vec<Regex>,
    boosters: Vec<(Regex, String)>,
    positive_keywords: Vec<String>,
    negative_keywords: Vec<String>,
}

fn whole_word(word: &str) -> Result<Regex, SentimentError> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))).map_err(|source| {
        SentimentError::Pattern {
            word: word.to_string(),
            source,
        }
    })
}

impl Preprocessor {
    /// # Errors
    ///
    /// Returns [`SentimentError::Pattern`] if a rule word cannot be compiled.
    pub fn new(rules: &Rules) -> Result<Self, SentimentError> {
        let translit = rules
            .translit_variants
            .iter()
            .map(|(from, to)| Ok((whole_word(from)?, to.clone())))
            .collect::<Result<_, SentimentError>>()?;
        let negations = rules
            .negation_words
            .iter()
            .map(|w| whole_word(w))
            .collect::<Result<_, _>>()?;
        let boosters = rules
            .booster_words
            .iter()
            .map(|w| Ok((whole_word(w)?, w.clone())))
            .collect::<Result<_, SentimentError>>()?;

        Ok(Self {
            translit,
            negations,
            boosters,
            positive_keywords: rules.emoji_positive_keywords.clone(),
            negative_keywords: rules.emoji_negative_keywords.clone(),
        })
    }

    /// Normalize `text` for the classifier.
    ///
    /// Telugu-script text is only trimmed. Everything else is lowercased,
    /// run through the transliteration, negation, and booster rules, tagged
    /// with ` positive`/` negative` per recognized emoji, and stripped of
    /// punctuation.
    #[must_use]
    pub fn preprocess(&self, text: &str) -> String {
        if contains_telugu(text) {
            return text.trim().to_string();
        }

        let mut text = text.trim().to_lowercase();
        for (pattern, replacement) in &self.translit {
            text = pattern
                .replace_all(&text, NoExpand(replacement))
                .into_owned();
        }
        for pattern in &self.negations {
            text = pattern
                .replace_all(&text, NoExpand(NEGATION_TOKEN))
                .into_owned();
        }
        for (pattern, replacement) in &self.boosters {
            text = pattern
                .replace_all(&text, NoExpand(replacement))
                .into_owned();
        }

        let tags: Vec<&str> = emoji::sequences(&text)
            .filter_map(|e| self.emoji_tag(e))
            .collect();
        for tag in tags {
            text.push(' ');
            text.push_str(tag);
        }

        PUNCTUATION.replace_all(&text, "").into_owned()
    }

    fn emoji_tag(&self, symbol: &str) -> Option<&'static str> {
        let name = emoji::describe(symbol)?;
        if self.positive_keywords.iter().any(|k| name.contains(k.as_str())) {
            Some("positive")
        } else if self.negative_keywords.iter().any(|k| name.contains(k.as_str())) {
            Some("negative")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preprocessor() -> Preprocessor {
        Preprocessor::new(&Rules::default_rules().unwrap()).unwrap()
    }

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(preprocessor().preprocess("  Super Movie!!! "), "super movie");
    }

    #[test]
    fn transliteration_variants_are_whole_word() {
        let p = preprocessor();
        assert_eq!(p.preprocess("Nennu vachanu"), "nenu vachanu");
        // "nennuuu" is not the word "nennu".
        assert_eq!(p.preprocess("nennuuu"), "nennuuu");
    }

    #[test]
    fn negations_collapse_to_not() {
        assert_eq!(
            preprocessor().preprocess("Bagundi kaadu, ledu!"),
            "bagundi not not"
        );
    }

    #[test]
    fn emoji_append_polarity_tokens() {
        let p = preprocessor();
        assert_eq!(p.preprocess("great 👍"), "great  positive");
        assert_eq!(p.preprocess("😡😡"), " negative negative");
        // Known emoji without a keyword add nothing.
        assert_eq!(p.preprocess("ok 🤔"), "ok ");
    }

    #[test]
    fn emoji_outside_common_threads_still_tag() {
        let p = preprocessor();
        assert_eq!(p.preprocess("😹"), " positive");
        assert_eq!(p.preprocess("nope 👎🏻"), "nope  negative");
    }

    #[test]
    fn telugu_script_is_only_trimmed() {
        assert_eq!(
            preprocessor().preprocess("  చాలా బాగుంది!  "),
            "చాలా బాగుంది!"
        );
    }

    #[test]
    fn detects_telugu_block() {
        assert!(contains_telugu("movie బాగుంది"));
        assert!(!contains_telugu("movie bagundi"));
    }

    #[test]
    fn custom_rules_apply_in_order() {
        let rules = Rules {
            translit_variants: vec![
                ("gud".to_string(), "good".to_string()),
                ("good".to_string(), "great".to_string()),
            ],
            negation_words: vec!["nahi".to_string()],
            booster_words: vec!["bahut".to_string()],
            emoji_positive_keywords: vec![],
            emoji_negative_keywords: vec![],
            lexicon: crate::rules::Lexicon::default(),
        };
        let p = Preprocessor::new(&rules).unwrap();
        assert_eq!(p.preprocess("Bahut gud, nahi?"), "bahut great not");
    }
}
