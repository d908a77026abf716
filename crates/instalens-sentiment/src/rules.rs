//! Normalization rule set for code-mixed comments.

use std::path::Path;

use serde::Deserialize;

use crate::error::SentimentError;

const DEFAULT_RULES: &str = include_str!("../rules/default_rules.json");

/// Word lists and mappings consumed by the preprocessor.
///
/// Mappings are ordered pairs; they are applied in file order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rules {
    pub translit_variants: Vec<(String, String)>,
    pub negation_words: Vec<String>,
    pub booster_words: Vec<String>,
    pub emoji_positive_keywords: Vec<String>,
    pub emoji_negative_keywords: Vec<String>,
    /// Reference tables shipped with the rule set. The preprocessor does not
    /// apply them.
    #[serde(default)]
    pub lexicon: Lexicon,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub phonetic_mappings: Vec<(String, String)>,
    pub vowel_mappings: Vec<(String, String)>,
    pub standard_spellings: Vec<(String, String)>,
    pub abbreviations: Vec<(String, String)>,
    pub stop_words: Vec<String>,
    pub sentiment_words: SentimentWords,
    pub code_switch_markers: Vec<String>,
    pub emoji_positive: Vec<String>,
    pub emoji_negative: Vec<String>,
    pub emoji_sarcastic: Vec<String>,
    pub textual_sarcasm_cues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SentimentWords {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub neutral: Vec<String>,
}

impl Rules {
    /// The rule set compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Rules`] if the embedded file is malformed.
    pub fn default_rules() -> Result<Self, SentimentError> {
        Self::from_json(DEFAULT_RULES, "<embedded>")
    }

    /// Load a rule set from a JSON file with the same shape as the default.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Rules`] when the file cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, SentimentError> {
        let raw = std::fs::read_to_string(path).map_err(|e| SentimentError::Rules {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&raw, &path.display().to_string())
    }

    /// `path` when given, otherwise the embedded defaults.
    ///
    /// # Errors
    ///
    /// See [`Rules::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SentimentError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::default_rules(),
        }
    }

    fn from_json(raw: &str, source_name: &str) -> Result<Self, SentimentError> {
        serde_json::from_str(raw).map_err(|e| SentimentError::Rules {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })
    }
}
