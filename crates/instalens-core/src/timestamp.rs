use chrono::{DateTime, FixedOffset, NaiveDate};

const UNKNOWN: &str = "Unknown";
const HIDDEN: &str = "Hidden";

/// When a post was published, as read from its `time` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostedAt {
    Known(DateTime<FixedOffset>),
    Unknown,
}

impl PostedAt {
    /// Parse a machine-readable `datetime` attribute (RFC 3339, `Z` allowed).
    /// Missing or malformed values become [`PostedAt::Unknown`].
    #[must_use]
    pub fn from_attribute(raw: Option<&str>) -> Self {
        raw.map(str::trim)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map_or(Self::Unknown, Self::Known)
    }

    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Known(dt) => Some(dt.date_naive()),
            Self::Unknown => None,
        }
    }

    /// `YYYY-MM-DD` or `Unknown`.
    #[must_use]
    pub fn date_cell(&self) -> String {
        match self {
            Self::Known(dt) => dt.format("%Y-%m-%d").to_string(),
            Self::Unknown => UNKNOWN.to_string(),
        }
    }

    /// `HH:MM:SS` or `Unknown`.
    #[must_use]
    pub fn time_cell(&self) -> String {
        match self {
            Self::Known(dt) => dt.format("%H:%M:%S").to_string(),
            Self::Unknown => UNKNOWN.to_string(),
        }
    }
}

/// A post's like count; posters can hide it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeCount {
    Count(u64),
    Hidden,
}

impl LikeCount {
    /// Parse the like display text, e.g. `"1,234"`, `"1.234 likes"`, `"12.5K"`.
    /// Absent or unparseable text is [`LikeCount::Hidden`].
    #[must_use]
    pub fn from_display(raw: Option<&str>) -> Self {
        raw.and_then(parse_count).map_or(Self::Hidden, Self::Count)
    }

    /// Numeric text or `Hidden`.
    #[must_use]
    pub fn cell(&self) -> String {
        match self {
            Self::Count(n) => n.to_string(),
            Self::Hidden => HIDDEN.to_string(),
        }
    }
}

fn parse_count(raw: &str) -> Option<u64> {
    let lowered = raw.trim().to_lowercase();
    let number = lowered
        .trim_end_matches("likes")
        .trim_end_matches("like")
        .trim();
    if number.is_empty() {
        return None;
    }

    let (digits, multiplier) = match number.chars().last() {
        Some('k') => (&number[..number.len() - 1], 1_000_f64),
        Some('m') => (&number[..number.len() - 1], 1_000_000_f64),
        _ => (number, 1_f64),
    };

    if multiplier > 1.0 {
        let value: f64 = digits.trim().replace(',', ".").parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        return Some((value * multiplier).round() as u64);
    }

    let compact: String = digits
        .chars()
        .filter(|c| !matches!(c, ',' | '.' | ' ' | '\u{a0}' | '\u{202f}'))
        .collect();
    compact.parse().ok()
}
