use chrono::NaiveDate;
use thiserror::Error;

/// Path segments that address site features rather than accounts.
const RESERVED_SEGMENTS: &[&str] = &[
    "p", "reel", "reels", "explore", "stories", "accounts", "direct", "tv",
];

const MAX_HANDLE_LEN: usize = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile identifier is empty")]
    Empty,

    #[error("'{0}' does not name a profile")]
    NotAProfile(String),

    #[error("invalid handle '{0}': only letters, digits, '.' and '_' are allowed (max 30)")]
    InvalidHandle(String),

    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("start date {start} is after end date {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
}

/// A resolved profile: the bare handle plus its canonical profile URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileTarget {
    handle: String,
    url: String,
}

impl ProfileTarget {
    /// Resolve a handle, `@handle`, or profile URL against `base_url`.
    ///
    /// Accepted forms: `name`, `@name`, `instagram.com/name`,
    /// `https://www.instagram.com/name/?hl=en`. Query strings, fragments, and
    /// trailing path segments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] when the identifier is empty, points at a
    /// non-profile page, or the handle has characters the site never allows.
    pub fn parse(input: &str, base_url: &str) -> Result<Self, ProfileError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ProfileError::Empty);
        }

        let without_scheme = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed);
        let without_suffix = without_scheme
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        let candidate = if without_suffix.contains('/') {
            // host/handle/... or handle/
            let mut segments = without_suffix.split('/').filter(|s| !s.is_empty());
            let first = segments.next().unwrap_or_default();
            if first.contains('.') && first.contains("instagram") {
                segments.next().unwrap_or_default()
            } else {
                first
            }
        } else {
            without_suffix
        };

        let handle = candidate.trim_start_matches('@').to_lowercase();
        if handle.is_empty() || RESERVED_SEGMENTS.contains(&handle.as_str()) {
            return Err(ProfileError::NotAProfile(trimmed.to_string()));
        }
        if handle.len() > MAX_HANDLE_LEN
            || !handle
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
        {
            return Err(ProfileError::InvalidHandle(handle));
        }

        let url = format!("{}/{handle}/", base_url.trim_end_matches('/'));
        Ok(Self { handle, url })
    }

    /// Parse a comma-separated list, dropping blank entries.
    ///
    /// # Errors
    ///
    /// Returns the first entry that fails [`ProfileTarget::parse`].
    pub fn parse_list(input: &str, base_url: &str) -> Result<Vec<Self>, ProfileError> {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Self::parse(s, base_url))
            .collect()
    }

    #[must_use]
    pub fn handle(&self) -> &str {
        &self.handle
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Display for ProfileTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.handle)
    }
}

/// Inclusive `[start, end]` calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// # Errors
    ///
    /// Returns [`ProfileError::InvertedWindow`] when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ProfileError> {
        if start > end {
            return Err(ProfileError::InvertedWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidDate`] or [`ProfileError::InvertedWindow`].
    pub fn parse(start: &str, end: &str) -> Result<Self, ProfileError> {
        let parse_one = |value: &str| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                ProfileError::InvalidDate {
                    value: value.to_string(),
                }
            })
        };
        Self::new(parse_one(start)?, parse_one(end)?)
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// `MM-DD_MM-DD`, used to name per-profile intermediate files.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}_{}", self.start.format("%m-%d"), self.end.format("%m-%d"))
    }
}
