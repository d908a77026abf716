use std::path::PathBuf;
use std::time::Duration;

use instalens_core::ConfigError;

/// Where the classifier lives and which rule set to normalize with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentConfig {
    pub tei_url: String,
    /// `None` uses the embedded rules.
    pub rules_path: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl SentimentConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build config from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `INSTALENS_TEI_URL` is unset
    /// and [`ConfigError::InvalidEnvVar`] for unparseable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key))
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let tei_url = lookup("INSTALENS_TEI_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("INSTALENS_TEI_URL".to_string()))?;

        let rules_path = lookup("INSTALENS_SENTIMENT_RULES_PATH")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let timeout_secs = match lookup("INSTALENS_TEI_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidEnvVar {
                    var: "INSTALENS_TEI_TIMEOUT_SECS".to_string(),
                    reason: format!("expected a positive integer, got '{raw}'"),
                })?,
            Err(_) => 30,
        };

        Ok(Self {
            tei_url,
            rules_path,
            timeout_secs,
        })
    }
}
