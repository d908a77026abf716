use std::time::Duration;

use instalens_core::ConfigError;

/// Which repository workflow to trigger and how long to wait for it.
#[derive(Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    pub token: String,
    /// `owner/name`.
    pub repo: String,
    /// Workflow file name or numeric id.
    pub workflow: String,
    pub git_ref: String,
    pub poll_interval_secs: u64,
    pub max_polls: u32,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for DispatchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchConfig")
            .field("token", &"[redacted]")
            .field("repo", &self.repo)
            .field("workflow", &self.workflow)
            .field("git_ref", &self.git_ref)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("max_polls", &self.max_polls)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl DispatchConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Build config from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `GITHUB_TOKEN` or
    /// `INSTALENS_DISPATCH_REPO` is unset, and [`ConfigError::InvalidEnvVar`]
    /// for malformed values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key))
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let require = |var: &str| -> Result<String, ConfigError> {
            lookup(var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
        };

        let or_default = |var: &str, default: &str| -> String {
            lookup(var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let parse_positive = |var: &str, default: &str| -> Result<u64, ConfigError> {
            let raw = or_default(var, default);
            raw.parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: format!("expected a positive integer, got '{raw}'"),
                })
        };

        let token = require("GITHUB_TOKEN")?;
        let repo = require("INSTALENS_DISPATCH_REPO")?;
        let mut parts = repo.split('/');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
        );
        if !well_formed {
            return Err(ConfigError::InvalidEnvVar {
                var: "INSTALENS_DISPATCH_REPO".to_string(),
                reason: format!("expected 'owner/name', got '{repo}'"),
            });
        }

        let max_polls = u32::try_from(parse_positive("INSTALENS_DISPATCH_MAX_POLLS", "600")?)
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "INSTALENS_DISPATCH_MAX_POLLS".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            token,
            repo,
            workflow: or_default("INSTALENS_DISPATCH_WORKFLOW", "scraper.yml"),
            git_ref: or_default("INSTALENS_DISPATCH_REF", "main"),
            poll_interval_secs: parse_positive("INSTALENS_DISPATCH_POLL_SECS", "6")?,
            max_polls,
            timeout_secs: 30,
        })
    }
}
