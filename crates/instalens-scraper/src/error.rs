use thiserror::Error;

/// Why a session could not be established.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The site asked for a challenge or second factor. A human has to
    /// resolve it; retrying does not help.
    #[error("login challenge or two-factor verification required")]
    ChallengeRequired,

    #[error("login failed: {0}")]
    LoginFailed(String),

    #[error("cookie injection failed: {0}")]
    Cookies(String),

    #[error("no session credentials configured (set a cookies file or login username/password)")]
    MissingCredentials,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),

    #[error("could not open first post of {profile}: {reason}")]
    ProfileLoad { profile: String, reason: String },

    #[error("extraction failed for post {post}: {reason}")]
    Extraction { post: u32, reason: String },

    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("driver error: {0}")]
    Driver(String),

    #[error("invalid cookie file {path}: {reason}")]
    CookieFile { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("table error: {0}")]
    Table(#[from] instalens_core::TableError),
}

impl ScraperError {
    /// True for failures that end a profile but should not be retried
    /// without operator action.
    #[must_use]
    pub fn needs_operator(&self) -> bool {
        matches!(
            self,
            ScraperError::Authentication(AuthError::ChallengeRequired | AuthError::MissingCredentials)
        )
    }
}
