use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Username/password pair for the interactive login flow.
#[derive(Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Site root, e.g. `https://www.instagram.com`. Never ends with `/`.
    pub base_url: String,
    pub login: Option<LoginCredentials>,
    /// JSON file holding session cookies; takes precedence over `login`.
    pub cookies_path: Option<PathBuf>,
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub max_concurrent_profiles: usize,
    pub first_post_timeout_secs: u64,
    pub next_post_timeout_secs: u64,
    pub comments_timeout_secs: u64,
    pub login_timeout_secs: u64,
    pub page_settle_ms: u64,
    pub output_dir: PathBuf,
    pub diagnostics_dir: PathBuf,
}

impl AppConfig {
    #[must_use]
    pub fn first_post_timeout(&self) -> Duration {
        Duration::from_secs(self.first_post_timeout_secs)
    }

    #[must_use]
    pub fn next_post_timeout(&self) -> Duration {
        Duration::from_secs(self.next_post_timeout_secs)
    }

    #[must_use]
    pub fn comments_timeout(&self) -> Duration {
        Duration::from_secs(self.comments_timeout_secs)
    }

    #[must_use]
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    #[must_use]
    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("base_url", &self.base_url)
            .field("login", &self.login)
            .field("cookies_path", &self.cookies_path)
            .field("headless", &self.headless)
            .field("chrome_path", &self.chrome_path)
            .field("max_concurrent_profiles", &self.max_concurrent_profiles)
            .field("first_post_timeout_secs", &self.first_post_timeout_secs)
            .field("next_post_timeout_secs", &self.next_post_timeout_secs)
            .field("comments_timeout_secs", &self.comments_timeout_secs)
            .field("login_timeout_secs", &self.login_timeout_secs)
            .field("page_settle_ms", &self.page_settle_ms)
            .field("output_dir", &self.output_dir)
            .field("diagnostics_dir", &self.diagnostics_dir)
            .finish()
    }
}
