//! Session establishment: cookie injection or interactive login.

use std::path::{Path, PathBuf};

use instalens_core::{AppConfig, LoginCredentials};

use crate::driver::{wait_for, BrowserCookie, Locator, PageDriver};
use crate::error::{AuthError, ScraperError};
use crate::selectors;
use crate::timing::{pause, Timing};

/// Credentials handed to the establisher at call time.
#[derive(Clone)]
pub enum SessionCredentials {
    Cookies(Vec<BrowserCookie>),
    Login(LoginCredentials),
}

impl std::fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cookies(cookies) => f
                .debug_tuple("Cookies")
                .field(&cookies.iter().map(|c| c.name.as_str()).collect::<Vec<_>>())
                .finish(),
            Self::Login(login) => f.debug_tuple("Login").field(login).finish(),
        }
    }
}

impl SessionCredentials {
    /// Resolve credentials from configuration. A cookie file wins over a
    /// username/password pair.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::CookieFile`] when the cookie file cannot be read
    /// or parsed, and [`AuthError::MissingCredentials`] when nothing is set.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        if let Some(path) = &config.cookies_path {
            let cookies = load_cookie_file(path)?;
            return Ok(Self::Cookies(cookies));
        }
        if let Some(login) = &config.login {
            return Ok(Self::Login(login.clone()));
        }
        Err(AuthError::MissingCredentials.into())
    }
}

/// Read a JSON array of `{name|key, value, domain?, path?}` objects.
///
/// # Errors
///
/// Returns [`ScraperError::CookieFile`] on I/O or JSON errors, or when the
/// file holds no cookies.
pub fn load_cookie_file(path: &Path) -> Result<Vec<BrowserCookie>, ScraperError> {
    let cookie_error = |reason: String| ScraperError::CookieFile {
        path: path.display().to_string(),
        reason,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| cookie_error(e.to_string()))?;
    let cookies: Vec<BrowserCookie> =
        serde_json::from_str(&raw).map_err(|e| cookie_error(e.to_string()))?;
    if cookies.is_empty() {
        return Err(cookie_error("no cookies in file".to_string()));
    }
    Ok(cookies)
}

/// Where screenshots go and which profile they belong to.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub dir: PathBuf,
    pub profile: String,
}

impl Diagnostics {
    #[must_use]
    pub fn path_for(&self, tag: &str) -> PathBuf {
        self.dir.join(format!("{}_{tag}.png", self.profile))
    }

    /// Save a screenshot. Failures are logged, never returned.
    pub async fn capture(&self, driver: &mut dyn PageDriver, tag: &str) {
        let path = self.path_for(tag);
        match driver.screenshot(&path).await {
            Ok(()) => tracing::info!(profile = %self.profile, path = %path.display(), "saved diagnostic screenshot"),
            Err(e) => tracing::warn!(profile = %self.profile, error = %e, "could not save diagnostic screenshot"),
        }
    }
}

/// Authenticate `driver` against the site.
///
/// # Errors
///
/// Returns [`ScraperError::Authentication`] when the session cannot be
/// established, or a driver error from the underlying browser.
pub async fn establish(
    driver: &mut dyn PageDriver,
    credentials: &SessionCredentials,
    base_url: &str,
    timing: &Timing,
    diagnostics: &Diagnostics,
) -> Result<(), ScraperError> {
    match credentials {
        SessionCredentials::Cookies(cookies) => {
            inject_cookies(driver, cookies, base_url, timing).await
        }
        SessionCredentials::Login(login) => {
            let result = interactive_login(driver, login, base_url, timing).await;
            if result.is_err() {
                diagnostics.capture(driver, "login_failed").await;
            }
            result
        }
    }
}

async fn inject_cookies(
    driver: &mut dyn PageDriver,
    cookies: &[BrowserCookie],
    base_url: &str,
    timing: &Timing,
) -> Result<(), ScraperError> {
    driver.goto(&format!("{base_url}/")).await?;
    pause(timing.page_settle).await;

    let domain = cookie_domain(base_url);
    let scoped: Vec<BrowserCookie> = cookies
        .iter()
        .map(|c| BrowserCookie {
            domain: c.domain.clone().or_else(|| Some(domain.clone())),
            path: c.path.clone().or_else(|| Some("/".to_string())),
            ..c.clone()
        })
        .collect();

    driver
        .set_cookies(&scoped)
        .await
        .map_err(|e| AuthError::Cookies(e.to_string()))?;
    driver.reload().await?;
    pause(timing.page_settle).await;

    tracing::debug!(count = scoped.len(), "session cookies injected");
    Ok(())
}

async fn interactive_login(
    driver: &mut dyn PageDriver,
    login: &LoginCredentials,
    base_url: &str,
    timing: &Timing,
) -> Result<(), ScraperError> {
    driver
        .goto(&format!("{base_url}{}", selectors::LOGIN_PATH))
        .await?;

    let form = [&selectors::LOGIN_USERNAME, &selectors::LOGIN_PASSWORD];
    for input in form {
        if !wait_for(driver, input, timing.login_timeout, timing.poll_interval).await? {
            return Err(AuthError::LoginFailed(format!("login form input {input} never appeared")).into());
        }
    }

    type_slowly(driver, &selectors::LOGIN_USERNAME, &login.username, timing).await?;
    pause(timing.between_fields.sample()).await;
    type_slowly(driver, &selectors::LOGIN_PASSWORD, &login.password, timing).await?;
    pause(timing.before_submit.sample()).await;
    driver.press_enter(&selectors::LOGIN_PASSWORD).await?;

    // Some signed-in layouts have no search box; the nav is enough.
    let signed_in = wait_for(
        driver,
        &selectors::SEARCH_BOX,
        timing.login_timeout,
        timing.poll_interval,
    )
    .await?
        || wait_for(
            driver,
            &selectors::PRIMARY_NAV,
            timing.login_timeout,
            timing.poll_interval,
        )
        .await?;
    if signed_in {
        tracing::info!(user = %login.username, "logged in");
        return Ok(());
    }

    if challenge_present(driver).await? {
        return Err(AuthError::ChallengeRequired.into());
    }
    Err(AuthError::LoginFailed("signed-in page never appeared".to_string()).into())
}

async fn type_slowly(
    driver: &mut dyn PageDriver,
    input: &Locator,
    text: &str,
    timing: &Timing,
) -> Result<(), ScraperError> {
    driver.clear(input).await?;
    for ch in text.chars() {
        driver.type_char(input, ch).await?;
        pause(timing.keystroke.sample()).await;
    }
    Ok(())
}

async fn challenge_present(driver: &mut dyn PageDriver) -> Result<bool, ScraperError> {
    if driver.exists(&selectors::CHALLENGE_PROMPT).await? {
        return Ok(true);
    }
    let source = driver.page_source().await?.to_lowercase();
    Ok(selectors::TWO_FACTOR_MARKERS
        .iter()
        .any(|marker| source.contains(marker)))
}

/// `.instagram.com` for `https://www.instagram.com`.
fn cookie_domain(base_url: &str) -> String {
    let host = base_url
        .split("://")
        .nth(1)
        .unwrap_or(base_url)
        .split(['/', ':'])
        .next()
        .unwrap_or_default();
    let bare = host.strip_prefix("www.").unwrap_or(host);
    if bare.contains('.') {
        format!(".{bare}")
    } else {
        bare.to_string()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
