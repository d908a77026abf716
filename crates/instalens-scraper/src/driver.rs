//! Browser automation seam.
//!
//! Every page interaction the scraping engine performs goes through
//! [`PageDriver`], so the traversal and extraction logic can run against an
//! in-memory fake as well as a real Chromium session.

use std::borrow::Cow;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScraperError;

/// How to find an element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(Cow<'static, str>),
    XPath(Cow<'static, str>),
}

impl Locator {
    #[must_use]
    pub const fn css(selector: &'static str) -> Self {
        Locator::Css(Cow::Borrowed(selector))
    }

    #[must_use]
    pub const fn xpath(expression: &'static str) -> Self {
        Locator::XPath(Cow::Borrowed(expression))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Locator::Css(s) | Locator::XPath(s) => s,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css:{s}"),
            Locator::XPath(s) => write!(f, "xpath:{s}"),
        }
    }
}

/// A cookie to inject before the session is used.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct BrowserCookie {
    #[serde(alias = "key")]
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// One exclusive browser tab.
///
/// Lookups that find nothing return `Ok(None)`, `Ok(false)`, or an empty
/// vector. `Err` is reserved for a broken session.
#[async_trait]
pub trait PageDriver: Send {
    async fn goto(&mut self, url: &str) -> Result<(), ScraperError>;

    async fn reload(&mut self) -> Result<(), ScraperError>;

    async fn current_url(&mut self) -> Result<String, ScraperError>;

    async fn page_source(&mut self) -> Result<String, ScraperError>;

    async fn exists(&mut self, locator: &Locator) -> Result<bool, ScraperError>;

    async fn attribute(
        &mut self,
        locator: &Locator,
        name: &str,
    ) -> Result<Option<String>, ScraperError>;

    /// Rendered text of the first match.
    async fn text(&mut self, locator: &Locator) -> Result<Option<String>, ScraperError>;

    /// Rendered text of every match, in document order.
    async fn texts(&mut self, locator: &Locator) -> Result<Vec<String>, ScraperError>;

    /// Scroll the first match into view and click it through script.
    /// Returns `false` when nothing matched.
    async fn click(&mut self, locator: &Locator) -> Result<bool, ScraperError>;

    /// Empty an input. Returns `false` when nothing matched.
    async fn clear(&mut self, locator: &Locator) -> Result<bool, ScraperError>;

    /// Send one keystroke to an input.
    async fn type_char(&mut self, locator: &Locator, ch: char) -> Result<(), ScraperError>;

    async fn press_enter(&mut self, locator: &Locator) -> Result<(), ScraperError>;

    async fn set_cookies(&mut self, cookies: &[BrowserCookie]) -> Result<(), ScraperError>;

    async fn screenshot(&mut self, path: &Path) -> Result<(), ScraperError>;

    /// Release the browser. Called exactly once on every exit path.
    async fn close(&mut self) -> Result<(), ScraperError>;
}

/// Opens one driver per profile.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PageDriver>, ScraperError>;
}

/// Poll `exists` until one of `candidates` appears or `timeout` elapses.
///
/// Returns the index of the earliest candidate present on the first tick
/// where any is present. A zero timeout checks exactly once.
///
/// # Errors
///
/// Propagates driver errors.
pub async fn wait_for_any(
    driver: &mut dyn PageDriver,
    candidates: &[&Locator],
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<usize>, ScraperError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        for (index, locator) in candidates.iter().enumerate() {
            if driver.exists(locator).await? {
                return Ok(Some(index));
            }
        }
        let now = tokio::time::Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        let step = poll_interval.min(deadline - now);
        if step.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(step).await;
        }
    }
}

/// [`wait_for_any`] over a single locator.
///
/// # Errors
///
/// Propagates driver errors.
pub async fn wait_for(
    driver: &mut dyn PageDriver,
    locator: &Locator,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<bool, ScraperError> {
    Ok(wait_for_any(driver, &[locator], timeout, poll_interval)
        .await?
        .is_some())
}
