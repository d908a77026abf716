//! [`PageDriver`] over a real Chromium via the DevTools protocol.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, SetUserAgentOverrideParams};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::driver::{BrowserCookie, Locator, PageDriver, SessionFactory};
use crate::error::ScraperError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const SCROLL_INTO_VIEW: &str =
    "function() { this.scrollIntoView({behavior: 'smooth', block: 'center'}); }";
const SCRIPT_CLICK: &str = "function() { this.click(); }";
const CLEAR_VALUE: &str = "function() { this.value = ''; }";

/// Launch options for each profile's browser.
#[derive(Debug, Clone)]
pub struct ChromiumSessionFactory {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub request_timeout: Duration,
    /// Pause between scroll and click so handlers attach.
    pub scroll_settle: Duration,
}

impl ChromiumSessionFactory {
    #[must_use]
    pub fn from_config(config: &instalens_core::AppConfig) -> Self {
        Self {
            headless: config.headless,
            chrome_path: config.chrome_path.clone(),
            request_timeout: Duration::from_secs(60),
            scroll_settle: Duration::from_millis(600),
        }
    }

    fn browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig, ScraperError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(self.request_timeout)
            .window_size(1280, 900)
            .user_data_dir(profile_dir)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-notifications")
            .arg("--blink-settings=imagesEnabled=false")
            .arg("--lang=en-US");
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(ScraperError::Driver)
    }
}

#[async_trait]
impl SessionFactory for ChromiumSessionFactory {
    async fn open(&self) -> Result<Box<dyn PageDriver>, ScraperError> {
        let profile_dir = tempfile::Builder::new()
            .prefix("instalens-chrome-")
            .tempdir()?;
        let config = self.browser_config(profile_dir.path())?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        page.execute(SetUserAgentOverrideParams::new(USER_AGENT))
            .await?;

        Ok(Box::new(ChromiumDriver {
            browser,
            page,
            handler_task,
            scroll_settle: self.scroll_settle,
            closed: false,
            _profile_dir: profile_dir,
        }))
    }
}

/// One browser process with one tab. Dropping it kills the process.
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    scroll_settle: Duration,
    closed: bool,
    _profile_dir: tempfile::TempDir,
}

/// A lookup error that only means "no such element". Protocol errors are
/// answers from a live browser; anything else is a broken session.
fn is_missing_element(error: &CdpError) -> bool {
    matches!(error, CdpError::NotFound | CdpError::Chrome(_))
}

impl ChromiumDriver {
    async fn find(&self, locator: &Locator) -> Result<Option<Element>, ScraperError> {
        let found = match locator {
            Locator::Css(selector) => self.page.find_element(selector.as_ref()).await,
            Locator::XPath(expression) => self.page.find_xpath(expression.as_ref()).await,
        };
        match found {
            Ok(element) => Ok(Some(element)),
            Err(e) if is_missing_element(&e) => {
                tracing::trace!(%locator, error = %e, "element lookup missed");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Element>, ScraperError> {
        let found = match locator {
            Locator::Css(selector) => self.page.find_elements(selector.as_ref()).await,
            Locator::XPath(expression) => self.page.find_xpaths(expression.as_ref()).await,
        };
        match found {
            Ok(elements) => Ok(elements),
            Err(e) if is_missing_element(&e) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn goto(&mut self, url: &str) -> Result<(), ScraperError> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), ScraperError> {
        self.page.reload().await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, ScraperError> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn page_source(&mut self) -> Result<String, ScraperError> {
        Ok(self.page.content().await?)
    }

    async fn exists(&mut self, locator: &Locator) -> Result<bool, ScraperError> {
        Ok(self.find(locator).await?.is_some())
    }

    async fn attribute(
        &mut self,
        locator: &Locator,
        name: &str,
    ) -> Result<Option<String>, ScraperError> {
        match self.find(locator).await? {
            Some(element) => Ok(element.attribute(name).await?),
            None => Ok(None),
        }
    }

    async fn text(&mut self, locator: &Locator) -> Result<Option<String>, ScraperError> {
        match self.find(locator).await? {
            Some(element) => Ok(element.inner_text().await?),
            None => Ok(None),
        }
    }

    async fn texts(&mut self, locator: &Locator) -> Result<Vec<String>, ScraperError> {
        let mut texts = Vec::new();
        for element in self.find_all(locator).await? {
            if let Some(text) = element.inner_text().await? {
                texts.push(text);
            }
        }
        Ok(texts)
    }

    async fn click(&mut self, locator: &Locator) -> Result<bool, ScraperError> {
        let Some(element) = self.find(locator).await? else {
            return Ok(false);
        };
        element.call_js_fn(SCROLL_INTO_VIEW, false).await?;
        tokio::time::sleep(self.scroll_settle).await;
        element.call_js_fn(SCRIPT_CLICK, false).await?;
        Ok(true)
    }

    async fn clear(&mut self, locator: &Locator) -> Result<bool, ScraperError> {
        let Some(element) = self.find(locator).await? else {
            return Ok(false);
        };
        element.call_js_fn(CLEAR_VALUE, false).await?;
        Ok(true)
    }

    async fn type_char(&mut self, locator: &Locator, ch: char) -> Result<(), ScraperError> {
        let element = self
            .find(locator)
            .await?
            .ok_or_else(|| ScraperError::Driver(format!("input {locator} not found")))?;
        element.focus().await?;
        element.type_str(ch.to_string()).await?;
        Ok(())
    }

    async fn press_enter(&mut self, locator: &Locator) -> Result<(), ScraperError> {
        let element = self
            .find(locator)
            .await?
            .ok_or_else(|| ScraperError::Driver(format!("input {locator} not found")))?;
        element.press_key("Enter").await?;
        Ok(())
    }

    async fn set_cookies(&mut self, cookies: &[BrowserCookie]) -> Result<(), ScraperError> {
        let mut params = Vec::with_capacity(cookies.len());
        for cookie in cookies {
            let mut builder = CookieParam::builder()
                .name(cookie.name.clone())
                .value(cookie.value.clone());
            if let Some(domain) = &cookie.domain {
                builder = builder.domain(domain.clone());
            }
            if let Some(path) = &cookie.path {
                builder = builder.path(path.clone());
            }
            params.push(builder.build().map_err(ScraperError::Driver)?);
        }
        self.page.set_cookies(params).await?;
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path) -> Result<(), ScraperError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.page
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let result = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        result?;
        Ok(())
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        self.handler_task.abort();
        if !self.closed {
            tracing::debug!("browser dropped without close; process is killed with it");
        }
    }
}
