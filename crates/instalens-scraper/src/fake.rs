//! Scripted in-memory site used by the engine tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::driver::{BrowserCookie, Locator, PageDriver, SessionFactory};
use crate::error::ScraperError;
use crate::selectors::{
    self, CommentStrategy, FIRST_POST_STRATEGIES, THREAD_BODY_DIV4, THREAD_BODY_DIV5,
    THREAD_DIALOG_GENERIC,
};

pub(crate) const BASE_URL: &str = "https://fake.test";

#[derive(Debug, Clone, Default)]
pub(crate) struct FakePost {
    pub url: String,
    pub datetime: Option<String>,
    pub likes: Option<String>,
    pub caption: Option<String>,
    pub comments: Vec<String>,
    /// Name of the thread layout this post renders, if any.
    pub layout: Option<&'static str>,
    /// Comments revealed per load-more click; 0 shows all at once.
    pub page_size: usize,
}

impl FakePost {
    pub fn dated(slug: &str, datetime: &str) -> Self {
        Self {
            url: format!("{BASE_URL}/p/{slug}/"),
            datetime: Some(datetime.to_string()),
            likes: Some("1,024".to_string()),
            ..Self::default()
        }
    }

    pub fn undated(slug: &str) -> Self {
        Self {
            url: format!("{BASE_URL}/p/{slug}/"),
            ..Self::default()
        }
    }

    pub fn thread(mut self, layout: &'static str, caption: Option<&str>, comments: &[&str]) -> Self {
        self.layout = Some(layout);
        self.caption = caption.map(str::to_string);
        self.comments = comments.iter().map(|c| (*c).to_string()).collect();
        self
    }

    pub fn paged(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    fn initially_revealed(&self) -> usize {
        if self.page_size == 0 {
            self.comments.len()
        } else {
            self.page_size.min(self.comments.len())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoginBehavior {
    Accept,
    Challenge,
    TwoFactorText,
    Reject,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeProfile {
    pub posts: Vec<FakePost>,
    /// First-post strategy that resolves on the grid.
    pub tile: Option<&'static str>,
    pub fail_goto: bool,
    pub panic_on_open: bool,
}

impl FakeProfile {
    pub fn with_posts(posts: Vec<FakePost>) -> Self {
        Self {
            posts,
            tile: Some("grid-generic"),
            fail_goto: false,
            panic_on_open: false,
        }
    }
}

#[derive(Debug)]
pub(crate) struct FakeSite {
    pub profiles: HashMap<String, FakeProfile>,
    pub login: LoginBehavior,
    pub latency: Duration,
    /// Locators the site never renders.
    pub hidden: Vec<Locator>,
    /// Locators whose lookups fail as if the node went stale.
    pub stale: Vec<Locator>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self {
            profiles: HashMap::new(),
            login: LoginBehavior::Accept,
            latency: Duration::ZERO,
            hidden: Vec::new(),
            stale: Vec::new(),
        }
    }

    pub fn hide(mut self, locator: &Locator) -> Self {
        self.hidden.push(locator.clone());
        self
    }

    pub fn stale(mut self, locator: &Locator) -> Self {
        self.stale.push(locator.clone());
        self
    }

    pub fn profile(mut self, handle: &str, profile: FakeProfile) -> Self {
        self.profiles.insert(handle.to_string(), profile);
        self
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeLog {
    pub visited: Vec<String>,
    pub cookies: Vec<BrowserCookie>,
    pub typed: String,
    pub screenshots: Vec<PathBuf>,
    pub load_more_clicks: usize,
    pub opened: usize,
    pub closed: usize,
}

#[derive(Debug, Clone)]
enum Screen {
    Blank,
    Landing,
    LoginForm { submitted: bool },
    Grid(String),
    Viewer {
        handle: String,
        index: usize,
        revealed: usize,
    },
    Missing,
}

#[derive(Clone, Copy)]
enum ThreadPart {
    Container,
    Caption,
    Items,
    LoadMore,
}

fn thread_part(locator: &Locator) -> Option<(&'static CommentStrategy, ThreadPart)> {
    [&THREAD_BODY_DIV5, &THREAD_BODY_DIV4, &THREAD_DIALOG_GENERIC]
        .into_iter()
        .find_map(|s| {
            if locator == &s.container {
                Some((s, ThreadPart::Container))
            } else if locator == &s.caption {
                Some((s, ThreadPart::Caption))
            } else if locator == &s.comment_items {
                Some((s, ThreadPart::Items))
            } else if locator == &s.load_more {
                Some((s, ThreadPart::LoadMore))
            } else {
                None
            }
        })
}

fn tile_name(locator: &Locator) -> Option<&'static str> {
    FIRST_POST_STRATEGIES
        .iter()
        .find(|s| &s.tile == locator)
        .map(|s| s.name)
}

pub(crate) struct FakeDriver {
    site: Arc<FakeSite>,
    log: Arc<Mutex<FakeLog>>,
    active: Option<Arc<AtomicUsize>>,
    screen: Screen,
    signed_in: bool,
    closed: bool,
}

impl FakeDriver {
    pub fn new(site: Arc<FakeSite>) -> Self {
        Self::with_log(site, Arc::new(Mutex::new(FakeLog::default())), None)
    }

    fn with_log(
        site: Arc<FakeSite>,
        log: Arc<Mutex<FakeLog>>,
        active: Option<Arc<AtomicUsize>>,
    ) -> Self {
        log.lock().unwrap().opened += 1;
        Self {
            site,
            log,
            active,
            screen: Screen::Blank,
            signed_in: false,
            closed: false,
        }
    }

    pub fn log(&self) -> Arc<Mutex<FakeLog>> {
        Arc::clone(&self.log)
    }

    fn current_post(&self) -> Option<(&FakePost, usize)> {
        match &self.screen {
            Screen::Viewer {
                handle,
                index,
                revealed,
            } => self
                .site
                .profiles
                .get(handle)
                .and_then(|p| p.posts.get(*index))
                .map(|post| (post, *revealed)),
            _ => None,
        }
    }

    fn thread_matches(&self, strategy: &CommentStrategy) -> Option<(&FakePost, usize)> {
        self.current_post()
            .filter(|(post, _)| post.layout == Some(strategy.name))
    }

    /// `Ok(true)` when `locator` is hidden, `Err` when it is stale.
    fn injected_fault(&self, locator: &Locator) -> Result<bool, ScraperError> {
        if self.site.stale.contains(locator) {
            return Err(ScraperError::Driver("stale element reference".to_string()));
        }
        Ok(self.site.hidden.contains(locator))
    }

    fn login_submitted(&self) -> bool {
        matches!(self.screen, Screen::LoginForm { submitted: true })
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Some(active) = &self.active {
                active.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }
}

impl Drop for FakeDriver {
    fn drop(&mut self) {
        self.release();
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    async fn goto(&mut self, url: &str) -> Result<(), ScraperError> {
        if !self.site.latency.is_zero() {
            tokio::time::sleep(self.site.latency).await;
        }
        self.log.lock().unwrap().visited.push(url.to_string());

        let path = url.strip_prefix(BASE_URL).unwrap_or(url);
        self.screen = if path == "/" {
            Screen::Landing
        } else if path == selectors::LOGIN_PATH {
            Screen::LoginForm { submitted: false }
        } else {
            let handle = path.trim_matches('/').to_string();
            match self.site.profiles.get(&handle) {
                Some(profile) if profile.panic_on_open => panic!("renderer crashed on {handle}"),
                Some(profile) if profile.fail_goto => {
                    return Err(ScraperError::Driver("net::ERR_CONNECTION_RESET".to_string()));
                }
                Some(_) => Screen::Grid(handle),
                None => Screen::Missing,
            }
        };
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), ScraperError> {
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, ScraperError> {
        if let Some((post, _)) = self.current_post() {
            return Ok(post.url.clone());
        }
        Ok(match &self.screen {
            Screen::Grid(handle) => format!("{BASE_URL}/{handle}/"),
            _ => format!("{BASE_URL}/"),
        })
    }

    async fn page_source(&mut self) -> Result<String, ScraperError> {
        if self.login_submitted() && self.site.login == LoginBehavior::TwoFactorText {
            return Ok("<html><p>Enter the code from your Two-Factor app</p></html>".to_string());
        }
        Ok("<html></html>".to_string())
    }

    async fn exists(&mut self, locator: &Locator) -> Result<bool, ScraperError> {
        if self.injected_fault(locator)? {
            return Ok(false);
        }
        if locator == &selectors::LOGIN_USERNAME || locator == &selectors::LOGIN_PASSWORD {
            return Ok(matches!(self.screen, Screen::LoginForm { .. }));
        }
        if locator == &selectors::SEARCH_BOX || locator == &selectors::PRIMARY_NAV {
            return Ok(self.signed_in);
        }
        if locator == &selectors::CHALLENGE_PROMPT {
            return Ok(self.login_submitted() && self.site.login == LoginBehavior::Challenge);
        }
        if let Some(name) = tile_name(locator) {
            return Ok(match &self.screen {
                Screen::Grid(handle) => self
                    .site
                    .profiles
                    .get(handle)
                    .is_some_and(|p| p.tile == Some(name) && !p.posts.is_empty()),
                _ => false,
            });
        }
        if locator == &selectors::POST_TIME {
            return Ok(self.current_post().is_some_and(|(p, _)| p.datetime.is_some()));
        }
        if locator == &selectors::LIKE_COUNT {
            return Ok(self.current_post().is_some_and(|(p, _)| p.likes.is_some()));
        }
        if locator == &selectors::NEXT_POST {
            return Ok(match &self.screen {
                Screen::Viewer { handle, index, .. } => self
                    .site
                    .profiles
                    .get(handle)
                    .is_some_and(|p| index + 1 < p.posts.len()),
                _ => false,
            });
        }
        if let Some((strategy, part)) = thread_part(locator) {
            let Some((post, revealed)) = self.thread_matches(strategy) else {
                return Ok(false);
            };
            return Ok(match part {
                ThreadPart::Container => true,
                ThreadPart::Caption => post.caption.is_some(),
                ThreadPart::Items => revealed > 0,
                ThreadPart::LoadMore => revealed < post.comments.len(),
            });
        }
        Ok(false)
    }

    async fn attribute(
        &mut self,
        locator: &Locator,
        name: &str,
    ) -> Result<Option<String>, ScraperError> {
        if self.injected_fault(locator)? {
            return Ok(None);
        }
        if locator == &selectors::POST_TIME && name == selectors::POST_TIME_ATTRIBUTE {
            return Ok(self.current_post().and_then(|(p, _)| p.datetime.clone()));
        }
        Ok(None)
    }

    async fn text(&mut self, locator: &Locator) -> Result<Option<String>, ScraperError> {
        if self.injected_fault(locator)? {
            return Ok(None);
        }
        if locator == &selectors::LIKE_COUNT {
            return Ok(self.current_post().and_then(|(p, _)| p.likes.clone()));
        }
        if let Some((strategy, ThreadPart::Caption)) = thread_part(locator) {
            return Ok(self
                .thread_matches(strategy)
                .and_then(|(p, _)| p.caption.clone()));
        }
        Ok(None)
    }

    async fn texts(&mut self, locator: &Locator) -> Result<Vec<String>, ScraperError> {
        if self.injected_fault(locator)? {
            return Ok(Vec::new());
        }
        if let Some((strategy, ThreadPart::Items)) = thread_part(locator) {
            return Ok(self
                .thread_matches(strategy)
                .map(|(p, revealed)| p.comments[..revealed].to_vec())
                .unwrap_or_default());
        }
        Ok(Vec::new())
    }

    async fn click(&mut self, locator: &Locator) -> Result<bool, ScraperError> {
        if !self.exists(locator).await? {
            return Ok(false);
        }
        if tile_name(locator).is_some() {
            if let Screen::Grid(handle) = &self.screen {
                let handle = handle.clone();
                let revealed = self.site.profiles[&handle].posts[0].initially_revealed();
                self.screen = Screen::Viewer {
                    handle,
                    index: 0,
                    revealed,
                };
            }
            return Ok(true);
        }
        if locator == &selectors::NEXT_POST {
            if let Screen::Viewer { handle, index, .. } = &self.screen {
                let handle = handle.clone();
                let index = index + 1;
                let revealed = self.site.profiles[&handle].posts[index].initially_revealed();
                self.screen = Screen::Viewer {
                    handle,
                    index,
                    revealed,
                };
            }
            return Ok(true);
        }
        if let Some((_, ThreadPart::LoadMore)) = thread_part(locator) {
            if let Screen::Viewer {
                handle,
                index,
                revealed,
            } = &mut self.screen
            {
                let post = &self.site.profiles[handle.as_str()].posts[*index];
                *revealed = (*revealed + post.page_size.max(1)).min(post.comments.len());
            }
            self.log.lock().unwrap().load_more_clicks += 1;
            return Ok(true);
        }
        Ok(true)
    }

    async fn clear(&mut self, locator: &Locator) -> Result<bool, ScraperError> {
        self.exists(locator).await
    }

    async fn type_char(&mut self, _locator: &Locator, ch: char) -> Result<(), ScraperError> {
        self.log.lock().unwrap().typed.push(ch);
        Ok(())
    }

    async fn press_enter(&mut self, _locator: &Locator) -> Result<(), ScraperError> {
        self.screen = Screen::LoginForm { submitted: true };
        self.signed_in = self.site.login == LoginBehavior::Accept;
        Ok(())
    }

    async fn set_cookies(&mut self, cookies: &[BrowserCookie]) -> Result<(), ScraperError> {
        self.log.lock().unwrap().cookies.extend_from_slice(cookies);
        self.signed_in = true;
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path) -> Result<(), ScraperError> {
        self.log.lock().unwrap().screenshots.push(path.to_path_buf());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        if !self.closed {
            self.log.lock().unwrap().closed += 1;
        }
        self.release();
        Ok(())
    }
}

/// Hands out [`FakeDriver`]s and tracks how many are open at once.
pub(crate) struct FakeFactory {
    site: Arc<FakeSite>,
    pub log: Arc<Mutex<FakeLog>>,
    pub active: Arc<AtomicUsize>,
    pub peak: Arc<AtomicUsize>,
}

impl FakeFactory {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Arc::new(site),
            log: Arc::new(Mutex::new(FakeLog::default())),
            active: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    async fn open(&self) -> Result<Box<dyn PageDriver>, ScraperError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        Ok(Box::new(FakeDriver::with_log(
            Arc::clone(&self.site),
            Arc::clone(&self.log),
            Some(Arc::clone(&self.active)),
        )))
    }
}
