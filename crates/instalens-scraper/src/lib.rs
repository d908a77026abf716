pub mod assemble;
pub mod chromium;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod navigator;
pub mod orchestrator;
pub mod pipeline;
pub mod selectors;
pub mod session;
pub mod timing;
pub mod window;

#[cfg(test)]
mod fake;

pub use assemble::{assemble_rows, split_hashtags, PostMeta, PostRecord};
pub use chromium::{ChromiumDriver, ChromiumSessionFactory};
pub use driver::{BrowserCookie, Locator, PageDriver, SessionFactory};
pub use error::{AuthError, ScraperError};
pub use navigator::Advance;
pub use orchestrator::{intermediate_path, Orchestrator, ProfileOutcome, RunReport};
pub use pipeline::{scrape_profile, ProfileScrape, ScrapeSettings};
pub use session::{load_cookie_file, SessionCredentials};
pub use timing::{Jitter, Timing};
pub use window::{decide, WindowDecision, GRACE_POSTS};
