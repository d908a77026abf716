//! Waits, pauses, and human-like jitter used while driving the page.

use std::time::Duration;

use instalens_core::AppConfig;
use rand::Rng;

/// Inclusive random range of pause lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    pub min: Duration,
    pub max: Duration,
}

impl Jitter {
    #[must_use]
    pub const fn millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self::millis(0, 0)
    }

    /// Draw one duration. Synchronous so the thread-local RNG is never held
    /// across an await point.
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        #[allow(clippy::cast_possible_truncation)]
        let (lo, hi) = (self.min.as_millis() as u64, self.max.as_millis() as u64);
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}

#[derive(Debug, Clone)]
pub struct Timing {
    pub poll_interval: Duration,
    pub page_settle: Duration,
    pub login_timeout: Duration,
    pub first_post_timeout: Duration,
    pub next_post_timeout: Duration,
    pub comments_timeout: Duration,
    pub keystroke: Jitter,
    pub between_fields: Jitter,
    pub before_submit: Jitter,
    pub after_click: Duration,
    pub after_advance: Jitter,
    pub after_load_more: Duration,
}

impl Timing {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            page_settle: config.page_settle(),
            login_timeout: config.login_timeout(),
            first_post_timeout: config.first_post_timeout(),
            next_post_timeout: config.next_post_timeout(),
            comments_timeout: config.comments_timeout(),
            keystroke: Jitter::millis(20, 140),
            between_fields: Jitter::millis(500, 1200),
            before_submit: Jitter::millis(500, 1000),
            after_click: Duration::from_secs(3),
            after_advance: Jitter::millis(3000, 5000),
            after_load_more: Duration::from_secs(2),
        }
    }

    /// No waiting at all; every lookup is checked once.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            poll_interval: Duration::ZERO,
            page_settle: Duration::ZERO,
            login_timeout: Duration::ZERO,
            first_post_timeout: Duration::ZERO,
            next_post_timeout: Duration::ZERO,
            comments_timeout: Duration::ZERO,
            keystroke: Jitter::none(),
            between_fields: Jitter::none(),
            before_submit: Jitter::none(),
            after_click: Duration::ZERO,
            after_advance: Jitter::none(),
            after_load_more: Duration::ZERO,
        }
    }
}

pub(crate) async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
