//! Reading one post from the viewer.

use instalens_core::{LikeCount, PostedAt};

use crate::driver::{wait_for_any, Locator, PageDriver};
use crate::error::ScraperError;
use crate::selectors::{self, comment_strategies, CommentStrategy};
use crate::timing::{pause, Timing};

/// Upper bound on load-more rounds for a single thread.
const MAX_LOAD_MORE_PASSES: usize = 500;

/// # Errors
///
/// Propagates driver errors. A missing or malformed timestamp is
/// [`PostedAt::Unknown`].
pub async fn read_posted_at(driver: &mut dyn PageDriver) -> Result<PostedAt, ScraperError> {
    let raw = driver
        .attribute(&selectors::POST_TIME, selectors::POST_TIME_ATTRIBUTE)
        .await?;
    Ok(PostedAt::from_attribute(raw.as_deref()))
}

/// # Errors
///
/// Propagates driver errors. A missing count is [`LikeCount::Hidden`].
pub async fn read_like_count(driver: &mut dyn PageDriver) -> Result<LikeCount, ScraperError> {
    let raw = driver.text(&selectors::LIKE_COUNT).await?;
    Ok(LikeCount::from_display(raw.as_deref()))
}

/// Collect the caption and every comment of the post at `sequence`.
///
/// Returns raw entries: the caption first (when its element exists),
/// then comments in display order.
///
/// # Errors
///
/// Returns [`ScraperError::Extraction`] when no thread layout resolves or the
/// driver fails mid-thread.
pub async fn extract_thread(
    driver: &mut dyn PageDriver,
    sequence: u32,
    timing: &Timing,
) -> Result<Vec<String>, ScraperError> {
    let extraction = |reason: String| ScraperError::Extraction {
        post: sequence,
        reason,
    };

    let strategies = comment_strategies(sequence);
    let containers: Vec<&Locator> = strategies.iter().map(|s| &s.container).collect();
    let matched = wait_for_any(
        driver,
        &containers,
        timing.comments_timeout,
        timing.poll_interval,
    )
    .await
    .map_err(|e| extraction(e.to_string()))?
    .ok_or_else(|| extraction("no comment container layout matched".to_string()))?;

    let strategy = strategies[matched];
    tracing::debug!(post = sequence, layout = strategy.name, "comment thread located");

    collect_entries(driver, strategy, timing)
        .await
        .map_err(|e| extraction(e.to_string()))
}

async fn collect_entries(
    driver: &mut dyn PageDriver,
    strategy: &CommentStrategy,
    timing: &Timing,
) -> Result<Vec<String>, ScraperError> {
    let mut entries = Vec::new();
    if let Some(caption) = driver.text(&strategy.caption).await? {
        entries.push(caption.trim().to_string());
    }

    let mut seen = 0usize;
    for _ in 0..MAX_LOAD_MORE_PASSES {
        let batch = driver.texts(&strategy.comment_items).await?;
        if batch.len() <= seen {
            break;
        }
        entries.extend(batch[seen..].iter().map(|c| c.trim().to_string()));
        seen = batch.len();

        if !driver.click(&strategy.load_more).await? {
            break;
        }
        pause(timing.after_load_more).await;
    }
    Ok(entries)
}
