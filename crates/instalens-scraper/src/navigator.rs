//! Profile grid to post viewer, then post to post.

use instalens_core::ProfileTarget;

use crate::driver::{wait_for, wait_for_any, Locator, PageDriver};
use crate::error::ScraperError;
use crate::selectors::{self, FIRST_POST_STRATEGIES};
use crate::session::Diagnostics;
use crate::timing::{pause, Timing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The viewer now shows the next post.
    Next,
    /// No next-post control: the profile is exhausted.
    End,
}

/// Load the profile grid and open its first post in the viewer.
///
/// # Errors
///
/// Returns [`ScraperError::ProfileLoad`] when no first-post strategy matches
/// within the timeout or the click does not land. A screenshot is saved
/// first.
pub async fn open_profile(
    driver: &mut dyn PageDriver,
    target: &ProfileTarget,
    timing: &Timing,
    diagnostics: &Diagnostics,
) -> Result<(), ScraperError> {
    match open_first_post(driver, target, timing).await {
        Ok(strategy) => {
            tracing::debug!(profile = %target, strategy, "opened first post");
            Ok(())
        }
        Err(reason) => {
            diagnostics.capture(driver, "click_error").await;
            Err(ScraperError::ProfileLoad {
                profile: target.handle().to_string(),
                reason,
            })
        }
    }
}

async fn open_first_post(
    driver: &mut dyn PageDriver,
    target: &ProfileTarget,
    timing: &Timing,
) -> Result<&'static str, String> {
    driver
        .goto(target.url())
        .await
        .map_err(|e| e.to_string())?;
    pause(timing.page_settle).await;

    let tiles: Vec<&Locator> = FIRST_POST_STRATEGIES.iter().map(|s| &s.tile).collect();
    let matched = wait_for_any(
        driver,
        &tiles,
        timing.first_post_timeout,
        timing.poll_interval,
    )
    .await
    .map_err(|e| e.to_string())?
    .ok_or_else(|| {
        format!(
            "no first post within {}s",
            timing.first_post_timeout.as_secs()
        )
    })?;

    let strategy = &FIRST_POST_STRATEGIES[matched];
    pause(timing.page_settle).await;
    let clicked = driver
        .click(&strategy.tile)
        .await
        .map_err(|e| e.to_string())?;
    if !clicked {
        return Err(format!("first post tile ({}) vanished before click", strategy.name));
    }
    pause(timing.after_click).await;
    Ok(strategy.name)
}

/// Move the viewer to the next post.
///
/// # Errors
///
/// Propagates driver errors. A missing control is [`Advance::End`], not an
/// error.
pub async fn advance(driver: &mut dyn PageDriver, timing: &Timing) -> Result<Advance, ScraperError> {
    let present = wait_for(
        driver,
        &selectors::NEXT_POST,
        timing.next_post_timeout,
        timing.poll_interval,
    )
    .await?;
    if !present || !driver.click(&selectors::NEXT_POST).await? {
        return Ok(Advance::End);
    }
    pause(timing.after_advance.sample()).await;
    Ok(Advance::Next)
}
