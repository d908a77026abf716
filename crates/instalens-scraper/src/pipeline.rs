//! One profile, start to finish, on an already-open driver.

use std::collections::HashSet;
use std::path::PathBuf;

use instalens_core::{CommentRow, DateWindow, LikeCount, PostedAt, ProfileTarget};

use crate::assemble::{assemble_rows, PostMeta, PostRecord};
use crate::driver::PageDriver;
use crate::error::ScraperError;
use crate::extractor::{extract_thread, read_like_count, read_posted_at};
use crate::navigator::{advance, open_profile, Advance};
use crate::session::{establish, Diagnostics, SessionCredentials};
use crate::timing::Timing;
use crate::window::decide;

/// Settings shared by every profile of a run.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub base_url: String,
    pub timing: Timing,
    pub diagnostics_dir: PathBuf,
    /// Where per-profile intermediate tables are written.
    pub work_dir: PathBuf,
}

/// Result of walking one profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileScrape {
    pub rows: Vec<CommentRow>,
    pub posts_visited: u32,
}

/// Authenticate, open the profile, and walk posts until the date window or
/// the grid runs out.
///
/// Post-level failures stay with the post: an unreadable date or like count
/// falls back to unknown or hidden, and a thread that cannot be extracted
/// contributes no rows. The caller owns `driver` and must close it.
///
/// # Errors
///
/// Returns profile-fatal errors: authentication, first-post load, or a
/// driver failure while locating or advancing posts.
pub async fn scrape_profile(
    driver: &mut dyn PageDriver,
    target: &ProfileTarget,
    window: &DateWindow,
    credentials: &SessionCredentials,
    settings: &ScrapeSettings,
) -> Result<ProfileScrape, ScraperError> {
    let timing = &settings.timing;
    let diagnostics = Diagnostics {
        dir: settings.diagnostics_dir.clone(),
        profile: target.handle().to_string(),
    };

    establish(driver, credentials, &settings.base_url, timing, &diagnostics).await?;
    open_profile(driver, target, timing, &diagnostics).await?;

    let mut scrape = ProfileScrape::default();
    let mut seen_urls = HashSet::new();
    let mut sequence = 1u32;

    loop {
        let url = driver.current_url().await?;
        if !seen_urls.insert(url.clone()) {
            tracing::warn!(profile = %target, post = sequence, url, "viewer did not move, ending traversal");
            break;
        }
        scrape.posts_visited = sequence;

        let posted_at = read_posted_at(driver).await.unwrap_or_else(|e| {
            tracing::warn!(profile = %target, post = sequence, error = %e, "could not read post date");
            PostedAt::Unknown
        });
        let decision = decide(&posted_at, sequence, window);
        if decision.stop {
            tracing::info!(
                profile = %target,
                post = sequence,
                date = %posted_at.date_cell(),
                "post predates window, stopping"
            );
            break;
        }

        let like_count = read_like_count(driver).await.unwrap_or_else(|e| {
            tracing::warn!(profile = %target, post = sequence, error = %e, "could not read like count");
            LikeCount::Hidden
        });
        let entries = if decision.extract {
            match extract_thread(driver, sequence, timing).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(profile = %target, post = sequence, error = %e, "skipping comments");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let record = PostRecord::from_entries(
            PostMeta {
                url,
                sequence_number: sequence,
                posted_at,
                like_count,
            },
            entries,
        );
        let rows = assemble_rows(&record, target.handle());
        tracing::debug!(
            profile = %target,
            post = sequence,
            in_window = decision.extract,
            rows = rows.len(),
            "post processed"
        );
        scrape.rows.extend(rows);

        match advance(driver, timing).await? {
            Advance::Next => sequence += 1,
            Advance::End => {
                tracing::info!(profile = %target, posts = sequence, "reached last post");
                break;
            }
        }
    }

    Ok(scrape)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
