//! Bounded fan-out across profiles and merge of their tables.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use instalens_core::{read_table, write_table, CommentRow, DateWindow, ProfileTarget};

use crate::driver::SessionFactory;
use crate::error::ScraperError;
use crate::pipeline::{scrape_profile, ScrapeSettings};
use crate::session::SessionCredentials;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOutcome {
    Succeeded {
        profile: String,
        posts_visited: u32,
        rows: usize,
    },
    Failed {
        profile: String,
        reason: String,
    },
}

impl ProfileOutcome {
    #[must_use]
    pub fn profile(&self) -> &str {
        match self {
            Self::Succeeded { profile, .. } | Self::Failed { profile, .. } => profile,
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Combined table plus one outcome per requested profile.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Grouped by profile, in completion order.
    pub rows: Vec<CommentRow>,
    pub outcomes: Vec<ProfileOutcome>,
}

impl RunReport {
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// True when profiles were requested and none succeeded.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.failed_count() == self.outcomes.len()
    }
}

struct ProfileArtifact {
    table: Option<PathBuf>,
    posts_visited: u32,
}

pub struct Orchestrator {
    factory: Arc<dyn SessionFactory>,
    credentials: Arc<SessionCredentials>,
    settings: Arc<ScrapeSettings>,
    max_concurrent: usize,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        factory: Arc<dyn SessionFactory>,
        credentials: SessionCredentials,
        settings: ScrapeSettings,
        max_concurrent: usize,
    ) -> Self {
        Self {
            factory,
            credentials: Arc::new(credentials),
            settings: Arc::new(settings),
            max_concurrent,
        }
    }

    /// Worker budget for `profile_count` profiles, never zero.
    #[must_use]
    pub fn concurrency_for(&self, profile_count: usize) -> usize {
        self.max_concurrent.min(profile_count).max(1)
    }

    /// Scrape every profile and merge the results.
    ///
    /// Each profile runs in its own task with its own session; a failure or
    /// panic in one is recorded in its outcome and never reaches siblings.
    pub async fn run(&self, profiles: &[ProfileTarget], window: DateWindow) -> RunReport {
        let workers = self.concurrency_for(profiles.len());
        tracing::info!(profiles = profiles.len(), workers, window = %window.label(), "starting scrape run");

        let results: Vec<(ProfileTarget, Result<ProfileArtifact, String>)> =
            stream::iter(profiles.iter().cloned().enumerate())
                .map(|(slot, target)| {
                    let factory = Arc::clone(&self.factory);
                    let credentials = Arc::clone(&self.credentials);
                    let settings = Arc::clone(&self.settings);
                    async move {
                        let task = tokio::spawn(run_profile(
                            factory,
                            credentials,
                            settings,
                            target.clone(),
                            window,
                            slot,
                        ));
                        let result = match task.await {
                            Ok(Ok(artifact)) => Ok(artifact),
                            Ok(Err(e)) => Err(e.to_string()),
                            Err(join_err) => Err(format!("profile task aborted: {join_err}")),
                        };
                        (target, result)
                    }
                })
                .buffer_unordered(workers)
                .collect()
                .await;

        let mut report = RunReport::default();
        for (target, result) in results {
            let outcome = match result.and_then(|artifact| fold_artifact(&mut report.rows, artifact)) {
                Ok((posts_visited, rows)) => {
                    tracing::info!(profile = %target, posts_visited, rows, "profile complete");
                    ProfileOutcome::Succeeded {
                        profile: target.handle().to_string(),
                        posts_visited,
                        rows,
                    }
                }
                Err(reason) => {
                    tracing::error!(profile = %target, error = %reason, "profile failed");
                    ProfileOutcome::Failed {
                        profile: target.handle().to_string(),
                        reason,
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        let failed = report.failed_count();
        if failed > 0 {
            tracing::warn!(failed, total = profiles.len(), "some profiles failed");
        }
        report
    }
}

/// Read a profile's intermediate table into `rows` and delete the file.
fn fold_artifact(
    rows: &mut Vec<CommentRow>,
    artifact: ProfileArtifact,
) -> Result<(u32, usize), String> {
    let Some(path) = artifact.table else {
        return Ok((artifact.posts_visited, 0));
    };
    let table: Vec<CommentRow> = read_table(&path).map_err(|e| e.to_string())?;
    if let Err(e) = std::fs::remove_file(&path) {
        tracing::warn!(path = %path.display(), error = %e, "could not delete intermediate table");
    }
    let count = table.len();
    rows.extend(table);
    Ok((artifact.posts_visited, count))
}

async fn run_profile(
    factory: Arc<dyn SessionFactory>,
    credentials: Arc<SessionCredentials>,
    settings: Arc<ScrapeSettings>,
    target: ProfileTarget,
    window: DateWindow,
    slot: usize,
) -> Result<ProfileArtifact, ScraperError> {
    let mut driver = factory.open().await?;
    let result = scrape_profile(driver.as_mut(), &target, &window, &credentials, &settings).await;
    if let Err(e) = driver.close().await {
        tracing::warn!(profile = %target, error = %e, "browser did not close cleanly");
    }
    let scrape = result?;

    let table = if scrape.rows.is_empty() {
        None
    } else {
        let path = intermediate_path(&settings.work_dir, &window, &target, slot);
        std::fs::create_dir_all(&settings.work_dir)?;
        write_table(&path, &scrape.rows)?;
        Some(path)
    };

    Ok(ProfileArtifact {
        table,
        posts_visited: scrape.posts_visited,
    })
}

/// `MM-DD_MM-DD_<handle>_<slot>.csv` under `work_dir`. `slot` is the
/// profile's position in the run, so a handle listed twice gets two files.
#[must_use]
pub fn intermediate_path(
    work_dir: &Path,
    window: &DateWindow,
    target: &ProfileTarget,
    slot: usize,
) -> PathBuf {
    work_dir.join(format!("{}_{}_{slot}.csv", window.label(), target.handle()))
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
