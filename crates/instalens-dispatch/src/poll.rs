//! Polling primitives: the run state machine, run selection, and an
//! injectable sleep.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::WorkflowRun;

/// Runs created this long before the dispatch call still count as ours.
pub const RUN_CLOCK_SKEW_SECS: i64 = 60;

/// Where a dispatched workflow stands from the client's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Dispatched,
    Polling { attempt: u32 },
    Completed(WorkflowRun),
    TimedOut { polls: u32 },
}

/// Pause between polls. Tests swap in an implementation that returns
/// immediately.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Newest run created at or after `dispatched_at` minus the clock skew.
#[must_use]
pub fn select_run(runs: Vec<WorkflowRun>, dispatched_at: DateTime<Utc>) -> Option<WorkflowRun> {
    let earliest = dispatched_at - chrono::Duration::seconds(RUN_CLOCK_SKEW_SECS);
    runs.into_iter()
        .filter(|run| run.created_at >= earliest)
        .max_by_key(|run| run.created_at)
}
