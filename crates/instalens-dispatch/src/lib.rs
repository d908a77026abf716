//! Remote execution of the scraper through a GitHub Actions workflow.
//!
//! [`DispatchClient`] triggers the workflow with the run's inputs, polls
//! until the run completes, then downloads the uploaded artifact and parses
//! the single CSV inside it.

mod archive;
mod client;
mod config;
mod error;
mod poll;
mod retry;
mod types;

pub use archive::{extract_single_csv, rows_from_archive};
pub use client::{artifact_name, DispatchClient};
pub use config::DispatchConfig;
pub use error::DispatchError;
pub use poll::{select_run, RunState, Sleeper, TokioSleeper, RUN_CLOCK_SKEW_SECS};
pub use types::{Artifact, DispatchInputs, WorkflowRun};
