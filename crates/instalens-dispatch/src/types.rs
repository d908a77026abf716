//! Wire types for the GitHub Actions REST endpoints in use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inputs declared by the scraper workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchInputs {
    /// Comma-separated profile identifiers.
    pub profile_url: String,
    /// `YYYY-MM-DD`.
    pub start_date: String,
    /// `YYYY-MM-DD`.
    pub end_date: String,
    /// Operator name.
    pub username: String,
    pub artifact_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DispatchRequest<'a> {
    #[serde(rename = "ref")]
    pub git_ref: &'a str,
    pub inputs: &'a DispatchInputs,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowRun {
    pub id: i64,
    pub status: String,
    #[serde(default)]
    pub conclusion: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub html_url: String,
}

impl WorkflowRun {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowRunsResponse {
    #[serde(default)]
    pub workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artifact {
    pub id: i64,
    pub name: String,
    pub archive_download_url: String,
    #[serde(default)]
    pub expired: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtifactsResponse {
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}
