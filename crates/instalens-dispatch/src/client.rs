//! HTTP client for the GitHub Actions endpoints that run the scraper
//! remotely: trigger a workflow, wait for it, and pull its artifact.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use instalens_core::CommentRow;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::archive::rows_from_archive;
use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::poll::{select_run, RunState, Sleeper, TokioSleeper};
use crate::retry::retry_with_backoff;
use crate::types::{
    Artifact, ArtifactsResponse, DispatchInputs, DispatchRequest, WorkflowRun,
    WorkflowRunsResponse,
};

const DEFAULT_BASE_URL: &str = "https://api.github.com/";
const API_VERSION: &str = "2022-11-28";

/// Client for one repository workflow.
///
/// Use [`DispatchClient::new`] for production or
/// [`DispatchClient::with_base_url`] to point at a mock server in tests.
pub struct DispatchClient {
    client: Client,
    token: String,
    base_url: Url,
    repo: String,
    workflow: String,
    git_ref: String,
    poll_interval: Duration,
    max_polls: u32,
    max_retries: u32,
    backoff_base_ms: u64,
    sleeper: Arc<dyn Sleeper>,
}

impl DispatchClient {
    /// # Errors
    ///
    /// Returns [`DispatchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &DispatchConfig) -> Result<Self, DispatchError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`DispatchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`DispatchError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(config: &DispatchConfig, base_url: &str) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("instalens/0.1 (workflow-dispatch)")
            .build()?;

        // Trailing slash so `join` appends instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| DispatchError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            token: config.token.clone(),
            base_url,
            repo: config.repo.clone(),
            workflow: config.workflow.clone(),
            git_ref: config.git_ref.clone(),
            poll_interval: config.poll_interval(),
            max_polls: config.max_polls,
            max_retries: 3,
            backoff_base_ms: 1_000,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Trigger the workflow. Returns the time just before the request was
    /// sent, which [`DispatchClient::wait_for_completion`] uses to find the
    /// run.
    ///
    /// Not retried: a dispatch that reached the server but timed out may
    /// already have started a run.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Api`] for any status other than 204 and
    /// [`DispatchError::Http`] on network failure.
    pub async fn dispatch(&self, inputs: &DispatchInputs) -> Result<DateTime<Utc>, DispatchError> {
        let url = self.api_url(
            &format!(
                "repos/{}/actions/workflows/{}/dispatches",
                self.repo, self.workflow
            ),
            &[],
        )?;
        let body = DispatchRequest {
            git_ref: &self.git_ref,
            inputs,
        };

        let dispatched_at = Utc::now();
        let response = self.authorized(self.client.post(url)).json(&body).send().await?;
        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            repo = %self.repo,
            workflow = %self.workflow,
            artifact = %inputs.artifact_name,
            "workflow dispatched"
        );
        Ok(dispatched_at)
    }

    /// The newest run of the workflow created since `dispatched_at`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the runs list cannot be fetched.
    pub async fn latest_run(
        &self,
        dispatched_at: DateTime<Utc>,
    ) -> Result<Option<WorkflowRun>, DispatchError> {
        let url = self.api_url(
            &format!("repos/{}/actions/workflows/{}/runs", self.repo, self.workflow),
            &[("event", "workflow_dispatch"), ("per_page", "20")],
        )?;
        let runs: WorkflowRunsResponse = self.get_json(url).await?;
        Ok(select_run(runs.workflow_runs, dispatched_at))
    }

    /// Poll until the run dispatched at `dispatched_at` completes.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::WorkflowTimeout`] once `max_polls` polls have
    /// passed without a completed run, or the first non-transient API error.
    pub async fn wait_for_completion(
        &self,
        dispatched_at: DateTime<Utc>,
    ) -> Result<WorkflowRun, DispatchError> {
        let mut state = RunState::Dispatched;
        loop {
            state = match state {
                RunState::Dispatched => RunState::Polling { attempt: 1 },
                RunState::Polling { attempt } => {
                    match self.latest_run(dispatched_at).await? {
                        Some(run) if run.is_completed() => RunState::Completed(run),
                        observed => {
                            tracing::debug!(
                                attempt,
                                status = observed.as_ref().map_or("not started", |r| r.status.as_str()),
                                "workflow still running"
                            );
                            if attempt >= self.max_polls {
                                RunState::TimedOut { polls: attempt }
                            } else {
                                self.sleeper.sleep(self.poll_interval).await;
                                RunState::Polling {
                                    attempt: attempt + 1,
                                }
                            }
                        }
                    }
                }
                RunState::Completed(run) => {
                    tracing::info!(
                        run_id = run.id,
                        conclusion = run.conclusion.as_deref().unwrap_or("unknown"),
                        "workflow completed"
                    );
                    return Ok(run);
                }
                RunState::TimedOut { polls } => {
                    return Err(DispatchError::WorkflowTimeout { polls });
                }
            };
        }
    }

    /// The live artifact called `name`, if it has been uploaded.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the artifact list cannot be fetched.
    pub async fn find_artifact(&self, name: &str) -> Result<Option<Artifact>, DispatchError> {
        let url = self.api_url(
            &format!("repos/{}/actions/artifacts", self.repo),
            &[("name", name), ("per_page", "100")],
        )?;
        let listing: ArtifactsResponse = self.get_json(url).await?;
        Ok(listing
            .artifacts
            .into_iter()
            .filter(|a| a.name == name && !a.expired)
            .max_by_key(|a| a.id))
    }

    /// Wait for the artifact called `name`, download it, and parse the CSV
    /// inside.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::ArtifactNotFound`] after `max_polls` polls,
    /// [`DispatchError::Archive`]/[`DispatchError::Table`] for a bad archive,
    /// or the first non-transient API error.
    pub async fn fetch_artifact_csv(&self, name: &str) -> Result<Vec<CommentRow>, DispatchError> {
        let mut attempt = 1u32;
        let artifact = loop {
            if let Some(artifact) = self.find_artifact(name).await? {
                break artifact;
            }
            if attempt >= self.max_polls {
                return Err(DispatchError::ArtifactNotFound {
                    name: name.to_string(),
                    polls: attempt,
                });
            }
            tracing::debug!(attempt, artifact = name, "artifact not uploaded yet");
            self.sleeper.sleep(self.poll_interval).await;
            attempt += 1;
        };

        let bytes = self.download(&artifact.archive_download_url).await?;
        let rows = rows_from_archive(&bytes)?;
        tracing::info!(artifact = name, rows = rows.len(), "artifact downloaded");
        Ok(rows)
    }

    /// Dispatch, wait, and collect the resulting rows.
    ///
    /// # Errors
    ///
    /// Any error from the three steps.
    pub async fn dispatch_and_collect(
        &self,
        inputs: &DispatchInputs,
    ) -> Result<Vec<CommentRow>, DispatchError> {
        let dispatched_at = self.dispatch(inputs).await?;
        self.wait_for_completion(dispatched_at).await?;
        self.fetch_artifact_csv(&inputs.artifact_name).await
    }

    fn api_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, DispatchError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| DispatchError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(ACCEPT, "application/vnd.github+json")
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, DispatchError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.authorized(self.client.get(url.clone())).send().await?;
                let status = response.status();
                let body = response.text().await?;
                if !status.is_success() {
                    return Err(DispatchError::Api {
                        status: status.as_u16(),
                        body,
                    });
                }
                serde_json::from_str(&body).map_err(|e| DispatchError::Deserialize {
                    context: url.to_string(),
                    source: e,
                })
            }
        })
        .await
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, DispatchError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self.authorized(self.client.get(url)).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(DispatchError::Api {
                    status: status.as_u16(),
                    body,
                });
            }
            Ok(response.bytes().await?.to_vec())
        })
        .await
    }
}

/// `scraped_data_<operator>_<6 hex>`, unique per dispatch.
///
/// Characters GitHub rejects in artifact names are replaced with `_`.
#[must_use]
pub fn artifact_name(operator: &str) -> String {
    let operator: String = operator
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("scraped_data_{operator}_{}", &suffix[..6])
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
