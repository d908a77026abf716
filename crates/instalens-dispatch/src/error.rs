use thiserror::Error;

/// Errors returned by the workflow dispatch client.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an unexpected status.
    #[error("GitHub API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("workflow did not complete after {polls} polls")]
    WorkflowTimeout { polls: u32 },

    #[error("artifact '{name}' did not appear after {polls} polls")]
    ArtifactNotFound { name: String, polls: u32 },

    #[error("artifact archive error: {0}")]
    Archive(String),

    #[error("artifact table error: {0}")]
    Table(#[from] instalens_core::TableError),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
