pub mod app_config;
pub mod config;
pub mod profile;
pub mod rows;
pub mod table;
pub mod timestamp;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, LoginCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use profile::{DateWindow, ProfileError, ProfileTarget};
pub use rows::{
    AnnotatedCommentRow, CommentRow, SentimentLabel, TableRow, ANNOTATED_COLUMNS, COMMENT_COLUMNS,
};
pub use table::{parse_rows, read_table, write_rows, write_table, TableError};
pub use timestamp::{LikeCount, PostedAt};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
