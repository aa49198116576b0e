//! Error types for sqlite MCP

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqliteMcpError {
    /// Statement shape does not match the operation
    #[error("{0}")]
    Validation(String),

    /// SQLite rejected the statement or the connection could not be opened
    #[error("{0}")]
    Execution(#[from] rusqlite::Error),

    /// The blocking task running a statement panicked or was cancelled
    #[error("query task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// The database file or its directory could not be prepared
    #[error("failed to prepare database at {}: {source}", .path.display())]
    Startup {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),

    #[error("mcp error: {0}")]
    Protocol(String),
}

impl From<rmcp::ErrorData> for SqliteMcpError {
    fn from(err: rmcp::ErrorData) -> Self {
        SqliteMcpError::Protocol(err.message.to_string())
    }
}

impl SqliteMcpError {
    pub(crate) fn startup(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SqliteMcpError::Startup {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SqliteMcpError>;
