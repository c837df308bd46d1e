use std::io;
use thiserror::Error;

/// Error type for taskpro library operations
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Process {pid} not found")]
    NotFound { pid: u32 },

    #[error("Access denied: cannot {action} process {pid}")]
    AccessDenied { pid: u32, action: String },

    #[error("Cannot {action} '{name}' (PID: {pid}): this is a protected system process")]
    Forbidden {
        pid: u32,
        name: String,
        action: String,
    },

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for taskpro
pub type Result<T> = std::result::Result<T, TaskError>;

impl TaskError {
    pub fn not_found(pid: u32) -> Self {
        TaskError::NotFound { pid }
    }

    pub fn access_denied<S: Into<String>>(pid: u32, action: S) -> Self {
        TaskError::AccessDenied {
            pid,
            action: action.into(),
        }
    }

    pub fn forbidden<N: Into<String>, A: Into<String>>(pid: u32, name: N, action: A) -> Self {
        TaskError::Forbidden {
            pid,
            name: name.into(),
            action: action.into(),
        }
    }

    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        TaskError::Timeout(msg.into())
    }

    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        TaskError::Unsupported(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        TaskError::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TaskError::Other(msg.into())
    }

    /// True for failures caused by missing privileges rather than policy
    pub fn is_privilege_gap(&self) -> bool {
        matches!(self, TaskError::AccessDenied { .. })
    }
}
