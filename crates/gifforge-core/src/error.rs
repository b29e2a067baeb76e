//! Unified error type for the gifforge application.
//!
//! All crates funnel their failures into [`Error`], which carries enough
//! context for API handlers to derive an HTTP status code via
//! [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in gifforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request data failed validation (missing upload, empty file, bad body).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "artifact").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An external tool (ffmpeg, ffprobe) returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Media probing deemed the input unreadable.
    #[error("Probe error: {0}")]
    Probe(String),

    /// An encoding tier (or the whole tier chain) failed.
    #[error("Encode error [{tier}]: {message}")]
    Encode {
        /// The tier (or chain stage) that failed.
        tier: String,
        /// Human-readable error description.
        message: String,
    },

    /// An external tool exceeded its time budget.
    #[error("Tool {tool} timed out after {after_secs}s")]
    Timeout {
        /// Name of the tool that timed out.
        tool: String,
        /// The timeout that was exceeded, in seconds.
        after_secs: u64,
    },

    /// An expected output artifact is missing or empty.
    #[error("Resource error: {0}")]
    Resource(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound { .. } => 404,
            Error::Io { .. } => 500,
            Error::Tool { .. } => 502,
            Error::Probe(_) => 422,
            Error::Encode { .. } => 502,
            Error::Timeout { .. } => 504,
            Error::Resource(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Encode`].
    pub fn encode(tier: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Encode {
            tier: tier.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Timeout`].
    pub fn timeout(tool: impl Into<String>, after_secs: u64) -> Self {
        Error::Timeout {
            tool: tool.into(),
            after_secs,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
