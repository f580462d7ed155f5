//! Agent error types
//!
//! Conversational failures (body parse, encoding) are folded into text replies
//! by the router; the rest surface as HTTP errors.

use hyper::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Descriptor missing or corrupt
    #[error("{0}")]
    ConfigLoad(String),

    /// Request body is not valid JSON
    #[error("Invalid JSON: {0}")]
    RequestParse(#[from] serde_json::Error),

    /// Image generation failed
    #[error("{0}")]
    Encoding(String),

    /// Request body could not be read
    #[error("{0}")]
    BodyRead(String),

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl AgentError {
    /// HTTP status used when the error is surfaced rather than folded into a reply
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ConfigLoad(_) | Self::BodyRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RequestParse(_) | Self::Encoding(_) => StatusCode::OK,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
