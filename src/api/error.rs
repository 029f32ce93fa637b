use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failures talking to the lessons API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network or transport failure before a response arrived
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status
    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// The body could not be parsed into the expected shape
    #[error("Unexpected response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// Short message suitable for showing in a view
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { status, message, .. } if message.is_empty() => format!("HTTP {}", status),
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
