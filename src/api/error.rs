use std::fmt;

/// Failure talking to the remote card-database API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401: no authenticated session.
    Unauthorized,
    /// 404 on the given path.
    NotFound(String),
    /// Any other non-success status.
    Status { status: u16, message: String },
    /// Connection, timeout or other transport failure.
    Transport(String),
    /// The response body did not match the expected shape.
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "unauthorized"),
            ApiError::NotFound(path) => write!(f, "not found: {}", path),
            ApiError::Status { status, message } => {
                write!(f, "request failed with status {}: {}", status, message)
            }
            ApiError::Transport(message) => write!(f, "transport error: {}", message),
            ApiError::Decode(message) => write!(f, "decode failed: {}", message),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// HTTP status behind this error, if there was a response at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::NotFound(_) => Some(404),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }

    /// 401 and 404 mean "nothing there yet" on the identity and preference
    /// probes; callers log these at debug rather than surfacing them.
    pub fn is_expected_absence(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::NotFound(_))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
