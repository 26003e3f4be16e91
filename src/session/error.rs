use std::fmt;

use crate::api::ApiError;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    Api(ApiError),
    Store(StoreError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Api(err) => write!(f, "account request failed: {}", err),
            SessionError::Store(err) => write!(f, "store update failed: {}", err),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Api(err) => Some(err),
            SessionError::Store(err) => Some(err),
        }
    }
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        SessionError::Api(err)
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        SessionError::Store(err)
    }
}
