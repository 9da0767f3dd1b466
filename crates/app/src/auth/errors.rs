//! Auth service errors.

use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum AuthServiceError {
    /// The API refused the credentials or registration.
    #[error("{0}")]
    Rejected(String),

    /// The API accepted the request but sent back no user.
    #[error("auth response did not include a user")]
    MissingUser,

    #[error("auth request failed")]
    Api(#[source] ApiError),
}

impl AuthServiceError {
    /// Map an API error, using `fallback` when the server gave no message.
    pub(crate) fn from_api(error: ApiError, fallback: &str) -> Self {
        match error {
            ApiError::Rejected { message, .. } if message.is_empty() => {
                Self::Rejected(fallback.to_string())
            }
            ApiError::Rejected { message, .. } => Self::Rejected(message),
            error @ ApiError::Http(_) => Self::Api(error),
        }
    }
}
