use thiserror::Error;

/// Error classes surfaced by the client library.
///
/// Network covers both transport failures and non-OK responses (the backend's
/// `error` field is carried through when present). Validation is raised before
/// a request is issued; State when an operation makes no sense for the current
/// local state (e.g. changing duration with nothing active).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("state error: {0}")]
    State(String),
}

impl ClientError {
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
