use thiserror::Error;

/// Errors raised by the form and its prediction endpoint
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for FormError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FormError::InvalidResponse(err.to_string())
        } else {
            FormError::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, FormError>;
