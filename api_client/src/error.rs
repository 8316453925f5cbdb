use reqwest::StatusCode;
use serde::Deserialize;
use std::result::Result as StdResult;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON marshalling failed {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP IO failed {0}")]
    Http(reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("{message}")]
    Server { status: StatusCode, message: String },

    #[error("{0}")]
    Invalid(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl Error {
    /// Builds the error for a non-2xx answer. The server's `{"error": ..}`
    /// message wins; a body that does not decode leaves the status text.
    pub fn from_failure(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .map(|ErrorBody { error }| error)
            .unwrap_or_else(|_| status.to_string());

        Self::Server { status, message }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(value)
        }
    }
}

pub type Result<A> = StdResult<A, Error>;
