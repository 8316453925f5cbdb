use std::{io, time::Duration};

use thiserror::Error;
use tokio::task;

use crate::core::model::BookId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Book not found")]
    NotFound(BookId),

    #[error("Invalid book ID `{0}`")]
    InvalidIdentifier(String),

    #[error("Store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Failed to marshall json data {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage failure {0}")]
    Storage(#[from] fjall::Error),

    #[error("IO error {0}")]
    IoError(#[from] io::Error),

    #[error("Store task failed {0}")]
    Task(#[from] task::JoinError),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Store failures are the ones a caller can do nothing about.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::Json(..) | Self::Storage(..) | Self::IoError(..) | Self::Task(..)
        )
    }
}

pub type Result<A> = std::result::Result<A, Error>;
