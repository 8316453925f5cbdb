use serde::{Deserialize, Serialize};

use crate::core::model as domain;

/// A book on the wire: `{"id", "title", "author", "year"}`.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: domain::BookId,
    #[serde(flatten)]
    pub info: domain::BookInfo,
}

impl From<domain::Book> for Book {
    fn from(domain::Book(id, info): domain::Book) -> Self {
        Self { id, info }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewBook(pub domain::BookInfo);

#[derive(Debug, Serialize, Deserialize)]
pub struct BookChanges(pub domain::BookChanges);

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    pub message: String,
}

impl Confirmation {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
