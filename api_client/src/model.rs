use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BookId(pub Uuid);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(id) = self;
        write!(f, "{id}")
    }
}

impl FromStr for BookId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| Error::Invalid(format!("Invalid book ID `{s}`")))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: BookId,
    #[serde(flatten)]
    pub info: BookInfo,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BookInfo {
    pub title: String,
    pub author: String,
    pub year: i32,
}

impl BookInfo {
    pub fn validate(&self) -> Result<()> {
        require_text("Title", &self.title)?;
        require_text("Author", &self.author)?;
        require_positive_year(self.year)
    }
}

/// Fields left `None` are not sent and keep their value on the server.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BookChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl BookChanges {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            require_text("Title", title)?;
        }
        if let Some(author) = &self.author {
            require_text("Author", author)?;
        }
        self.year.map_or(Ok(()), require_positive_year)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.year.is_none()
    }

    /// The changes that turn `current` into `wanted`.
    pub fn between(current: &BookInfo, wanted: BookInfo) -> Self {
        let BookInfo {
            title,
            author,
            year,
        } = wanted;

        Self {
            title: (title != current.title).then_some(title),
            author: (author != current.author).then_some(author),
            year: (year != current.year).then_some(year),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Confirmation {
    pub message: String,
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::Invalid(format!("{field} cannot be empty")))
    } else {
        Ok(())
    }
}

fn require_positive_year(year: i32) -> Result<()> {
    if year > 0 {
        Ok(())
    } else {
        Err(Error::Invalid("Year must be a positive number".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dune() -> BookInfo {
        BookInfo {
            title: "Dune".to_owned(),
            author: "Herbert".to_owned(),
            year: 1965,
        }
    }

    #[test]
    fn books_decode_from_the_flat_wire_shape() {
        let book: Book = serde_json::from_value(json!({
            "id": "6f1b2c3d-4e5f-4a55-9a8e-0f8b4c1e2d1a",
            "title": "Dune",
            "author": "Herbert",
            "year": 1965,
        }))
        .expect("a book");

        assert_eq!(book.id.to_string(), "6f1b2c3d-4e5f-4a55-9a8e-0f8b4c1e2d1a");
        assert_eq!(book.info, dune());
    }

    #[test]
    fn changes_only_carry_what_differs() {
        let changes = BookChanges::between(
            &dune(),
            BookInfo {
                title: "Dune (50th Anniversary)".to_owned(),
                ..dune()
            },
        );

        assert_eq!(
            serde_json::to_value(&changes).expect("serializable"),
            json!({"title": "Dune (50th Anniversary)"})
        );
        assert!(BookChanges::between(&dune(), dune()).is_empty());
    }

    #[test]
    fn validation_matches_the_server_rules() {
        assert!(dune().validate().is_ok());
        assert!(BookInfo {
            title: " ".to_owned(),
            ..dune()
        }
        .validate()
        .is_err());
        assert!(BookInfo { year: 0, ..dune() }.validate().is_err());
        assert!(BookChanges {
            author: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn malformed_ids_are_rejected_locally() {
        assert!(matches!("42".parse::<BookId>(), Err(Error::Invalid(..))));
    }
}
