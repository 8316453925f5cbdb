use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    infrastructure::UniqueId,
};

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookId(pub UniqueId);

impl BookId {
    pub fn fresh() -> Self {
        Self(UniqueId::fresh())
    }
}

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
            .map(|id| Self(UniqueId(id)))
            .map_err(|_| Error::InvalidIdentifier(s.to_owned()))
    }
}

impl From<BookId> for Uuid {
    fn from(BookId(UniqueId(id)): BookId) -> Self {
        id
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    pub title: String,
    pub author: String,
    pub year: i32,
}

impl BookInfo {
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("author", &self.author)?;
        require_positive_year(self.year)
    }

    /// Fields missing from `changes` keep their current values.
    pub fn amended(self, changes: BookChanges) -> Self {
        let BookChanges {
            title,
            author,
            year,
        } = changes;

        Self {
            title: title.unwrap_or(self.title),
            author: author.unwrap_or(self.author),
            year: year.unwrap_or(self.year),
        }
    }
}

/// The body of an update. An `id` in the payload is not part of it and is
/// dropped during decoding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl BookChanges {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(author) = &self.author {
            require_text("author", author)?;
        }
        if let Some(year) = self.year {
            require_positive_year(year)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Book(pub BookId, pub BookInfo);

impl Book {
    pub fn id(&self) -> BookId {
        let Self(id, _) = self;
        *id
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::validation(format!("Field `{field}` must not be empty")))
    } else {
        Ok(())
    }
}

fn require_positive_year(year: i32) -> Result<()> {
    if year > 0 {
        Ok(())
    } else {
        Err(Error::validation("Field `year` must be a positive number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> BookInfo {
        BookInfo {
            title: "Dune".to_owned(),
            author: "Herbert".to_owned(),
            year: 1965,
        }
    }

    #[test]
    fn blank_text_is_rejected() {
        let info = BookInfo {
            title: "   ".to_owned(),
            ..dune()
        };
        assert!(matches!(info.validate(), Err(Error::Validation(..))));

        let info = BookInfo {
            author: String::new(),
            ..dune()
        };
        assert!(matches!(info.validate(), Err(Error::Validation(..))));
    }

    #[test]
    fn year_must_be_positive() {
        let info = BookInfo { year: 0, ..dune() };
        assert!(matches!(info.validate(), Err(Error::Validation(..))));

        let changes = BookChanges {
            year: Some(-12),
            ..Default::default()
        };
        assert!(matches!(changes.validate(), Err(Error::Validation(..))));
    }

    #[test]
    fn amend_keeps_omitted_fields() {
        let amended = dune().amended(BookChanges {
            title: Some("Dune (50th Anniversary)".to_owned()),
            ..Default::default()
        });

        assert_eq!(amended.title, "Dune (50th Anniversary)");
        assert_eq!(amended.author, "Herbert");
        assert_eq!(amended.year, 1965);
    }

    #[test]
    fn changes_ignore_a_supplied_id() {
        let changes: BookChanges = serde_json::from_str(
            r#"{"id":"0f8b4c1e-2d1a-4c55-9a8e-6f1b2c3d4e5f","year":1966}"#,
        )
        .expect("a decodable body");

        assert_eq!(
            changes,
            BookChanges {
                year: Some(1966),
                ..Default::default()
            }
        );
    }

    #[test]
    fn identifiers_parse_from_text() {
        let id = BookId::fresh();
        assert_eq!(id.to_string().parse::<BookId>().ok(), Some(id));
        assert!(matches!(
            "not-an-id".parse::<BookId>(),
            Err(Error::InvalidIdentifier(..))
        ));
    }
}
