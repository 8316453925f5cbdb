use anyhow::Result;
use clap::{Args, Subcommand};
use std::{
    fmt,
    io::{BufRead, Write},
};
use tabled::{Table, Tabled};

use super::{domain, prompt::Prompt};

#[derive(Subcommand)]
pub enum Command {
    /// List every book in the catalog
    #[command(alias = "list")]
    Fetch,

    /// Show a single book
    Show {
        #[arg(long, help = "ID of the book")]
        id: String,
    },

    /// Add a book, asking for whatever is not given
    Create(BookDraft),

    /// Change a book, asking for whatever is not given
    Update {
        #[arg(long, help = "ID of the book to update")]
        id: Option<String>,

        #[command(flatten)]
        draft: BookDraft,
    },

    /// Remove a book
    Delete {
        #[arg(long, help = "ID of the book to delete")]
        id: Option<String>,
    },
}

#[derive(Args, Default)]
pub struct BookDraft {
    #[arg(long, help = "Title of the book")]
    pub title: Option<String>,

    #[arg(long, help = "Author of the book")]
    pub author: Option<String>,

    #[arg(long, help = "Publication year of the book")]
    pub year: Option<i32>,
}

impl BookDraft {
    pub fn complete<R, W>(
        self,
        prompt: &mut Prompt<R, W>,
        this_year: i32,
    ) -> Result<domain::BookInfo>
    where
        R: BufRead,
        W: Write,
    {
        let Self {
            title,
            author,
            year,
        } = self;

        let title = match title {
            Some(title) => title,
            None => prompt.text("Enter book title", None)?,
        };
        let author = match author {
            Some(author) => author,
            None => prompt.text("Enter book author", None)?,
        };
        let year = match year {
            Some(year) => year,
            None => prompt.year("Enter publication year", this_year)?,
        };

        Ok(domain::BookInfo {
            title,
            author,
            year,
        })
    }

    /// Like `complete`, with the current values as the defaults.
    pub fn amend<R, W>(
        self,
        prompt: &mut Prompt<R, W>,
        current: &domain::BookInfo,
    ) -> Result<domain::BookInfo>
    where
        R: BufRead,
        W: Write,
    {
        let Self {
            title,
            author,
            year,
        } = self;

        let title = match title {
            Some(title) => title,
            None => prompt.text("Enter new title", Some(&current.title))?,
        };
        let author = match author {
            Some(author) => author,
            None => prompt.text("Enter new author", Some(&current.author))?,
        };
        let year = match year {
            Some(year) => year,
            None => prompt.year("Enter new publication year", current.year)?,
        };

        Ok(domain::BookInfo {
            title,
            author,
            year,
        })
    }
}

pub struct Book(pub domain::Book);

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(domain::Book {
            id,
            info:
                domain::BookInfo {
                    title,
                    author,
                    year,
                },
        }) = self;

        writeln!(f, "{title} ({year})")?;
        writeln!(f, "by {author}")?;
        write!(f, "[Book ID {id}]")
    }
}

impl From<domain::Book> for Book {
    fn from(value: domain::Book) -> Self {
        Self(value)
    }
}

#[derive(Tabled)]
struct BookRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Year")]
    year: i32,
}

impl From<domain::Book> for BookRow {
    fn from(
        domain::Book {
            id,
            info:
                domain::BookInfo {
                    title,
                    author,
                    year,
                },
        }: domain::Book,
    ) -> Self {
        Self {
            id: id.to_string(),
            title,
            author,
            year,
        }
    }
}

pub fn book_table(books: Vec<domain::Book>) -> String {
    Table::new(books.into_iter().map(BookRow::from)).to_string()
}
