use api_client::{error::Error, model as domain};

/// The raw text of the book dialog.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub year: String,
}

impl BookForm {
    pub fn from_book(info: &domain::BookInfo) -> Self {
        Self {
            title: info.title.clone(),
            author: info.author.clone(),
            year: info.year.to_string(),
        }
    }

    pub fn parse(self) -> Result<domain::BookInfo, Error> {
        let Self {
            title,
            author,
            year,
        } = self;

        let year = year
            .trim()
            .parse()
            .map_err(|_| Error::Invalid("Please enter a valid number for the year".to_owned()))?;
        let info = domain::BookInfo {
            title: title.trim().to_owned(),
            author: author.trim().to_owned(),
            year,
        };

        info.validate()?;
        Ok(info)
    }
}
