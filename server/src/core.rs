use std::{future::Future, time::Duration};
use tokio::time;
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    infrastructure::BookStore,
};
use model::{Book, BookChanges, BookId, BookInfo};

pub mod model;

/// Owns the book collection: every read and mutation goes through here,
/// against the store it was constructed with.
pub struct Catalog<S> {
    store: S,
    timeout: Duration,
}

impl<S> Catalog<S>
where
    S: BookStore,
{
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(store: S) -> Self {
        Self {
            store,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub async fn list(&self) -> Result<Vec<Book>> {
        self.bounded(self.store.all()).await
    }

    pub async fn create(&self, info: BookInfo) -> Result<Book> {
        info.validate()?;
        let book = self.bounded(self.store.insert(info)).await?;
        info!(id = %book.id(), "book created");
        Ok(book)
    }

    pub async fn read(&self, id: BookId) -> Result<Book> {
        debug!(%id, "reading book");
        self.existing(id, self.store.find(id)).await
    }

    pub async fn update(&self, id: BookId, changes: BookChanges) -> Result<Book> {
        changes.validate()?;
        let Book(id, current) = self.read(id).await?;

        // The book may be deleted between the read and the write; `replace`
        // reports that instead of recreating it.
        let book = self
            .existing(id, self.store.replace(id, current.amended(changes)))
            .await?;

        info!(%id, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: BookId) -> Result<()> {
        self.existing(id, self.store.remove(id)).await?;
        info!(%id, "book deleted");
        Ok(())
    }

    async fn existing<F>(&self, id: BookId, lookup: F) -> Result<Book>
    where
        F: Future<Output = Result<Option<Book>>>,
    {
        self.bounded(lookup).await?.ok_or(Error::NotFound(id))
    }

    async fn bounded<F, A>(&self, operation: F) -> Result<A>
    where
        F: Future<Output = Result<A>>,
    {
        time::timeout(self.timeout, operation)
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
    }
}
