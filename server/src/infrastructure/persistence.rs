use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::{Deserialize, Serialize};
use tokio::task;
use uuid::Uuid;

use crate::{
    core::model::{Book, BookId, BookInfo},
    error,
    infrastructure::{BookStore, UniqueId},
};

#[derive(Serialize, Deserialize)]
struct ArchivedBook(BookInfo);

impl ArchivedBook {
    fn as_json(&self) -> error::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn from_slice(bytes: &[u8]) -> error::Result<Self> {
        Ok(Self(serde_json::from_slice(bytes)?))
    }

    fn into_book(self, id: BookId) -> Book {
        let Self(info) = self;
        Book(id, info)
    }
}

impl From<BookInfo> for ArchivedBook {
    fn from(value: BookInfo) -> Self {
        Self(value)
    }
}

struct BookKey(Uuid);

impl BookKey {
    fn from_slice(bytes: &[u8]) -> error::Result<BookId> {
        Uuid::from_slice(bytes)
            .map(|id| BookId(UniqueId(id)))
            .map_err(|_| {
                error::Error::IoError(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "corrupt book key",
                ))
            })
    }
}

impl From<BookId> for BookKey {
    fn from(id: BookId) -> Self {
        Self(id.into())
    }
}

impl AsRef<[u8]> for BookKey {
    fn as_ref(&self) -> &[u8] {
        let Self(id) = self;
        id.as_bytes()
    }
}

/// Durable book store on a fjall keyspace.
#[derive(Clone)]
pub struct BookArchive(Arc<BookArchiveInner>);

impl BookArchive {
    pub fn try_new<P>(store_path: P) -> error::Result<Self>
    where
        P: AsRef<Path>,
    {
        Ok(Self(Arc::new(BookArchiveInner::try_open(
            Keyspace::open(Config::new(store_path))?,
        )?)))
    }

    fn inner(&self) -> &BookArchiveInner {
        let Self(x) = self;
        x
    }

    /// fjall calls block, `SyncAll` included, so they run off the runtime.
    async fn run<F, A>(&self, work: F) -> error::Result<A>
    where
        F: FnOnce(&BookArchiveInner) -> error::Result<A> + Send + 'static,
        A: Send + 'static,
    {
        let Self(inner) = self;
        let inner = Arc::clone(inner);
        task::spawn_blocking(move || work(&inner)).await?
    }
}

pub struct BookArchiveInner {
    keyspace: Keyspace,
    books: PartitionHandle,
    retired: PartitionHandle,
    // Held from the existence check through the write of every mutation.
    writing: Mutex<()>,
}

impl BookArchiveInner {
    pub fn try_open(keyspace: Keyspace) -> error::Result<Self> {
        let books = keyspace.open_partition("books", PartitionCreateOptions::default())?;
        let retired = keyspace.open_partition("retired", PartitionCreateOptions::default())?;

        Ok(Self {
            keyspace,
            books,
            retired,
            writing: Mutex::new(()),
        })
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // Guards no data.
        self.writing.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn unused_id(&self) -> error::Result<BookId> {
        loop {
            let id = BookId::fresh();
            let key = BookKey::from(id);
            if !self.books.contains_key(&key)? && !self.retired.contains_key(&key)? {
                break Ok(id);
            }
        }
    }

    fn find_book(&self, id: BookId) -> error::Result<Option<Book>> {
        if let Some(bytes) = self.books.get(BookKey::from(id))? {
            Ok(Some(ArchivedBook::from_slice(&bytes)?.into_book(id)))
        } else {
            Ok(None)
        }
    }

    fn find_all(&self) -> error::Result<Vec<Book>> {
        let mut books = vec![];

        for pair in self.books.iter() {
            let (key, value) = pair?;
            let id = BookKey::from_slice(&key)?;
            books.push(ArchivedBook::from_slice(&value)?.into_book(id));
        }

        Ok(books)
    }

    fn insert_book(&self, info: BookInfo) -> error::Result<Book> {
        let _writing = self.lock_writes();
        let id = self.unused_id()?;
        self.write(id, &info)?;
        Ok(Book(id, info))
    }

    fn replace_book(&self, id: BookId, info: BookInfo) -> error::Result<Option<Book>> {
        let _writing = self.lock_writes();
        if self.books.contains_key(BookKey::from(id))? {
            self.write(id, &info)?;
            Ok(Some(Book(id, info)))
        } else {
            Ok(None)
        }
    }

    fn remove_book(&self, id: BookId) -> error::Result<Option<Book>> {
        let _writing = self.lock_writes();
        if let Some(book) = self.find_book(id)? {
            self.retire(id)?;
            Ok(Some(book))
        } else {
            Ok(None)
        }
    }

    fn write(&self, id: BookId, info: &BookInfo) -> error::Result<()> {
        let archived = ArchivedBook::from(info.clone());
        self.books
            .insert(BookKey::from(id).as_ref(), archived.as_json()?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn retire(&self, id: BookId) -> error::Result<()> {
        let mut batch = self.keyspace.batch();
        let key = BookKey::from(id);

        batch.remove(&self.books, key.as_ref());
        batch.insert(&self.retired, key.as_ref(), b"".as_slice());
        batch.commit()?;

        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

impl BookStore for BookArchive {
    async fn all(&self) -> error::Result<Vec<Book>> {
        self.run(|inner| inner.find_all()).await
    }

    async fn find(&self, id: BookId) -> error::Result<Option<Book>> {
        self.run(move |inner| inner.find_book(id)).await
    }

    async fn insert(&self, info: BookInfo) -> error::Result<Book> {
        self.run(move |inner| inner.insert_book(info)).await
    }

    async fn replace(&self, id: BookId, info: BookInfo) -> error::Result<Option<Book>> {
        self.run(move |inner| inner.replace_book(id, info)).await
    }

    async fn remove(&self, id: BookId) -> error::Result<Option<Book>> {
        self.run(move |inner| inner.remove_book(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    use crate::core::Catalog;

    fn book_info(title: &str, year: i32) -> BookInfo {
        BookInfo {
            title: title.to_owned(),
            author: "Tolkien".to_owned(),
            year,
        }
    }

    #[tokio::test]
    async fn books_survive_reopening() -> error::Result<()> {
        let directory = TempDir::new()?;

        let (hobbit, silmarillion) = {
            let archive = BookArchive::try_new(directory.path())?;
            let hobbit = archive.insert(book_info("The Hobbit", 1937)).await?;
            let silmarillion = archive.insert(book_info("The Silmarillion", 1977)).await?;
            (hobbit, silmarillion)
        };

        let archive = BookArchive::try_new(directory.path())?;
        assert_eq!(archive.find(hobbit.id()).await?, Some(hobbit.clone()));

        let mut all = archive.all().await?;
        all.sort_by_key(|Book(_, info)| info.year);
        assert_eq!(all, vec![hobbit, silmarillion]);

        Ok(())
    }

    #[tokio::test]
    async fn removed_books_stay_removed_and_retired() -> error::Result<()> {
        let directory = TempDir::new()?;
        let archive = BookArchive::try_new(directory.path())?;

        let book = archive.insert(book_info("Farmer Giles of Ham", 1949)).await?;
        assert_eq!(archive.remove(book.id()).await?, Some(book.clone()));
        assert_eq!(archive.remove(book.id()).await?, None);
        assert_eq!(
            archive
                .replace(book.id(), book_info("Farmer Giles", 1949))
                .await?,
            None
        );

        assert_eq!(archive.find(book.id()).await?, None);
        assert!(archive
            .inner()
            .retired
            .contains_key(BookKey::from(book.id()))?);

        Ok(())
    }

    #[tokio::test]
    async fn replace_rewrites_the_record_in_place() -> error::Result<()> {
        let directory = TempDir::new()?;
        let archive = BookArchive::try_new(directory.path())?;

        let Book(id, _) = archive.insert(book_info("The Hobit", 1937)).await?;
        let fixed = archive.replace(id, book_info("The Hobbit", 1937)).await?;

        assert_eq!(fixed, Some(Book(id, book_info("The Hobbit", 1937))));
        assert_eq!(archive.all().await?.len(), 1);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_mutations_never_bring_a_book_back() -> error::Result<()> {
        let directory = TempDir::new()?;
        let archive = BookArchive::try_new(directory.path())?;

        for _ in 0..100 {
            let Book(id, _) = archive.insert(book_info("Roverandom", 1998)).await?;

            let replacing = {
                let archive = archive.clone();
                let info = book_info("Roverandom", 1925);
                tokio::spawn(async move { archive.replace(id, info).await })
            };
            let removals = [archive.clone(), archive.clone()]
                .map(|archive| tokio::spawn(async move { archive.remove(id).await }));

            replacing.await??;
            let mut removed = 0;
            for removal in removals {
                if removal.await??.is_some() {
                    removed += 1;
                }
            }

            assert_eq!(removed, 1);
            assert_eq!(archive.find(id).await?, None);
        }

        Ok(())
    }

    #[tokio::test]
    async fn blocked_writes_time_out() -> error::Result<()> {
        let directory = TempDir::new()?;
        let archive = BookArchive::try_new(directory.path())?;
        let catalog = Catalog::new(archive.clone()).with_timeout(Duration::from_millis(50));

        let held = archive.inner().lock_writes();
        let outcome = catalog.create(book_info("Smith of Wootton Major", 1967)).await;
        drop(held);

        assert!(matches!(outcome, Err(error::Error::Timeout(..))));
        Ok(())
    }
}
