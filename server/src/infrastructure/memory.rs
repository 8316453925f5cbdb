use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::{
    core::model::{Book, BookId, BookInfo},
    error::Result,
};

use super::BookStore;

#[derive(Default)]
struct Shelf {
    books: HashMap<BookId, BookInfo>,
    retired: HashSet<BookId>,
}

impl Shelf {
    fn unused_id(&self) -> BookId {
        loop {
            let id = BookId::fresh();
            if !self.books.contains_key(&id) && !self.retired.contains(&id) {
                break id;
            }
        }
    }
}

/// Books held in process memory, gone with the process.
#[derive(Default)]
pub struct MemoryStore(RwLock<Shelf>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookStore for MemoryStore {
    async fn all(&self) -> Result<Vec<Book>> {
        let Self(shelf) = self;
        Ok(shelf
            .read()
            .await
            .books
            .iter()
            .map(|(id, info)| Book(*id, info.clone()))
            .collect())
    }

    async fn find(&self, id: BookId) -> Result<Option<Book>> {
        let Self(shelf) = self;
        Ok(shelf
            .read()
            .await
            .books
            .get(&id)
            .map(|info| Book(id, info.clone())))
    }

    async fn insert(&self, info: BookInfo) -> Result<Book> {
        let Self(shelf) = self;
        let mut shelf = shelf.write().await;
        let id = shelf.unused_id();
        shelf.books.insert(id, info.clone());
        Ok(Book(id, info))
    }

    async fn replace(&self, id: BookId, info: BookInfo) -> Result<Option<Book>> {
        let Self(shelf) = self;
        let mut shelf = shelf.write().await;
        if let Some(current) = shelf.books.get_mut(&id) {
            *current = info.clone();
            Ok(Some(Book(id, info)))
        } else {
            Ok(None)
        }
    }

    async fn remove(&self, id: BookId) -> Result<Option<Book>> {
        let Self(shelf) = self;
        let mut shelf = shelf.write().await;
        if let Some(info) = shelf.books.remove(&id) {
            shelf.retired.insert(id);
            Ok(Some(Book(id, info)))
        } else {
            Ok(None)
        }
    }
}
