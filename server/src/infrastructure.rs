use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    future::Future,
    sync::Arc,
};
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::{
    core::model::{Book, BookId, BookInfo},
    error::Result,
};

pub mod memory;
pub mod persistence;

pub use memory::MemoryStore;
pub use persistence::BookArchive;

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueId(pub Uuid);

impl UniqueId {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let UniqueId(id) = self;
        write!(f, "{id}")
    }
}

#[derive(Clone)]
pub struct Termination {
    signal: broadcast::Sender<()>,
}

impl Termination {
    pub fn new() -> Self {
        let (signal, _rx) = broadcast::channel(1);
        Self { signal }
    }

    pub fn waiter(&self) -> TerminationWaiter {
        TerminationWaiter::new(self.signal.subscribe())
    }

    pub fn signal(&self) {
        // Nobody listening means nobody left to stop.
        let _ = self.signal.send(());
    }
}

impl Default for Termination {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct TerminationWaiter(Arc<Mutex<broadcast::Receiver<()>>>);

impl TerminationWaiter {
    fn new(receiver: broadcast::Receiver<()>) -> Self {
        Self(Arc::new(Mutex::new(receiver)))
    }

    /// Resolves on the signal, or when the `Termination` is gone.
    pub async fn wait(&self) {
        let _ = self.0.lock().await.recv().await;
    }
}

/// Keyed storage for books. The store owns identifier assignment: an id it
/// hands out has never belonged to another book, live or deleted.
///
/// The methods spell out `Send` futures so that generic axum handlers can
/// hold them across awaits. Implementations are free to use `async fn`.
pub trait BookStore: Send + Sync + 'static {
    fn all(&self) -> impl Future<Output = Result<Vec<Book>>> + Send;

    fn find(&self, id: BookId) -> impl Future<Output = Result<Option<Book>>> + Send;

    fn insert(&self, info: BookInfo) -> impl Future<Output = Result<Book>> + Send;

    /// `None` when there is no book under `id`; nothing is written then.
    fn replace(
        &self,
        id: BookId,
        info: BookInfo,
    ) -> impl Future<Output = Result<Option<Book>>> + Send;

    /// `None` when there is no book under `id`. The id is retired otherwise.
    fn remove(&self, id: BookId) -> impl Future<Output = Result<Option<Book>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn waiters_wake_on_signal() {
        let termination = Termination::new();
        let waiter = termination.waiter();

        let waiting = tokio::spawn(async move { waiter.wait().await });
        termination.signal();

        waiting.await.expect("waiter to finish");
    }

    #[tokio::test]
    async fn waiters_wake_when_termination_is_dropped() {
        let termination = Termination::new();
        let waiter = termination.waiter();
        drop(termination);

        waiter.wait().await;
    }
}
