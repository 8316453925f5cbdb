use clap::Parser;
use std::{future, process};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

use server::{
    core::Catalog,
    error::Result,
    http,
    infrastructure::{BookArchive, BookStore, MemoryStore, Termination},
    settings::{Settings, StoreKind},
};

async fn serve<S>(store: S, settings: &Settings) -> Result<()>
where
    S: BookStore,
{
    let listener = TcpListener::bind(settings.listen).await?;
    info!(address = %settings.listen, store = ?settings.store, "bookshelf listening");

    let catalog = Catalog::new(store).with_timeout(settings.store_timeout());

    let terminator = Termination::new();
    let waiter = terminator.waiter();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("shutting down");
                terminator.signal();
            }
            Err(error) => {
                // Dropping the terminator would stop the server right away.
                warn!(%error, "no Ctrl-C handler, running until killed");
                future::pending::<()>().await;
            }
        }
    });

    http::Api::new(catalog).start(listener, waiter).await
}

async fn run(settings: Settings) -> Result<()> {
    match settings.store {
        StoreKind::Memory => serve(MemoryStore::new(), &settings).await,
        StoreKind::Fjall => serve(BookArchive::try_new(&settings.store_path)?, &settings).await,
    }
}

#[tokio::main]
async fn main() {
    let settings = Settings::parse();

    if settings.json_logs {
        tracing_subscriber::fmt().json().init();
    } else {
        tracing_subscriber::fmt::init();
    }

    if let Err(error) = run(settings).await {
        error!(%error, "bookshelf stopped");
        process::exit(1);
    }
}
