use clap::{Parser, ValueEnum};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Books live in process memory and vanish on exit
    Memory,
    /// Books are kept in a fjall keyspace on disk
    Fjall,
}

#[derive(Debug, Parser)]
#[command(name = "bookshelf-server")]
#[command(about = "Serves the book catalog over HTTP")]
pub struct Settings {
    #[arg(
        long,
        env = "BOOKSHELF_LISTEN",
        default_value = "0.0.0.0:8080",
        help = "Address to accept connections on"
    )]
    pub listen: SocketAddr,

    #[arg(long, env = "BOOKSHELF_STORE", value_enum, default_value_t = StoreKind::Fjall)]
    pub store: StoreKind,

    #[arg(
        long,
        env = "BOOKSHELF_STORE_PATH",
        default_value = "book-store",
        help = "Directory of the fjall keyspace"
    )]
    pub store_path: PathBuf,

    #[arg(
        long,
        env = "BOOKSHELF_TIMEOUT_SECS",
        default_value_t = 10,
        help = "Upper bound for a single store call"
    )]
    pub timeout_secs: u64,

    #[arg(long, env = "BOOKSHELF_JSON_LOGS", help = "Log as JSON lines")]
    pub json_logs: bool,
}

impl Settings {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
