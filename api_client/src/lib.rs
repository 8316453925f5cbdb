pub mod blocking;
pub mod client;
pub mod error;
pub mod model;

pub use blocking::ApiClient as BlockingApiClient;
pub use client::ApiClient;
