use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::{error, model};

#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
}

impl ApiClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: &str) -> error::Result<Self> {
        Self::with_timeout(base_url, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> error::Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub async fn get_books(&self) -> error::Result<Vec<model::Book>> {
        self.request_resource(Method::GET, "/books").await
    }

    pub async fn get_book(&self, id: model::BookId) -> error::Result<model::Book> {
        self.request_resource(Method::GET, &format!("/books/{id}"))
            .await
    }

    pub async fn add_book(&self, info: &model::BookInfo) -> error::Result<model::Book> {
        info.validate()?;
        self.send_resource(Method::POST, "/books", info).await
    }

    pub async fn update_book(
        &self,
        id: model::BookId,
        changes: &model::BookChanges,
    ) -> error::Result<model::Book> {
        changes.validate()?;
        self.send_resource(Method::PUT, &format!("/books/{id}"), changes)
            .await
    }

    pub async fn delete_book(&self, id: model::BookId) -> error::Result<model::Confirmation> {
        self.request_resource(Method::DELETE, &format!("/books/{id}"))
            .await
    }

    async fn send_resource<R, S>(
        &self,
        method: Method,
        uri: &str,
        resource: &R,
    ) -> error::Result<S>
    where
        R: Serialize,
        S: DeserializeOwned,
    {
        let request = self
            .http_client
            .request(method, self.resolve_resource_uri(uri))
            .json(resource)
            .build()?;
        self.execute(request).await
    }

    async fn request_resource<R>(&self, method: Method, uri: &str) -> error::Result<R>
    where
        R: DeserializeOwned,
    {
        let request = self
            .http_client
            .request(method, self.resolve_resource_uri(uri))
            .build()?;
        self.execute(request).await
    }

    async fn execute<R>(&self, request: reqwest::Request) -> error::Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self.http_client.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            Ok(serde_json::from_slice(&body)?)
        } else {
            Err(error::Error::from_failure(status, &body))
        }
    }

    fn resolve_resource_uri(&self, resource_uri: &str) -> String {
        format!("{}{resource_uri}", self.base_url)
    }
}
