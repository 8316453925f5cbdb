use reqwest::{blocking::Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::{error, model};

/// Same contract as [`crate::ApiClient`] for callers without a runtime.
#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> error::Result<Self> {
        Self::with_timeout(base_url, crate::ApiClient::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> error::Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn get_books(&self) -> error::Result<Vec<model::Book>> {
        self.request_resource(Method::GET, "/books")
    }

    pub fn get_book(&self, id: model::BookId) -> error::Result<model::Book> {
        self.request_resource(Method::GET, &format!("/books/{id}"))
    }

    pub fn add_book(&self, info: &model::BookInfo) -> error::Result<model::Book> {
        info.validate()?;
        self.send_resource(Method::POST, "/books", info)
    }

    pub fn update_book(
        &self,
        id: model::BookId,
        changes: &model::BookChanges,
    ) -> error::Result<model::Book> {
        changes.validate()?;
        self.send_resource(Method::PUT, &format!("/books/{id}"), changes)
    }

    pub fn delete_book(&self, id: model::BookId) -> error::Result<model::Confirmation> {
        self.request_resource(Method::DELETE, &format!("/books/{id}"))
    }

    fn send_resource<R, S>(&self, method: Method, uri: &str, resource: &R) -> error::Result<S>
    where
        R: Serialize,
        S: DeserializeOwned,
    {
        let request = self
            .http_client
            .request(method, self.resolve_resource_uri(uri))
            .json(resource)
            .build()?;
        self.execute(request)
    }

    fn request_resource<R>(&self, method: Method, uri: &str) -> error::Result<R>
    where
        R: DeserializeOwned,
    {
        let request = self
            .http_client
            .request(method, self.resolve_resource_uri(uri))
            .build()?;
        self.execute(request)
    }

    fn execute<R>(&self, request: reqwest::blocking::Request) -> error::Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self.http_client.execute(request)?;
        let status = response.status();
        let body = response.bytes()?;

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
