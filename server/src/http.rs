use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use std::{result::Result as StdResult, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::{
    core::{model as domain, Catalog},
    error::{Error, Result},
    infrastructure::{BookStore, TerminationWaiter},
};

pub mod model;

type ApiResult<A> = StdResult<A, ApiError>;

type SharedCatalog<S> = Arc<Catalog<S>>;
pub struct Api<S>(SharedCatalog<S>);

impl<S> Api<S>
where
    S: BookStore,
{
    pub fn new(catalog: Catalog<S>) -> Self {
        Self(Arc::new(catalog))
    }

    pub fn router(self) -> Router {
        let Self(catalog) = self;
        routing_configuration()
            .with_state(catalog)
            .layer(TraceLayer::new_for_http())
    }

    pub async fn start(self, listener: TcpListener, termination: TerminationWaiter) -> Result<()> {
        Ok(axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { termination.wait().await })
            .await?)
    }
}

fn routing_configuration<S>() -> Router<SharedCatalog<S>>
where
    S: BookStore,
{
    Router::new()
        .route("/", get(system_root::<S>))
        .route("/books", get(books::list::<S>).post(books::create::<S>))
        .route(
            "/books/:id",
            get(books::get::<S>)
                .put(books::update::<S>)
                .delete(books::delete::<S>),
        )
}

struct ApiError(Error);

impl ApiError {
    fn status(&self) -> StatusCode {
        let Self(error) = self;
        match error {
            Error::Validation(..) | Error::InvalidIdentifier(..) => StatusCode::BAD_REQUEST,
            Error::NotFound(..) => StatusCode::NOT_FOUND,
            Error::Timeout(..) => StatusCode::GATEWAY_TIMEOUT,
            Error::Json(..) | Error::Storage(..) | Error::IoError(..) | Error::Task(..) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let Self(error) = self;

        let message = if error.is_store_failure() {
            error!(%error, "store failure");
            "Book store failure".to_owned()
        } else {
            error.to_string()
        };

        (status, Json(model::ErrorBody { error: message })).into_response()
    }
}

// Bodies are decoded by hand so that every malformed one gets the same
// 400 with an error body, whatever its content type.
fn decode<A>(body: &Bytes) -> Result<A>
where
    A: DeserializeOwned,
{
    serde_json::from_slice(body)
        .map_err(|error| Error::validation(format!("Invalid request body: {error}")))
}

fn resource_location(id: domain::BookId) -> String {
    format!("/books/{id}")
}

mod books {
    use super::*;

    pub async fn get<S>(
        State(catalog): State<SharedCatalog<S>>,
        Path(id): Path<String>,
    ) -> ApiResult<Json<model::Book>>
    where
        S: BookStore,
    {
        Ok(Json(catalog.read(id.parse::<domain::BookId>()?).await?.into()))
    }

    pub async fn list<S>(
        State(catalog): State<SharedCatalog<S>>,
    ) -> ApiResult<Json<Vec<model::Book>>>
    where
        S: BookStore,
    {
        Ok(Json(
            catalog
                .list()
                .await?
                .into_iter()
                .map(|b| b.into())
                .collect(),
        ))
    }

    pub async fn create<S>(
        State(catalog): State<SharedCatalog<S>>,
        body: Bytes,
    ) -> ApiResult<Response>
    where
        S: BookStore,
    {
        let model::NewBook(info) = decode(&body)?;
        let book = catalog.create(info).await?;

        Ok((
            StatusCode::CREATED,
            [(header::LOCATION, resource_location(book.id()))],
            Json(model::Book::from(book)),
        )
            .into_response())
    }

    pub async fn update<S>(
        State(catalog): State<SharedCatalog<S>>,
        Path(id): Path<String>,
        body: Bytes,
    ) -> ApiResult<Json<model::Book>>
    where
        S: BookStore,
    {
        let id = id.parse::<domain::BookId>()?;
        let model::BookChanges(changes) = decode(&body)?;

        Ok(Json(catalog.update(id, changes).await?.into()))
    }

    pub async fn delete<S>(
        State(catalog): State<SharedCatalog<S>>,
        Path(id): Path<String>,
    ) -> ApiResult<Json<model::Confirmation>>
    where
        S: BookStore,
    {
        catalog.delete(id.parse::<domain::BookId>()?).await?;
        Ok(Json(model::Confirmation::new("Book deleted successfully")))
    }
}

async fn system_root<S>(State(_catalog): State<SharedCatalog<S>>) -> ApiResult<String>
where
    S: BookStore,
{
    Ok("Bookshelf 0.1 running.".to_owned())
}
