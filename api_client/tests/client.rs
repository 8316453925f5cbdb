use api_client::{
    error::Error,
    model::{BookChanges, BookId, BookInfo},
    ApiClient, BlockingApiClient,
};
use std::{net::SocketAddr, time::Duration};
use tokio::{net::TcpListener, task};

use server::{
    core::Catalog,
    http::Api,
    infrastructure::{MemoryStore, Termination},
};

async fn start_server() -> (SocketAddr, Termination) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("a free port");
    let address = listener.local_addr().expect("a bound address");

    let termination = Termination::new();
    let waiter = termination.waiter();
    tokio::spawn(async move {
        Api::new(Catalog::new(MemoryStore::new()))
            .start(listener, waiter)
            .await
            .expect("the server to run")
    });

    (address, termination)
}

fn dune() -> BookInfo {
    BookInfo {
        title: "Dune".to_owned(),
        author: "Herbert".to_owned(),
        year: 1965,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn book_lifecycle_over_http() {
    let (address, termination) = start_server().await;
    let client = ApiClient::new(&format!("http://{address}/")).expect("a client");

    assert!(client.get_books().await.expect("a listing").is_empty());

    let created = client.add_book(&dune()).await.expect("a created book");
    assert_eq!(created.info, dune());
    assert_eq!(
        client.get_book(created.id).await.expect("the book"),
        created
    );

    let updated = client
        .update_book(
            created.id,
            &BookChanges {
                title: Some("Dune (50th Anniversary)".to_owned()),
                ..Default::default()
            },
        )
        .await
        .expect("an updated book");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.info.title, "Dune (50th Anniversary)");
    assert_eq!(updated.info.author, "Herbert");
    assert_eq!(updated.info.year, 1965);

    let confirmation = client.delete_book(created.id).await.expect("a deletion");
    assert_eq!(confirmation.message, "Book deleted successfully");

    let missing = client.get_book(created.id).await.expect_err("a missing book");
    assert!(missing.is_not_found());
    assert_eq!(missing.to_string(), "Book not found");

    termination.signal();
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_ids_surface_server_messages() {
    let (address, termination) = start_server().await;
    let client = ApiClient::new(&format!("http://{address}")).expect("a client");
    let stranger: BookId = "0f8b4c1e-2d1a-4c55-9a8e-6f1b2c3d4e5f".parse().expect("an id");

    let error = client.delete_book(stranger).await.expect_err("not found");
    assert!(error.is_not_found());

    let error = client
        .update_book(
            stranger,
            &BookChanges {
                year: Some(2000),
                ..Default::default()
            },
        )
        .await
        .expect_err("not found");
    assert!(error.is_not_found());

    termination.signal();
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_books_never_leave_the_client() {
    let (address, termination) = start_server().await;
    let client = ApiClient::new(&format!("http://{address}")).expect("a client");

    let error = client
        .add_book(&BookInfo {
            author: " ".to_owned(),
            ..dune()
        })
        .await
        .expect_err("a rejected book");

    assert!(matches!(error, Error::Invalid(..)));
    assert!(client.get_books().await.expect("a listing").is_empty());

    termination.signal();
}

#[tokio::test(flavor = "multi_thread")]
async fn blocking_client_speaks_the_same_contract() {
    let (address, termination) = start_server().await;
    let base_url = format!("http://{address}");

    let books = task::spawn_blocking(move || {
        let client = BlockingApiClient::new(&base_url).expect("a client");
        let created = client.add_book(&dune()).expect("a created book");
        client.get_book(created.id).expect("the book");
        client.get_books().expect("a listing")
    })
    .await
    .expect("the blocking calls to finish");

    assert_eq!(books.len(), 1);
    assert_eq!(books[0].info, dune());

    termination.signal();
}

#[tokio::test(flavor = "multi_thread")]
async fn silent_servers_time_out() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("a free port");
    let address = listener.local_addr().expect("a bound address");

    tokio::spawn(async move {
        let mut connections = vec![];
        while let Ok((connection, _)) = listener.accept().await {
            connections.push(connection);
        }
    });

    let client = ApiClient::with_timeout(&format!("http://{address}"), Duration::from_millis(100))
        .expect("a client");
    let error = client.get_books().await.expect_err("no answer");

    assert!(matches!(error, Error::Timeout), "got {error:?}");
}
