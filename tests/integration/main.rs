//! End-to-end tests against running services
//!
//! Start the four services (and their Postgres and Redis) first, then run
//! `cargo test -- --ignored`. Endpoints default to the ports in
//! `.env.example` and can be overridden with `TEST_*_ENDPOINT`.

use catalog_services::proto::{
    author::{author_service_client::AuthorServiceClient, Author},
    book::{book_service_client::BookServiceClient, Book, BookRequest, BorrowRecord},
    category::{category_service_client::CategoryServiceClient, Category},
    user::{user_service_client::UserServiceClient, LoginRequest, RegisterRequest},
};
use reqwest::Client;
use serde_json::Value;
use tonic::{transport::Channel, Code, Request};
use uuid::Uuid;

fn endpoint(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

async fn users() -> UserServiceClient<Channel> {
    UserServiceClient::connect(endpoint("TEST_USER_ENDPOINT", "http://127.0.0.1:3000"))
        .await
        .expect("Failed to connect to user service")
}

async fn authors() -> AuthorServiceClient<Channel> {
    AuthorServiceClient::connect(endpoint("TEST_AUTHOR_ENDPOINT", "http://127.0.0.1:3001"))
        .await
        .expect("Failed to connect to author service")
}

async fn categories() -> CategoryServiceClient<Channel> {
    CategoryServiceClient::connect(endpoint("TEST_CATEGORY_ENDPOINT", "http://127.0.0.1:3002"))
        .await
        .expect("Failed to connect to category service")
}

async fn books() -> BookServiceClient<Channel> {
    BookServiceClient::connect(endpoint("TEST_BOOK_ENDPOINT", "http://127.0.0.1:3003"))
        .await
        .expect("Failed to connect to book service")
}

fn authed<T>(message: T, token: &str) -> Request<T> {
    let mut request = Request::new(message);
    request.metadata_mut().insert(
        "authorization",
        format!("Bearer {}", token).parse().unwrap(),
    );
    request
}

/// Register a fresh user and return a token for it
async fn login_new_user() -> String {
    let mut client = users().await;
    let email = format!("{}@ex.com", Uuid::new_v4().simple());

    client
        .register(RegisterRequest {
            name: "alice".to_string(),
            email: email.clone(),
            password: "pw1".to_string(),
        })
        .await
        .expect("Failed to register");

    client
        .login(LoginRequest {
            email,
            password: "pw1".to_string(),
        })
        .await
        .expect("Failed to login")
        .into_inner()
        .token
}

/// Create an author, a category and a book named `name`; returns the book id
async fn create_book(token: &str, name: &str) -> String {
    let author_id = authors()
        .await
        .create(authed(
            Author {
                name: "AA".to_string(),
                ..Default::default()
            },
            token,
        ))
        .await
        .expect("Failed to create author")
        .into_inner()
        .id;

    let category_id = categories()
        .await
        .create(authed(
            Category {
                name: "CC".to_string(),
                ..Default::default()
            },
            token,
        ))
        .await
        .expect("Failed to create category")
        .into_inner()
        .id;

    books()
        .await
        .create(authed(
            Book {
                name: name.to_string(),
                author_id,
                category_id,
                ..Default::default()
            },
            token,
        ))
        .await
        .expect("Failed to create book")
        .into_inner()
        .id
}

fn borrow(book_id: &str, token: &str) -> Request<BorrowRecord> {
    authed(
        BorrowRecord {
            book_id: book_id.to_string(),
            ..Default::default()
        },
        token,
    )
}

async fn get_book(id: &str, token: &str) -> Result<Book, tonic::Status> {
    books()
        .await
        .get(authed(
            Book {
                id: id.to_string(),
                ..Default::default()
            },
            token,
        ))
        .await
        .map(|r| r.into_inner())
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let url = endpoint("TEST_HEALTH_URL", "http://127.0.0.1:8080");
    let response = Client::new()
        .get(format!("{}/health", url))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_call_is_denied() {
    let status = books()
        .await
        .get_list(BookRequest::default())
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
}

#[tokio::test]
#[ignore]
async fn test_get_book_requires_token() {
    let token = login_new_user().await;
    let id = create_book(&token, "B1").await;

    let status = books()
        .await
        .get(Request::new(Book {
            id,
            ..Default::default()
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
}

#[tokio::test]
#[ignore]
async fn test_login_failures() {
    let mut client = users().await;
    let email = format!("{}@ex.com", Uuid::new_v4().simple());
    client
        .register(RegisterRequest {
            name: "bob".to_string(),
            email: email.clone(),
            password: "pw1".to_string(),
        })
        .await
        .unwrap();

    let status = client
        .login(LoginRequest {
            email: format!("nobody-{}", email),
            password: "pw1".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    let status = client
        .login(LoginRequest {
            email,
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
}

#[tokio::test]
#[ignore]
async fn test_register_login_and_create_book() {
    let token = login_new_user().await;
    let id = create_book(&token, "B1").await;

    let book = get_book(&id, &token).await.unwrap();
    assert_eq!(book.name, "B1");
    assert!(!book.is_borrowed);
    assert_eq!(book.borrows, 0);
}

#[tokio::test]
#[ignore]
async fn test_borrow_conflict_and_return() {
    let token = login_new_user().await;
    let id = create_book(&token, "B1").await;
    let mut client = books().await;

    client.borrow_book(borrow(&id, &token)).await.unwrap();

    let status = client.borrow_book(borrow(&id, &token)).await.unwrap_err();
    assert!(matches!(
        status.code(),
        Code::FailedPrecondition | Code::Aborted
    ));

    client.return_book(borrow(&id, &token)).await.unwrap();

    let book = get_book(&id, &token).await.unwrap();
    assert!(!book.is_borrowed);
    assert_eq!(book.borrows, 1);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrow_single_winner() {
    let t1 = login_new_user().await;
    let t2 = login_new_user().await;
    let id = create_book(&t1, "B1").await;

    let (mut c1, mut c2) = (books().await, books().await);
    let (r1, r2) = tokio::join!(
        c1.borrow_book(borrow(&id, &t1)),
        c2.borrow_book(borrow(&id, &t2)),
    );

    let (winner, loser, loser_result) = match (r1.is_ok(), r2.is_ok()) {
        (true, false) => (&t1, &t2, r2),
        (false, true) => (&t2, &t1, r1),
        other => panic!("expected exactly one winner, got {:?}", other),
    };
    assert!(matches!(
        loser_result.unwrap_err().code(),
        Code::FailedPrecondition | Code::Aborted
    ));

    let mut client = books().await;
    client.return_book(borrow(&id, winner)).await.unwrap();
    client.borrow_book(borrow(&id, loser)).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_update_visible_to_fresh_client() {
    let token = login_new_user().await;
    let id = create_book(&token, "B1").await;

    // warm the cache
    get_book(&id, &token).await.unwrap();

    books()
        .await
        .update(authed(
            Book {
                id: id.clone(),
                name: "B1 second edition".to_string(),
                ..Default::default()
            },
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(get_book(&id, &token).await.unwrap().name, "B1 second edition");
}

#[tokio::test]
#[ignore]
async fn test_delete_hides_book() {
    let token = login_new_user().await;
    let name = format!("doomed-{}", Uuid::new_v4().simple());
    let id = create_book(&token, &name).await;

    books()
        .await
        .delete(authed(
            Book {
                id: id.clone(),
                ..Default::default()
            },
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(get_book(&id, &token).await.unwrap_err().code(), Code::NotFound);

    let listed = books()
        .await
        .get_list(authed(BookRequest::default(), &token))
        .await
        .unwrap()
        .into_inner()
        .books;
    assert!(listed.iter().all(|b| b.id != id));
}

#[tokio::test]
#[ignore]
async fn test_recommendation_orders_by_borrows() {
    let token = login_new_user().await;
    let tag = Uuid::new_v4().simple().to_string();
    let b1 = create_book(&token, &format!("{}-B1", tag)).await;
    let b2 = create_book(&token, &format!("{}-B2", tag)).await;
    let mut client = books().await;

    for (id, times) in [(&b1, 3), (&b2, 1)] {
        for _ in 0..times {
            client.borrow_book(borrow(id, &token)).await.unwrap();
            client.return_book(borrow(id, &token)).await.unwrap();
        }
    }

    let recommended = client
        .get_recommendation(authed(BookRequest { search: tag }, &token))
        .await
        .unwrap()
        .into_inner()
        .books;
    let ids: Vec<&str> = recommended.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec![b1.as_str(), b2.as_str()]);
}
