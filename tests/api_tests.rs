//! API integration tests
//!
//! These run against a live server (`cargo run`) with a database that has
//! an `admin`/`admin` staff account. Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

/// Helper to log in and get a bearer token
async fn get_token(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/login/", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Helper to register a fresh member and return (username, token, user id)
async fn register_member(client: &Client, prefix: &str) -> (String, String, i64) {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let username = format!("{}-{}", prefix, nanos);

    let response = client
        .post(format!("{}/register/", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "testpass"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse register response");
    let user_id = body["id"].as_i64().expect("No user id");

    let token = get_token(client, &username, "testpass").await;
    (username, token, user_id)
}

/// Helper to create an author, category and book as admin; returns the book id
async fn create_book(client: &Client, admin_token: &str, copies: i64) -> i64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();

    let response = client
        .post(format!("{}/authors/", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "name": format!("Author {}", nanos % 1_000_000_000),
            "bio": "Test author"
        }))
        .send()
        .await
        .expect("Failed to create author");
    assert_eq!(response.status(), 201);
    let author: Value = response.json().await.unwrap();

    // The category vocabulary is fixed, so the category may already exist
    let response = client
        .post(format!("{}/categories/", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({ "name": "FICTION" }))
        .send()
        .await
        .expect("Failed to create category");
    let category_id = if response.status() == 201 {
        let category: Value = response.json().await.unwrap();
        category["id"].as_i64().unwrap()
    } else {
        let response = client
            .get(format!("{}/categories/", BASE_URL))
            .header("Authorization", format!("Bearer {}", admin_token))
            .send()
            .await
            .unwrap();
        let categories: Value = response.json().await.unwrap();
        categories.as_array().unwrap()[0]["id"].as_i64().unwrap()
    };

    let response = client
        .post(format!("{}/books/", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "title": format!("Test Book {}", nanos),
            "description": "A book for testing",
            "author_id": author["id"].as_i64().unwrap(),
            "category_id": category_id,
            "total_copies": copies
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);

    let book: Value = response.json().await.unwrap();
    assert_eq!(book["available_copies"], book["total_copies"]);
    book["id"].as_i64().unwrap()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_and_login() {
    let client = Client::new();
    let (username, token, _) = register_member(&client, "login-test").await;

    let response = client
        .get(format!("{}/me/", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], username.as_str());
    assert_eq!(body["role"], "member");
    assert_eq!(body["penalty_points"], 0);
}

#[tokio::test]
#[ignore]
async fn test_register_duplicate_username() {
    let client = Client::new();
    let (username, _, _) = register_member(&client, "dup-test").await;

    let response = client
        .post(format!("{}/register/", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "otherpass"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/login/", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_manage_catalog() {
    let client = Client::new();
    let (_, token, _) = register_member(&client, "perm-test").await;

    let response = client
        .post(format!("{}/categories/", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": "HISTORY" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // Books are readable by any authenticated user
    let response = client
        .get(format!("{}/books/", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_penalty_access_rules() {
    let client = Client::new();
    let admin_token = get_token(&client, "admin", "admin").await;
    let (_, token_a, id_a) = register_member(&client, "penalty-a").await;
    let (_, token_b, id_b) = register_member(&client, "penalty-b").await;

    // Own penalty: ok, starts at zero
    let response = client
        .get(format!("{}/user/{}/penalty/", BASE_URL, id_a))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["penalty_points"], 0);

    // Another member's penalty: forbidden
    let response = client
        .get(format!("{}/user/{}/penalty/", BASE_URL, id_a))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // Staff may read anyone's
    let response = client
        .get(format!("{}/user/{}/penalty/", BASE_URL, id_b))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Unknown user id
    let response = client
        .get(format!("{}/user/999999999/penalty/", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_flow() {
    let client = Client::new();
    let admin_token = get_token(&client, "admin", "admin").await;
    let (_, token, _) = register_member(&client, "borrow-flow").await;

    let book_id = create_book(&client, &admin_token, 1).await;

    // Borrow the single copy
    let response = client
        .post(format!("{}/borrow/", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let borrow_id = body["borrow_id"].as_str().expect("No borrow id").to_string();

    // Book is now unavailable
    let response = client
        .get(format!("{}/books/{}/", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    let book: Value = response.json().await.unwrap();
    assert_eq!(book["available_copies"], 0);

    // A second borrow attempt fails with a client error
    let response = client
        .post(format!("{}/borrow/", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // The open borrow shows up in the list
    let response = client
        .get(format!("{}/borrow/", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    let borrows: Value = response.json().await.unwrap();
    assert_eq!(borrows.as_array().unwrap().len(), 1);

    // Return it; on-time return accrues no penalty
    let response = client
        .post(format!("{}/borrow/return/", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "borrow_id": borrow_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["penalty_points_added"], 0);

    // Availability is restored
    let response = client
        .get(format!("{}/books/{}/", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    let book: Value = response.json().await.unwrap();
    assert_eq!(book["available_copies"], 1);

    // Returning it again is a client error
    let response = client
        .post(format!("{}/borrow/return/", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "borrow_id": borrow_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_borrow_limit() {
    let client = Client::new();
    let admin_token = get_token(&client, "admin", "admin").await;
    let (_, token, _) = register_member(&client, "borrow-limit").await;

    let book_id = create_book(&client, &admin_token, 5).await;

    let mut first_borrow_id = String::new();
    for i in 0..3 {
        let response = client
            .post(format!("{}/borrow/", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "book_id": book_id }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
        if i == 0 {
            let body: Value = response.json().await.unwrap();
            first_borrow_id = body["borrow_id"].as_str().unwrap().to_string();
        }
    }

    // The fourth borrow is rejected
    let response = client
        .post(format!("{}/borrow/", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // After returning one, a new borrow succeeds
    let response = client
        .post(format!("{}/borrow/return/", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "borrow_id": first_borrow_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = client
        .post(format!("{}/borrow/", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_return_someone_elses_borrow() {
    let client = Client::new();
    let admin_token = get_token(&client, "admin", "admin").await;
    let (_, token_a, _) = register_member(&client, "owner").await;
    let (_, token_b, _) = register_member(&client, "intruder").await;

    let book_id = create_book(&client, &admin_token, 1).await;

    let response = client
        .post(format!("{}/borrow/", BASE_URL))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let borrow_id = body["borrow_id"].as_str().unwrap().to_string();

    // Another user cannot close it
    let response = client
        .post(format!("{}/borrow/return/", BASE_URL))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&json!({ "borrow_id": borrow_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // And the book stays checked out
    let response = client
        .get(format!("{}/books/{}/", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .unwrap();
    let book: Value = response.json().await.unwrap();
    assert_eq!(book["available_copies"], 0);
}

#[tokio::test]
#[ignore]
async fn test_return_malformed_borrow_id() {
    let client = Client::new();
    let (_, token, _) = register_member(&client, "malformed").await;

    let response = client
        .post(format!("{}/borrow/return/", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "borrow_id": "not-a-uuid" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_book_copy_accounting_on_update() {
    let client = Client::new();
    let admin_token = get_token(&client, "admin", "admin").await;

    let book_id = create_book(&client, &admin_token, 5).await;

    // Raising total_copies raises available_copies by the same delta
    let response = client
        .put(format!("{}/books/{}/", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({ "total_copies": 8 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let book: Value = response.json().await.unwrap();
    assert_eq!(book["total_copies"], 8);
    assert_eq!(book["available_copies"], 8);

    // Dropping below the reported available count is rejected
    let response = client
        .put(format!("{}/books/{}/", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({ "total_copies": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}
