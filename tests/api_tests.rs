//! API integration tests
//!
//! Run against a live server with a migrated database:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique numeric suffix so tests never collide on unique columns
fn unique() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

/// Register a librarian account and log in with it
async fn staff_token(client: &Client) -> String {
    let username = format!("lib{}", unique());

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.org", username),
            "password": "testpass",
            "confirm_password": "testpass",
            "role": "librarian"
        }))
        .send()
        .await
        .expect("Failed to register staff account");
    assert_eq!(response.status(), 201);

    login(client, &username, "testpass").await
}

async fn login(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Catalog a book with the given stock, returning its id
async fn create_book(client: &Client, token: &str, quantity: i32) -> i64 {
    let isbn = format!("{:013}", unique() % 10_000_000_000_000);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Test Book",
            "author": "Test Author",
            "isbn": isbn,
            "price": "12.50",
            "quantity": quantity
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse book response");
    body["id"].as_i64().expect("No book ID")
}

/// Register a student (with their login identity), returning (id, email)
async fn create_student(client: &Client, token: &str) -> (i64, String) {
    let n = unique();
    let email = format!("student{}@example.org", n);

    let response = client
        .post(format!("{}/students", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": "Test Student",
            "email": email,
            "phone": format!("{:010}", n % 10_000_000_000),
            "address": "1 Library Lane",
            "password": "studpass",
            "confirm_password": "studpass"
        }))
        .send()
        .await
        .expect("Failed to create student");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse student response");
    (body["id"].as_i64().expect("No student ID"), email)
}

async fn issue(client: &Client, token: &str, student_id: i64, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "student_id": student_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send issue request")
}

async fn return_loan(client: &Client, token: &str, assignment_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/loans/{}/return", BASE_URL, assignment_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send return request")
}

async fn book_quantity(client: &Client, token: &str, book_id: i64) -> i64 {
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to get book");
    let body: Value = response.json().await.expect("Failed to parse book");
    body["quantity"].as_i64().expect("No quantity")
}

#[tokio::test]
#[ignore]
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
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "nobody",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_register_student_gets_exactly_one_role() {
    let client = Client::new();
    let username = format!("stud{}", unique());

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.org", username),
            "password": "testpass",
            "confirm_password": "testpass",
            "role": "student"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], "student");

    // The new identity can log in and carries the student role
    let token = login(&client, &username, "testpass").await;
    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], "student");
}

#[tokio::test]
#[ignore]
async fn test_register_password_mismatch() {
    let client = Client::new();
    let username = format!("mis{}", unique());

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.org", username),
            "password": "testpass",
            "confirm_password": "other",
            "role": "student"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_student_cannot_use_staff_endpoints() {
    let client = Client::new();
    let username = format!("stud{}", unique());

    client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.org", username),
            "password": "testpass",
            "confirm_password": "testpass",
            "role": "student"
        }))
        .send()
        .await
        .expect("Failed to register");
    let token = login(&client, &username, "testpass").await;

    for path in ["/books", "/students", "/loans"] {
        let response = client
            .get(format!("{}{}", BASE_URL, path))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 403, "expected 403 for {}", path);
    }
}

#[tokio::test]
#[ignore]
async fn test_rejected_student_creation_leaves_email_reusable() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let n = unique();
    let phone = format!("{:010}", n % 10_000_000_000);

    // First student claims the phone number
    let response = client
        .post(format!("{}/students", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": "First Student",
            "email": format!("first{}@example.org", n),
            "phone": phone,
            "address": "1 Library Lane",
            "password": "studpass",
            "confirm_password": "studpass"
        }))
        .send()
        .await
        .expect("Failed to create student");
    assert_eq!(response.status(), 201);

    // Second attempt with a fresh email but the same phone is rejected
    let email = format!("second{}@example.org", n);
    let response = client
        .post(format!("{}/students", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": "Second Student",
            "email": email,
            "phone": phone,
            "address": "1 Library Lane",
            "password": "studpass",
            "confirm_password": "studpass"
        }))
        .send()
        .await
        .expect("Failed to create student");
    assert_eq!(response.status(), 409);

    // The rejected attempt must not have provisioned an identity: the same
    // email with a fresh phone succeeds, and the new student can log in
    let response = client
        .post(format!("{}/students", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": "Second Student",
            "email": email,
            "phone": format!("{:010}", (n + 1) % 10_000_000_000),
            "address": "1 Library Lane",
            "password": "studpass",
            "confirm_password": "studpass"
        }))
        .send()
        .await
        .expect("Failed to create student");
    assert_eq!(response.status(), 201);

    login(&client, &email, "studpass").await;
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_conflicts() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let isbn = format!("{:013}", unique() % 10_000_000_000_000);

    let payload = json!({
        "title": "Dup",
        "author": "Dup",
        "isbn": isbn,
        "quantity": 1
    });

    let first = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(second.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_issue_out_of_stock_leaves_quantity_unchanged() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let book_id = create_book(&client, &token, 0).await;
    let (student_id, _) = create_student(&client, &token).await;

    let response = issue(&client, &token, student_id, book_id).await;
    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "OutOfStock");

    assert_eq!(book_quantity(&client, &token, book_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_second_issue_to_same_student_rejected() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let first_book = create_book(&client, &token, 3).await;
    let second_book = create_book(&client, &token, 3).await;
    let (student_id, _) = create_student(&client, &token).await;

    let response = issue(&client, &token, student_id, first_book).await;
    assert_eq!(response.status(), 201);

    let response = issue(&client, &token, student_id, second_book).await;
    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "ActiveLoanExists");

    // The rejected issue must not have touched stock
    assert_eq!(book_quantity(&client, &token, second_book).await, 3);
}

#[tokio::test]
#[ignore]
async fn test_issue_return_round_trips_restore_quantity() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let book_id = create_book(&client, &token, 2).await;
    let (student_id, _) = create_student(&client, &token).await;

    for _ in 0..3 {
        let response = issue(&client, &token, student_id, book_id).await;
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.expect("Failed to parse assignment");
        let assignment_id = body["id"].as_i64().expect("No assignment ID");

        let response = return_loan(&client, &token, assignment_id).await;
        assert_eq!(response.status(), 200);
    }

    assert_eq!(book_quantity(&client, &token, book_id).await, 2);
}

#[tokio::test]
#[ignore]
async fn test_return_is_idempotent() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let book_id = create_book(&client, &token, 1).await;
    let (student_id, _) = create_student(&client, &token).await;

    let response = issue(&client, &token, student_id, book_id).await;
    let body: Value = response.json().await.expect("Failed to parse assignment");
    let assignment_id = body["id"].as_i64().expect("No assignment ID");

    let first = return_loan(&client, &token, assignment_id).await;
    assert_eq!(first.status(), 200);
    let first_body: Value = first.json().await.expect("Failed to parse return");
    assert_eq!(first_body["assignment"]["status"], "returned");
    let first_date = first_body["assignment"]["return_date"].clone();

    // Second return: no-op, quantity and record unchanged
    let second = return_loan(&client, &token, assignment_id).await;
    assert_eq!(second.status(), 200);
    let second_body: Value = second.json().await.expect("Failed to parse return");
    assert_eq!(second_body["assignment"]["status"], "returned");
    assert_eq!(second_body["assignment"]["return_date"], first_date);

    assert_eq!(book_quantity(&client, &token, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_return_unknown_assignment_not_found() {
    let client = Client::new();
    let token = staff_token(&client).await;

    let response = return_loan(&client, &token, 999_999_999).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_single_copy_two_students_scenario() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let book_id = create_book(&client, &token, 1).await;
    let (student_a, _) = create_student(&client, &token).await;
    let (student_b, _) = create_student(&client, &token).await;

    // A gets the only copy
    let response = issue(&client, &token, student_a, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse assignment");
    let assignment_a = body["id"].as_i64().expect("No assignment ID");
    assert_eq!(book_quantity(&client, &token, book_id).await, 0);

    // B is out of luck
    let response = issue(&client, &token, student_b, book_id).await;
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "OutOfStock");

    // A returns, stock recovers
    let response = return_loan(&client, &token, assignment_a).await;
    assert_eq!(response.status(), 200);
    assert_eq!(book_quantity(&client, &token, book_id).await, 1);

    // Now B succeeds
    let response = issue(&client, &token, student_b, book_id).await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_my_loans_shows_only_own_assignments() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let first_book = create_book(&client, &token, 1).await;
    let (student_a, email_a) = create_student(&client, &token).await;
    let (_student_b, email_b) = create_student(&client, &token).await;

    let response = issue(&client, &token, student_a, first_book).await;
    assert_eq!(response.status(), 201);

    // A sees their loan
    let token_a = login(&client, &email_a, "studpass").await;
    let response = client
        .get(format!("{}/loans/mine", BASE_URL))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .expect("Failed to get own loans");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse loans");
    let loans = body.as_array().expect("Expected array");
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0]["student_id"].as_i64().unwrap(), student_a);

    // B sees nothing of A's
    let token_b = login(&client, &email_b, "studpass").await;
    let response = client
        .get(format!("{}/loans/mine", BASE_URL))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .expect("Failed to get own loans");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse loans");
    assert_eq!(body.as_array().expect("Expected array").len(), 0);
}

#[tokio::test]
#[ignore]
async fn test_book_search_is_paginated() {
    let client = Client::new();
    let token = staff_token(&client).await;

    let response = client
        .get(format!("{}/books?q=test&page=1", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert_eq!(body["per_page"].as_i64().unwrap(), 10);
    assert!(body["items"].as_array().unwrap().len() <= 10);
}
