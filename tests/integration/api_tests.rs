//! API integration tests against a running server
//!
//! Needs a super-admin account, given by LABSLOT_TEST_EMAIL and
//! LABSLOT_TEST_PASSWORD. Start the server with the same values in
//! LABSLOT_AUTH__SUPER_ADMIN_EMAIL and LABSLOT_AUTH__SUPER_ADMIN_PASSWORD so
//! the account is created at startup. Run with: cargo test -- --ignored

use chrono::{Duration, Local};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn credentials() -> (String, String) {
    (
        std::env::var("LABSLOT_TEST_EMAIL").unwrap_or_else(|_| "root@university.edu".to_string()),
        std::env::var("LABSLOT_TEST_PASSWORD").unwrap_or_else(|_| "labslot-root".to_string()),
    )
}

/// Client holding the session cookie of the configured super-admin
async fn logged_in_client() -> Client {
    let client = Client::builder().cookie_store(true).build().unwrap();
    let (email, password) = credentials();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(response.status().is_success(), "login failed: {}", response.status());

    client
}

async fn create_equipment(client: &Client, name: &str) -> i64 {
    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .json(&json!({
            "name": name,
            "department": "Chemistry",
            "category": "Spectroscopy",
            "location": "C-201"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

fn tomorrow() -> String {
    (Local::now().date_naive() + Duration::days(1)).format("%Y-%m-%d").to_string()
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
async fn test_login_sets_cookie() {
    let client = Client::new();
    let (email, password) = credentials();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.contains("HttpOnly"));

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["user"]["password"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": credentials().0, "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_register_rejects_foreign_domain() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Outsider",
            "email": "outsider@gmail.com",
            "department": "Physics",
            "role": "student",
            "password": "long-enough-password"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_booking_flow_with_conflict_and_slots() {
    let client = logged_in_client().await;
    let equipment_id = create_equipment(&client, "Integration NMR").await;
    let date = tomorrow();

    let first = client
        .post(format!("{}/bookings", BASE_URL))
        .json(&json!({
            "equipment_id": equipment_id,
            "date": date,
            "start_time": "10:00",
            "duration": 2.0,
            "purpose": "Sample run"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let first: Value = first.json().await.unwrap();
    let first_id = first["booking"]["id"].as_i64().unwrap();
    assert_eq!(first["booking"]["status"], "pending");
    assert_eq!(first["conflicts"], json!([]));

    // Overlapping request is accepted but reports the conflict
    let second = client
        .post(format!("{}/bookings", BASE_URL))
        .json(&json!({
            "equipment_id": equipment_id,
            "date": date,
            "start_time": "11:00",
            "duration": 1.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CREATED);
    let second: Value = second.json().await.unwrap();
    assert_eq!(second["conflicts"], json!([first_id]));
    let second_id = second["booking"]["id"].as_i64().unwrap();

    let rejected = client
        .patch(format!("{}/bookings/{}/status", BASE_URL, second_id))
        .json(&json!({ "status": "rejected" }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::OK);

    let slots: Value = client
        .get(format!("{}/equipment/{}/slots?date={}", BASE_URL, equipment_id, date))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let busy: Vec<&str> = slots["slots"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["available"] == false)
        .map(|s| s["start"].as_str().unwrap())
        .collect();
    assert_eq!(busy, vec!["10:00", "11:00"]);

    // Rejected is final
    let reopen = client
        .patch(format!("{}/bookings/{}/status", BASE_URL, second_id))
        .json(&json!({ "status": "approved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(reopen.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let deleted = client
        .delete(format!("{}/equipment/{}", BASE_URL, equipment_id))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore]
async fn test_booking_outside_opening_hours() {
    let client = logged_in_client().await;
    let equipment_id = create_equipment(&client, "Integration SEM").await;

    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .json(&json!({
            "equipment_id": equipment_id,
            "date": tomorrow(),
            "start_time": "17:00",
            "duration": 3.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    client
        .delete(format!("{}/equipment/{}", BASE_URL, equipment_id))
        .send()
        .await
        .unwrap();
}
