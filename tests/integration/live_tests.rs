//! Tests against a running server
//!
//! Start the server (e.g. `SHAREIT_STORAGE__BACKEND=memory`) and run
//! with `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:9090";
const SHARER: &str = "X-Sharer-User-Id";

/// Create a user with a unique email and return its id
async fn create_user(client: &Client, name: &str) -> i64 {
    let email = format!(
        "{}-{}@example.com",
        name.to_lowercase(),
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({ "name": name, "email": email }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response")
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
async fn test_booking_flow() {
    let client = Client::new();
    let owner = create_user(&client, "Owner").await;
    let booker = create_user(&client, "Booker").await;

    let item: Value = client
        .post(format!("{}/items", BASE_URL))
        .header(SHARER, owner.to_string())
        .json(&json!({ "name": "Drill", "description": "Cordless", "available": true }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let now = Utc::now();
    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .header(SHARER, booker.to_string())
        .json(&json!({
            "itemId": item["id"],
            "start": (now + Duration::minutes(1)).to_rfc3339(),
            "end": (now + Duration::days(2)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let booking: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(booking["status"], "WAITING");

    let approve = format!("{}/bookings/{}?approved=true", BASE_URL, booking["id"]);
    let response = client
        .patch(&approve)
        .header(SHARER, owner.to_string())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let response = client
        .patch(&approve)
        .header(SHARER, owner.to_string())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_unknown_state() {
    let client = Client::new();
    let user = create_user(&client, "Lister").await;

    let response = client
        .get(format!("{}/bookings?state=UNSUPPORTED_STATUS", BASE_URL))
        .header(SHARER, user.to_string())
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Unknown state: UNSUPPORTED_STATUS");
}
