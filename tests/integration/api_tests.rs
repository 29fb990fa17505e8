//! In-process API tests over the memory store

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use shareit_server::{
    api::{create_router, SHARER_USER_ID},
    config::{AppConfig, StorageBackend},
    repository::Repository,
    AppState,
};

struct TestApp {
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Memory;
        let state = AppState::new(config, Repository::memory());
        Self {
            router: create_router(state),
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<i64>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = user {
            builder = builder.header(SHARER_USER_ID, id.to_string());
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_user(&self, name: &str, email: &str) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/users",
                None,
                Some(json!({ "name": name, "email": email })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_i64().unwrap()
    }

    async fn create_item(&self, owner: i64, name: &str, available: bool) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/items",
                Some(owner),
                Some(json!({
                    "name": name,
                    "description": format!("{} for rent", name),
                    "available": available
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_i64().unwrap()
    }
}

fn booking_body(item_id: i64, start: chrono::DateTime<Utc>, end: chrono::DateTime<Utc>) -> Value {
    json!({
        "itemId": item_id,
        "start": start.to_rfc3339(),
        "end": end.to_rfc3339()
    })
}

#[tokio::test]
async fn health_and_readiness() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");

    let (status, body) = app.send(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn user_crud() {
    let app = TestApp::new();
    let id = app.create_user("Ann", "ann@example.com").await;

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/users/{}", id),
            None,
            Some(json!({ "name": "Ann B." })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ann B.");
    assert_eq!(body["email"], "ann@example.com");

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/users/{}", id),
            None,
            Some(json!({ "email": "  " })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["email"], "ann@example.com");

    let (status, body) = app.send(Method::GET, "/users", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app.send(Method::DELETE, &format!("/users/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.send(Method::GET, &format!("/users/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn user_input_errors() {
    let app = TestApp::new();
    app.create_user("Ann", "ann@example.com").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/users",
            None,
            Some(json!({ "name": "Other", "email": "ann@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .send(
            Method::POST,
            "/users",
            None,
            Some(json!({ "name": "Bob", "email": "not-an-email" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email format");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::GET, "/users/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_sharer_header_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/items", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains(SHARER_USER_ID));
}

#[tokio::test]
async fn booking_is_approved_once() {
    let app = TestApp::new();
    let owner = app.create_user("Owner", "owner@example.com").await;
    let booker = app.create_user("Booker", "booker@example.com").await;
    let item = app.create_item(owner, "Drill", true).await;

    let now = Utc::now();
    let (status, body) = app
        .send(
            Method::POST,
            "/bookings",
            Some(booker),
            Some(booking_body(item, now + Duration::minutes(1), now + Duration::days(2))),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "WAITING");
    assert_eq!(body["item"]["name"], "Drill");
    assert_eq!(body["booker"]["id"], booker);
    let booking = body["id"].as_i64().unwrap();

    let approve = format!("/bookings/{}?approved=true", booking);
    let (status, body) = app.send(Method::PATCH, &approve, Some(booker), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{}", body);

    let (status, body) = app.send(Method::PATCH, &approve, Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/bookings/{}?approved=false", booking),
            Some(owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(Method::GET, &format!("/bookings/{}", booking), Some(booker), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");

    let (status, body) = app
        .send(Method::GET, "/bookings/owner?state=FUTURE", Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app
        .send(Method::GET, "/bookings?state=PAST", Some(booker), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn booking_creation_errors() {
    let app = TestApp::new();
    let owner = app.create_user("Owner", "owner@example.com").await;
    let booker = app.create_user("Booker", "booker@example.com").await;
    let item = app.create_item(owner, "Drill", true).await;
    let hidden = app.create_item(owner, "Saw", false).await;
    let start = Utc::now() + Duration::days(1);

    let cases = [
        (booker, booking_body(item, start, start - Duration::hours(2)), StatusCode::BAD_REQUEST),
        (booker, booking_body(hidden, start, start + Duration::hours(2)), StatusCode::BAD_REQUEST),
        (owner, booking_body(item, start, start + Duration::hours(2)), StatusCode::NOT_FOUND),
        (booker, booking_body(999, start, start + Duration::hours(2)), StatusCode::NOT_FOUND),
        (booker, json!({ "itemId": item }), StatusCode::BAD_REQUEST),
    ];
    for (user, body, expected) in cases {
        let (status, response) = app.send(Method::POST, "/bookings", Some(user), Some(body)).await;
        assert_eq!(status, expected, "{}", response);
    }
}

#[tokio::test]
async fn listing_parameters_are_checked() {
    let app = TestApp::new();
    let user = app.create_user("Ann", "ann@example.com").await;

    let (status, body) = app
        .send(Method::GET, "/bookings?state=UNSUPPORTED_STATUS", Some(user), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown state: UNSUPPORTED_STATUS");

    let (status, _) = app
        .send(Method::GET, "/bookings/owner?from=-1&size=10", Some(user), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::GET, "/requests/all?from=0&size=0", Some(user), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.send(Method::GET, "/bookings", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn items_search_and_comments() {
    let app = TestApp::new();
    let owner = app.create_user("Owner", "owner@example.com").await;
    let other = app.create_user("Other", "other@example.com").await;
    let item = app.create_item(owner, "Drill", true).await;
    app.create_item(owner, "Hidden drill", false).await;

    let (status, body) = app.send(Method::GET, "/items/search?text=DRILL", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app.send(Method::GET, "/items/search?text=", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/items/{}/comment", item),
            Some(other),
            Some(json!({ "text": "Nice" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/items/{}", item),
            Some(other),
            Some(json!({ "available": false })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/items/{}", item),
            Some(owner),
            Some(json!({ "description": "Heavy duty" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Heavy duty");
    assert_eq!(body["name"], "Drill");
}

#[tokio::test]
async fn owner_sees_next_booking() {
    let app = TestApp::new();
    let owner = app.create_user("Owner", "owner@example.com").await;
    let booker = app.create_user("Booker", "booker@example.com").await;
    let item = app.create_item(owner, "Tent", true).await;
    let start = Utc::now() + Duration::days(3);

    let (status, booking) = app
        .send(
            Method::POST,
            "/bookings",
            Some(booker),
            Some(booking_body(item, start, start + Duration::days(1))),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/items/{}", item);
    let (_, as_owner) = app.send(Method::GET, &uri, Some(owner), None).await;
    assert_eq!(as_owner["nextBooking"]["id"], booking["id"]);
    assert_eq!(as_owner["nextBooking"]["bookerId"], booker);
    assert!(as_owner["lastBooking"].is_null());
    assert_eq!(as_owner["comments"], json!([]));

    let (_, as_booker) = app.send(Method::GET, &uri, Some(booker), None).await;
    assert!(as_booker["nextBooking"].is_null());

    let (_, listed) = app.send(Method::GET, "/items", Some(owner), None).await;
    assert_eq!(listed[0]["nextBooking"]["id"], booking["id"]);
}

#[tokio::test]
async fn requests_carry_answering_items() {
    let app = TestApp::new();
    let asker = app.create_user("Asker", "asker@example.com").await;
    let owner = app.create_user("Owner", "owner@example.com").await;

    let (status, request) = app
        .send(
            Method::POST,
            "/requests",
            Some(asker),
            Some(json!({ "description": "Need a ladder" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["items"], json!([]));
    let request_id = request["id"].as_i64().unwrap();

    let (status, item) = app
        .send(
            Method::POST,
            "/items",
            Some(owner),
            Some(json!({
                "name": "Ladder",
                "description": "Three meters",
                "available": true,
                "requestId": request_id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["requestId"], request_id);

    let (_, own) = app.send(Method::GET, "/requests", Some(asker), None).await;
    assert_eq!(own[0]["items"][0]["name"], "Ladder");

    let (_, others) = app.send(Method::GET, "/requests/all", Some(owner), None).await;
    assert_eq!(others.as_array().unwrap().len(), 1);
    let (_, none) = app.send(Method::GET, "/requests/all", Some(asker), None).await;
    assert_eq!(none, json!([]));

    let (status, single) = app
        .send(Method::GET, &format!("/requests/{}", request_id), Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(single["description"], "Need a ladder");

    let (status, _) = app
        .send(
            Method::POST,
            "/requests",
            Some(asker),
            Some(json!({ "description": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
