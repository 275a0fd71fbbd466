use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine.new_user("alice", "password").await.unwrap();
    engine.new_user("bob", "hunter2").await.unwrap();
    server::router(Arc::new(engine))
}

fn basic(user: &str, password: &str) -> String {
    let secret = format!("{user}:{password}");
    format!(
        "Basic {}",
        base64::prelude::BASE64_STANDARD.encode(secret)
    )
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_needs_no_credentials() {
    let app = app().await;
    let (status, body) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_rejects_missing_or_wrong_credentials() {
    let app = app().await;

    let (status, _) = call(&app, "GET", "/api/payees", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong = basic("alice", "nope");
    let (status, _) = call(&app, "GET", "/api/payees", Some(&wrong), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn payee_and_bill_crud_round_trip() {
    let app = app().await;
    let alice = basic("alice", "password");

    let (status, payee) = call(
        &app,
        "POST",
        "/api/payees",
        Some(&alice),
        Some(json!({ "name": "Power Co", "website": "https://power.example" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let payee_id = payee["id"].as_str().unwrap().to_string();

    let (status, bill) = call(
        &app,
        "POST",
        "/api/bills",
        Some(&alice),
        Some(json!({
            "payee_id": payee_id,
            "name": "Electricity",
            "amount_minor": 8_150,
            "due_date": "2020-01-15T00:00:00Z",
            "billing_frequency": "quarterly",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bill["status"], "pending");
    assert_eq!(bill["is_overdue"], true);
    assert_eq!(bill["next_due_date"], "2020-04-15T00:00:00Z");
    let bill_id = bill["id"].as_str().unwrap().to_string();

    let (status, paid) = call(
        &app,
        "POST",
        &format!("/api/bills/{bill_id}/pay"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "paid");
    assert_eq!(paid["is_overdue"], false);

    let (status, list) = call(
        &app,
        "GET",
        "/api/bills?status=paid",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["items"].as_array().unwrap().len(), 1);

    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/api/payees/{payee_id}"),
        Some(&alice),
        Some(json!({ "name": "Power & Light" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Power & Light");
    assert_eq!(updated["website"], Value::Null);

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/payees/{payee_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(
        &app,
        "GET",
        &format!("/api/bills/{bill_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not exists"));
}

#[tokio::test]
async fn records_of_other_users_are_not_found() {
    let app = app().await;
    let alice = basic("alice", "password");
    let bob = basic("bob", "hunter2");

    let (_, habit) = call(
        &app,
        "POST",
        "/api/habits",
        Some(&alice),
        Some(json!({ "name": "Stretch" })),
    )
    .await;
    let habit_id = habit["id"].as_str().unwrap().to_string();
    assert_eq!(habit["target_days_per_week"], 7);

    let (status, _) = call(
        &app,
        "GET",
        &format!("/api/habits/{habit_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        "POST",
        "/api/streaks",
        Some(&bob),
        Some(json!({ "habit_id": habit_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = call(&app, "GET", "/api/habits", Some(&bob), None).await;
    assert!(list["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn validation_and_state_errors_are_unprocessable() {
    let app = app().await;
    let alice = basic("alice", "password");

    let (status, body) = call(
        &app,
        "POST",
        "/api/habits",
        Some(&alice),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (_, date) = call(
        &app,
        "POST",
        "/api/important-dates",
        Some(&alice),
        Some(json!({
            "person_name": "Giulia",
            "date_type": "anniversary",
            "date_value": "2015-09-12T00:00:00Z",
        })),
    )
    .await;
    let date_id = date["id"].as_str().unwrap().to_string();
    assert_eq!(date["is_active"], true);

    let (status, reminder) = call(
        &app,
        "POST",
        "/api/reminders",
        Some(&alice),
        Some(json!({
            "important_date_id": date_id,
            "scheduled_time": "2020-09-05T08:00:00Z",
            "advance_notice_days": 7,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reminder["delivery_channel"], "email");
    assert_eq!(reminder["is_ready_to_send"], true);
    let reminder_id = reminder["id"].as_str().unwrap().to_string();

    let (_, due) = call(&app, "GET", "/api/reminders/due", Some(&alice), None).await;
    assert_eq!(due["items"].as_array().unwrap().len(), 1);

    let (status, snoozed) = call(
        &app,
        "POST",
        &format!("/api/reminders/{reminder_id}/snooze"),
        Some(&alice),
        Some(json!({ "minutes": 15 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snoozed["status"], "snoozed");
    assert_eq!(snoozed["scheduled_time"], "2020-09-05T08:15:00Z");

    let (status, sent) = call(
        &app,
        "POST",
        &format!("/api/reminders/{reminder_id}/sent"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["status"], "sent");
    assert_eq!(sent["is_ready_to_send"], false);

    let (status, edited) = call(
        &app,
        "PUT",
        &format!("/api/reminders/{reminder_id}"),
        Some(&alice),
        Some(json!({
            "scheduled_time": "2021-09-05T08:00:00Z",
            "advance_notice_days": 3,
            "delivery_channel": "push",
            "status": "scheduled",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["status"], "sent");
    assert_eq!(edited["delivery_channel"], "push");
    assert_eq!(edited["sent_at"], sent["sent_at"]);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/reminders/{reminder_id}/snooze"),
        Some(&alice),
        Some(json!({ "minutes": 15 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/reminders/{reminder_id}/dismiss"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn warranty_claim_flow() {
    let app = app().await;
    let alice = basic("alice", "password");

    let (_, purchase) = call(
        &app,
        "POST",
        "/api/purchases",
        Some(&alice),
        Some(json!({
            "product_name": "Dishwasher",
            "purchase_date": "2026-01-10T10:00:00Z",
            "price_minor": 54_900,
        })),
    )
    .await;
    let purchase_id = purchase["id"].as_str().unwrap().to_string();
    assert_eq!(purchase["has_active_warranty"], false);

    let (status, warranty) = call(
        &app,
        "POST",
        "/api/warranties",
        Some(&alice),
        Some(json!({
            "purchase_id": purchase_id,
            "start_date": "2026-01-10T10:00:00Z",
            "end_date": "2099-01-10T10:00:00Z",
            "duration_months": 24,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(warranty["status"], "active");
    let warranty_id = warranty["id"].as_str().unwrap().to_string();

    let (_, purchase) = call(
        &app,
        "GET",
        &format!("/api/purchases/{purchase_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(purchase["has_active_warranty"], true);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/warranties/{warranty_id}/claim/approve"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, claimed) = call(
        &app,
        "POST",
        &format!("/api/warranties/{warranty_id}/claim"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(claimed["status"], "claim_filed");
    assert!(claimed["claim_filed_date"].is_string());

    let (status, rejected) = call(
        &app,
        "POST",
        &format!("/api/warranties/{warranty_id}/claim/reject"),
        Some(&alice),
        Some(json!({ "reason": "water damage" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["status"], "claim_rejected");
    assert_eq!(rejected["notes"], "Claim rejected: water damage");

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/purchases/{purchase_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, warranties) = call(&app, "GET", "/api/warranties", Some(&alice), None).await;
    assert!(warranties["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_requests_get_a_json_400() {
    let app = app().await;
    let alice = basic("alice", "password");

    let request = Request::builder()
        .method("POST")
        .uri("/api/habits")
        .header(header::AUTHORIZATION, &alice)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());

    let (status, body) = call(&app, "GET", "/api/habits/not-a-uuid", Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = call(
        &app,
        "GET",
        "/api/bills?status=sleeping",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = call(
        &app,
        "POST",
        "/api/habits",
        Some(&alice),
        Some(json!({ "description": "no name" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
