// SPDX-License-Identifier: MIT

//! Firestore integration tests.
//!
//! These run against the Firestore emulator and are skipped when
//! FIRESTORE_EMULATOR_HOST is not set. They cover the store-dependent
//! behavior the offline tests cannot reach: owner scoping of listing and
//! updates, and duplicate-user conflicts at the insert itself.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use receipt_tracker::error::AppError;
use receipt_tracker::models::{Expense, User};
use tower::ServiceExt;

use common::{create_emulator_app, test_db};

/// Unique name per test run so emulator state never collides.
fn unique_name(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}_{}", prefix, nanos)
}

fn test_user(username: &str) -> User {
    User {
        id: receipt_tracker::models::new_record_id(),
        username: username.to_string(),
        password_hash: "$argon2id$unused".to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

fn test_expense(user_id: &str, amount: f64, upload_date: &str) -> Expense {
    Expense {
        id: receipt_tracker::models::new_record_id(),
        user_id: user_id.to_string(),
        amount,
        merchant: "Office Depot".to_string(),
        category: "Supplies".to_string(),
        receipt_image: "receipt.jpg".to_string(),
        upload_date: upload_date.to_string(),
        is_tax_deductible: false,
        deduction_reason: None,
        date: None,
        invoice_number: None,
        tax_rate: None,
        tax_amount: None,
        items: None,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("JSON body")
}

async fn post_form(app: &axum::Router, uri: &str, form: String) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Register a fresh user through the API and return a bearer token.
async fn register_and_login(app: &axum::Router, username: &str) -> String {
    let form = format!("username={}&password=hunter2hunter2", username);

    let response = post_form(app, "/api/auth/register", form.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_form(app, "/api/auth/token", form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    json["access_token"].as_str().expect("token").to_string()
}

/// Confirm an expense through the API, returning the stored record.
async fn confirm_expense(app: &axum::Router, token: &str, amount: f64) -> serde_json::Value {
    let payload = serde_json::json!({
        "amount": amount,
        "merchant": "Cafe",
        "category": "Meals",
        "receipt_image": "r.png",
        "upload_date": "2026-08-01T12:00:00Z"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/expenses/confirm-receipt/")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    body_json(response).await
}

#[tokio::test]
async fn test_duplicate_user_insert_maps_to_conflict() {
    require_emulator!();
    let db = test_db().await;

    let username = unique_name("dup");
    db.create_user(&test_user(&username))
        .await
        .expect("first insert succeeds");

    // Second keyed insert loses the race and must be a duplicate, not a 500.
    let err = db
        .create_user(&test_user(&username))
        .await
        .expect_err("second insert must fail");
    assert!(matches!(err, AppError::DuplicateUser), "got {:?}", err);

    println!("✓ Duplicate user insert verified: second create is DuplicateUser");
}

#[tokio::test]
async fn test_expense_listing_is_scoped_to_owner() {
    require_emulator!();
    let db = test_db().await;

    let alice = unique_name("alice");
    let bob = unique_name("bob");

    let older = test_expense(&bob, 10.0, "2026-08-01T12:00:00Z");
    let newer = test_expense(&bob, 20.0, "2026-08-02T12:00:00Z");
    let hers = test_expense(&alice, 30.0, "2026-08-03T12:00:00Z");
    for expense in [&older, &newer, &hers] {
        db.insert_expense(expense).await.expect("insert");
    }

    let bobs = db.list_expenses(&bob, 0, 10).await.expect("list");
    assert_eq!(bobs.len(), 2);
    assert!(bobs.iter().all(|e| e.user_id == bob));
    // Newest upload first
    assert_eq!(bobs[0].id, newer.id);
    assert_eq!(bobs[1].id, older.id);

    let alices = db.list_expenses(&alice, 0, 10).await.expect("list");
    assert_eq!(alices.len(), 1);
    assert_eq!(alices[0].id, hers.id);

    // Same query twice returns the same page
    let again = db.list_expenses(&bob, 0, 10).await.expect("list");
    assert_eq!(
        again.iter().map(|e| &e.id).collect::<Vec<_>>(),
        bobs.iter().map(|e| &e.id).collect::<Vec<_>>()
    );

    println!("✓ Listing scope verified: {} for owner, no cross-user rows", bobs.len());
}

#[tokio::test]
async fn test_list_route_returns_only_callers_expenses() {
    require_emulator!();
    let (app, _state) = create_emulator_app().await;

    let alice_token = register_and_login(&app, &unique_name("alice")).await;
    let bob_token = register_and_login(&app, &unique_name("bob")).await;

    let bobs_expense = confirm_expense(&app, &bob_token, 55.0).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/expenses/list/")
                .header(header::AUTHORIZATION, format!("Bearer {}", alice_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listed = body_json(response).await;
    let listed = listed.as_array().expect("array body");
    assert!(
        listed.iter().all(|e| e["id"] != bobs_expense["id"]),
        "another user's expense leaked into the listing"
    );

    println!("✓ List route scope verified: caller never sees other users' rows");
}

#[tokio::test]
async fn test_update_route_rejects_non_owner_and_leaves_record_unchanged() {
    require_emulator!();
    let (app, state) = create_emulator_app().await;

    let alice_token = register_and_login(&app, &unique_name("alice")).await;
    let bob_token = register_and_login(&app, &unique_name("bob")).await;

    let bobs_expense = confirm_expense(&app, &bob_token, 55.0).await;
    let expense_id = bobs_expense["id"].as_str().expect("id").to_string();

    let attempt = |token: String| {
        let app = app.clone();
        let uri = format!("/api/expenses/update-collection/{}", expense_id);
        async move {
            app.oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(uri)
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"amount": 999.0}"#))
                    .unwrap(),
            )
            .await
            .unwrap()
        }
    };

    // Indistinguishable from a missing record
    let response = attempt(alice_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let stored = state
        .db
        .get_expense(&expense_id)
        .await
        .expect("get")
        .expect("record still present");
    assert_eq!(stored.amount, 55.0, "non-owner update must not change the record");

    // The owner's identical update goes through
    let response = attempt(bob_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["updated_count"], 1);

    let stored = state.db.get_expense(&expense_id).await.expect("get").expect("record");
    assert_eq!(stored.amount, 999.0);

    println!("✓ Update scope verified: non-owner gets 404, record untouched");
}

#[tokio::test]
async fn test_confirm_route_rejects_negative_amount() {
    require_emulator!();
    let (app, _state) = create_emulator_app().await;

    let token = register_and_login(&app, &unique_name("carol")).await;

    let payload = serde_json::json!({
        "amount": -5.0,
        "merchant": "Cafe",
        "category": "Meals",
        "receipt_image": "r.png",
        "upload_date": "2026-08-01T12:00:00Z"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/expenses/confirm-receipt/")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    println!("✓ Confirm validation verified: negative amount rejected");
}
