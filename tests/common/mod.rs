// SPDX-License-Identifier: MIT

use receipt_tracker::config::Config;
use receipt_tracker::db::FirestoreDb;
use receipt_tracker::routes::create_router;
use receipt_tracker::services::{OcrClient, StructuredExtractor};
use receipt_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app backed by the Firestore emulator.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_emulator_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db().await;

    let ocr = OcrClient::new(config.vision_api_key.clone()).expect("OCR client");
    let extractor = StructuredExtractor::new(
        config.extraction_base_url.clone(),
        config.extraction_api_key.clone(),
        config.extraction_model.clone(),
    )
    .expect("extraction client");

    let state = Arc::new(AppState {
        config,
        db,
        ocr,
        extractor,
    });

    (create_router(state.clone()), state)
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();

    let ocr = OcrClient::new(config.vision_api_key.clone()).expect("OCR client");
    let extractor = StructuredExtractor::new(
        config.extraction_base_url.clone(),
        config.extraction_api_key.clone(),
        config.extraction_model.clone(),
    )
    .expect("extraction client");

    let state = Arc::new(AppState {
        config,
        db,
        ocr,
        extractor,
    });

    (create_router(state.clone()), state)
}
