// SPDX-License-Identifier: MIT

//! Receipt-Tracker API Server
//!
//! Authenticates users, runs uploaded receipt images through OCR and
//! structured extraction, and persists the confirmed expense records.

use receipt_tracker::{
    config::Config,
    db::FirestoreDb,
    services::{OcrClient, StructuredExtractor},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Receipt-Tracker API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize the extraction collaborators
    let ocr = OcrClient::new(config.vision_api_key.clone())
        .expect("Failed to initialize OCR client");
    let extractor = StructuredExtractor::new(
        config.extraction_base_url.clone(),
        config.extraction_api_key.clone(),
        config.extraction_model.clone(),
    )
    .expect("Failed to initialize extraction client");
    tracing::info!(
        model = %config.extraction_model,
        "Extraction collaborators initialized"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        ocr,
        extractor,
    });

    // Build router
    let app = receipt_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("receipt_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
