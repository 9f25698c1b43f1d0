// SPDX-License-Identifier: MIT

//! Receipt-Tracker: expense tracking with receipt extraction.
//!
//! This crate provides the backend API for uploading receipt images,
//! extracting structured expense fields through OCR and a language model,
//! and managing the confirmed expense records per user.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{OcrClient, StructuredExtractor};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub ocr: OcrClient,
    pub extractor: StructuredExtractor,
}
