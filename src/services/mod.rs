// SPDX-License-Identifier: MIT

//! Services module - password hashing and external extraction collaborators.

pub mod extraction;
pub mod ocr;
pub mod password;

pub use extraction::StructuredExtractor;
pub use ocr::OcrClient;
