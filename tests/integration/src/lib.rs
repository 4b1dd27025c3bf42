//! CSV pipeline integration tests
//!
//! These tests run against a deployed API Gateway stage. Set
//! CSVPIPE_API_URL (directly or in a `.env` file) to enable them.
//!
//! Run with: cargo test --manifest-path tests/integration/Cargo.toml

pub mod client;
pub mod fixtures;

pub use client::CsvPipeClient;
pub use fixtures::*;
