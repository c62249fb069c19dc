//! Loan Portfolio API Library
//!
//! Core functionality for the loan portfolio viewer: the document API
//! client, portfolio statistics, presentation handlers, and the diagnostic
//! harness.
//!
//! # Modules
//!
//! - `api_client`: JSON:API document client.
//! - `config`: Configuration management.
//! - `diagnostics`: Connectivity and permission diagnostics.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and shared state.
//! - `models`: Wire and domain data models.
//! - `stats`: Portfolio statistics calculator.

// Re-export primary modules for shared use in tests and other binaries
pub mod api_client;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod stats;
