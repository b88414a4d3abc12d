//! WetterOnline scraper.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod conditions;
pub mod parser;
pub mod fetch;
pub mod engine;
pub mod dashboard;
