//! Integration tests: captured-page pipeline and real HTTP transport.

mod fetch_pipeline;
mod mock_source;
mod redirect;
