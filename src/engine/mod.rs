//! Refresh engine: keeps the latest snapshot of every configured page.

pub mod coordinator;
