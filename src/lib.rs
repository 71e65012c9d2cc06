// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod engine;
pub mod ingest;
pub mod queries;
pub mod source;
