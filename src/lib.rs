//! Film Agent Server Library
//!
//! A TMDB-backed movie and TV search service. This library exposes the
//! internal modules for the binaries and the end-to-end tests.

pub mod config;
pub mod content;
pub mod history;
pub mod server;
pub mod sqlite_persistence;
pub mod tmdb;

// Re-export commonly used types for convenience
pub use content::{ContentAggregator, ContentKind, ContentRecord, RecordNormalizer};
pub use history::{SearchHistoryStore, SqliteSearchHistoryStore};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use tmdb::{MetadataProvider, TmdbClient, TmdbClientConfig, UpstreamError};
