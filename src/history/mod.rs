//! Search history persistence.
//!
//! Every successful search is appended as a [`SearchHistoryEntry`]; entries are
//! never updated or deleted by the server.

mod models;
mod schema;
mod sqlite_history_store;

pub use models::SearchHistoryEntry;
pub use schema::HISTORY_VERSIONED_SCHEMAS;
pub use sqlite_history_store::SqliteSearchHistoryStore;

use anyhow::Result;

pub trait SearchHistoryStore: Send + Sync {
    /// Appends a new entry for `query` and returns it.
    fn record(&self, query: &str, results_count: usize) -> Result<SearchHistoryEntry>;

    /// Returns at most `limit` entries, most recent first.
    fn list_recent(&self, limit: usize) -> Result<Vec<SearchHistoryEntry>>;
}
