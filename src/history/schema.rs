//! SQLite schema definitions for the search history database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

// =============================================================================
// Version 1 - Search history
// =============================================================================

const SEARCH_HISTORY_TABLE_V1: Table = Table {
    name: "search_history",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true), // UUID
        sqlite_column!("query", &SqlType::Text, non_null = true),
        sqlite_column!("timestamp", &SqlType::Text, non_null = true), // RFC 3339
        sqlite_column!("results_count", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_search_history_timestamp", "timestamp DESC")],
};

pub const HISTORY_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[SEARCH_HISTORY_TABLE_V1],
    migration: None,
}];
