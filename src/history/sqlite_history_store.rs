use super::models::SearchHistoryEntry;
use super::schema::HISTORY_VERSIONED_SCHEMAS;
use super::SearchHistoryStore;
use crate::sqlite_persistence::open_versioned_db;
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, types::Type, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

pub struct SqliteSearchHistoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSearchHistoryStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned_db(db_path.as_ref(), HISTORY_VERSIONED_SCHEMAS, "history")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // Fixed-width so that lexicographic order in SQLite matches time order.
    fn format_datetime(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<SearchHistoryEntry> {
        let timestamp_idx = row.as_ref().column_index("timestamp")?;
        let timestamp_str: String = row.get(timestamp_idx)?;
        let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(timestamp_idx, Type::Text, Box::new(e))
            })?;
        let results_count: i64 = row.get("results_count")?;

        Ok(SearchHistoryEntry {
            id: row.get("id")?,
            query: row.get("query")?,
            timestamp,
            results_count: results_count.max(0) as usize,
        })
    }
}

impl SearchHistoryStore for SqliteSearchHistoryStore {
    fn record(&self, query: &str, results_count: usize) -> Result<SearchHistoryEntry> {
        let entry = SearchHistoryEntry::new(query, results_count);
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO search_history (id, query, timestamp, results_count)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.id,
                entry.query,
                Self::format_datetime(&entry.timestamp),
                entry.results_count as i64
            ],
        )?;
        debug!("Recorded search '{}' ({} results)", query, results_count);

        Ok(entry)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<SearchHistoryEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, query, timestamp, results_count
             FROM search_history ORDER BY timestamp DESC, rowid DESC LIMIT ?1",
        )?;

        let entries = stmt
            .query_map(params![limit as i64], Self::row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(entries)
    }
}
