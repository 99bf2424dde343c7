use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub id: String,
    /// The query exactly as the client sent it.
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub results_count: usize,
}

impl SearchHistoryEntry {
    pub fn new(query: &str, results_count: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            query: query.to_string(),
            timestamp: Utc::now(),
            results_count,
        }
    }
}
