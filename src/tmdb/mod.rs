//! TMDB metadata access.
//!
//! [`MetadataProvider`] is the seam between the aggregation pipeline and the
//! upstream catalog; [`TmdbClient`] is the production implementation.

mod client;
mod models;

pub use client::{TmdbClient, TmdbClientConfig, DEFAULT_TMDB_BASE_URL};
pub use models::{
    CastMember, CombinedCredits, Creator, Credits, CrewMember, Genre, GenreList, MediaItem,
    MovieRecord, PersonRecord, ProductionCountry, SearchPage, SeriesRecord,
};

use crate::content::ContentKind;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the metadata upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Upstream is not configured: {0}")]
    NotConfigured(String),

    #[error("Upstream API error (status {status_code}): {message}")]
    Status { status_code: u16, message: String },

    #[error("Upstream transport error: {0}")]
    Transport(String),

    #[error("Invalid upstream response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// HTTP status reported by the upstream, when it answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

/// Read-only access to a movie/TV metadata catalog.
///
/// Multi-search and discover results are returned as raw JSON entries so
/// callers can skip individual malformed items instead of failing the page.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn search_multi(&self, query: &str, page: u32) -> Result<SearchPage<Value>, UpstreamError>;

    async fn search_movies(
        &self,
        query: &str,
        page: u32,
    ) -> Result<SearchPage<MovieRecord>, UpstreamError>;

    async fn search_tv_shows(
        &self,
        query: &str,
        page: u32,
    ) -> Result<SearchPage<SeriesRecord>, UpstreamError>;

    async fn search_person(
        &self,
        query: &str,
        page: u32,
    ) -> Result<SearchPage<PersonRecord>, UpstreamError>;

    async fn popular_movies(&self, page: u32) -> Result<SearchPage<MovieRecord>, UpstreamError>;

    async fn popular_tv_shows(&self, page: u32) -> Result<SearchPage<SeriesRecord>, UpstreamError>;

    /// Movie details with credits and videos embedded.
    async fn movie_details(&self, id: i64) -> Result<MovieRecord, UpstreamError>;

    /// Series details with credits and videos embedded.
    async fn tv_details(&self, id: i64) -> Result<SeriesRecord, UpstreamError>;

    async fn movie_genres(&self) -> Result<GenreList, UpstreamError>;

    async fn tv_genres(&self) -> Result<GenreList, UpstreamError>;

    async fn person_combined_credits(&self, id: i64) -> Result<CombinedCredits, UpstreamError>;

    /// Titles of `kind` tagged with `genre_id`, in upstream popularity order.
    async fn discover_by_genre(
        &self,
        kind: ContentKind,
        genre_id: i64,
        page: u32,
    ) -> Result<SearchPage<Value>, UpstreamError>;
}
