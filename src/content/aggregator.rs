//! Request pipelines built on top of a [`MetadataProvider`].
//!
//! Per-item detail enrichment is best-effort: when a detail lookup fails the
//! bare list item is normalized instead, so a single bad upstream answer never
//! removes an entry or fails a whole listing.

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

use super::normalize::RecordNormalizer;
use super::{ContentKind, ContentRecord};
use crate::history::{SearchHistoryEntry, SearchHistoryStore};
use crate::server::metrics::{record_enrichment_fallback, record_history_write_failure};
use crate::tmdb::{
    CombinedCredits, MediaItem, MetadataProvider, MovieRecord, SeriesRecord, UpstreamError,
};

pub const MAX_SEARCH_ITEMS: usize = 15;
pub const MAX_PERSON_CREDITS: usize = 3;
pub const MAX_POPULAR_PER_KIND: usize = 8;
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("{0}")]
    Validation(String),

    #[error("Movie or TV show not found")]
    NotFound,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub results: Vec<ContentRecord>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentListing {
    pub results: Vec<ContentRecord>,
    pub total: usize,
}

impl From<Vec<ContentRecord>> for ContentListing {
    fn from(results: Vec<ContentRecord>) -> Self {
        Self {
            total: results.len(),
            results,
        }
    }
}

fn popularity_of(credit: &Value) -> f64 {
    credit
        .get("popularity")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// Merges cast and crew credits and keeps the `limit` most popular, stable
/// with respect to the original order on ties.
fn top_credits(credits: CombinedCredits, limit: usize) -> Vec<Value> {
    let mut merged: Vec<Value> = credits.cast.into_iter().chain(credits.crew).collect();
    merged.sort_by(|a, b| popularity_of(b).total_cmp(&popularity_of(a)));
    merged.truncate(limit);
    merged
}

fn sort_by_rating_desc(records: &mut [ContentRecord]) {
    records.sort_by(|a, b| b.rating_value().total_cmp(&a.rating_value()));
}

fn title_matches(title: &Option<String>, needle: &str) -> bool {
    title
        .as_deref()
        .map(|t| t.to_lowercase().contains(needle))
        .unwrap_or(false)
}

pub struct ContentAggregator {
    provider: Arc<dyn MetadataProvider>,
    history: Arc<dyn SearchHistoryStore>,
    normalizer: RecordNormalizer,
}

impl ContentAggregator {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        history: Arc<dyn SearchHistoryStore>,
        normalizer: RecordNormalizer,
    ) -> Self {
        Self {
            provider,
            history,
            normalizer,
        }
    }

    pub fn normalizer(&self) -> &RecordNormalizer {
        &self.normalizer
    }

    /// Multi-search, enrichment and person expansion. The query is sent
    /// upstream trimmed but echoed and recorded verbatim.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, AggregationError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(AggregationError::Validation(
                "Search query cannot be empty".to_string(),
            ));
        }

        let page = self.provider.search_multi(trimmed, 1).await?;
        let per_item = join_all(
            page.results
                .into_iter()
                .take(MAX_SEARCH_ITEMS)
                .map(|item| self.process_search_item(item)),
        )
        .await;
        let results: Vec<ContentRecord> = per_item.into_iter().flatten().collect();

        debug!("Search '{}' produced {} records", trimmed, results.len());
        self.record_search(query, results.len());

        Ok(SearchOutcome {
            query: query.to_string(),
            total: results.len(),
            results,
        })
    }

    async fn process_search_item(&self, item: Value) -> Vec<ContentRecord> {
        match MediaItem::from_value(item) {
            Ok(MediaItem::Movie(movie)) => vec![self.enrich_movie(movie).await],
            Ok(MediaItem::Tv(series)) => vec![self.enrich_series(series).await],
            Ok(MediaItem::Person(person)) => match person.id {
                Some(id) => self.expand_person(id).await,
                None => Vec::new(),
            },
            Err(err) => {
                debug!("Skipping search result: {}", err);
                Vec::new()
            }
        }
    }

    async fn enrich_movie(&self, bare: MovieRecord) -> ContentRecord {
        let Some(id) = bare.id else {
            return self.normalizer.normalize_movie(&bare);
        };
        match self.provider.movie_details(id).await {
            Ok(detailed) => self.normalizer.normalize_movie(&detailed),
            Err(err) => {
                warn!("Movie {} enrichment failed, using search data: {}", id, err);
                record_enrichment_fallback(ContentKind::Movie);
                self.normalizer.normalize_movie(&bare)
            }
        }
    }

    async fn enrich_series(&self, bare: SeriesRecord) -> ContentRecord {
        let Some(id) = bare.id else {
            return self.normalizer.normalize_series(&bare);
        };
        match self.provider.tv_details(id).await {
            Ok(detailed) => self.normalizer.normalize_series(&detailed),
            Err(err) => {
                warn!("Series {} enrichment failed, using search data: {}", id, err);
                record_enrichment_fallback(ContentKind::Tv);
                self.normalizer.normalize_series(&bare)
            }
        }
    }

    async fn expand_person(&self, person_id: i64) -> Vec<ContentRecord> {
        let credits = match self.provider.person_combined_credits(person_id).await {
            Ok(credits) => credits,
            Err(err) => {
                warn!("Credits lookup for person {} failed: {}", person_id, err);
                return Vec::new();
            }
        };

        top_credits(credits, MAX_PERSON_CREDITS)
            .into_iter()
            .filter_map(|credit| match MediaItem::from_value(credit) {
                Ok(MediaItem::Movie(movie)) => Some(self.normalizer.normalize_movie(&movie)),
                Ok(MediaItem::Tv(series)) => Some(self.normalizer.normalize_series(&series)),
                _ => None,
            })
            .collect()
    }

    fn record_search(&self, query: &str, results_count: usize) {
        let history = self.history.clone();
        let query = query.to_string();
        tokio::task::spawn_blocking(move || {
            if let Err(err) = history.record(&query, results_count) {
                warn!("Failed to record search '{}': {:#}", query, err);
                record_history_write_failure();
            }
        });
    }

    pub async fn popular(&self) -> Result<ContentListing, AggregationError> {
        let (movies, series) = tokio::try_join!(
            self.provider.popular_movies(1),
            self.provider.popular_tv_shows(1)
        )?;

        let (mut results, series_results) = tokio::join!(
            join_all(
                movies
                    .results
                    .into_iter()
                    .take(MAX_POPULAR_PER_KIND)
                    .map(|movie| self.enrich_movie(movie))
            ),
            join_all(
                series
                    .results
                    .into_iter()
                    .take(MAX_POPULAR_PER_KIND)
                    .map(|show| self.enrich_series(show))
            )
        );
        results.extend(series_results);
        sort_by_rating_desc(&mut results);

        Ok(results.into())
    }

    /// Union of movie and series genre names, sorted.
    pub async fn genres(&self) -> Result<Vec<String>, AggregationError> {
        let (movie_genres, tv_genres) =
            tokio::try_join!(self.provider.movie_genres(), self.provider.tv_genres())?;

        let names: BTreeSet<String> = movie_genres
            .genres
            .into_iter()
            .chain(tv_genres.genres)
            .map(|genre| genre.name)
            .filter(|name| !name.is_empty())
            .collect();
        Ok(names.into_iter().collect())
    }

    /// Numeric input is looked up as a movie, then as a series. Anything else
    /// is treated as a title fragment.
    pub async fn get_by_id(&self, id_or_title: &str) -> Result<ContentRecord, AggregationError> {
        let Ok(id) = id_or_title.trim().parse::<i64>() else {
            return self.find_by_title(id_or_title).await;
        };

        match self.provider.movie_details(id).await {
            Ok(movie) => return Ok(self.normalizer.normalize_movie(&movie)),
            Err(err) => debug!("No movie with id {}: {}", id, err),
        }
        match self.provider.tv_details(id).await {
            Ok(series) => Ok(self.normalizer.normalize_series(&series)),
            Err(err) => {
                debug!("No series with id {}: {}", id, err);
                Err(AggregationError::NotFound)
            }
        }
    }

    async fn find_by_title(&self, title: &str) -> Result<ContentRecord, AggregationError> {
        let needle = title.to_lowercase();
        let page = self.provider.search_multi(title, 1).await?;

        for item in page.results {
            match MediaItem::from_value(item) {
                Ok(MediaItem::Movie(movie)) if title_matches(&movie.title, &needle) => {
                    return Ok(self.enrich_movie(movie).await);
                }
                Ok(MediaItem::Tv(series)) if title_matches(&series.name, &needle) => {
                    return Ok(self.enrich_series(series).await);
                }
                _ => {}
            }
        }
        Err(AggregationError::NotFound)
    }

    /// Titles of one kind tagged with a genre, without enrichment.
    pub async fn discover(
        &self,
        kind: ContentKind,
        genre_id: i64,
        page: u32,
    ) -> Result<ContentListing, AggregationError> {
        let page = self.provider.discover_by_genre(kind, genre_id, page).await?;

        let results: Vec<ContentRecord> = page
            .results
            .into_iter()
            .filter_map(|item| {
                let normalized = match kind {
                    ContentKind::Movie => serde_json::from_value::<MovieRecord>(item)
                        .map(|movie| self.normalizer.normalize_movie(&movie)),
                    ContentKind::Tv => serde_json::from_value::<SeriesRecord>(item)
                        .map(|series| self.normalizer.normalize_series(&series)),
                };
                normalized
                    .map_err(|err| debug!("Skipping discover result: {}", err))
                    .ok()
            })
            .collect();

        Ok(results.into())
    }

    async fn load_history(&self, limit: usize) -> Result<Vec<SearchHistoryEntry>, AggregationError> {
        let history = self.history.clone();
        tokio::task::spawn_blocking(move || history.list_recent(limit))
            .await
            .map_err(|err| AggregationError::Persistence(err.to_string()))?
            .map_err(|err| AggregationError::Persistence(format!("{:#}", err)))
    }

    /// Most recent searches first. Storage failures yield an empty list.
    pub async fn recent_history(&self, limit: usize) -> Vec<SearchHistoryEntry> {
        match self.load_history(limit).await {
            Ok(entries) => entries,
            Err(err) => {
                error!("Failed to load search history: {}", err);
                Vec::new()
            }
        }
    }
}
