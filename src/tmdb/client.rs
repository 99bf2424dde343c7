//! HTTP client for the TMDB v3 API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::models::{
    CombinedCredits, GenreList, MovieRecord, PersonRecord, SearchPage, SeriesRecord,
};
use super::{MetadataProvider, UpstreamError};
use crate::content::ContentKind;
use crate::server::metrics::record_upstream_request;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

const DETAILS_APPENDIX: &str = "credits,videos";
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Clone)]
pub struct TmdbClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_sec: u64,
}

impl Default for TmdbClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            timeout_sec: 10,
        }
    }
}

/// Talks to TMDB over HTTPS, authenticating with the `api_key` query parameter.
pub struct TmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(config: TmdbClientConfig) -> Result<Self, UpstreamError> {
        if config.api_key.trim().is_empty() {
            return Err(UpstreamError::NotConfigured(
                "TMDB API key is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| UpstreamError::NotConfigured(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let start = Instant::now();
        let result = self.fetch(endpoint, params).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(UpstreamError::Status { .. }) => "status_error",
            Err(UpstreamError::Decode(_)) => "decode_error",
            Err(_) => "transport_error",
        };
        record_upstream_request(operation, outcome, start.elapsed());

        if let Err(err) = &result {
            warn!("TMDB {} {} failed: {}", operation, endpoint, err);
        }
        result
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status_code: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    fn search_params(query: &str, page: u32) -> [(&'static str, String); 2] {
        [("query", query.to_string()), ("page", page.to_string())]
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn search_multi(&self, query: &str, page: u32) -> Result<SearchPage<Value>, UpstreamError> {
        self.get("search_multi", "/search/multi", &Self::search_params(query, page))
            .await
    }

    async fn search_movies(
        &self,
        query: &str,
        page: u32,
    ) -> Result<SearchPage<MovieRecord>, UpstreamError> {
        self.get("search_movies", "/search/movie", &Self::search_params(query, page))
            .await
    }

    async fn search_tv_shows(
        &self,
        query: &str,
        page: u32,
    ) -> Result<SearchPage<SeriesRecord>, UpstreamError> {
        self.get("search_tv", "/search/tv", &Self::search_params(query, page))
            .await
    }

    async fn search_person(
        &self,
        query: &str,
        page: u32,
    ) -> Result<SearchPage<PersonRecord>, UpstreamError> {
        self.get("search_person", "/search/person", &Self::search_params(query, page))
            .await
    }

    async fn popular_movies(&self, page: u32) -> Result<SearchPage<MovieRecord>, UpstreamError> {
        self.get("popular_movies", "/movie/popular", &[("page", page.to_string())])
            .await
    }

    async fn popular_tv_shows(&self, page: u32) -> Result<SearchPage<SeriesRecord>, UpstreamError> {
        self.get("popular_tv", "/tv/popular", &[("page", page.to_string())])
            .await
    }

    async fn movie_details(&self, id: i64) -> Result<MovieRecord, UpstreamError> {
        self.get(
            "movie_details",
            &format!("/movie/{}", id),
            &[("append_to_response", DETAILS_APPENDIX.to_string())],
        )
        .await
    }

    async fn tv_details(&self, id: i64) -> Result<SeriesRecord, UpstreamError> {
        self.get(
            "tv_details",
            &format!("/tv/{}", id),
            &[("append_to_response", DETAILS_APPENDIX.to_string())],
        )
        .await
    }

    async fn movie_genres(&self) -> Result<GenreList, UpstreamError> {
        self.get("movie_genres", "/genre/movie/list", &[]).await
    }

    async fn tv_genres(&self) -> Result<GenreList, UpstreamError> {
        self.get("tv_genres", "/genre/tv/list", &[]).await
    }

    async fn person_combined_credits(&self, id: i64) -> Result<CombinedCredits, UpstreamError> {
        self.get(
            "person_credits",
            &format!("/person/{}/combined_credits", id),
            &[],
        )
        .await
    }

    async fn discover_by_genre(
        &self,
        kind: ContentKind,
        genre_id: i64,
        page: u32,
    ) -> Result<SearchPage<Value>, UpstreamError> {
        self.get(
            "discover",
            &format!("/discover/{}", kind.as_str()),
            &[
                ("with_genres", genre_id.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }
}
