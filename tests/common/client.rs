//! HTTP client for end-to-end tests
//!
//! This module wraps reqwest and provides methods for all film-agent-server
//! endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Root
    // ========================================================================

    /// GET /api/
    pub async fn home(&self) -> Response {
        self.client
            .get(format!("{}/api/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // Content Endpoints
    // ========================================================================

    /// POST /api/movies/search
    pub async fn search(&self, query: &str) -> Response {
        self.client
            .post(format!("{}/api/movies/search", self.base_url))
            .json(&json!({ "query": query }))
            .send()
            .await
            .expect("Search request failed")
    }

    /// GET /api/movies/popular
    pub async fn popular(&self) -> Response {
        self.client
            .get(format!("{}/api/movies/popular", self.base_url))
            .send()
            .await
            .expect("Popular request failed")
    }

    /// GET /api/movies/genres
    pub async fn genres(&self) -> Response {
        self.client
            .get(format!("{}/api/movies/genres", self.base_url))
            .send()
            .await
            .expect("Genres request failed")
    }

    /// GET /api/movies/discover?genre={genre}[&kind={kind}]
    pub async fn discover(&self, genre: i64, kind: Option<&str>) -> Response {
        let mut request = self
            .client
            .get(format!("{}/api/movies/discover", self.base_url))
            .query(&[("genre", genre.to_string())]);
        if let Some(kind) = kind {
            request = request.query(&[("kind", kind)]);
        }
        request.send().await.expect("Discover request failed")
    }

    /// GET /api/movies/{id}
    pub async fn get_content(&self, id_or_title: &str) -> Response {
        self.client
            .get(format!("{}/api/movies/{}", self.base_url, id_or_title))
            .send()
            .await
            .expect("Get content request failed")
    }

    // ========================================================================
    // History
    // ========================================================================

    /// GET /api/search/history
    pub async fn history(&self) -> Response {
        self.client
            .get(format!("{}/api/search/history", self.base_url))
            .send()
            .await
            .expect("History request failed")
    }
}
