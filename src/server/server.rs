use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Json, Router,
};

use super::error::ApiError;
use super::extract::{ApiJson, ApiQuery};
use super::metrics::metrics_handler;
use super::{log_requests, state::*, ServerConfig};
use crate::content::{ContentKind, ContentRecord, HISTORY_LIMIT};
use crate::history::SearchHistoryEntry;

const WELCOME_MESSAGE: &str =
    "Film & Movie Agent API - Search for your favorite films and shows with real TMDB data!";

#[derive(Serialize)]
struct HomeResponse {
    message: &'static str,
}

#[derive(Deserialize, Debug)]
struct SearchBody {
    pub query: String,
}

#[derive(Serialize)]
struct SearchResponse {
    query: String,
    results: Vec<ContentRecord>,
    total: usize,
    message: String,
}

#[derive(Serialize)]
struct PopularResponse {
    results: Vec<ContentRecord>,
    total: usize,
    message: &'static str,
}

#[derive(Serialize)]
struct GenresResponse {
    genres: Vec<String>,
    total: usize,
}

#[derive(Serialize)]
struct HistoryResponse {
    history: Vec<SearchHistoryEntry>,
    total: usize,
}

#[derive(Serialize)]
struct DiscoverResponse {
    results: Vec<ContentRecord>,
    total: usize,
}

#[derive(Deserialize, Debug)]
struct DiscoverParams {
    genre: i64,
    kind: Option<String>,
    page: Option<u32>,
}

async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: WELCOME_MESSAGE,
    })
}

async fn search_content(
    State(aggregator): State<GuardedAggregator>,
    ApiJson(body): ApiJson<SearchBody>,
) -> Result<Json<SearchResponse>, ApiError> {
    let outcome = aggregator
        .search(&body.query)
        .await
        .map_err(|e| ApiError::from_aggregation(e, "An error occurred while searching"))?;

    let message = format!(
        "Found {} results for '{}' from TMDB",
        outcome.total, outcome.query
    );
    Ok(Json(SearchResponse {
        query: outcome.query,
        results: outcome.results,
        total: outcome.total,
        message,
    }))
}

async fn popular_content(
    State(aggregator): State<GuardedAggregator>,
) -> Result<Json<PopularResponse>, ApiError> {
    let listing = aggregator.popular().await.map_err(|e| {
        ApiError::from_aggregation(e, "An error occurred while fetching popular content")
    })?;

    Ok(Json(PopularResponse {
        results: listing.results,
        total: listing.total,
        message: "Popular movies and shows from TMDB",
    }))
}

async fn list_genres(
    State(aggregator): State<GuardedAggregator>,
) -> Result<Json<GenresResponse>, ApiError> {
    let genres = aggregator
        .genres()
        .await
        .map_err(|e| ApiError::from_aggregation(e, "An error occurred while fetching genres"))?;

    Ok(Json(GenresResponse {
        total: genres.len(),
        genres,
    }))
}

async fn discover_content(
    State(aggregator): State<GuardedAggregator>,
    ApiQuery(params): ApiQuery<DiscoverParams>,
) -> Result<Json<DiscoverResponse>, ApiError> {
    let kind = match params.kind.as_deref() {
        None => ContentKind::Movie,
        Some(raw) => ContentKind::parse(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown content kind '{}'", raw)))?,
    };

    let listing = aggregator
        .discover(kind, params.genre, params.page.unwrap_or(1).max(1))
        .await
        .map_err(|e| ApiError::from_aggregation(e, "An error occurred while discovering content"))?;

    Ok(Json(DiscoverResponse {
        results: listing.results,
        total: listing.total,
    }))
}

async fn get_content(
    State(aggregator): State<GuardedAggregator>,
    Path(id): Path<String>,
) -> Result<Json<ContentRecord>, ApiError> {
    aggregator.get_by_id(&id).await.map(Json).map_err(|e| {
        ApiError::from_aggregation(e, "An error occurred while fetching movie details")
    })
}

async fn search_history(State(aggregator): State<GuardedAggregator>) -> Json<HistoryResponse> {
    let history = aggregator.recent_history(HISTORY_LIMIT).await;
    Json(HistoryResponse {
        total: history.len(),
        history,
    })
}

pub fn make_app(config: ServerConfig, aggregator: GuardedAggregator) -> Router {
    let state = ServerState::new(config.clone(), aggregator);

    let api_routes: Router = Router::new()
        .route("/api", get(home))
        .route("/api/", get(home))
        .route("/api/movies/search", post(search_content))
        .route("/api/movies/popular", get(popular_content))
        .route("/api/movies/genres", get(list_genres))
        .route("/api/movies/discover", get(discover_content))
        .route("/api/movies/{id}", get(get_content))
        .route("/api/search/history", get(search_history))
        .with_state(state.clone());

    let app = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            api_routes.fallback_service(static_files_service)
        }
        None => api_routes,
    };

    app.layer(CorsLayer::permissive())
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(config: ServerConfig, aggregator: GuardedAggregator) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, aggregator);

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            tracing::error!("Metrics server stopped: {}", e);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(listener, app).await?)
}
