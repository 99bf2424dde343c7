//! Fake TMDB upstream
//!
//! An axum router answering the TMDB v3 endpoints the server uses with
//! canned JSON. Every request is recorded so tests can assert on what the
//! client actually sent, and requests without the expected `api_key` query
//! parameter are rejected the way TMDB rejects them.

use super::constants::*;
use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Requests received by the fake upstream, as `path?query`.
#[derive(Clone, Default)]
pub struct UpstreamLog {
    requests: Arc<Mutex<Vec<String>>>,
}

impl UpstreamLog {
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of recorded requests whose `path?query` contains `needle`
    pub fn count_matching(&self, needle: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.contains(needle))
            .count()
    }
}

async fn record_and_authorize(
    State(log): State<UpstreamLog>,
    request: Request,
    next: Next,
) -> Response {
    let uri = request.uri();
    let query = uri.query().unwrap_or_default().to_string();
    log.requests
        .lock()
        .unwrap()
        .push(format!("{}?{}", uri.path(), query));

    let expected = format!("api_key={}", TEST_API_KEY);
    if !query.split('&').any(|pair| pair == expected) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "status_code": 7,
                "status_message": "Invalid API key: You must be granted a valid key.",
                "success": false
            })),
        )
            .into_response();
    }
    next.run(request).await
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found.",
            "success": false
        })),
    )
        .into_response()
}

fn page(results: Vec<Value>) -> Response {
    let total = results.len();
    Json(json!({
        "page": 1,
        "results": results,
        "total_pages": 1,
        "total_results": total
    }))
    .into_response()
}

// ============================================================================
// Canned Records
// ============================================================================

pub fn matrix_summary() -> Value {
    json!({
        "id": MATRIX_ID,
        "title": MATRIX_TITLE,
        "release_date": "1999-03-30",
        "overview": "A hacker learns the truth about his reality.",
        "poster_path": "/matrix.jpg",
        "vote_average": 8.2,
        "popularity": 80.0,
        "genre_ids": [28, 878],
        "original_language": "en"
    })
}

pub fn matrix_details() -> Value {
    let mut details = matrix_summary();
    let extra = json!({
        "runtime": 136,
        "genres": [
            {"id": 28, "name": "Action"},
            {"id": 878, "name": "Science Fiction"}
        ],
        "production_countries": [
            {"iso_3166_1": "US", "name": "United States of America"}
        ],
        "credits": {
            "cast": [
                {"name": "Keanu Reeves", "character": "Neo", "order": 0},
                {"name": "Laurence Fishburne", "character": "Morpheus", "order": 1}
            ],
            "crew": [
                {"name": "Bill Pope", "job": "Director of Photography", "department": "Camera"},
                {"name": "Lana Wachowski", "job": "Director", "department": "Directing"}
            ]
        },
        "videos": {"results": []}
    });
    if let (Some(target), Some(source)) = (details.as_object_mut(), extra.as_object()) {
        target.extend(source.clone());
    }
    details
}

pub fn reloaded_summary() -> Value {
    json!({
        "id": RELOADED_ID,
        "title": RELOADED_TITLE,
        "release_date": "2003-05-15",
        "overview": "",
        "poster_path": null,
        "vote_average": 7.0,
        "popularity": 40.0,
        "genre_ids": [28, 12345],
        "original_language": "en"
    })
}

pub fn low_rated_summary() -> Value {
    json!({
        "id": LOW_RATED_ID,
        "title": LOW_RATED_TITLE,
        "release_date": "2010-01-01",
        "overview": "Not very good.",
        "vote_average": 5.0,
        "genre_ids": [35],
        "original_language": "fr"
    })
}

pub fn thrones_summary() -> Value {
    json!({
        "id": THRONES_ID,
        "name": THRONES_TITLE,
        "first_air_date": "2011-04-17",
        "overview": "Noble families fight for the Iron Throne.",
        "poster_path": "/got.jpg",
        "vote_average": 8.4,
        "popularity": 300.0,
        "genre_ids": [10765, 18],
        "original_language": "en"
    })
}

pub fn thrones_details() -> Value {
    let mut details = thrones_summary();
    let extra = json!({
        "last_air_date": "2019-05-19",
        "episode_run_time": [60],
        "created_by": [
            {"name": "David Benioff"},
            {"name": "D. B. Weiss"}
        ],
        "genres": [
            {"id": 10765, "name": "Sci-Fi & Fantasy"},
            {"id": 18, "name": "Drama"}
        ],
        "production_countries": [
            {"iso_3166_1": "GB", "name": "United Kingdom"},
            {"iso_3166_1": "US", "name": "United States of America"}
        ],
        "credits": {
            "cast": [
                {"name": "Emilia Clarke", "character": "Daenerys Targaryen", "order": 0},
                {"name": "Kit Harington", "character": "Jon Snow", "order": 1}
            ],
            "crew": []
        }
    });
    if let (Some(target), Some(source)) = (details.as_object_mut(), extra.as_object()) {
        target.extend(source.clone());
    }
    details
}

pub fn cancelled_summary() -> Value {
    json!({
        "id": CANCELLED_ID,
        "name": CANCELLED_TITLE,
        "first_air_date": "2015-02-01",
        "overview": "One season and done.",
        "vote_average": 6.0,
        "genre_ids": [18],
        "original_language": "de"
    })
}

fn keanu_summary() -> Value {
    json!({
        "id": KEANU_ID,
        "name": "Keanu Reeves",
        "popularity": 50.0,
        "known_for_department": "Acting"
    })
}

fn with_media_type(mut item: Value, media_type: &str) -> Value {
    if let Some(object) = item.as_object_mut() {
        object.insert("media_type".to_string(), json!(media_type));
    }
    item
}

// ============================================================================
// Handlers
// ============================================================================

async fn search(
    Path(kind): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let query = params
        .get("query")
        .map(|q| q.to_lowercase())
        .unwrap_or_default();
    let matrix = query.contains(MATRIX_QUERY);
    let thrones = query.contains("thrones");
    let keanu = query.contains("keanu");

    let results = match kind.as_str() {
        "multi" => {
            let mut results = Vec::new();
            if matrix {
                results.push(with_media_type(matrix_summary(), "movie"));
                results.push(with_media_type(reloaded_summary(), "movie"));
                results.push(with_media_type(keanu_summary(), "person"));
                results.push(json!({"id": 1, "media_type": "collection"}));
            }
            if thrones {
                results.push(with_media_type(thrones_summary(), "tv"));
            }
            results
        }
        "movie" if matrix => vec![matrix_summary(), reloaded_summary()],
        "tv" if thrones => vec![thrones_summary()],
        "person" if keanu => vec![keanu_summary()],
        "movie" | "tv" | "person" => Vec::new(),
        _ => return not_found(),
    };
    page(results)
}

async fn movie_details(Path(id): Path<i64>) -> Response {
    match id {
        MATRIX_ID => Json(matrix_details()).into_response(),
        RELOADED_ID => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"status_code": 11, "status_message": "Internal error."})),
        )
            .into_response(),
        BROKEN_BODY_ID => "{\"id\": 666, \"title\": ".into_response(),
        _ => not_found(),
    }
}

async fn tv_details(Path(id): Path<i64>) -> Response {
    match id {
        THRONES_ID => Json(thrones_details()).into_response(),
        _ => not_found(),
    }
}

async fn popular_movies() -> Response {
    page(vec![low_rated_summary(), matrix_summary()])
}

async fn popular_tv() -> Response {
    page(vec![thrones_summary(), cancelled_summary()])
}

async fn genre_list(Path(kind): Path<String>) -> Response {
    let genres = match kind.as_str() {
        "movie" => json!([
            {"id": 28, "name": "Action"},
            {"id": 18, "name": "Drama"},
            {"id": 35, "name": "Comedy"}
        ]),
        "tv" => json!([
            {"id": 18, "name": "Drama"},
            {"id": 10762, "name": "Kids"}
        ]),
        _ => return not_found(),
    };
    Json(json!({ "genres": genres })).into_response()
}

/// Keanu's credits, ranked by popularity: John Wick (95), The Matrix (80),
/// Produced Film (50), then a low-popularity series that gets cut.
async fn person_credits(Path(id): Path<i64>) -> Response {
    if id != KEANU_ID {
        return not_found();
    }
    Json(json!({
        "cast": [
            with_media_type(matrix_summary(), "movie"),
            with_media_type(json!({
                "id": 245891,
                "title": JOHN_WICK_TITLE,
                "release_date": "2014-10-22",
                "vote_average": 7.4,
                "popularity": 95.0,
                "genre_ids": [28, 53]
            }), "movie"),
            with_media_type(json!({
                "id": 1400,
                "name": "Minor Show",
                "first_air_date": "2001-01-01",
                "popularity": 10.0
            }), "tv")
        ],
        "crew": [
            with_media_type(json!({
                "id": 606,
                "title": PRODUCED_TITLE,
                "release_date": "2005-06-01",
                "vote_average": 6.1,
                "popularity": 50.0,
                "job": "Producer"
            }), "movie")
        ]
    }))
    .into_response()
}

async fn discover(
    Path(kind): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let action = params.get("with_genres").map(String::as_str) == Some("28");
    match kind.as_str() {
        "movie" if action => page(vec![matrix_summary(), json!("not a movie")]),
        "tv" if action => page(vec![thrones_summary()]),
        "movie" | "tv" => page(Vec::new()),
        _ => not_found(),
    }
}

/// Builds the fake upstream, served under [`UPSTREAM_BASE_PATH`].
pub fn fake_tmdb_router(log: UpstreamLog) -> Router {
    let routes = Router::new()
        .route("/search/{kind}", get(search))
        .route("/movie/popular", get(popular_movies))
        .route("/movie/{id}", get(movie_details))
        .route("/tv/popular", get(popular_tv))
        .route("/tv/{id}", get(tv_details))
        .route("/genre/{kind}/list", get(genre_list))
        .route("/person/{id}/combined_credits", get(person_credits))
        .route("/discover/{kind}", get(discover));

    Router::new()
        .nest(UPSTREAM_BASE_PATH, routes)
        .layer(middleware::from_fn_with_state(log, record_and_authorize))
}
