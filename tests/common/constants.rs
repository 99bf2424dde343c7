//! Test constants shared across all E2E tests
//!
//! Centralizes fixture IDs, titles and timeouts so the fake upstream and the
//! assertions never drift apart.

// ============================================================================
// Fake Upstream
// ============================================================================

/// API key the fake TMDB upstream accepts
pub const TEST_API_KEY: &str = "test-api-key";

/// Path prefix the fake upstream serves under, mirroring TMDB's `/3`
pub const UPSTREAM_BASE_PATH: &str = "/3";

/// Image base URL handed to the normalizer
pub const TEST_IMAGE_BASE_URL: &str = "https://images.test/w500";

// ============================================================================
// Fixture IDs
// ============================================================================

/// "The Matrix", full details available
pub const MATRIX_ID: i64 = 603;

/// "The Matrix Reloaded", details lookup answers 500
pub const RELOADED_ID: i64 = 604;

/// "Low Rated Movie", details lookup answers 404
pub const LOW_RATED_ID: i64 = 700;

/// "Game of Thrones", only exists as a series
pub const THRONES_ID: i64 = 1399;

/// "Cancelled Show", popular series whose details lookup answers 404
pub const CANCELLED_ID: i64 = 1500;

/// Keanu Reeves, expanded into his credits by multi-search
pub const KEANU_ID: i64 = 6384;

/// Movie whose details body is not valid JSON
pub const BROKEN_BODY_ID: i64 = 666;

/// Genre ID for "Action"
pub const ACTION_GENRE_ID: i64 = 28;

// ============================================================================
// Fixture Metadata
// ============================================================================

pub const MATRIX_TITLE: &str = "The Matrix";

pub const RELOADED_TITLE: &str = "The Matrix Reloaded";

pub const LOW_RATED_TITLE: &str = "Low Rated Movie";

pub const THRONES_TITLE: &str = "Game of Thrones";

pub const CANCELLED_TITLE: &str = "Cancelled Show";

pub const JOHN_WICK_TITLE: &str = "John Wick";

pub const PRODUCED_TITLE: &str = "Produced Film";

/// Query matching the Matrix titles and Keanu Reeves in multi-search
pub const MATRIX_QUERY: &str = "matrix";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Maximum time to wait for a background history write (milliseconds)
pub const HISTORY_WRITE_TIMEOUT_MS: u64 = 2000;
