//! Test server lifecycle management
//!
//! This module spawns the fake TMDB upstream and the API server under test.
//! Each test gets an isolated pair with its own history database.

use super::constants::*;
use super::fixtures::{fake_tmdb_router, UpstreamLog};
use film_agent_server::content::{ContentAggregator, RecordNormalizer};
use film_agent_server::history::SqliteSearchHistoryStore;
use film_agent_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use film_agent_server::tmdb::{TmdbClient, TmdbClientConfig};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Binds a random local port and serves `app` until the returned sender fires
/// or is dropped.
async fn serve_on_random_port(app: axum::Router) -> (String, u16, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");

    let port = listener
        .local_addr()
        .expect("Failed to get local address")
        .port();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
    });

    (format!("http://127.0.0.1:{}", port), port, shutdown_tx)
}

/// Fake TMDB upstream running on a random port
pub struct FakeUpstream {
    /// TMDB-style base URL including the API version path
    pub base_url: String,

    /// Every request the upstream received
    pub log: UpstreamLog,

    _shutdown_tx: Option<oneshot::Sender<()>>,
}

impl FakeUpstream {
    pub async fn spawn() -> Self {
        let log = UpstreamLog::default();
        let (url, _, shutdown_tx) = serve_on_random_port(fake_tmdb_router(log.clone())).await;

        Self {
            base_url: format!("{}{}", url, UPSTREAM_BASE_PATH),
            log,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// A client for this upstream authenticating with `api_key`
    pub fn client_with_key(&self, api_key: &str) -> TmdbClient {
        TmdbClient::new(TmdbClientConfig {
            api_key: api_key.to_string(),
            base_url: self.base_url.clone(),
            timeout_sec: REQUEST_TIMEOUT_SECS,
        })
        .expect("Failed to build TMDB client")
    }

    pub fn client(&self) -> TmdbClient {
        self.client_with_key(TEST_API_KEY)
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Test server instance wired to a fake upstream and a temporary history DB
///
/// When dropped, both servers gracefully shut down and temp resources are
/// cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// The upstream the server talks to
    pub upstream: FakeUpstream,

    /// History store for direct database access in tests
    pub history: Arc<SqliteSearchHistoryStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the history database cannot be created, a port cannot be
    /// bound or the server doesn't become ready within the timeout.
    pub async fn spawn() -> Self {
        Self::spawn_with_api_key(TEST_API_KEY).await
    }

    /// Spawns a server whose TMDB client sends `api_key`. Anything other than
    /// [`TEST_API_KEY`] is rejected by the fake upstream.
    pub async fn spawn_with_api_key(api_key: &str) -> Self {
        let upstream = FakeUpstream::spawn().await;

        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let history = Arc::new(
            SqliteSearchHistoryStore::new(temp_db_dir.path().join("history.db"))
                .expect("Failed to open history store"),
        );

        let aggregator = ContentAggregator::new(
            Arc::new(upstream.client_with_key(api_key)),
            history.clone(),
            RecordNormalizer::new(TEST_IMAGE_BASE_URL),
        );

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };
        let app = make_app(config, Arc::new(aggregator));
        let (base_url, port, shutdown_tx) = serve_on_random_port(app).await;

        let server = Self {
            base_url,
            port,
            upstream,
            history,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the /api/ endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/api/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
