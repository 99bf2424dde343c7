pub mod config;
mod error;
mod extract;
mod http_layers;
pub mod metrics;
#[allow(clippy::module_inception)]
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use extract::{ApiJson, ApiQuery};
pub use http_layers::*;
pub use server::{make_app, make_metrics_app, run_server};
