use axum::extract::FromRef;

use crate::content::ContentAggregator;
use std::sync::Arc;

use super::ServerConfig;

pub type GuardedAggregator = Arc<ContentAggregator>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub aggregator: GuardedAggregator,
}

impl ServerState {
    pub fn new(config: ServerConfig, aggregator: GuardedAggregator) -> ServerState {
        ServerState {
            config,
            aggregator,
        }
    }
}

impl FromRef<ServerState> for GuardedAggregator {
    fn from_ref(input: &ServerState) -> Self {
        input.aggregator.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
