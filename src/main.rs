//! Binary entry point for the ticket routing agent.

use std::sync::Arc;

use ticket_router::client::{ClassifierClient, HttpClassifierClient};
use ticket_router::server::{run_server, AppState};
use ticket_router::{init_tracing, AgentConfig, Dispatcher, RoutingPolicy, StatsCollector};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing()?;

    let config = AgentConfig::from_env()?;

    let client: Arc<dyn ClassifierClient> = Arc::new(HttpClassifierClient::new(&config));
    let stats = Arc::new(StatsCollector::new());
    let dispatcher = Dispatcher::new(
        RoutingPolicy::new(),
        Arc::clone(&client),
        Arc::clone(&stats),
    );
    let state = Arc::new(AppState::new(dispatcher, client, stats));

    run_server(&config, state).await
}
