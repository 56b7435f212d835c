//! Server entry point: tracing init, env configuration, bind, serve.

use anyhow::Result;
use idlink::http_server::{run_http_server, AppState};
use idlink::{IdentityResolver, RetryTuning, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env();
    let state = AppState::new(IdentityResolver::new(), RetryTuning::default());

    run_http_server(&config.bind_addr(), state).await
}
