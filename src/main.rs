use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use policy_assistant::core::config::{AppPaths, ServerSettings};
use policy_assistant::core::logging;
use policy_assistant::server::router::router;
use policy_assistant::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths);

    let state = AppState::initialize_with(paths)
        .await
        .context("Failed to initialize application state")?;

    let config = state.config.load_config()?;
    let server = ServerSettings::from_config(&config);
    let bind_addr = format!("{}:{}", server.host, server.port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!(
        "Listening on {} ({} documents loaded)",
        addr,
        state.documents.count().await
    );

    let app: Router = router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
