// SPDX-License-Identifier: MIT

//! FitLink API Server
//!
//! Serves the social fitness backend: profiles, friendships, follows,
//! activity logs, direct messages and roles.

use fitlink::{
    config::Config, models::Principal, services::RelationshipEngine, store::Store, AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting FitLink API");

    // Initialize the in-memory store, seeding configured admins
    let store = Store::with_admins(
        config
            .admin_principals
            .iter()
            .map(|p| Principal::from(p.as_str())),
    );
    let relationships = RelationshipEngine::new(store.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        relationships,
    });

    // Build router
    let app = fitlink::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fitlink=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
