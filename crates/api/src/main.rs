use std::env;

use anyhow::Result;
use wayfarer_api::build_app;
use wayfarer_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("wayfarer_api");

    let locations_path =
        env::var("WAYFARER_LOCATIONS_PATH").unwrap_or_else(|_| "data/locations.json".to_string());
    let bind = env::var("WAYFARER_BIND").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

    let app = build_app(&locations_path).await?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, locations = %locations_path, "wayfarer api started");

    axum::serve(listener, app).await?;
    Ok(())
}
