use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kith_common::Config;
use kith_dedup::DedupConfig;

mod rest;
mod scan_loop;

pub struct AppState {
    pub pool: PgPool,
    pub dedup: DedupConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    kith_store::migrate::run(&pool).await?;

    let dedup = DedupConfig::with_threshold(config.fuzzy_threshold);

    if config.scan_interval_hours > 0 {
        scan_loop::start_scan_interval(pool.clone(), dedup.clone(), config.scan_interval_hours);
    }

    let state = Arc::new(AppState { pool, dedup });

    let app = Router::new()
        // Health check
        .route("/health", get(|| async { "ok" }))
        // Duplicate review queue
        .route(
            "/api/workspaces/{workspace_id}/duplicates",
            get(rest::list_duplicates),
        )
        .route(
            "/api/workspaces/{workspace_id}/duplicates/scan",
            post(rest::scan),
        )
        .route(
            "/api/workspaces/{workspace_id}/duplicates/{candidate_id}/dismiss",
            post(rest::dismiss),
        )
        .route(
            "/api/workspaces/{workspace_id}/duplicates/merge",
            post(rest::merge),
        )
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Logging layer: method + path + status + latency
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("kith API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
