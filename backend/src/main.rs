mod config;
mod constants;
mod errors;
mod gateway;
mod middlewares;
mod models;
mod rooms;
mod routes;
mod state;
mod store;
mod utils;
mod worker;

#[cfg(test)]
mod tests;

use std::{io::IsTerminal, net::SocketAddr, sync::Arc};

use axum::{middleware, response::IntoResponse, routing::get, Json, Router};
use clap::Parser;
use config::{Config, Options};
use errors::Error;
use models::ErrorResponse;
use state::AppState;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::filter::LevelFilter;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

#[derive(OpenApi)]
#[openapi(
    info(title = "Live Auction API", description = "Timed live auctions with realtime bidding."),
    tags(
        (name = "Auction", description = "Auction lifecycle"),
        (name = "Service", description = "Service status"),
    ),
)]
struct ApiDoc;

fn init_tracing() -> Result<(), Error> {
    let fmt_builder = tracing_subscriber::fmt()
        .with_line_number(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stderr().is_terminal());

    // Compact output on a terminal, JSON lines otherwise.
    if std::io::stderr().is_terminal() {
        tracing::subscriber::set_global_default(fmt_builder.compact().finish())?;
    } else {
        tracing::subscriber::set_global_default(fmt_builder.json().finish())?;
    }
    Ok(())
}

pub fn create_service(state: Arc<AppState>) -> Result<Router, Error> {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(routes::router())
        .merge(routes::auction::router())
        .split_for_parts();
    let api_yaml = api.to_yaml()?;

    let router = router
        .route(
            "/v1/openapi.json",
            get(move || {
                let api = api.clone();
                async move { Json(api) }
            }),
        )
        .route(
            "/v1/openapi.yaml",
            get(move || {
                let api_yaml = api_yaml.clone();
                async move { api_yaml }
            }),
        )
        .route("/v1/ws", get(routes::ws::ws_route_handler))
        .fallback(|| async { ErrorResponse::not_found().into_response() })
        .layer(middleware::from_fn(middlewares::trace_client))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    Ok(router)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let options = Options::parse();
    init_tracing()?;

    let config = Config::load(&options)?;
    tracing::info!(?config, "Auction server starting");

    let state = Arc::new(AppState::new(config));
    let sweeper = state
        .config
        .auto_finish
        .then(|| tokio::spawn(worker::run_expiry_sweeper(state.clone())));

    let app = create_service(state.clone())?;
    let listener = tokio::net::TcpListener::bind(state.config.listen_addr).await?;
    tracing::info!("Listening on {}", state.config.listen_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    tracing::info!("Auction server stopped");
    Ok(())
}
