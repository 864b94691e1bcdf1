//! Web layer
//!
//! HTTP surface for the console: playlist export plus CRUD for providers,
//! streams and filter rules. Handlers are thin; they validate parameters,
//! call the store or the playlist service, and map errors to status codes.
//! The requesting user is an explicit path parameter on every route, never
//! implicit session state.

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{
    config::Config, database::Database, ingestor::IngestorService, playlist::PlaylistService,
};

pub mod api;
pub mod handlers;
pub mod responses;

pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: Config, database: Database, ingestor: IngestorService) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
        let app = Self::create_router(AppState {
            playlist: PlaylistService::new(database.clone()),
            database,
            ingestor,
        });

        Ok(Self { app, addr })
    }

    fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health_check))
            // Playlist export: kind is live|vod|series
            .route(
                "/playlist/:user_id/:kind",
                get(handlers::serve_playlist),
            )
            .nest("/api/v1", Self::api_v1_routes())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    fn api_v1_routes() -> Router<AppState> {
        Router::new()
            // Providers
            .route(
                "/users/:user_id/providers",
                get(api::list_providers).post(api::create_provider),
            )
            .route(
                "/users/:user_id/providers/:id",
                get(api::get_provider)
                    .put(api::update_provider)
                    .delete(api::delete_provider),
            )
            .route(
                "/users/:user_id/providers/:id/refresh",
                post(api::refresh_provider),
            )
            // Streams
            .route("/users/:user_id/streams", get(api::list_streams))
            .route(
                "/users/:user_id/streams/:id",
                get(api::get_stream)
                    .put(api::update_stream)
                    .delete(api::delete_stream),
            )
            .route("/users/:user_id/streams/:id/move", post(api::move_stream))
            // Filter rules
            .route(
                "/users/:user_id/filters",
                get(api::list_filter_rules).post(api::create_filter_rule),
            )
            .route(
                "/users/:user_id/filters/:id",
                get(api::get_filter_rule)
                    .put(api::update_filter_rule)
                    .delete(api::delete_filter_rule),
            )
            // Missing streams (reconciliation bookkeeping)
            .route(
                "/users/:user_id/missing-streams",
                get(api::list_missing_streams).delete(api::clear_missing_streams),
            )
    }

    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub playlist: PlaylistService,
    pub ingestor: IngestorService,
}
