//! Stagetrack API Library
//!
//! Staging-yard tracking: pallet entrances, batch exit processing, and
//! monthly storage cost reports.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{
    http::HeaderValue,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

/// Build the full application router with middleware applied.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.cors_origins.as_deref());

    Router::new()
        .merge(openapi::swagger_ui())
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api_v1_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CompressionLayer::new())
        .with_state(state)
}

/// Versioned API routes.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    let entrances = Router::new()
        .route(
            "/entrances",
            get(handlers::entrances::list_entrances).post(handlers::entrances::create_entrance),
        )
        .route(
            "/entrances/exits/batch",
            post(handlers::entrances::process_exit_batch),
        )
        .route(
            "/entrances/search/part-number/:text",
            get(handlers::entrances::search_by_part_number),
        )
        .route(
            "/entrances/search/folio/:folio",
            get(handlers::entrances::search_by_folio),
        )
        .route(
            "/entrances/:id",
            get(handlers::entrances::get_entrance)
                .put(handlers::entrances::update_entrance)
                .delete(handlers::entrances::delete_entrance),
        )
        .route(
            "/entrances/:id/exits",
            patch(handlers::entrances::update_exits),
        );

    let reports = Router::new()
        .route(
            "/reports/available",
            get(handlers::reports::available_reports),
        )
        .route(
            "/reports/monthly/:year/:month",
            get(handlers::reports::monthly_report),
        )
        .route(
            "/reports/monthly/:year/:month/download",
            get(handlers::reports::download_monthly_report),
        );

    entrances.merge(reports)
}

fn cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some(list) => {
            let parsed: Vec<HeaderValue> = list
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parsed))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}
