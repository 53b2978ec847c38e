//! Enerlight API library
//!
//! Order management for a lighting distributor: catalog, clients, users,
//! priced proposals with their line items, and the project templates used
//! to assemble them. The [`client`] module offers a typed client over the
//! same DTOs.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod pricing;
pub mod services;
pub mod tracing;

use std::{sync::Arc, time::Duration};

use axum::{http::HeaderValue, routing::get, Extension, Router};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
};

use crate::auth::{AuthConfig, AuthService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = handlers::AppServices::new(db.clone(), &config);
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config)));
        Self {
            db,
            config,
            services,
            auth,
        }
    }
}

/// Every JSON endpoint, relative to `/api`.
pub fn api_routes(config: &config::AppConfig) -> Router<AppState> {
    Router::new()
        .nest("/auth", handlers::auth::auth_routes())
        .nest("/products", handlers::products::product_routes())
        .nest("/clients", handlers::clients::client_routes())
        .nest("/orders", handlers::orders::order_routes())
        .nest("/users", handlers::users::user_routes())
        .nest("/projects", handlers::projects::project_routes())
        .nest(
            "/uploads",
            handlers::uploads::upload_routes(config.upload_max_bytes),
        )
        .nest("/health", handlers::health::health_routes())
}

fn cors_layer(config: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if config.should_allow_permissive_cors() {
        ::tracing::info!("Using permissive CORS because explicit origins were not configured");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    }
}

/// The complete application: API under `/api`, stored uploads under `/uploads`,
/// and the OpenAPI document.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .nest("/api", api_routes(&config))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(crate::tracing::configure_http_tracing())
        .layer(cors_layer(&config))
        // Inject AuthService into request extensions for auth middleware
        .layer(Extension(state.auth.clone()))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
