//! TaskFlow backend library.
//!
//! A REST API over a single JSON task file. Exposed as a library so the
//! router can be driven in-process by tests.

pub mod config;
pub mod error;
pub mod logic;
pub mod models;
pub mod routes_tasks;
pub mod service;
pub mod store;

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::UNEXPECTED_ERROR;
use crate::models::ApiResponse;
use crate::service::TaskService;

fn panic_response(_: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::failure(UNEXPECTED_ERROR)),
    )
        .into_response()
}

/// Build the full application: `/api` routes, middleware, and optional static files.
pub fn app(service: TaskService, config: &AppConfig) -> Router {
    let mut app = Router::new()
        .nest("/api", routes_tasks::router())
        .with_state(service);

    if let Some(dir) = &config.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
