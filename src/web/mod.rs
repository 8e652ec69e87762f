use axum::{
    Router,
    extract::Request,
    http::Method,
    middleware::{self as axum_middleware, Next},
    response::Response,
    routing::get,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::server::config::ServerConfig;
use crate::web::render::LeaderboardRenderer;
use crate::web::routes::*;

pub use crate::web::error::AppError;

pub mod error;
pub mod models;
pub mod render;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabaseConnection,
    pub config: Arc<ServerConfig>,
    pub renderer: Arc<LeaderboardRenderer>,
}

async fn home_handler() -> &'static str {
    "Ranking server is running."
}

async fn health_check_handler() -> &'static str {
    "OK"
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();
    let response = next.run(req).await;
    info!(
        status = response.status().as_u16(),
        %method,
        %uri,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Handled request."
    );
    response
}

pub fn create_axum_router(
    db_pool: DatabaseConnection,
    config: Arc<ServerConfig>,
    renderer: Arc<LeaderboardRenderer>,
) -> Router {
    let app_state = Arc::new(AppState {
        db_pool,
        config,
        renderer,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(home_handler))
        .route("/api/health", get(health_check_handler))
        .merge(ranking_routes::create_ranking_router())
        .with_state(app_state)
        .layer(cors)
        .layer(axum_middleware::from_fn(log_requests))
}
