// Route exports
pub mod packages;
pub mod users;

use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

use crate::auth::JwtIssuer;
use crate::core::{MatchingEngine, PackageService};
use crate::models::HealthResponse;
use crate::services::{PostgresStore, RedisCache, S3ObjectStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PostgresStore>,
    pub engine: MatchingEngine<PostgresStore, RedisCache>,
    pub packages: PackageService<PostgresStore>,
    pub storage: Arc<S3ObjectStore>,
    pub tokens: JwtIssuer,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check)).service(
        web::scope("/v1")
            .configure(users::configure)
            .configure(packages::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
