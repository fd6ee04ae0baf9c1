use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use amora_api::auth::JwtIssuer;
use amora_api::config::Settings;
use amora_api::core::{CacheKey, MatchingEngine, PackageService};
use amora_api::routes::{self, AppState};
use amora_api::services::{PostgresStore, RedisCache, S3ObjectStore};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap_or_default())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

async fn build_s3_client(settings: &amora_api::config::StorageSettings) -> aws_sdk_s3::Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(settings.region.clone()));

    if let Some(endpoint) = &settings.endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    let config = loader.load().await;
    aws_sdk_s3::Client::new(&config)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Amora API...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize Redis-backed exclusion cache (required - the daily
    // exclusion and quota invariants live there)
    let cache_timeout = Duration::from_secs(settings.cache.operation_timeout_secs);
    let cache = match RedisCache::new(&settings.cache.redis_url, cache_timeout).await {
        Ok(cache) => {
            info!("Exclusion cache initialized (namespace: {})", settings.cache.namespace);
            Arc::new(cache)
        }
        Err(e) => {
            error!("Failed to connect to Redis: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "Redis connection required"));
        }
    };

    // Initialize PostgreSQL store
    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let db_min_conn = settings.database.min_connections.unwrap_or(1);

    let store = Arc::new(
        PostgresStore::new(
            &settings.database.url,
            db_max_conn,
            db_min_conn,
            Duration::from_secs(settings.database.operation_timeout_secs),
            Duration::from_secs(settings.cache.package_ttl_secs),
        )
        .await
        .unwrap_or_else(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            panic!("PostgreSQL connection error: {}", e);
        }),
    );

    info!("PostgreSQL store initialized (max: {} connections)", db_max_conn);

    // Initialize object storage for profile photos
    let s3 = build_s3_client(&settings.storage).await;
    let storage = Arc::new(S3ObjectStore::new(
        s3,
        settings.storage.bucket.clone(),
        settings.storage.public_url.clone(),
        Duration::from_secs(settings.cache.operation_timeout_secs),
    ));

    info!("Object storage initialized (bucket: {})", settings.storage.bucket);

    // Token issuer
    let tokens = JwtIssuer::new(
        &settings.auth.jwt_secret,
        settings.auth.access_ttl_secs,
        settings.auth.refresh_ttl_secs,
    );

    // Matching engine and entitlements on top of the shared stores
    let keys = CacheKey::new(settings.cache.namespace.clone());
    let engine = MatchingEngine::new(store.clone(), cache.clone(), keys);
    let packages = PackageService::new(store.clone());

    info!("Matching engine initialized");

    // Build application state
    let app_state = AppState {
        store,
        engine,
        packages,
        storage,
        tokens: tokens.clone(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            // Raw photo uploads come through the payload path
            .app_data(web::PayloadConfig::new(5 * 1024 * 1024))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
