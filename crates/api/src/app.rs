use axum::{middleware, routing::get, Router};
use domain::services::ReportStores;
use persistence::repositories::{
    AccessRepository, AttachmentRepository, CertificateRepository, IssueRepository,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, require_auth, trace_id};
use crate::routes::{files, health, reports};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stores: ReportStores,
    /// Present when the stores are backed by PostgreSQL; read by the health probes.
    pub pool: Option<PgPool>,
}

/// Builds the application over the PostgreSQL repositories.
pub fn create_app(config: Config, pool: PgPool) -> Router {
    let stores = ReportStores {
        certificates: Arc::new(CertificateRepository::new(pool.clone())),
        issues: Arc::new(IssueRepository::new(pool.clone())),
        attachments: Arc::new(AttachmentRepository::new(pool.clone())),
        access: Arc::new(AccessRepository::new(pool.clone())),
    };
    create_app_with_stores(config, stores, Some(pool))
}

pub fn create_app_with_stores(config: Config, stores: ReportStores, pool: Option<PgPool>) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        config: config.clone(),
        stores,
        pool,
    };

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Report routes (require API key authentication)
    let protected_routes = Router::new()
        .route(
            "/api/v1/certificates/:certificate_id/report",
            get(reports::get_report),
        )
        .route(
            "/api/v1/certificates/:certificate_id/files/:file_id",
            get(files::get_certificate_file),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
