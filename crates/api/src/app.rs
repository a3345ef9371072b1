//! Application wiring: services, router, startup checks.

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use crate::app::services::AppServices;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Choose the store backend for this process.
///
/// In-memory by default; with the `postgres` feature and `DATABASE_URL` set,
/// the Postgres store is used instead.
pub async fn build_services() -> AppServices {
    #[cfg(feature = "postgres")]
    if let Ok(url) = std::env::var("DATABASE_URL") {
        let store = storefront_infra::PgStore::connect(&url)
            .await
            .expect("failed to connect to DATABASE_URL");
        tracing::info!("using postgres store");
        return AppServices::postgres(store);
    }

    tracing::info!("using in-memory store");
    AppServices::in_memory()
}

/// Build the full router.
///
/// Schema validation runs here once; an inconsistent schema declaration is a
/// programming error and aborts startup.
pub fn build_app(services: AppServices) -> Router {
    storefront_catalog::validate_schemas().expect("entity query schemas are inconsistent");

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/categories", routes::categories::router())
        .nest("/products", routes::products::router())
        .nest("/orders", routes::orders::router())
        .layer(Extension(Arc::new(services)))
}

async fn healthz() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
