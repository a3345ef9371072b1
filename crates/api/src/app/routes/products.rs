use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use storefront_catalog::{Product, ProductPatch};
use storefront_core::{CategoryId, ProductId};
use storefront_query::orchestrator::ListParams;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    let params = ListParams::from_query(params);
    match services.list_products(&params).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope.map(dto::product_to_json))).into_response(),
        Err(e) => errors::query_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let category_id: CategoryId = match body.category_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid category id");
        }
    };
    let product = match Product::new(
        category_id,
        body.name,
        body.description,
        body.price_cents,
        body.stock_quantity,
        body.status,
    ) {
        Ok(p) => p,
        Err(e) => return errors::repo_error_to_response(e.into()),
    };
    match services.create_product(product).await {
        Ok(created) => (StatusCode::CREATED, Json(dto::product_to_json(created))).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };
    match services.get_product(id).await {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };
    let category_id = match body.category_id {
        Some(raw) => match raw.parse::<CategoryId>() {
            Ok(v) => Some(v),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid category id",
                );
            }
        },
        None => None,
    };
    let patch = ProductPatch {
        category_id,
        name: body.name,
        description: body.description,
        price_cents: body.price_cents,
        stock_quantity: body.stock_quantity,
        status: body.status,
    };
    match services.update_product(id, patch).await {
        Ok(updated) => (StatusCode::OK, Json(dto::product_to_json(updated))).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };
    match services.delete_product(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}
