use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use storefront_catalog::{Order, OrderPatch};
use storefront_core::{OrderId, ProductId};
use storefront_query::orchestrator::ListParams;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    let params = ListParams::from_query(params);
    match services.list_orders(&params).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope.map(dto::order_to_json))).into_response(),
        Err(e) => errors::query_error_to_response(e),
    }
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match body.product_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };
    let order = match Order::new(product_id, body.quantity) {
        Ok(o) => o,
        Err(e) => return errors::repo_error_to_response(e.into()),
    };
    match services.create_order(order).await {
        Ok(created) => (StatusCode::CREATED, Json(dto::order_to_json(created))).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id");
        }
    };
    match services.get_order(id).await {
        Ok(order) => (StatusCode::OK, Json(dto::order_to_json(order))).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateOrderRequest>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id");
        }
    };
    let patch = OrderPatch {
        quantity: body.quantity,
        status: body.status,
    };
    match services.update_order(id, patch).await {
        Ok(updated) => (StatusCode::OK, Json(dto::order_to_json(updated))).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id");
        }
    };
    match services.delete_order(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}
