use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use storefront_catalog::{Category, CategoryPatch};
use storefront_core::CategoryId;
use storefront_query::orchestrator::ListParams;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    let params = ListParams::from_query(params);
    match services.list_categories(&params).await {
        Ok(envelope) => {
            (StatusCode::OK, Json(envelope.map(dto::category_to_json))).into_response()
        }
        Err(e) => errors::query_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateCategoryRequest>,
) -> axum::response::Response {
    let category = match Category::new(body.name, body.description) {
        Ok(c) => c,
        Err(e) => return errors::repo_error_to_response(e.into()),
    };
    match services.create_category(category).await {
        Ok(created) => {
            (StatusCode::CREATED, Json(dto::category_to_json(created))).into_response()
        }
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CategoryId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid category id");
        }
    };
    match services.get_category(id).await {
        Ok(category) => (StatusCode::OK, Json(dto::category_to_json(category))).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateCategoryRequest>,
) -> axum::response::Response {
    let id: CategoryId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid category id");
        }
    };
    let patch = CategoryPatch {
        name: body.name,
        description: body.description,
    };
    match services.update_category(id, patch).await {
        Ok(updated) => (StatusCode::OK, Json(dto::category_to_json(updated))).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CategoryId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid category id");
        }
    };
    match services.delete_category(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}
