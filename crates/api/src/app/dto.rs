//! Request DTOs and explicit entity → JSON mapping.
//!
//! Each entity has exactly one mapping function; domain types never cross
//! the HTTP boundary through blanket serialization.

use serde::{Deserialize, Deserializer};

use storefront_catalog::{Category, Order, OrderStatus, Product, ProductStatus};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    /// Absent = keep, `null` = clear, string = replace.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub status: ProductStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub category_id: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub price_cents: Option<i64>,
    pub stock_quantity: Option<i64>,
    pub status: Option<ProductStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    pub quantity: Option<i64>,
    pub status: Option<OrderStatus>,
}

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// -------------------------
// Response mapping
// -------------------------

pub fn category_to_json(category: Category) -> serde_json::Value {
    serde_json::json!({
        "id": category.id.to_string(),
        "name": category.name,
        "description": category.description,
        "created_at": category.created_at.to_rfc3339(),
        "updated_at": category.updated_at.to_rfc3339(),
    })
}

pub fn product_to_json(product: Product) -> serde_json::Value {
    serde_json::json!({
        "id": product.id.to_string(),
        "category_id": product.category_id.to_string(),
        "name": product.name,
        "description": product.description,
        "price_cents": product.price_cents,
        "stock_quantity": product.stock_quantity,
        "status": product.status.as_str(),
        "is_available": product.is_available(),
        "created_at": product.created_at.to_rfc3339(),
        "updated_at": product.updated_at.to_rfc3339(),
    })
}

pub fn order_to_json(order: Order) -> serde_json::Value {
    serde_json::json!({
        "id": order.id.to_string(),
        "product_id": order.product_id.to_string(),
        "quantity": order.quantity,
        "status": order.status.as_str(),
        "created_at": order.created_at.to_rfc3339(),
        "updated_at": order.updated_at.to_rfc3339(),
    })
}
