//! `storefront-catalog` — the catalog's entity records.
//!
//! Category, Product and Order records with their validation rules, plus the
//! static query schemas that declare what each entity exposes to the query
//! core. The records are plain data: the store owns persistence, the query
//! core only reads them.

pub mod category;
pub mod order;
pub mod product;

pub use category::{CATEGORY_SCHEMA, Category, CategoryPatch};
pub use order::{ORDER_SCHEMA, Order, OrderPatch, OrderStatus};
pub use product::{PRODUCT_SCHEMA, Product, ProductPatch, ProductStatus};

/// Validate every entity schema. Called once at startup; a failure here is a
/// programming error in a schema declaration.
pub fn validate_schemas() -> Result<(), storefront_query::schema::SchemaError> {
    CATEGORY_SCHEMA.validate()?;
    PRODUCT_SCHEMA.validate()?;
    ORDER_SCHEMA.validate()?;
    Ok(())
}
