//! Product record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, DomainError, DomainResult, ProductId};
use storefront_query::schema::{
    Direction, EntitySchema, FieldKind, FieldSchema, FieldValue, FilterOp, Queryable,
};

pub const MAX_NAME_LEN: usize = 200;

/// Query surface of products. Catalog browsing wants newest-first, so
/// `created_at` descending is the default.
pub static PRODUCT_SCHEMA: EntitySchema = EntitySchema {
    entity: "product",
    fields: &[
        FieldSchema {
            name: "category_id",
            kind: FieldKind::Uuid,
            ops: &[FilterOp::Eq],
        },
        FieldSchema {
            name: "status",
            kind: FieldKind::Text,
            ops: &[FilterOp::Eq],
        },
        FieldSchema {
            name: "name",
            kind: FieldKind::Text,
            ops: &[FilterOp::Eq, FilterOp::Contains],
        },
        FieldSchema {
            name: "price",
            kind: FieldKind::Integer,
            ops: &[FilterOp::Range],
        },
        FieldSchema {
            name: "stock_quantity",
            kind: FieldKind::Integer,
            ops: &[FilterOp::Range],
        },
        FieldSchema {
            name: "created_at",
            kind: FieldKind::Timestamp,
            ops: &[FilterOp::Range],
        },
    ],
    sortable: &["price", "stock_quantity", "name", "created_at"],
    default_sort: &[("created_at", Direction::Desc)],
};

/// Product lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Discontinued,
}

impl ProductStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProductStatus::Active),
            "inactive" => Some(ProductStatus::Inactive),
            "discontinued" => Some(ProductStatus::Discontinued),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Discontinued => "discontinued",
        }
    }
}

/// A product. Belongs to exactly one category; the store enforces that the
/// reference is valid at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    /// Price in the smallest currency unit (e.g. cents). Never negative.
    pub price_cents: i64,
    /// Units on hand. Never negative.
    pub stock_quantity: i64,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a product; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub category_id: Option<CategoryId>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price_cents: Option<i64>,
    pub stock_quantity: Option<i64>,
    pub status: Option<ProductStatus>,
}

impl Product {
    pub fn new(
        category_id: CategoryId,
        name: impl Into<String>,
        description: Option<String>,
        price_cents: i64,
        stock_quantity: i64,
        status: ProductStatus,
    ) -> DomainResult<Self> {
        let now = Utc::now();
        let mut product = Self {
            id: ProductId::new(),
            category_id,
            name: String::new(),
            description,
            price_cents: 0,
            stock_quantity: 0,
            status,
            created_at: now,
            updated_at: now,
        };
        product.set_name(name.into())?;
        product.set_price(price_cents)?;
        product.set_stock(stock_quantity)?;
        Ok(product)
    }

    pub fn apply(&mut self, patch: ProductPatch) -> DomainResult<()> {
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(name) = patch.name {
            self.set_name(name)?;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price_cents) = patch.price_cents {
            self.set_price(price_cents)?;
        }
        if let Some(stock_quantity) = patch.stock_quantity {
            self.set_stock(stock_quantity)?;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// A product is available when it is active and in stock.
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Active && self.stock_quantity > 0
    }

    fn set_name(&mut self, name: String) -> DomainResult<()> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name", "must not be empty"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(DomainError::validation(
                "name",
                format!("must not exceed {MAX_NAME_LEN} characters"),
            ));
        }
        self.name = name;
        Ok(())
    }

    fn set_price(&mut self, price_cents: i64) -> DomainResult<()> {
        if price_cents < 0 {
            return Err(DomainError::validation("price_cents", "must not be negative"));
        }
        self.price_cents = price_cents;
        Ok(())
    }

    fn set_stock(&mut self, stock_quantity: i64) -> DomainResult<()> {
        if stock_quantity < 0 {
            return Err(DomainError::validation(
                "stock_quantity",
                "must not be negative",
            ));
        }
        self.stock_quantity = stock_quantity;
        Ok(())
    }
}

impl Queryable for Product {
    fn schema() -> &'static EntitySchema {
        &PRODUCT_SCHEMA
    }

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Uuid(*self.id.as_uuid())),
            "category_id" => Some(FieldValue::Uuid(*self.category_id.as_uuid())),
            "status" => Some(FieldValue::Text(self.status.as_str().to_string())),
            "name" => Some(FieldValue::Text(self.name.clone())),
            "price" => Some(FieldValue::Integer(self.price_cents)),
            "stock_quantity" => Some(FieldValue::Integer(self.stock_quantity)),
            "created_at" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lighting() -> CategoryId {
        CategoryId::new()
    }

    #[test]
    fn negative_price_is_rejected() {
        let err =
            Product::new(lighting(), "Lamp", None, -1, 0, ProductStatus::Active).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation { field: "price_cents", .. }
        ));
    }

    #[test]
    fn negative_stock_is_rejected() {
        let err =
            Product::new(lighting(), "Lamp", None, 100, -5, ProductStatus::Active).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation { field: "stock_quantity", .. }
        ));
    }

    #[test]
    fn availability_needs_active_status_and_stock() {
        let mut product =
            Product::new(lighting(), "Lamp", None, 2500, 3, ProductStatus::Active).unwrap();
        assert!(product.is_available());

        product
            .apply(ProductPatch { stock_quantity: Some(0), ..Default::default() })
            .unwrap();
        assert!(!product.is_available());

        product
            .apply(ProductPatch {
                stock_quantity: Some(3),
                status: Some(ProductStatus::Discontinued),
                ..Default::default()
            })
            .unwrap();
        assert!(!product.is_available());
    }

    #[test]
    fn rejected_patch_leaves_the_record_unchanged_fieldwise() {
        let mut product =
            Product::new(lighting(), "Lamp", None, 2500, 3, ProductStatus::Active).unwrap();
        let err = product
            .apply(ProductPatch { price_cents: Some(-10), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(product.price_cents, 2500);
    }

    #[test]
    fn schema_is_well_formed() {
        PRODUCT_SCHEMA.validate().unwrap();
    }

    proptest! {
        /// Property: construction never produces a record violating the
        /// price/stock invariants.
        #[test]
        fn constructed_products_satisfy_invariants(
            price in -1_000i64..1_000_000,
            stock in -1_000i64..1_000_000,
        ) {
            match Product::new(lighting(), "Lamp", None, price, stock, ProductStatus::Active) {
                Ok(p) => {
                    prop_assert!(p.price_cents >= 0);
                    prop_assert!(p.stock_quantity >= 0);
                }
                Err(_) => prop_assert!(price < 0 || stock < 0),
            }
        }
    }
}
