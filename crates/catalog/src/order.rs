//! Order record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, OrderId, ProductId};
use storefront_query::schema::{
    Direction, EntitySchema, FieldKind, FieldSchema, FieldValue, FilterOp, Queryable,
};

/// Query surface of orders, newest-first by default.
pub static ORDER_SCHEMA: EntitySchema = EntitySchema {
    entity: "order",
    fields: &[
        FieldSchema {
            name: "product_id",
            kind: FieldKind::Uuid,
            ops: &[FilterOp::Eq],
        },
        FieldSchema {
            name: "status",
            kind: FieldKind::Text,
            ops: &[FilterOp::Eq],
        },
        FieldSchema {
            name: "quantity",
            kind: FieldKind::Integer,
            ops: &[FilterOp::Range],
        },
        FieldSchema {
            name: "created_at",
            kind: FieldKind::Timestamp,
            ops: &[FilterOp::Range],
        },
    ],
    sortable: &["created_at", "quantity", "status"],
    default_sort: &[("created_at", Direction::Desc)],
};

/// Order lifecycle status. No workflow is enforced here; status transitions
/// are plain updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Fulfilled,
}

impl OrderStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "cancelled" => Some(OrderStatus::Cancelled),
            "fulfilled" => Some(OrderStatus::Fulfilled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Fulfilled => "fulfilled",
        }
    }
}

/// An order for a single product. The store guarantees the product exists
/// when the order is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    /// Units ordered. At least 1.
    pub quantity: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for an order; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPatch {
    pub quantity: Option<i64>,
    pub status: Option<OrderStatus>,
}

impl Order {
    pub fn new(product_id: ProductId, quantity: i64) -> DomainResult<Self> {
        let now = Utc::now();
        let mut order = Self {
            id: OrderId::new(),
            product_id,
            quantity: 1,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        order.set_quantity(quantity)?;
        Ok(order)
    }

    pub fn apply(&mut self, patch: OrderPatch) -> DomainResult<()> {
        if let Some(quantity) = patch.quantity {
            self.set_quantity(quantity)?;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    fn set_quantity(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity < 1 {
            return Err(DomainError::validation("quantity", "must be at least 1"));
        }
        self.quantity = quantity;
        Ok(())
    }
}

impl Queryable for Order {
    fn schema() -> &'static EntitySchema {
        &ORDER_SCHEMA
    }

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Uuid(*self.id.as_uuid())),
            "product_id" => Some(FieldValue::Uuid(*self.product_id.as_uuid())),
            "status" => Some(FieldValue::Text(self.status.as_str().to_string())),
            "quantity" => Some(FieldValue::Integer(self.quantity)),
            "created_at" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}
