//! Shared fixtures for the resolver and orchestrator tests.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::schema::{
    Direction, EntitySchema, FieldKind, FieldSchema, FieldValue, FilterOp, Queryable,
};

/// Product-shaped schema used across the unit tests.
pub static SAMPLE_SCHEMA: EntitySchema = EntitySchema {
    entity: "sample",
    fields: &[
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
            name: "created_at",
            kind: FieldKind::Timestamp,
            ops: &[FilterOp::Range],
        },
    ],
    sortable: &["name", "price", "created_at"],
    default_sort: &[("created_at", Direction::Desc)],
};

#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

impl Queryable for SampleRow {
    fn schema() -> &'static EntitySchema {
        &SAMPLE_SCHEMA
    }

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Uuid(self.id)),
            "name" => Some(FieldValue::Text(self.name.clone())),
            "price" => Some(FieldValue::Integer(self.price)),
            "created_at" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

/// Build a row with a deterministic id and timestamp derived from `seq`.
pub fn sample_row(name: &str, price: i64, seq: u128) -> SampleRow {
    SampleRow {
        id: Uuid::from_u128(seq),
        name: name.to_string(),
        price,
        created_at: Utc.timestamp_opt(1_700_000_000 + seq as i64, 0).unwrap(),
    }
}
