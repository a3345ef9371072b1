//! Statically declared query schemas.
//!
//! Each entity declares, once, which fields may be filtered (and with which
//! operators), which fields may be sorted, and its default ordering. Schemas
//! are plain `'static` data so they can be validated at startup and shared
//! freely between the resolvers and the store implementations.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Value type of a filterable or sortable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Uuid,
    Timestamp,
}

/// Filter operator families a field may allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Exact match: `field=value`.
    Eq,
    /// Bounded range: `min_field=..` / `max_field=..`.
    Range,
    /// Case-insensitive substring: `field_contains=value`. Text fields only.
    Contains,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One filterable field of an entity.
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub ops: &'static [FilterOp],
}

/// The complete query surface of one entity type.
#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    pub entity: &'static str,
    pub fields: &'static [FieldSchema],
    pub sortable: &'static [&'static str],
    pub default_sort: &'static [(&'static str, Direction)],
}

/// A schema declaration is internally inconsistent.
///
/// These are programming errors, caught once at startup, never per request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema `{entity}` declares field `{field}` twice")]
    DuplicateField { entity: &'static str, field: &'static str },

    #[error("schema `{entity}` allows Contains on non-text field `{field}`")]
    ContainsOnNonText { entity: &'static str, field: &'static str },

    #[error("schema `{entity}` default-sorts by `{field}`, which is not sortable")]
    DefaultSortNotSortable { entity: &'static str, field: &'static str },
}

impl EntitySchema {
    /// Look up a filterable field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Resolve a sortable field name to its `'static` schema spelling.
    ///
    /// `id` is always sortable; it is the mandatory final tie-break.
    pub fn sortable_field(&self, name: &str) -> Option<&'static str> {
        if name == "id" {
            return Some("id");
        }
        self.sortable.iter().find(|s| **s == name).copied()
    }

    /// Consistency check, run once at startup.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    entity: self.entity,
                    field: field.name,
                });
            }
            if field.ops.contains(&FilterOp::Contains) && field.kind != FieldKind::Text {
                return Err(SchemaError::ContainsOnNonText {
                    entity: self.entity,
                    field: field.name,
                });
            }
        }
        for (field, _) in self.default_sort {
            if self.sortable_field(field).is_none() {
                return Err(SchemaError::DefaultSortNotSortable {
                    entity: self.entity,
                    field,
                });
            }
        }
        Ok(())
    }
}

/// A coerced filter or sort value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Ordering between values of the same kind; `None` across kinds.
    pub fn compare(&self, other: &FieldValue) -> Option<core::cmp::Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => Some(a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl FieldKind {
    /// Coerce a raw query-string value to this kind.
    pub fn coerce(&self, raw: &str) -> Result<FieldValue, String> {
        match self {
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Integer => raw
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| format!("`{raw}` is not an integer")),
            FieldKind::Uuid => raw
                .parse::<Uuid>()
                .map(FieldValue::Uuid)
                .map_err(|_| format!("`{raw}` is not a valid id")),
            FieldKind::Timestamp => DateTime::parse_from_rfc3339(raw)
                .map(|dt| FieldValue::Timestamp(dt.with_timezone(&Utc)))
                .map_err(|_| format!("`{raw}` is not an RFC 3339 timestamp")),
        }
    }
}

/// Read access to an entity's queryable fields.
///
/// Implemented per entity record; lets the in-memory store (and the resolver
/// tests) evaluate predicates and sort specs without knowing the entity type.
pub trait Queryable {
    /// The entity's static query schema.
    fn schema() -> &'static EntitySchema;

    /// Value of a queryable field. Must answer every schema field, every
    /// sortable field, and `id`.
    fn field_value(&self, name: &str) -> Option<FieldValue>;
}
