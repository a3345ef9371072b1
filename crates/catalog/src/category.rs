//! Category record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, DomainError, DomainResult};
use storefront_query::schema::{
    Direction, EntitySchema, FieldKind, FieldSchema, FieldValue, FilterOp, Queryable,
};

pub const MAX_NAME_LEN: usize = 100;

/// Query surface of categories. Names are the natural browse order, hence
/// the default sort.
pub static CATEGORY_SCHEMA: EntitySchema = EntitySchema {
    entity: "category",
    fields: &[
        FieldSchema {
            name: "name",
            kind: FieldKind::Text,
            ops: &[FilterOp::Eq, FilterOp::Contains],
        },
        FieldSchema {
            name: "description",
            kind: FieldKind::Text,
            ops: &[FilterOp::Contains],
        },
        FieldSchema {
            name: "created_at",
            kind: FieldKind::Timestamp,
            ops: &[FilterOp::Range],
        },
    ],
    sortable: &["name", "created_at"],
    default_sort: &[("name", Direction::Asc)],
};

/// A product category. Names are unique store-wide (enforced by the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a category; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl Category {
    pub fn new(name: impl Into<String>, description: Option<String>) -> DomainResult<Self> {
        let now = Utc::now();
        let mut category = Self {
            id: CategoryId::new(),
            name: String::new(),
            description,
            created_at: now,
            updated_at: now,
        };
        category.set_name(name.into())?;
        Ok(category)
    }

    pub fn apply(&mut self, patch: CategoryPatch) -> DomainResult<()> {
        if let Some(name) = patch.name {
            self.set_name(name)?;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        self.updated_at = Utc::now();
        Ok(())
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
}

impl Queryable for Category {
    fn schema() -> &'static EntitySchema {
        &CATEGORY_SCHEMA
    }

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Uuid(*self.id.as_uuid())),
            "name" => Some(FieldValue::Text(self.name.clone())),
            "description" => Some(FieldValue::Text(self.description.clone().unwrap_or_default())),
            "created_at" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}
