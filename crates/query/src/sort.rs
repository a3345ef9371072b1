//! Sort resolution: requested sort keys → a validated, total ordering.

use crate::error::QueryError;
use crate::schema::{Direction, EntitySchema, Queryable};

/// One resolved (field, direction) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: &'static str,
    pub direction: Direction,
}

/// Ordered sort keys, applied left-to-right as tie-breakers.
///
/// The final key is always `id` ascending, so the ordering is total and page
/// boundaries are deterministic even when earlier keys are non-unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub keys: Vec<SortKey>,
}

impl SortSpec {
    /// Compare two in-memory rows under this spec.
    pub fn compare<T: Queryable>(&self, a: &T, b: &T) -> core::cmp::Ordering {
        for key in &self.keys {
            let ord = match (a.field_value(key.field), b.field_value(key.field)) {
                (Some(va), Some(vb)) => va.compare(&vb).unwrap_or(core::cmp::Ordering::Equal),
                _ => core::cmp::Ordering::Equal,
            };
            let ord = match key.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            };
            if ord != core::cmp::Ordering::Equal {
                return ord;
            }
        }
        core::cmp::Ordering::Equal
    }
}

/// Resolve a raw `sort` parameter against the entity's allow-list.
///
/// `sort=price,-created_at` sorts by price ascending, then created_at
/// descending. Absent or blank input falls back to the entity's documented
/// default ordering. Unknown keys fail with `InvalidSortField`.
pub fn resolve(
    schema: &'static EntitySchema,
    raw: Option<&str>,
) -> Result<SortSpec, QueryError> {
    let mut keys: Vec<SortKey> = Vec::new();

    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            for segment in raw.split(',') {
                let segment = segment.trim();
                if segment.is_empty() {
                    continue;
                }
                let (name, direction) = match segment.strip_prefix('-') {
                    Some(name) => (name, Direction::Desc),
                    None => (segment, Direction::Asc),
                };
                let field = schema
                    .sortable_field(name)
                    .ok_or_else(|| QueryError::InvalidSortField(name.to_string()))?;
                push_key(&mut keys, SortKey { field, direction });
            }
        }
        None => {
            for (field, direction) in schema.default_sort {
                push_key(&mut keys, SortKey { field, direction: *direction });
            }
        }
    }

    // Mandatory tie-break; identifiers are unique, so the ordering is total.
    push_key(&mut keys, SortKey { field: "id", direction: Direction::Asc });

    Ok(SortSpec { keys })
}

fn push_key(keys: &mut Vec<SortKey>, key: SortKey) {
    if !keys.iter().any(|k| k.field == key.field) {
        keys.push(key);
    }
}
