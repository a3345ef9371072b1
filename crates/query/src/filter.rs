//! Filter resolution: raw query parameters → validated predicates.

use std::collections::HashMap;

use crate::error::QueryError;
use crate::schema::{EntitySchema, FieldKind, FieldValue, FilterOp, Queryable};

/// Store-level comparison operator of a resolved predicate.
///
/// A `Range` filter resolves into separate `Gte`/`Lte` predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateOp {
    Eq,
    Gte,
    Lte,
    Contains,
}

/// One validated filter condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: &'static str,
    pub op: PredicateOp,
    pub value: FieldValue,
}

impl Predicate {
    /// Evaluate this predicate against an in-memory row.
    ///
    /// Rows that do not expose the field never match; the resolver only emits
    /// predicates for schema fields, so that case indicates an incomplete
    /// `Queryable` implementation.
    pub fn matches<T: Queryable>(&self, row: &T) -> bool {
        let Some(actual) = row.field_value(self.field) else {
            return false;
        };
        match self.op {
            PredicateOp::Eq => actual == self.value,
            PredicateOp::Gte => matches!(
                actual.compare(&self.value),
                Some(core::cmp::Ordering::Greater | core::cmp::Ordering::Equal)
            ),
            PredicateOp::Lte => matches!(
                actual.compare(&self.value),
                Some(core::cmp::Ordering::Less | core::cmp::Ordering::Equal)
            ),
            PredicateOp::Contains => match (&actual, &self.value) {
                (FieldValue::Text(haystack), FieldValue::Text(needle)) => {
                    haystack.to_lowercase().contains(&needle.to_lowercase())
                }
                _ => false,
            },
        }
    }
}

/// Resolve raw query parameters into predicates.
///
/// Walks the schema's fields in declaration order, so the output is a
/// deterministic function of the input regardless of parameter-map iteration
/// order. Unknown parameters are ignored (`page`, `page_size` and `sort` fall
/// out of this for free).
pub fn resolve(
    schema: &'static EntitySchema,
    params: &HashMap<String, String>,
) -> Result<Vec<Predicate>, QueryError> {
    let mut predicates = Vec::new();

    for field in schema.fields {
        for op in field.ops {
            match op {
                FilterOp::Eq => {
                    if let Some(raw) = params.get(field.name) {
                        predicates.push(Predicate {
                            field: field.name,
                            op: PredicateOp::Eq,
                            value: coerce(field.name, field.kind, raw)?,
                        });
                    }
                }
                FilterOp::Contains => {
                    if let Some(raw) = params.get(&format!("{}_contains", field.name)) {
                        predicates.push(Predicate {
                            field: field.name,
                            op: PredicateOp::Contains,
                            value: coerce(field.name, field.kind, raw)?,
                        });
                    }
                }
                FilterOp::Range => {
                    let min = params
                        .get(&format!("min_{}", field.name))
                        .map(|raw| coerce(field.name, field.kind, raw))
                        .transpose()?;
                    let max = params
                        .get(&format!("max_{}", field.name))
                        .map(|raw| coerce(field.name, field.kind, raw))
                        .transpose()?;

                    if let (Some(min), Some(max)) = (&min, &max) {
                        if min.compare(max) == Some(core::cmp::Ordering::Greater) {
                            return Err(QueryError::invalid_range(field.name));
                        }
                    }
                    if let Some(min) = min {
                        predicates.push(Predicate {
                            field: field.name,
                            op: PredicateOp::Gte,
                            value: min,
                        });
                    }
                    if let Some(max) = max {
                        predicates.push(Predicate {
                            field: field.name,
                            op: PredicateOp::Lte,
                            value: max,
                        });
                    }
                }
            }
        }
    }

    Ok(predicates)
}

fn coerce(field: &'static str, kind: FieldKind, raw: &str) -> Result<FieldValue, QueryError> {
    kind.coerce(raw)
        .map_err(|message| QueryError::invalid_filter_value(field, message))
}
