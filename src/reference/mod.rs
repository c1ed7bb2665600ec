// ABOUTME: Output references pointing at another task's not-yet-known outputs
// ABOUTME: Defines the Reference type, its sentinel JSON encoding, and discovery in value trees

pub mod error;
pub mod resolve;

pub use error::{ReferenceError, Result};
pub use resolve::{resolve_value, MissingPolicy, OutputCache};

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Key marking a JSON object as an embedded reference.
pub const REFERENCE_KEY: &str = "__reference__";

/// A placeholder for a value another task has not produced yet.
///
/// Immutable once created; equality and hashing are structural over
/// `(owner_id, field_name)`. The field name may be a dotted/indexed path
/// (`"metrics.scores.0"`): the first segment names the output field, the
/// remaining segments descend into objects by key and arrays by index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub owner_id: Uuid,
    pub field_name: String,
}

impl Reference {
    pub fn new(owner_id: Uuid, field_name: impl Into<String>) -> Self {
        Self {
            owner_id,
            field_name: field_name.into(),
        }
    }

    /// Encode this reference as a sentinel object so it can sit at any depth
    /// inside a plain JSON argument tree.
    pub fn to_value(&self) -> Value {
        let inner = serde_json::json!({
            "owner_id": self.owner_id,
            "field_name": self.field_name,
        });
        let mut map = serde_json::Map::new();
        map.insert(REFERENCE_KEY.to_string(), inner);
        Value::Object(map)
    }

    /// Decode a sentinel object back into a reference. Returns `None` for
    /// anything that is not exactly a one-key `{"__reference__": ...}` object.
    pub fn from_value(value: &Value) -> Option<Reference> {
        let map = value.as_object()?;
        if map.len() != 1 {
            return None;
        }
        let inner = map.get(REFERENCE_KEY)?;
        serde_json::from_value(inner.clone()).ok()
    }

    /// The output field named by the first path segment, and the rest of the
    /// path (if any) used to descend into the field's value.
    pub fn split_path(&self) -> (&str, Option<&str>) {
        match self.field_name.split_once('.') {
            Some((field, rest)) => (field, Some(rest)),
            None => (self.field_name.as_str(), None),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner_id, self.field_name)
    }
}

/// Every distinct reference reachable in `value`, in discovery order.
pub fn find_references(value: &Value) -> Vec<Reference> {
    let mut found = IndexSet::new();
    collect_references(value, &mut found);
    found.into_iter().collect()
}

fn collect_references(value: &Value, found: &mut IndexSet<Reference>) {
    if let Some(reference) = Reference::from_value(value) {
        found.insert(reference);
        return;
    }
    match value {
        Value::Array(items) => {
            for item in items {
                collect_references(item, found);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                collect_references(item, found);
            }
        }
        _ => {}
    }
}

/// Descend into a value along a dotted path. Object segments index by key,
/// array segments by parsed integer. `None` path returns the value itself.
pub(crate) fn descend<'a>(value: &'a Value, path: Option<&str>) -> Option<&'a Value> {
    let Some(path) = path else {
        return Some(value);
    };
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
