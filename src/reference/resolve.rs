// ABOUTME: Resolution of references against the run cache and the output store
// ABOUTME: Walks nested value trees replacing sentinel objects with concrete values

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::error::{ReferenceError, Result};
use super::{descend, Reference};
use crate::store::OutputStore;

/// Materialized output values accumulated during a run, keyed by the
/// producing task's unique id. Authoritative over the store.
pub type OutputCache = HashMap<Uuid, IndexMap<String, Value>>;

/// What to do when a reference cannot be resolved from cache or store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Fail resolution with `ReferenceError::Missing`.
    #[default]
    Error,
    /// Leave the unresolved reference in place.
    Keep,
}

/// Replace every reference sentinel in `value` with its concrete value,
/// recursing through arrays and objects and leaving everything else
/// untouched. Cache hits short-circuit the store.
pub fn resolve_value(
    value: &mut Value,
    cache: Option<&OutputCache>,
    store: Option<&dyn OutputStore>,
    on_missing: MissingPolicy,
) -> Result<()> {
    if let Some(reference) = Reference::from_value(value) {
        match resolve_reference(&reference, cache, store)? {
            Some(resolved) => *value = resolved,
            None => {
                if on_missing == MissingPolicy::Error {
                    return Err(ReferenceError::Missing {
                        owner_id: reference.owner_id,
                        field_name: reference.field_name,
                    });
                }
            }
        }
        return Ok(());
    }

    match value {
        Value::Array(items) => {
            for item in items {
                resolve_value(item, cache, store, on_missing)?;
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                resolve_value(item, cache, store, on_missing)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn resolve_reference(
    reference: &Reference,
    cache: Option<&OutputCache>,
    store: Option<&dyn OutputStore>,
) -> Result<Option<Value>> {
    let (field, rest) = reference.split_path();

    if let Some(cache) = cache {
        if let Some(fields) = cache.get(&reference.owner_id) {
            if let Some(value) = fields.get(field) {
                return Ok(descend(value, rest).cloned());
            }
        }
    }

    if let Some(store) = store {
        if let Some(value) = store.get(reference.owner_id, field)? {
            return Ok(descend(&value, rest).cloned());
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn cache_with(reference: &Reference, value: Value) -> OutputCache {
        let mut fields = IndexMap::new();
        fields.insert(reference.field_name.clone(), value);
        let mut cache = OutputCache::new();
        cache.insert(reference.owner_id, fields);
        cache
    }

    #[test]
    fn test_resolve_replaces_nested_references_only() {
        let reference = Reference::new(Uuid::new_v4(), "value");
        let cache = cache_with(&reference, json!(5));

        let mut tree = json!({
            "a": reference.to_value(),
            "b": [1, reference.to_value()],
            "c": {"untouched": true},
        });
        resolve_value(&mut tree, Some(&cache), None, MissingPolicy::Error).unwrap();

        assert_eq!(tree, json!({"a": 5, "b": [1, 5], "c": {"untouched": true}}));
    }

    #[test]
    fn test_missing_reference_errors_by_default() {
        let reference = Reference::new(Uuid::new_v4(), "value");
        let mut tree = reference.to_value();

        let err = resolve_value(&mut tree, None, None, MissingPolicy::Error).unwrap_err();
        assert!(matches!(err, ReferenceError::Missing { .. }));
    }

    #[test]
    fn test_missing_reference_kept_under_keep_policy() {
        let reference = Reference::new(Uuid::new_v4(), "value");
        let mut tree = json!([reference.to_value(), 7]);

        resolve_value(&mut tree, None, None, MissingPolicy::Keep).unwrap();
        assert_eq!(tree, json!([reference.to_value(), 7]));
    }

    #[test]
    fn test_cache_is_preferred_over_store() {
        let reference = Reference::new(Uuid::new_v4(), "value");
        let cache = cache_with(&reference, json!("from-cache"));

        let mut store = MemoryStore::new();
        let mut fields = IndexMap::new();
        fields.insert("value".to_string(), json!("from-store"));
        store.put(reference.owner_id, fields).unwrap();

        let mut tree = reference.to_value();
        resolve_value(&mut tree, Some(&cache), Some(&store), MissingPolicy::Error).unwrap();
        assert_eq!(tree, json!("from-cache"));
    }

    #[test]
    fn test_store_fallback_on_cache_miss() {
        let reference = Reference::new(Uuid::new_v4(), "value");

        let mut store = MemoryStore::new();
        let mut fields = IndexMap::new();
        fields.insert("value".to_string(), json!(42));
        store.put(reference.owner_id, fields).unwrap();

        let mut tree = reference.to_value();
        resolve_value(&mut tree, None, Some(&store), MissingPolicy::Error).unwrap();
        assert_eq!(tree, json!(42));
    }

    #[test]
    fn test_dotted_path_resolution() {
        let owner = Uuid::new_v4();
        let reference = Reference::new(owner, "stats.scores.1");

        let mut fields = IndexMap::new();
        fields.insert("stats".to_string(), json!({"scores": [10, 20, 30]}));
        let mut cache = OutputCache::new();
        cache.insert(owner, fields);

        let mut tree = reference.to_value();
        resolve_value(&mut tree, Some(&cache), None, MissingPolicy::Error).unwrap();
        assert_eq!(tree, json!(20));
    }
}
