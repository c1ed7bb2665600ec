// ABOUTME: In-memory output store implementation
// ABOUTME: HashMap-backed store used as the default collaborator and as a test double

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use super::error::Result;
use super::OutputStore;

/// In-memory `OutputStore`. Records live for the lifetime of the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<Uuid, IndexMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of task ids with at least one stored field.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All fields stored for a task id, if any.
    pub fn fields(&self, owner_id: Uuid) -> Option<&IndexMap<String, Value>> {
        self.records.get(&owner_id)
    }
}

impl OutputStore for MemoryStore {
    fn get(&self, owner_id: Uuid, field_name: &str) -> Result<Option<Value>> {
        Ok(self
            .records
            .get(&owner_id)
            .and_then(|fields| fields.get(field_name))
            .cloned())
    }

    fn put(&mut self, owner_id: Uuid, fields: IndexMap<String, Value>) -> Result<()> {
        self.records.entry(owner_id).or_default().extend(fields);
        Ok(())
    }
}
