// ABOUTME: Output store collaborator interface for persisting task outputs
// ABOUTME: Defines the key-value OutputStore trait and the in-memory implementation

pub mod error;
pub mod memory;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;

use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

/// Key-value lookup service for task outputs, keyed by the producing task's
/// unique id. Backends (database, file, memory) are interchangeable; the
/// engine only needs these two operations.
pub trait OutputStore {
    /// Look up a single named output field for the given task id.
    /// Returns `Ok(None)` when the id or the field is not present.
    fn get(&self, owner_id: Uuid, field_name: &str) -> Result<Option<Value>>;

    /// Persist named fields under the given task id, merging with any
    /// fields already stored for that id.
    fn put(&mut self, owner_id: Uuid, fields: IndexMap<String, Value>) -> Result<()>;
}

impl<S: OutputStore + ?Sized> OutputStore for &mut S {
    fn get(&self, owner_id: Uuid, field_name: &str) -> Result<Option<Value>> {
        (**self).get(owner_id, field_name)
    }

    fn put(&mut self, owner_id: Uuid, fields: IndexMap<String, Value>) -> Result<()> {
        (**self).put(owner_id, fields)
    }
}
