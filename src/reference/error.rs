// ABOUTME: Error types for reference resolution
// ABOUTME: Covers unresolvable references and store lookup failures

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("could not resolve reference {owner_id}.{field_name} from cache or store")]
    Missing { owner_id: Uuid, field_name: String },

    #[error("store lookup failed: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ReferenceError>;
