// ABOUTME: Error types for output store operations
// ABOUTME: Defines failure modes shared by all OutputStore backends

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store backend error: {message}")]
    Backend { message: String },

    #[error("store record for task {owner_id} is corrupt: {reason}")]
    CorruptRecord { owner_id: Uuid, reason: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
