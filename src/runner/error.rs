// ABOUTME: Error types for orchestrated runs
// ABOUTME: Only malformed returns and store write failures abort a run

use thiserror::Error;

use crate::response::ResponseError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("run aborted: {0}")]
    Malformed(#[from] ResponseError),

    #[error("failed to persist stored data: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, RunError>;
