// ABOUTME: Error types for task resolution and execution
// ABOUTME: Distinguishes expected failures (fizzle) from malformed returns (abort)

use thiserror::Error;

use crate::reference::ReferenceError;
use crate::registry::RegistryError;
use crate::response::ResponseError;

#[derive(Error, Debug)]
pub enum TaskError {
    /// A required input could not be resolved. Expected failure; the
    /// orchestrator fizzles the task and continues.
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// The task names a callable the registry does not know. Expected
    /// failure at the task level.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The invoked function failed. Expected failure; never propagates past
    /// the task.
    #[error("task '{task}' failed: {source}")]
    ExecutionFailed {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    /// The function's return value violates the one-candidate-per-category
    /// rule. Programming error; aborts the whole run.
    #[error(transparent)]
    MalformedReturn(#[from] ResponseError),
}

pub type Result<T> = std::result::Result<T, TaskError>;
