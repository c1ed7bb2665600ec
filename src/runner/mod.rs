// ABOUTME: Orchestration of activity execution
// ABOUTME: Exposes the local sequential runner and the run_locally entry point

pub mod error;
pub mod local;

pub use error::{Result, RunError};
pub use local::{run_locally, FailureRecord, LocalRunner, RunReport};
