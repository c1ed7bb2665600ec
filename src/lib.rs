// ABOUTME: Main library module for the switchyard workflow execution engine
// ABOUTME: Exports all core modules and provides the public API

pub mod activity;
pub mod logging;
pub mod outputs;
pub mod reference;
pub mod registry;
pub mod response;
pub mod runner;
pub mod store;
pub mod task;

// Re-export commonly used types
pub use activity::{Activity, ActivityItem};
pub use outputs::{FieldKind, Outputs, Schema, WILDCARD_FIELD};
pub use reference::{find_references, MissingPolicy, OutputCache, Reference};
pub use registry::{FunctionRef, FunctionRegistry};
pub use response::{Response, ReturnItem, TaskReturn};
pub use runner::{run_locally, FailureRecord, LocalRunner, RunError, RunReport};
pub use store::{MemoryStore, OutputStore};
pub use task::{Task, TaskBuilder, TaskConfig, TaskError};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
