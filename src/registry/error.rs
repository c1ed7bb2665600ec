// ABOUTME: Error types for function registry lookups
// ABOUTME: Raised when a task names a callable the registry does not know

use thiserror::Error;

use super::FunctionRef;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("no function registered for '{function}'")]
    UnknownFunction { function: FunctionRef },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
