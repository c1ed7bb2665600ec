// ABOUTME: Error types for response classification
// ABOUTME: A malformed return is a programming error in the task's function and aborts the run

use thiserror::Error;

use crate::outputs::OutputsError;

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("malformed task return: more than one '{category}' entry")]
    DuplicateCategory { category: &'static str },

    #[error("malformed task return: {0}")]
    Schema(#[from] OutputsError),
}

pub type Result<T> = std::result::Result<T, ResponseError>;
