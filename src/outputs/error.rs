// ABOUTME: Error types for output container operations
// ABOUTME: Covers schema violations when producing or assigning output fields

use thiserror::Error;

use super::FieldKind;

#[derive(Error, Debug)]
pub enum OutputsError {
    #[error("field '{field}' is not declared in the output schema")]
    UnknownField { field: String },

    #[error("declared output field '{field}' was not produced")]
    MissingField { field: String },

    #[error("output field '{field}' expected {expected}, got {actual}")]
    KindMismatch {
        field: String,
        expected: FieldKind,
        actual: FieldKind,
    },

    #[error("schema declares {fields} fields but the produced value is a bare {actual}")]
    ExpectedObject { fields: usize, actual: FieldKind },
}

pub type Result<T> = std::result::Result<T, OutputsError>;
