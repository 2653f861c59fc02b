//! Schema validation errors.

use std::fmt;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when building or validating a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two definitions share a `(class, instruction)` key.
    DuplicateInstruction { class_id: u32, instruction_id: u32 },

    /// An argument uses a type tag outside the known set.
    UnsupportedArgType {
        class_id: u32,
        instruction_id: u32,
        index: usize,
        tag: u32,
    },

    /// An argument declares `min > max`.
    InvalidBounds {
        class_id: u32,
        instruction_id: u32,
        index: usize,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateInstruction {
                class_id,
                instruction_id,
            } => {
                write!(f, "duplicate instruction {class_id}[{instruction_id:02}]")
            }
            Self::UnsupportedArgType {
                class_id,
                instruction_id,
                index,
                tag,
            } => {
                write!(
                    f,
                    "argument {index} of {class_id}[{instruction_id:02}] has unsupported type tag {tag}"
                )
            }
            Self::InvalidBounds {
                class_id,
                instruction_id,
                index,
            } => {
                write!(
                    f,
                    "argument {index} of {class_id}[{instruction_id:02}] has min greater than max"
                )
            }
        }
    }
}

impl std::error::Error for SchemaError {}
