//! Error types for emevd decoding and encoding.

use std::fmt;

use bytestream::ByteError;

/// Result type for format operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Structural errors raised while decoding or encoding a document.
///
/// Every variant is terminal for the call that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormatError {
    /// The file does not start with `EVD\0`.
    BadMagic { found: [u8; 4] },

    /// The variant tag pair matches none of the known targets.
    UnknownVariant { tag1: u32, tag2: u32 },

    /// A field that must hold a fixed value held something else.
    UnexpectedValue { field: &'static str, found: i64 },

    /// An offset or index resolves outside its table.
    DanglingReference { table: Table, offset: u64 },

    /// The schema has no entry for this instruction.
    UnknownInstruction { class_id: u32, instruction_id: u32 },

    /// The schema declares an argument type tag the codec cannot handle.
    UnsupportedArgType {
        class_id: u32,
        instruction_id: u32,
        tag: u32,
    },

    /// The stream ended in the middle of a record.
    Truncated { needed: usize, available: usize },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: u64,
    },

    /// A value does not fit the field it must be written to.
    ValueOutOfRange { value: u64, bits: u8 },

    /// Argument values disagree with the schema descriptors.
    ArgumentMismatch {
        class_id: u32,
        instruction_id: u32,
        reason: ArgumentReason,
    },

    /// A linked-file name could not be decoded or encoded.
    InvalidString { offset: u64 },

    /// Byte stream misuse not covered by the variants above.
    Stream(ByteError),
}

/// Tables and pools addressed by offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Events,
    Instructions,
    Layers,
    Arguments,
    Parameters,
    LinkedFiles,
    Strings,
}

/// Specific limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    FileBytes,
    Events,
    Instructions,
    Layers,
    Parameters,
    LinkedFiles,
    PoolBytes,
}

/// Details for argument mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentReason {
    CountMismatch {
        expected: usize,
        found: usize,
    },
    TypeMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
    LengthMismatch {
        expected: usize,
        found: usize,
    },
}

impl From<ByteError> for FormatError {
    fn from(err: ByteError) -> Self {
        match err {
            ByteError::UnexpectedEof {
                requested,
                available,
            } => Self::Truncated {
                needed: requested,
                available,
            },
            ByteError::ValueOutOfRange { value, bits } => Self::ValueOutOfRange { value, bits },
            other => Self::Stream(other),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic { found } => {
                write!(f, "bad magic: {found:02X?}, expected \"EVD\\0\"")
            }
            Self::UnknownVariant { tag1, tag2 } => {
                write!(f, "unknown variant tags: 0x{tag1:08X} 0x{tag2:08X}")
            }
            Self::UnexpectedValue { field, found } => {
                write!(f, "unexpected value {found} in {field}")
            }
            Self::DanglingReference { table, offset } => {
                write!(f, "dangling reference into {table} at {offset}")
            }
            Self::UnknownInstruction {
                class_id,
                instruction_id,
            } => {
                write!(f, "unknown instruction {class_id}[{instruction_id:02}]")
            }
            Self::UnsupportedArgType {
                class_id,
                instruction_id,
                tag,
            } => {
                write!(
                    f,
                    "unsupported argument type tag {tag} in {class_id}[{instruction_id:02}]"
                )
            }
            Self::Truncated { needed, available } => {
                write!(f, "truncated: need {needed} bytes, have {available}")
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::ValueOutOfRange { value, bits } => {
                write!(f, "value {value} does not fit in {bits} bits")
            }
            Self::ArgumentMismatch {
                class_id,
                instruction_id,
                reason,
            } => {
                write!(
                    f,
                    "arguments of {class_id}[{instruction_id:02}] do not match schema: {reason}"
                )
            }
            Self::InvalidString { offset } => {
                write!(f, "invalid string at offset {offset}")
            }
            Self::Stream(err) => write!(f, "byte stream error: {err}"),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Events => "event table",
            Self::Instructions => "instruction table",
            Self::Layers => "layer table",
            Self::Arguments => "argument data",
            Self::Parameters => "parameter table",
            Self::LinkedFiles => "linked file table",
            Self::Strings => "string data",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FileBytes => "file bytes",
            Self::Events => "event count",
            Self::Instructions => "instruction count",
            Self::Layers => "layer count",
            Self::Parameters => "parameter count",
            Self::LinkedFiles => "linked file count",
            Self::PoolBytes => "pool bytes",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for ArgumentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountMismatch { expected, found } => {
                write!(f, "expected {expected} arguments, got {found}")
            }
            Self::TypeMismatch {
                index,
                expected,
                found,
            } => {
                write!(f, "argument {index} expected {expected}, got {found}")
            }
            Self::LengthMismatch { expected, found } => {
                write!(f, "blob is {found} bytes, layout needs {expected}")
            }
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Stream(err) => Some(err),
            _ => None,
        }
    }
}
