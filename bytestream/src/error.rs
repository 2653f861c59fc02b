//! Error types for byte stream operations.

use std::fmt;

/// Result type for byte stream operations.
pub type ByteResult<T> = Result<T, ByteError>;

/// Errors that can occur while reading or writing a byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteError {
    /// Attempted to read past the end of the buffer.
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// Attempted to seek or slice outside the buffer.
    SeekOutOfBounds {
        /// The requested absolute position.
        position: u64,
        /// Length of the underlying buffer.
        len: usize,
    },

    /// Value exceeds the range representable by the target width.
    ValueOutOfRange {
        /// The value that was out of range (two's complement for signed values).
        value: u64,
        /// Number of bits available.
        bits: u8,
    },

    /// The writer was finished while a reservation was still unfilled.
    UnfilledReservation {
        /// Name given to the reservation.
        name: &'static str,
    },

    /// A reservation was filled that this writer never handed out.
    UnknownReservation {
        /// Position recorded in the reservation.
        position: usize,
    },
}

impl fmt::Display for ByteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::SeekOutOfBounds { position, len } => {
                write!(f, "position {position} is outside a buffer of {len} bytes")
            }
            Self::ValueOutOfRange { value, bits } => {
                write!(f, "value {value} cannot be represented in {bits} bits")
            }
            Self::UnfilledReservation { name } => {
                write!(f, "reservation `{name}` was never filled")
            }
            Self::UnknownReservation { position } => {
                write!(f, "no pending reservation at position {position}")
            }
        }
    }
}

impl std::error::Error for ByteError {}
