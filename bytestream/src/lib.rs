//! Byte-level primitives for the emevd codec.
//!
//! This crate provides [`ByteReader`] and [`ByteWriter`] for little-endian
//! encoding and decoding of fixed-size fields. The reader is random-access:
//! tables are reached by seeking to offsets, and [`ByteReader::at`] hands out
//! a guard that puts the cursor back when it goes out of scope. The writer
//! supports reserving word slots up front and back-patching them once the
//! values are known.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads, seeks and slices are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about events, tables or headers.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bytestream::{ByteReader, ByteWriter, Width};
//!
//! let mut writer = ByteWriter::new();
//! let size = writer.reserve("size", Width::W32);
//! writer.write_u16(42);
//! writer.fill_with_position(size).unwrap();
//!
//! let bytes = writer.finish().unwrap();
//!
//! let mut reader = ByteReader::new(&bytes);
//! assert_eq!(reader.read_word(Width::W32).unwrap(), 6);
//! assert_eq!(reader.read_u16().unwrap(), 42);
//! ```

mod error;
mod reader;
mod width;
mod writer;

pub use error::{ByteError, ByteResult};
pub use reader::{ByteReader, Scoped};
pub use width::Width;
pub use writer::{ByteWriter, Reservation};
