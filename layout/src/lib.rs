//! Header layout and record geometry for the emevd codec.
//!
//! This crate handles the fixed skeleton of an event-script file: the magic
//! and variant tags, the header of table counts and offsets, the size of each
//! record per variant, and the natural-word codec every table reads through.
//! It does not know about events or instructions, only where they live.
//!
//! # Design Principles
//!
//! - **One place for width** - Only [`WidthCodec`] branches on 32 vs 64-bit words.
//! - **Bounded decoding** - Header counts are validated against [`Limits`] before any table is read.
//! - **Exact layout** - Header and record sizes are bit-exact per [`Variant`].

mod error;
mod header;
mod limits;
mod variant;
mod width;

pub use error::{ArgumentReason, FormatError, FormatResult, LimitKind, Table};
pub use header::{decode_header, DecodeWarning, Header, HeaderSlots};
pub use limits::Limits;
pub use variant::{Variant, MAGIC};
pub use width::{read_expected_i32, read_expected_u32, WidthCodec};
