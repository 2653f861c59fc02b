//! Event-script (EMEVD) document decoding and encoding.
//!
//! This is the main codec crate that ties together bytestream, layout, and
//! schema to turn the exact bytes of an event-script file into a [`Document`]
//! and back.
//!
//! # Features
//!
//! - Three container variants with 32 or 64-bit natural words
//! - Schema-driven decoding of instruction argument blobs
//! - Offset resolution between the event, instruction, layer, parameter and
//!   linked-file tables
//! - Two-pass encoding with back-patched header slots
//!
//! ```
//! use codec::{decode_document, encode_document, Document, Event, Instruction, Limits, Variant};
//! use schema::InstructionSchema;
//!
//! let schema = InstructionSchema::builder().build().unwrap();
//! let mut document = Document::new(Variant::Gamma);
//! document.events.push(Event::new(0));
//!
//! let bytes = encode_document(&document, &schema).unwrap();
//! let decoded = decode_document(&bytes, &schema, &Limits::default()).unwrap();
//! assert_eq!(decoded.document, document);
//! ```
//!
//! # Design Principles
//!
//! - **Correctness first** - All invariants are documented and tested.
//! - **Offsets are derived** - Encoding recomputes every offset from append order.
//! - **No partial documents** - Decoding returns a resolved document or the first error.

mod args;
mod document;
mod event;
mod instruction;
mod model;
mod pools;
mod tables;
mod types;

pub use args::ArgumentLayout;
pub use document::{decode_document, encode_document};
pub use layout::{
    decode_header, ArgumentReason, DecodeWarning, FormatError, FormatResult, Header, LimitKind,
    Limits, Table, Variant,
};
pub use model::{Decoded, Document, Event, Instruction, Layer, LinkedFile, Parameter};
pub use types::{ArgValue, BonfireHandler};
