//! Instruction argument schema for the emevd codec.
//!
//! The byte layout of an instruction's argument blob is not stored in the
//! file; it comes from an external schema keyed by `(class, instruction)`.
//! This crate defines:
//! - Argument type tags and descriptors
//! - The [`SchemaLookup`] capability the codec consumes
//! - A validated in-memory schema, [`InstructionSchema`]
//! - Deterministic schema hashing
//!
//! Loading schema documents is left to callers; with the `serde` feature the
//! definition types can be deserialized directly.
//!
//! # Design Principles
//!
//! - **Lookup, not ownership** - The codec only ever asks for descriptors by key.
//! - **Validated on construction** - Duplicate keys and unknown type tags are rejected up front.
//! - **Deterministic hashing** - Schema hash is stable given the same definition.

mod descriptor;
mod error;
mod hash;
mod schema;

pub use descriptor::{ArgDescriptor, ArgType};
pub use error::{SchemaError, SchemaResult};
pub use hash::schema_hash;
pub use schema::{InstructionDef, InstructionSchema, SchemaBuilder, SchemaLookup};
