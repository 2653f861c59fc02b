//! Schema-driven argument blob codec.
//!
//! A blob is laid out like a packed struct: each field is aligned to its own
//! size, and nothing follows the last field.

use bytestream::{ByteReader, ByteWriter};
use layout::{ArgumentReason, FormatError, FormatResult};
use schema::{ArgType, SchemaLookup};

use crate::types::ArgValue;

/// Resolved argument types of one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentLayout {
    class_id: u32,
    instruction_id: u32,
    types: Vec<ArgType>,
}

impl ArgumentLayout {
    /// Looks up the layout of an instruction.
    ///
    /// Fails with `UnknownInstruction` on a schema miss and with
    /// `UnsupportedArgType` if any descriptor carries an unknown tag.
    pub fn resolve(
        schema: &dyn SchemaLookup,
        class_id: u32,
        instruction_id: u32,
    ) -> FormatResult<Self> {
        let descriptors =
            schema
                .arguments_for(class_id, instruction_id)
                .ok_or(FormatError::UnknownInstruction {
                    class_id,
                    instruction_id,
                })?;
        let types = descriptors
            .iter()
            .map(|descriptor| {
                descriptor
                    .arg_type()
                    .ok_or(FormatError::UnsupportedArgType {
                        class_id,
                        instruction_id,
                        tag: descriptor.type_tag,
                    })
            })
            .collect::<FormatResult<Vec<_>>>()?;
        Ok(Self {
            class_id,
            instruction_id,
            types,
        })
    }

    /// Returns the encoded blob length, derived from the types alone.
    #[must_use]
    pub fn blob_len(&self) -> usize {
        self.types.iter().fold(0, |offset, arg_type| {
            align_up(offset, arg_type.align()) + arg_type.size()
        })
    }

    /// Decodes a blob. Bytes past the last field are ignored.
    pub fn decode(&self, blob: &[u8]) -> FormatResult<Vec<ArgValue>> {
        let mut reader = ByteReader::new(blob);
        let mut values = Vec::with_capacity(self.types.len());
        for &arg_type in &self.types {
            reader.align_to(arg_type.align())?;
            let value = match arg_type {
                ArgType::U8 => ArgValue::U8(reader.read_u8()?),
                ArgType::I8 => ArgValue::I8(reader.read_i8()?),
                ArgType::U16 => ArgValue::U16(reader.read_u16()?),
                ArgType::I16 => ArgValue::I16(reader.read_i16()?),
                ArgType::U32 | ArgType::U32Alt => ArgValue::U32(reader.read_u32()?),
                ArgType::I32 => ArgValue::I32(reader.read_i32()?),
                ArgType::F32 => ArgValue::F32(reader.read_f32()?),
            };
            values.push(value);
        }
        Ok(values)
    }

    /// Encodes `values` at the writer's position.
    ///
    /// The writer position must be 4-byte aligned so that field alignment
    /// relative to the blob start matches alignment relative to the pool;
    /// otherwise the written length disagrees with [`Self::blob_len`] and
    /// encoding fails with `LengthMismatch`.
    pub fn encode(&self, values: &[ArgValue], writer: &mut ByteWriter) -> FormatResult<()> {
        let start = writer.position();
        if values.len() != self.types.len() {
            return Err(self.mismatch(ArgumentReason::CountMismatch {
                expected: self.types.len(),
                found: values.len(),
            }));
        }
        for (index, (&arg_type, &value)) in self.types.iter().zip(values).enumerate() {
            writer.pad_to(arg_type.align());
            match value {
                ArgValue::U8(v) if value.matches(arg_type) => writer.write_u8(v),
                ArgValue::I8(v) if value.matches(arg_type) => writer.write_i8(v),
                ArgValue::U16(v) if value.matches(arg_type) => writer.write_u16(v),
                ArgValue::I16(v) if value.matches(arg_type) => writer.write_i16(v),
                ArgValue::U32(v) if value.matches(arg_type) => writer.write_u32(v),
                ArgValue::I32(v) if value.matches(arg_type) => writer.write_i32(v),
                ArgValue::F32(v) if value.matches(arg_type) => writer.write_f32(v),
                _ => {
                    return Err(self.mismatch(ArgumentReason::TypeMismatch {
                        index,
                        expected: arg_type.name(),
                        found: value.type_name(),
                    }))
                }
            }
        }
        let written = writer.position() - start;
        if written != self.blob_len() {
            return Err(self.mismatch(ArgumentReason::LengthMismatch {
                expected: self.blob_len(),
                found: written,
            }));
        }
        Ok(())
    }

    const fn mismatch(&self, reason: ArgumentReason) -> FormatError {
        FormatError::ArgumentMismatch {
            class_id: self.class_id,
            instruction_id: self.instruction_id,
            reason,
        }
    }
}

const fn align_up(offset: usize, align: usize) -> usize {
    (offset + align - 1) / align * align
}
