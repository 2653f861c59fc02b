//! Instruction records and their resolution against the argument pool and
//! layer table.

use bytestream::{ByteReader, ByteWriter};
use layout::{read_expected_u32, FormatError, FormatResult, Table, Variant, WidthCodec};
use schema::SchemaLookup;

use crate::args::ArgumentLayout;
use crate::model::{Instruction, Layer};
use crate::pools::WritePools;
use crate::tables::record_range;

/// Layer field value meaning "no layer".
const NO_LAYER: i64 = -1;

/// An instruction record as stored in the instruction table, before its
/// offsets are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InstructionRecord {
    pub(crate) class_id: u32,
    pub(crate) instruction_id: u32,
    pub(crate) argument_length: u64,
    pub(crate) argument_offset: u32,
    pub(crate) layer_offset: Option<u64>,
}

impl InstructionRecord {
    pub(crate) fn decode(reader: &mut ByteReader<'_>, variant: Variant) -> FormatResult<Self> {
        let words = WidthCodec::for_variant(variant);
        let class_id = reader.read_u32()?;
        let instruction_id = reader.read_u32()?;
        let argument_length = words.read_natural(reader)?;
        let argument_offset = reader.read_u32()?;
        if variant.has_instruction_padding() {
            read_expected_u32(reader, "instruction padding", 0)?;
        }
        let layer = if variant.has_wide_layer_reference() {
            reader.read_i64()?
        } else {
            let layer = i64::from(reader.read_i32()?);
            read_expected_u32(reader, "instruction layer padding", 0)?;
            layer
        };
        let layer_offset = match layer {
            NO_LAYER => None,
            offset => Some(u64::try_from(offset).map_err(|_| FormatError::DanglingReference {
                table: Table::Layers,
                offset: offset as u64,
            })?),
        };
        Ok(Self {
            class_id,
            instruction_id,
            argument_length,
            argument_offset,
            layer_offset,
        })
    }

    pub(crate) fn encode(&self, writer: &mut ByteWriter, variant: Variant) -> FormatResult<()> {
        let words = WidthCodec::for_variant(variant);
        writer.write_u32(self.class_id);
        writer.write_u32(self.instruction_id);
        words.write_natural(writer, self.argument_length)?;
        writer.write_u32(self.argument_offset);
        if variant.has_instruction_padding() {
            writer.write_u32(0);
        }
        let layer = match self.layer_offset {
            Some(offset) => i64::try_from(offset).map_err(|_| FormatError::ValueOutOfRange {
                value: offset,
                bits: 63,
            })?,
            None => NO_LAYER,
        };
        if variant.has_wide_layer_reference() {
            writer.write_i64(layer);
        } else {
            let narrow = i32::try_from(layer).map_err(|_| FormatError::ValueOutOfRange {
                value: layer as u64,
                bits: 31,
            })?;
            writer.write_i32(narrow);
            writer.write_u32(0);
        }
        Ok(())
    }

    /// Resolves the argument blob through the schema and the layer offset
    /// against the already decoded layer table.
    pub(crate) fn resolve(
        &self,
        schema: &dyn SchemaLookup,
        arguments: &[u8],
        layers: &[Layer],
        variant: Variant,
    ) -> FormatResult<Instruction> {
        let layout = ArgumentLayout::resolve(schema, self.class_id, self.instruction_id)?;
        let start = u64::from(self.argument_offset);
        let dangling = FormatError::DanglingReference {
            table: Table::Arguments,
            offset: start,
        };
        let end = start
            .checked_add(self.argument_length)
            .filter(|&end| end <= arguments.len() as u64)
            .ok_or(dangling)?;
        let values = layout.decode(&arguments[start as usize..end as usize])?;

        let layer = match self.layer_offset {
            Some(offset) => {
                let range =
                    record_range(Table::Layers, offset, 1, variant.layer_size(), layers.len())?;
                Some(layers[range.start])
            }
            None => None,
        };

        Ok(Instruction {
            class_id: self.class_id,
            instruction_id: self.instruction_id,
            arguments: values,
            layer,
        })
    }
}

impl Instruction {
    /// Appends this instruction's arguments and layer to the pools and
    /// returns the record pointing at them.
    pub(crate) fn to_record(
        &self,
        schema: &dyn SchemaLookup,
        pools: &mut WritePools<'_>,
        variant: Variant,
    ) -> FormatResult<InstructionRecord> {
        let layout = ArgumentLayout::resolve(schema, self.class_id, self.instruction_id)?;
        let start = pools.begin_arguments();
        layout.encode(&self.arguments, &mut pools.arguments)?;
        let argument_length = layout.blob_len() as u64;
        let argument_offset =
            u32::try_from(start).map_err(|_| FormatError::ValueOutOfRange {
                value: start as u64,
                bits: 32,
            })?;
        let layer_offset = self.layer.map(|layer| pools.layer_offset(layer, variant));

        Ok(InstructionRecord {
            class_id: self.class_id,
            instruction_id: self.instruction_id,
            argument_length,
            argument_offset,
            layer_offset,
        })
    }
}
