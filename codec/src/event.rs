//! Event records: assembly from the instruction and parameter tables on
//! decode, and pool appends on encode.

use bytestream::{ByteReader, ByteWriter};
use layout::{read_expected_u32, FormatError, FormatResult, Table, Variant, WidthCodec};

use crate::model::{Event, Instruction, Parameter};
use crate::pools::WritePools;
use crate::tables::record_range;
use crate::types::BonfireHandler;

/// Parameter offset written for an event without parameters.
const NO_PARAMETERS: i64 = -1;

/// An event record as stored in the event table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EventRecord {
    pub(crate) id: u64,
    pub(crate) instruction_count: u64,
    pub(crate) instruction_offset: u64,
    pub(crate) parameter_count: u64,
    pub(crate) parameter_offset: i64,
    pub(crate) bonfire_handler: BonfireHandler,
}

impl EventRecord {
    pub(crate) fn decode(reader: &mut ByteReader<'_>, variant: Variant) -> FormatResult<Self> {
        let words = WidthCodec::for_variant(variant);
        let id = words.read_natural(reader)?;
        let instruction_count = words.read_natural(reader)?;
        let instruction_offset = words.read_natural(reader)?;
        let parameter_count = words.read_natural(reader)?;
        let parameter_offset = if variant.has_split_parameter_offset() {
            let offset = reader.read_u32()?;
            read_expected_u32(reader, "event parameter offset padding", 0)?;
            // The "no parameters" sentinel is a 32-bit -1.
            if offset == u32::MAX {
                NO_PARAMETERS
            } else {
                i64::from(offset)
            }
        } else {
            words.read_signed(reader)?
        };
        let raw_handler = reader.read_u32()?;
        let bonfire_handler =
            BonfireHandler::from_raw(raw_handler).ok_or(FormatError::UnexpectedValue {
                field: "bonfire handler",
                found: i64::from(raw_handler),
            })?;
        read_expected_u32(reader, "event padding", 0)?;

        Ok(Self {
            id,
            instruction_count,
            instruction_offset,
            parameter_count,
            parameter_offset,
            bonfire_handler,
        })
    }

    pub(crate) fn encode(&self, writer: &mut ByteWriter, variant: Variant) -> FormatResult<()> {
        let words = WidthCodec::for_variant(variant);
        words.write_natural(writer, self.id)?;
        words.write_natural(writer, self.instruction_count)?;
        words.write_natural(writer, self.instruction_offset)?;
        words.write_natural(writer, self.parameter_count)?;
        if variant.has_split_parameter_offset() {
            writer.write_u32(split_offset(self.parameter_offset)?);
            writer.write_u32(0);
        } else {
            words.write_signed(writer, self.parameter_offset)?;
        }
        writer.write_u32(self.bonfire_handler.raw());
        writer.write_u32(0);
        Ok(())
    }

    /// Builds the event from the already decoded instruction and parameter
    /// tables.
    pub(crate) fn assemble(
        &self,
        instructions: &[Instruction],
        parameters: &[Parameter],
        variant: Variant,
    ) -> FormatResult<Event> {
        let instruction_range = record_range(
            Table::Instructions,
            self.instruction_offset,
            self.instruction_count,
            variant.instruction_size(),
            instructions.len(),
        )?;
        let parameter_range = if self.parameter_count == 0 {
            0..0
        } else {
            let offset =
                u64::try_from(self.parameter_offset).map_err(|_| FormatError::DanglingReference {
                    table: Table::Parameters,
                    offset: self.parameter_offset as u64,
                })?;
            record_range(
                Table::Parameters,
                offset,
                self.parameter_count,
                variant.parameter_size(),
                parameters.len(),
            )?
        };

        Ok(Event {
            id: self.id,
            bonfire_handler: self.bonfire_handler,
            instructions: instructions[instruction_range].to_vec(),
            parameters: parameters[parameter_range].to_vec(),
        })
    }
}

impl Event {
    /// Appends this event's instructions and parameters to the pools and
    /// returns the record pointing at them.
    pub(crate) fn to_record<'d>(
        &'d self,
        pools: &mut WritePools<'d>,
        variant: Variant,
    ) -> FormatResult<EventRecord> {
        let instruction_offset = pools.next_instruction_offset(variant);
        let parameter_offset = if self.parameters.is_empty() {
            NO_PARAMETERS
        } else {
            let offset = pools.next_parameter_offset(variant);
            i64::try_from(offset).map_err(|_| FormatError::ValueOutOfRange {
                value: offset,
                bits: 63,
            })?
        };
        pools.append_event(self);

        Ok(EventRecord {
            id: self.id,
            instruction_count: self.instructions.len() as u64,
            instruction_offset,
            parameter_count: self.parameters.len() as u64,
            parameter_offset,
            bonfire_handler: self.bonfire_handler,
        })
    }
}

/// Maps a parameter offset onto the unsigned 32-bit split field, where
/// `u32::MAX` is reserved for the sentinel.
fn split_offset(offset: i64) -> FormatResult<u32> {
    if offset == NO_PARAMETERS {
        return Ok(u32::MAX);
    }
    u32::try_from(offset)
        .ok()
        .filter(|&offset| offset != u32::MAX)
        .ok_or(FormatError::ValueOutOfRange {
            value: offset as u64,
            bits: 32,
        })
}
