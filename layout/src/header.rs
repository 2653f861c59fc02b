//! File header decoding and reserved-slot encoding.

use std::fmt;

use bytestream::{ByteReader, ByteWriter, Reservation};

use crate::error::{FormatError, FormatResult, LimitKind};
use crate::limits::Limits;
use crate::variant::{Variant, MAGIC};
use crate::width::WidthCodec;

/// Decoded file header.
///
/// Section offsets are absolute file positions; counts are record counts and
/// lengths are byte lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Detected variant.
    pub variant: Variant,
    /// Total file size recorded in the header.
    pub file_size: u64,
    pub event_count: u64,
    pub event_offset: u64,
    pub instruction_count: u64,
    pub instruction_offset: u64,
    /// Layer table offset (first of the two copies).
    pub layer_offset: u64,
    pub layer_count: u64,
    pub parameter_count: u64,
    pub parameter_offset: u64,
    pub linked_file_count: u64,
    pub linked_file_offset: u64,
    /// Argument pool length in bytes.
    pub argument_length: u64,
    pub argument_offset: u64,
    /// String pool length in bytes.
    pub string_length: u64,
    pub string_offset: u64,
}

impl Header {
    /// Creates a header with every count, offset and length zeroed.
    #[must_use]
    pub const fn empty(variant: Variant) -> Self {
        Self {
            variant,
            file_size: 0,
            event_count: 0,
            event_offset: 0,
            instruction_count: 0,
            instruction_offset: 0,
            layer_offset: 0,
            layer_count: 0,
            parameter_count: 0,
            parameter_offset: 0,
            linked_file_count: 0,
            linked_file_offset: 0,
            argument_length: 0,
            argument_offset: 0,
            string_length: 0,
            string_offset: 0,
        }
    }

    /// Checks every count and pool length against `limits`.
    pub fn check_limits(&self, limits: &Limits) -> FormatResult<()> {
        let checks = [
            (LimitKind::Events, limits.max_events, self.event_count),
            (
                LimitKind::Instructions,
                limits.max_instructions,
                self.instruction_count,
            ),
            (LimitKind::Layers, limits.max_layers, self.layer_count),
            (
                LimitKind::Parameters,
                limits.max_parameters,
                self.parameter_count,
            ),
            (
                LimitKind::LinkedFiles,
                limits.max_linked_files,
                self.linked_file_count,
            ),
            (LimitKind::PoolBytes, limits.max_pool_bytes, self.argument_length),
            (LimitKind::PoolBytes, limits.max_pool_bytes, self.string_length),
        ];
        for (kind, limit, actual) in checks {
            if actual > limit as u64 {
                return Err(FormatError::LimitsExceeded {
                    kind,
                    limit,
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Non-fatal inconsistencies found while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeWarning {
    /// The two copies of the layer table offset disagree; the first is used.
    LayerOffsetMismatch { first: u64, second: u64 },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LayerOffsetMismatch { first, second } => {
                write!(
                    f,
                    "layer table offset inconsistent: {first} vs {second}, using {first}"
                )
            }
        }
    }
}

/// Decodes the header at the reader's current position.
///
/// Warnings are appended to `warnings` and logged; they never stop decoding.
pub fn decode_header(
    reader: &mut ByteReader<'_>,
    limits: &Limits,
    warnings: &mut Vec<DecodeWarning>,
) -> FormatResult<Header> {
    if reader.len() > limits.max_file_bytes {
        return Err(FormatError::LimitsExceeded {
            kind: LimitKind::FileBytes,
            limit: limits.max_file_bytes,
            actual: reader.len() as u64,
        });
    }

    let magic = reader.read_bytes(MAGIC.len())?;
    if magic != MAGIC {
        let mut found = [0u8; 4];
        found.copy_from_slice(magic);
        return Err(FormatError::BadMagic { found });
    }

    let tag1 = reader.read_u32()?;
    let tag2 = reader.read_u32()?;
    let variant = Variant::from_tags(tag1, tag2)?;
    let words = WidthCodec::for_variant(variant);

    let file_size = words.read_natural(reader)?;
    let event_count = words.read_natural(reader)?;
    let event_offset = words.read_natural(reader)?;
    let instruction_count = words.read_natural(reader)?;
    let instruction_offset = words.read_natural(reader)?;
    words.read_zero(reader, "header reserved word")?;
    let layer_offset = words.read_natural(reader)?;
    let layer_count = words.read_natural(reader)?;
    let layer_offset_repeat = words.read_natural(reader)?;
    if layer_offset_repeat != layer_offset {
        let warning = DecodeWarning::LayerOffsetMismatch {
            first: layer_offset,
            second: layer_offset_repeat,
        };
        log::warn!("{warning}");
        warnings.push(warning);
    }
    let parameter_count = words.read_natural(reader)?;
    let parameter_offset = words.read_natural(reader)?;
    let linked_file_count = words.read_natural(reader)?;
    let linked_file_offset = words.read_natural(reader)?;
    let argument_length = words.read_natural(reader)?;
    let argument_offset = words.read_natural(reader)?;
    let string_length = words.read_natural(reader)?;
    let string_offset = words.read_natural(reader)?;
    if variant.has_header_trailer() {
        words.read_zero(reader, "header trailing word")?;
    }

    let header = Header {
        variant,
        file_size,
        event_count,
        event_offset,
        instruction_count,
        instruction_offset,
        layer_offset,
        layer_count,
        parameter_count,
        parameter_offset,
        linked_file_count,
        linked_file_offset,
        argument_length,
        argument_offset,
        string_length,
        string_offset,
    };
    header.check_limits(limits)?;
    Ok(header)
}

/// Header slots reserved at the start of an encode, filled once the body
/// has been laid out.
#[derive(Debug)]
#[must_use = "header slots must be filled before the writer is finished"]
pub struct HeaderSlots {
    file_size: Reservation,
    event_count: Reservation,
    event_offset: Reservation,
    instruction_count: Reservation,
    instruction_offset: Reservation,
    layer_offset: Reservation,
    layer_count: Reservation,
    layer_offset_repeat: Reservation,
    parameter_count: Reservation,
    parameter_offset: Reservation,
    linked_file_count: Reservation,
    linked_file_offset: Reservation,
    argument_length: Reservation,
    argument_offset: Reservation,
    string_length: Reservation,
    string_offset: Reservation,
}

impl HeaderSlots {
    /// Writes the magic and variant tags, then reserves every header field.
    pub fn reserve(writer: &mut ByteWriter, variant: Variant) -> FormatResult<Self> {
        let words = WidthCodec::for_variant(variant);
        let (tag1, tag2) = variant.tags();
        writer.write_bytes(&MAGIC);
        writer.write_u32(tag1);
        writer.write_u32(tag2);

        let file_size = words.reserve(writer, "file size");
        let event_count = words.reserve(writer, "event count");
        let event_offset = words.reserve(writer, "event offset");
        let instruction_count = words.reserve(writer, "instruction count");
        let instruction_offset = words.reserve(writer, "instruction offset");
        words.write_natural(writer, 0)?;
        let layer_offset = words.reserve(writer, "layer offset");
        let layer_count = words.reserve(writer, "layer count");
        let layer_offset_repeat = words.reserve(writer, "layer offset (repeat)");
        let parameter_count = words.reserve(writer, "parameter count");
        let parameter_offset = words.reserve(writer, "parameter offset");
        let linked_file_count = words.reserve(writer, "linked file count");
        let linked_file_offset = words.reserve(writer, "linked file offset");
        let argument_length = words.reserve(writer, "argument length");
        let argument_offset = words.reserve(writer, "argument offset");
        let string_length = words.reserve(writer, "string length");
        let string_offset = words.reserve(writer, "string offset");
        if variant.has_header_trailer() {
            words.write_natural(writer, 0)?;
        }

        Ok(Self {
            file_size,
            event_count,
            event_offset,
            instruction_count,
            instruction_offset,
            layer_offset,
            layer_count,
            layer_offset_repeat,
            parameter_count,
            parameter_offset,
            linked_file_count,
            linked_file_offset,
            argument_length,
            argument_offset,
            string_length,
            string_offset,
        })
    }

    /// Back-patches every slot from `header`, then the file size slot from
    /// the writer's final position.
    ///
    /// `header.file_size` is ignored; the body must be complete when this is
    /// called.
    pub fn fill(self, writer: &mut ByteWriter, header: &Header) -> FormatResult<()> {
        writer.fill(self.event_count, header.event_count)?;
        writer.fill(self.event_offset, header.event_offset)?;
        writer.fill(self.instruction_count, header.instruction_count)?;
        writer.fill(self.instruction_offset, header.instruction_offset)?;
        writer.fill(self.layer_offset, header.layer_offset)?;
        writer.fill(self.layer_count, header.layer_count)?;
        writer.fill(self.layer_offset_repeat, header.layer_offset)?;
        writer.fill(self.parameter_count, header.parameter_count)?;
        writer.fill(self.parameter_offset, header.parameter_offset)?;
        writer.fill(self.linked_file_count, header.linked_file_count)?;
        writer.fill(self.linked_file_offset, header.linked_file_offset)?;
        writer.fill(self.argument_length, header.argument_length)?;
        writer.fill(self.argument_offset, header.argument_offset)?;
        writer.fill(self.string_length, header.string_length)?;
        writer.fill(self.string_offset, header.string_offset)?;
        writer.fill_with_position(self.file_size)?;
        Ok(())
    }
}
