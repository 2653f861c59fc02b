//! Whole-document decoding and two-pass encoding.

use bytestream::{ByteReader, ByteWriter};
use layout::{
    decode_header, FormatError, FormatResult, Header, HeaderSlots, Limits, Table, WidthCodec,
};
use schema::SchemaLookup;

use crate::event::EventRecord;
use crate::instruction::InstructionRecord;
use crate::model::{Decoded, Document, Layer, LinkedFile, Parameter};
use crate::pools::{WritePools, ARGUMENT_ALIGN};
use crate::tables::{read_name, read_records, write_name};

/// Decodes a document from the exact bytes of a file.
///
/// Tables are read in dependency order: instruction records, layers, the
/// argument pool, parameters, linked files and the string pool, then events,
/// which slice the instruction and parameter tables. Decoding stops at the
/// first structural violation; the only non-fatal finding is reported in
/// [`Decoded::warnings`].
pub fn decode_document(
    bytes: &[u8],
    schema: &dyn SchemaLookup,
    limits: &Limits,
) -> FormatResult<Decoded> {
    let mut reader = ByteReader::new(bytes);
    let mut warnings = Vec::new();
    let header = decode_header(&mut reader, limits, &mut warnings)?;
    let variant = header.variant;
    let words = WidthCodec::for_variant(variant);

    let records = read_records(
        &mut reader,
        Table::Instructions,
        header.instruction_offset,
        header.instruction_count,
        variant.instruction_size(),
        |r| InstructionRecord::decode(r, variant),
    )?;
    let layers = read_records(
        &mut reader,
        Table::Layers,
        header.layer_offset,
        header.layer_count,
        variant.layer_size(),
        |r| Layer::decode(r, words),
    )?;
    let arguments = pool(
        &reader,
        Table::Arguments,
        header.argument_offset,
        header.argument_length,
    )?;
    let parameters = read_records(
        &mut reader,
        Table::Parameters,
        header.parameter_offset,
        header.parameter_count,
        variant.parameter_size(),
        |r| Parameter::decode(r, variant),
    )?;
    let name_offsets = read_records(
        &mut reader,
        Table::LinkedFiles,
        header.linked_file_offset,
        header.linked_file_count,
        variant.linked_file_size(),
        |r| words.read_natural(r),
    )?;
    let strings = pool(
        &reader,
        Table::Strings,
        header.string_offset,
        header.string_length,
    )?;
    let linked_files = name_offsets
        .into_iter()
        .map(|offset| read_name(strings, offset).map(|name| LinkedFile { name }))
        .collect::<FormatResult<Vec<_>>>()?;

    let instructions = records
        .iter()
        .map(|record| record.resolve(schema, arguments, &layers, variant))
        .collect::<FormatResult<Vec<_>>>()?;

    let event_records = read_records(
        &mut reader,
        Table::Events,
        header.event_offset,
        header.event_count,
        variant.event_size(),
        |r| EventRecord::decode(r, variant),
    )?;
    let events = event_records
        .iter()
        .map(|record| record.assemble(&instructions, &parameters, variant))
        .collect::<FormatResult<Vec<_>>>()?;

    log::debug!(
        "decoded {variant:?} document: {} events, {} instructions, {} layers, {} parameters, {} linked files",
        events.len(),
        instructions.len(),
        layers.len(),
        parameters.len(),
        linked_files.len()
    );

    Ok(Decoded {
        document: Document {
            variant,
            events,
            linked_files,
        },
        warnings,
    })
}

/// Encodes a document into the exact bytes of a file.
///
/// The header is reserved first, the sections are streamed in the order
/// events, instructions, layers, argument data, parameters, linked files,
/// strings, and the header slots are back-patched at the end. All offsets are
/// recomputed from append order.
pub fn encode_document(document: &Document, schema: &dyn SchemaLookup) -> FormatResult<Vec<u8>> {
    let variant = document.variant;
    let words = WidthCodec::for_variant(variant);
    let mut writer = ByteWriter::with_capacity(estimate_size(document));
    let slots = HeaderSlots::reserve(&mut writer, variant)?;
    let mut header = Header::empty(variant);
    let mut pools = WritePools::new();

    header.event_offset = position(&writer);
    header.event_count = document.events.len() as u64;
    for event in &document.events {
        event.to_record(&mut pools, variant)?.encode(&mut writer, variant)?;
    }

    header.instruction_offset = position(&writer);
    let instructions = std::mem::take(&mut pools.instructions);
    header.instruction_count = instructions.len() as u64;
    for instruction in instructions {
        instruction
            .to_record(schema, &mut pools, variant)?
            .encode(&mut writer, variant)?;
    }

    header.layer_offset = position(&writer);
    header.layer_count = pools.layers().len() as u64;
    for layer in pools.layers() {
        layer.encode(&mut writer, words)?;
    }

    header.argument_offset = position(&writer);
    writer.write_bytes(pools.arguments.as_slice());
    writer.write_zeros(variant.argument_trailer_len());
    header.argument_length = position(&writer) - header.argument_offset;
    writer.pad_to(ARGUMENT_ALIGN);

    header.parameter_offset = position(&writer);
    header.parameter_count = pools.parameters.len() as u64;
    for parameter in &pools.parameters {
        parameter.encode(&mut writer, variant)?;
    }

    header.linked_file_offset = position(&writer);
    header.linked_file_count = document.linked_files.len() as u64;
    for linked_file in &document.linked_files {
        let offset = write_name(&mut pools.strings, &linked_file.name)?;
        words.write_natural(&mut writer, offset)?;
    }

    header.string_offset = position(&writer);
    header.string_length = pools.strings.position() as u64;
    writer.write_bytes(pools.strings.as_slice());

    slots.fill(&mut writer, &header)?;
    let bytes = writer.finish()?;

    log::debug!(
        "encoded {variant:?} document: {} events, {} instructions, {} layers, {} bytes",
        header.event_count,
        header.instruction_count,
        header.layer_count,
        bytes.len()
    );
    Ok(bytes)
}

/// Returns a raw pool as a slice of the input, without moving the reader.
fn pool<'a>(
    reader: &ByteReader<'a>,
    table: Table,
    offset: u64,
    length: u64,
) -> FormatResult<&'a [u8]> {
    reader
        .slice(offset, length)
        .map_err(|_| FormatError::DanglingReference { table, offset })
}

fn position(writer: &ByteWriter) -> u64 {
    writer.position() as u64
}

fn estimate_size(document: &Document) -> usize {
    let variant = document.variant;
    let events = document.events.len() * variant.event_size();
    let instructions = document.instruction_count() * (variant.instruction_size() + 8);
    variant.header_size() + events + instructions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Event, Instruction};
    use crate::types::ArgValue;
    use layout::Variant;
    use schema::{ArgDescriptor, ArgType, InstructionDef, InstructionSchema};

    fn schema() -> InstructionSchema {
        InstructionSchema::builder()
            .instruction(
                InstructionDef::new(1000, 0, "Wait")
                    .arg(ArgDescriptor::new("Condition", ArgType::I8)),
            )
            .build()
            .unwrap()
    }

    fn document(variant: Variant) -> Document {
        let mut document = Document::new(variant);
        document.events.push(
            Event::new(0)
                .instruction(
                    Instruction::new(1000, 0)
                        .with_arguments(vec![ArgValue::I8(-1)])
                        .with_layer(2),
                )
                .parameter(Parameter::new(0, 0, 0, 1)),
        );
        document.linked_files.push(LinkedFile::new("common"));
        document
    }

    #[test]
    fn roundtrip_every_variant() {
        let schema = schema();
        for variant in Variant::ALL {
            let document = document(variant);
            let bytes = encode_document(&document, &schema).unwrap();
            let decoded = decode_document(&bytes, &schema, &Limits::for_testing()).unwrap();
            assert_eq!(decoded.document, document);
            assert!(decoded.warnings.is_empty());
        }
    }

    #[test]
    fn header_file_size_is_output_length() {
        let schema = schema();
        let bytes = encode_document(&document(Variant::Gamma), &schema).unwrap();
        let mut reader = ByteReader::new(&bytes);
        let header = decode_header(&mut reader, &Limits::default(), &mut Vec::new()).unwrap();
        assert_eq!(header.file_size, bytes.len() as u64);
        assert_eq!(header.event_offset, Variant::Gamma.header_size() as u64);
        assert_eq!(header.argument_length, 1);

        let bytes = encode_document(&document(Variant::Alpha), &schema).unwrap();
        let mut reader = ByteReader::new(&bytes);
        let header = decode_header(&mut reader, &Limits::default(), &mut Vec::new()).unwrap();
        assert_eq!(header.argument_length, 5);
        assert_eq!(header.parameter_offset % 4, 0);
    }

    #[test]
    fn empty_document_roundtrip() {
        let schema = schema();
        for variant in Variant::ALL {
            let document = Document::new(variant);
            let bytes = encode_document(&document, &schema).unwrap();
            assert_eq!(
                bytes.len(),
                variant.header_size() + variant.argument_trailer_len()
            );
            let decoded = decode_document(&bytes, &schema, &Limits::for_testing()).unwrap();
            assert_eq!(decoded.document, document);
        }
    }

    #[test]
    fn encode_schema_miss() {
        let mut document = Document::new(Variant::Alpha);
        document
            .events
            .push(Event::new(0).instruction(Instruction::new(2000, 0)));
        let err = encode_document(&document, &schema()).unwrap_err();
        assert_eq!(
            err,
            FormatError::UnknownInstruction {
                class_id: 2000,
                instruction_id: 0
            }
        );
    }

    #[test]
    fn encode_rejects_wide_event_id_on_narrow_variant() {
        let mut document = Document::new(Variant::Alpha);
        document.events.push(Event::new(u64::from(u32::MAX) + 1));
        let err = encode_document(&document, &schema()).unwrap_err();
        assert!(matches!(err, FormatError::ValueOutOfRange { bits: 32, .. }));
    }
}
