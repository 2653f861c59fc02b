use bytestream::ByteReader;
use codec::{
    decode_document, decode_header, encode_document, ArgValue, BonfireHandler, Document, Event,
    Header, Instruction, Limits, LinkedFile, Parameter, Variant,
};
use schema::{ArgDescriptor, ArgType, InstructionDef, InstructionSchema};

fn sample_schema() -> InstructionSchema {
    InstructionSchema::builder()
        .instruction(InstructionDef::new(1000, 0, "Wait"))
        .instruction(
            InstructionDef::new(1000, 1, "Packed")
                .arg(ArgDescriptor::new("Byte", ArgType::U8))
                .arg(ArgDescriptor::new("Short", ArgType::U16))
                .arg(ArgDescriptor::new("Word", ArgType::U32)),
        )
        .instruction(
            InstructionDef::new(2003, 66, "Set Event Flag")
                .arg(ArgDescriptor::new("Target", ArgType::U8))
                .arg(ArgDescriptor::new("Flag ID", ArgType::U32))
                .arg(ArgDescriptor::new("State", ArgType::U8).enum_name("ON/OFF")),
        )
        .instruction(
            InstructionDef::new(2004, 5, "Signed")
                .arg(ArgDescriptor::new("A", ArgType::I8))
                .arg(ArgDescriptor::new("B", ArgType::I16))
                .arg(ArgDescriptor::new("C", ArgType::I32))
                .arg(ArgDescriptor::new("D", ArgType::F32))
                .arg(ArgDescriptor::new("E", ArgType::U32Alt)),
        )
        .build()
        .unwrap()
}

fn set_flag(flag: u32, state: u8) -> Instruction {
    Instruction::new(2003, 66).with_arguments(vec![
        ArgValue::U8(0),
        ArgValue::U32(flag),
        ArgValue::U8(state),
    ])
}

fn sample_document(variant: Variant) -> Document {
    let mut document = Document::new(variant);
    document.events.push(Event::new(0));
    document.events.push(
        Event::new(50)
            .with_bonfire_handler(BonfireHandler::Restart)
            .instruction(set_flag(11_000, 1).with_layer(3)),
    );
    document.events.push(
        Event::new(11_005)
            .with_bonfire_handler(BonfireHandler::End)
            .instruction(Instruction::new(1000, 0))
            .instruction(Instruction::new(1000, 1).with_arguments(vec![
                ArgValue::U8(0xAB),
                ArgValue::U16(0xBEEF),
                ArgValue::U32(0xDEAD_BEEF),
            ]))
            .instruction(
                Instruction::new(2004, 5)
                    .with_arguments(vec![
                        ArgValue::I8(-3),
                        ArgValue::I16(-300),
                        ArgValue::I32(-70_000),
                        ArgValue::F32(2.5),
                        ArgValue::U32(9),
                    ])
                    .with_layer(7),
            )
            .instruction(set_flag(0, 0).with_layer(3))
            .parameter(Parameter::new(0, 4, 0, 4))
            .parameter(Parameter::new(3, 4, 4, 4))
            .parameter(Parameter::new(3, 0, 8, 1)),
    );
    document.events.push(
        Event::new(11_010)
            .instruction(set_flag(11_010, 1))
            .parameter(Parameter::new(0, 4, 0, 4)),
    );
    document.linked_files.push(LinkedFile::new("common_func"));
    document.linked_files.push(LinkedFile::new("m10_00_00_00"));
    document
}

fn header_of(bytes: &[u8]) -> Header {
    let mut reader = ByteReader::new(bytes);
    decode_header(&mut reader, &Limits::default(), &mut Vec::new()).unwrap()
}

#[test]
fn roundtrip_all_variants() {
    let schema = sample_schema();
    for variant in Variant::ALL {
        let document = sample_document(variant);
        let bytes = encode_document(&document, &schema).unwrap();
        let decoded = decode_document(&bytes, &schema, &Limits::for_testing()).unwrap();
        assert_eq!(decoded.document, document, "{variant:?}");
        assert!(decoded.warnings.is_empty());
    }
}

#[test]
fn reencode_is_byte_identical() {
    let schema = sample_schema();
    for variant in Variant::ALL {
        let bytes = encode_document(&sample_document(variant), &schema).unwrap();
        let decoded = decode_document(&bytes, &schema, &Limits::for_testing()).unwrap();
        let again = encode_document(&decoded.document, &schema).unwrap();
        assert_eq!(again, bytes, "{variant:?}");
    }
}

#[test]
fn header_counts_and_sections() {
    let schema = sample_schema();
    for variant in Variant::ALL {
        let bytes = encode_document(&sample_document(variant), &schema).unwrap();
        let header = header_of(&bytes);

        assert_eq!(header.variant, variant);
        assert_eq!(header.file_size, bytes.len() as u64);
        assert_eq!(header.event_count, 4);
        assert_eq!(header.instruction_count, 6);
        assert_eq!(header.layer_count, 2);
        assert_eq!(header.parameter_count, 4);
        assert_eq!(header.linked_file_count, 2);
        assert_eq!(header.event_offset, variant.header_size() as u64);
        assert_eq!(
            header.instruction_offset,
            header.event_offset + 4 * variant.event_size() as u64
        );
        assert_eq!(
            header.layer_offset,
            header.instruction_offset + 6 * variant.instruction_size() as u64
        );
        assert_eq!(
            header.argument_offset,
            header.layer_offset + 2 * variant.layer_size() as u64
        );
        assert!(header.parameter_offset >= header.argument_offset + header.argument_length);
        assert_eq!(header.parameter_offset % 4, 0);
        assert_eq!(
            header.linked_file_offset,
            header.parameter_offset + 4 * variant.parameter_size() as u64
        );
        assert_eq!(
            header.string_offset,
            header.linked_file_offset + 2 * variant.linked_file_size() as u64
        );
        assert_eq!(header.string_offset + header.string_length, bytes.len() as u64);
    }
}

#[test]
fn offsets_stay_within_their_tables() {
    let schema = sample_schema();
    for variant in Variant::ALL {
        let bytes = encode_document(&sample_document(variant), &schema).unwrap();
        let header = header_of(&bytes);
        let word = variant.width();
        let mut reader = ByteReader::new(&bytes);

        for index in 0..header.instruction_count {
            let record = header.instruction_offset + index * variant.instruction_size() as u64;
            reader.seek(record + 8).unwrap();
            let length = reader.read_word(word).unwrap();
            let offset = u64::from(reader.read_u32().unwrap());
            assert!(offset + length <= header.argument_length, "{variant:?} #{index}");
        }

        for index in 0..header.event_count {
            let record = header.event_offset + index * variant.event_size() as u64;
            reader.seek(record).unwrap();
            let _id = reader.read_word(word).unwrap();
            let count = reader.read_word(word).unwrap();
            let offset = reader.read_word(word).unwrap();
            assert_eq!(offset % variant.instruction_size() as u64, 0);
            let start = offset / variant.instruction_size() as u64;
            assert!(start + count <= header.instruction_count, "{variant:?} #{index}");
        }
    }
}

#[test]
fn packed_blob_is_eight_bytes() {
    let schema = sample_schema();
    let mut document = Document::new(Variant::Alpha);
    document
        .events
        .push(Event::new(0).instruction(Instruction::new(1000, 1).with_arguments(vec![
            ArgValue::U8(1),
            ArgValue::U16(2),
            ArgValue::U32(3),
        ])));
    let bytes = encode_document(&document, &schema).unwrap();
    let header = header_of(&bytes);

    let mut reader = ByteReader::new(&bytes);
    reader.seek(header.instruction_offset + 8).unwrap();
    assert_eq!(reader.read_u32().unwrap(), 8);

    let start = header.argument_offset as usize;
    assert_eq!(&bytes[start..start + 8], &[1, 0, 2, 0, 3, 0, 0, 0]);
}

#[test]
fn narrow_argument_length_counts_trailer() {
    let schema = sample_schema();
    for (variant, expected) in [(Variant::Alpha, 12), (Variant::Beta, 8), (Variant::Gamma, 8)] {
        let mut document = Document::new(variant);
        document
            .events
            .push(Event::new(0).instruction(Instruction::new(1000, 1).with_arguments(vec![
                ArgValue::U8(1),
                ArgValue::U16(2),
                ArgValue::U32(3),
            ])));
        let bytes = encode_document(&document, &schema).unwrap();
        let header = header_of(&bytes);
        assert_eq!(header.argument_length, expected, "{variant:?}");
        assert_eq!(
            header.parameter_offset,
            header.argument_offset + header.argument_length,
            "{variant:?}"
        );

        let start = (header.argument_offset + 8) as usize;
        let end = (header.argument_offset + header.argument_length) as usize;
        assert!(bytes[start..end].iter().all(|&b| b == 0));

        let decoded = decode_document(&bytes, &schema, &Limits::for_testing()).unwrap();
        assert_eq!(decoded.document, document);
        assert_eq!(encode_document(&decoded.document, &schema).unwrap(), bytes);
    }
}

#[test]
fn no_parameter_sentinels_in_file() {
    let schema = sample_schema();
    let cases: [(Variant, usize, &[u8]); 3] = [
        (Variant::Alpha, 16, &[0xFF, 0xFF, 0xFF, 0xFF]),
        (Variant::Beta, 32, &[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0]),
        (Variant::Gamma, 32, &[0xFF; 8]),
    ];
    for (variant, field, expected) in cases {
        let mut document = Document::new(variant);
        document.events.push(Event::new(0).instruction(Instruction::new(1000, 0)));
        let bytes = encode_document(&document, &schema).unwrap();
        let start = variant.header_size() + field;
        assert_eq!(&bytes[start..start + expected.len()], expected, "{variant:?}");
    }
}

#[test]
fn shared_layers_are_written_once() {
    let schema = sample_schema();
    let bytes = encode_document(&sample_document(Variant::Beta), &schema).unwrap();
    let header = header_of(&bytes);
    let mut reader = ByteReader::new(&bytes);

    let mut numbers = Vec::new();
    for index in 0..header.layer_count {
        reader
            .seek(header.layer_offset + index * Variant::Beta.layer_size() as u64)
            .unwrap();
        assert_eq!(reader.read_i32().unwrap(), 2);
        numbers.push(reader.read_u32().unwrap());
        assert_eq!(reader.read_i64().unwrap(), 0);
        assert_eq!(reader.read_i64().unwrap(), -1);
        assert_eq!(reader.read_i64().unwrap(), 1);
    }
    assert_eq!(numbers, vec![3, 7]);
}

#[test]
fn linked_file_names_are_utf16() {
    let schema = sample_schema();
    let bytes = encode_document(&sample_document(Variant::Alpha), &schema).unwrap();
    let header = header_of(&bytes);
    let start = header.string_offset as usize;
    assert_eq!(&bytes[start..start + 4], &[b'c', 0, b'o', 0]);
    // "common_func" plus terminator.
    let second = start + 24;
    assert_eq!(&bytes[second - 2..second + 2], &[0, 0, b'm', 0]);
    assert_eq!(header.string_length, 24 + 26);
}

#[test]
fn event_lookup_after_decode() {
    let schema = sample_schema();
    let bytes = encode_document(&sample_document(Variant::Gamma), &schema).unwrap();
    let mut document = decode_document(&bytes, &schema, &Limits::default())
        .unwrap()
        .document;

    let event = document.event(11_005).unwrap();
    assert_eq!(event.instructions.len(), 4);
    assert_eq!(event.parameters.len(), 3);
    assert_eq!(event.bonfire_handler, BonfireHandler::End);

    document
        .event_mut(0)
        .unwrap()
        .instructions
        .push(Instruction::new(1000, 0));
    let bytes = encode_document(&document, &schema).unwrap();
    let decoded = decode_document(&bytes, &schema, &Limits::default()).unwrap();
    assert_eq!(decoded.document.event(0).unwrap().instructions.len(), 1);
}
