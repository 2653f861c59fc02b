use bytestream::ByteReader;
use codec::{
    decode_document, decode_header, encode_document, ArgValue, DecodeWarning, Document, Event,
    FormatError, Header, Instruction, LimitKind, Limits, Parameter, Table, Variant,
};
use schema::{ArgDescriptor, ArgType, InstructionDef, InstructionSchema, SchemaLookup};

fn flag_schema() -> InstructionSchema {
    InstructionSchema::builder()
        .instruction(
            InstructionDef::new(2003, 66, "Set Event Flag")
                .arg(ArgDescriptor::new("Target", ArgType::U8))
                .arg(ArgDescriptor::new("Flag ID", ArgType::U32))
                .arg(ArgDescriptor::new("State", ArgType::U8)),
        )
        .build()
        .unwrap()
}

fn flag_document(variant: Variant) -> Document {
    let mut document = Document::new(variant);
    document.events.push(
        Event::new(100)
            .instruction(
                Instruction::new(2003, 66)
                    .with_arguments(vec![ArgValue::U8(0), ArgValue::U32(100), ArgValue::U8(1)])
                    .with_layer(4),
            )
            .parameter(Parameter::new(0, 4, 0, 4)),
    );
    document
}

fn encoded(variant: Variant) -> Vec<u8> {
    encode_document(&flag_document(variant), &flag_schema()).unwrap()
}

fn header_of(bytes: &[u8]) -> Header {
    let mut reader = ByteReader::new(bytes);
    decode_header(&mut reader, &Limits::default(), &mut Vec::new()).unwrap()
}

fn decode(bytes: &[u8]) -> Result<codec::Decoded, FormatError> {
    decode_document(bytes, &flag_schema(), &Limits::for_testing())
}

fn put_u32(bytes: &mut [u8], at: u64, value: u32) {
    let at = at as usize;
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

#[test]
fn bad_magic() {
    let mut bytes = encoded(Variant::Alpha);
    bytes[0] = b'X';
    assert_eq!(
        decode(&bytes).unwrap_err(),
        FormatError::BadMagic {
            found: *b"XVD\0"
        }
    );
}

#[test]
fn variant_detection() {
    let tags = [
        ((0x0000_0000, 0x0000_00CC), Variant::Alpha),
        ((0x0000_FF00, 0x0000_00CC), Variant::Beta),
        ((0x0001_FF00, 0x0000_00CD), Variant::Gamma),
    ];
    for ((tag1, tag2), variant) in tags {
        let bytes = encoded(variant);
        assert_eq!(&bytes[4..8], &u32::to_le_bytes(tag1));
        assert_eq!(&bytes[8..12], &u32::to_le_bytes(tag2));
        assert_eq!(decode(&bytes).unwrap().document.variant, variant);
    }
}

#[test]
fn unknown_variant() {
    let mut bytes = encoded(Variant::Gamma);
    put_u32(&mut bytes, 8, 0xCC);
    assert_eq!(
        decode(&bytes).unwrap_err(),
        FormatError::UnknownVariant {
            tag1: 0x0001_FF00,
            tag2: 0xCC
        }
    );
}

#[test]
fn bonfire_handler_three() {
    for variant in Variant::ALL {
        let mut bytes = encoded(variant);
        let header = header_of(&bytes);
        let field = header.event_offset + variant.event_size() as u64 - 8;
        put_u32(&mut bytes, field, 3);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            FormatError::UnexpectedValue {
                field: "bonfire handler",
                found: 3
            },
            "{variant:?}"
        );
    }
}

#[test]
fn layer_trailer_zero_minus_one_two() {
    for variant in Variant::ALL {
        let mut bytes = encoded(variant);
        let header = header_of(&bytes);
        let word = variant.width().bytes();
        let last = header.layer_offset as usize + 8 + 2 * word;
        bytes[last] = 2;
        let err = decode(&bytes).unwrap_err();
        assert_eq!(
            err,
            FormatError::UnexpectedValue {
                field: "layer trailer",
                found: 2
            },
            "{variant:?}"
        );
    }
}

#[test]
fn instruction_range_past_table() {
    for variant in Variant::ALL {
        let mut bytes = encoded(variant);
        let header = header_of(&bytes);
        let word = variant.width().bytes() as u64;
        let offset_field = header.event_offset + 2 * word;
        put_u32(
            &mut bytes,
            offset_field,
            variant.instruction_size() as u32,
        );
        assert_eq!(
            decode(&bytes).unwrap_err(),
            FormatError::DanglingReference {
                table: Table::Instructions,
                offset: variant.instruction_size() as u64
            },
            "{variant:?}"
        );
    }
}

#[test]
fn layer_reference_past_table() {
    let mut bytes = encoded(Variant::Alpha);
    let header = header_of(&bytes);
    put_u32(&mut bytes, header.instruction_offset + 16, 20);
    assert_eq!(
        decode(&bytes).unwrap_err(),
        FormatError::DanglingReference {
            table: Table::Layers,
            offset: 20
        }
    );
}

#[test]
fn table_offset_past_end_of_file() {
    let mut bytes = encoded(Variant::Alpha);
    let len = bytes.len() as u32;
    // Parameter table offset.
    put_u32(&mut bytes, 52, len + 4);
    assert_eq!(
        decode(&bytes).unwrap_err(),
        FormatError::DanglingReference {
            table: Table::Parameters,
            offset: u64::from(len) + 4
        }
    );
}

#[test]
fn truncated_header() {
    let bytes = encoded(Variant::Beta);
    let err = decode(&bytes[..100]).unwrap_err();
    assert!(matches!(err, FormatError::Truncated { .. }));
}

#[test]
fn truncated_table() {
    let bytes = encoded(Variant::Gamma);
    let header = header_of(&bytes);
    let cut = header.parameter_offset as usize + 8;
    let err = decode(&bytes[..cut]).unwrap_err();
    assert!(matches!(
        err,
        FormatError::Truncated { .. } | FormatError::DanglingReference { .. }
    ));
}

#[test]
fn schema_miss_on_decode() {
    let bytes = encoded(Variant::Beta);
    let empty = InstructionSchema::builder().build().unwrap();
    assert_eq!(
        decode_document(&bytes, &empty, &Limits::default()).unwrap_err(),
        FormatError::UnknownInstruction {
            class_id: 2003,
            instruction_id: 66
        }
    );
}

struct OddLookup(Vec<ArgDescriptor>);

impl SchemaLookup for OddLookup {
    fn arguments_for(&self, _class_id: u32, _instruction_id: u32) -> Option<&[ArgDescriptor]> {
        Some(&self.0)
    }
}

#[test]
fn unsupported_arg_type_on_decode() {
    let bytes = encoded(Variant::Alpha);
    let lookup = OddLookup(vec![ArgDescriptor::with_tag("mystery", 9)]);
    assert_eq!(
        decode_document(&bytes, &lookup, &Limits::default()).unwrap_err(),
        FormatError::UnsupportedArgType {
            class_id: 2003,
            instruction_id: 66,
            tag: 9
        }
    );
}

#[test]
fn limits_bound_header_counts() {
    let bytes = encoded(Variant::Gamma);
    let limits = Limits {
        max_events: 0,
        ..Limits::for_testing()
    };
    assert_eq!(
        decode_document(&bytes, &flag_schema(), &limits).unwrap_err(),
        FormatError::LimitsExceeded {
            kind: LimitKind::Events,
            limit: 0,
            actual: 1
        }
    );
}

#[test]
fn layer_offset_mismatch_only_warns() {
    let mut bytes = encoded(Variant::Alpha);
    let header = header_of(&bytes);
    // Second copy of the layer table offset.
    put_u32(&mut bytes, 44, 0x1234);

    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded.document, flag_document(Variant::Alpha));
    assert_eq!(
        decoded.warnings,
        vec![DecodeWarning::LayerOffsetMismatch {
            first: header.layer_offset,
            second: 0x1234
        }]
    );
}

#[test]
fn encode_rejects_argument_mismatch() {
    let mut document = flag_document(Variant::Beta);
    document.events[0].instructions[0].arguments.pop();
    let err = encode_document(&document, &flag_schema()).unwrap_err();
    assert!(matches!(err, FormatError::ArgumentMismatch { .. }));
}
