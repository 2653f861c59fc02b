#![no_main]

use codec::{decode_document, encode_document, Limits};
use libfuzzer_sys::fuzz_target;
use schema::{ArgDescriptor, ArgType, InstructionDef, InstructionSchema};

fn schema() -> InstructionSchema {
    InstructionSchema::builder()
        .instruction(InstructionDef::new(1000, 0, "Wait"))
        .instruction(
            InstructionDef::new(2003, 66, "Set Event Flag")
                .arg(ArgDescriptor::new("Target", ArgType::U8))
                .arg(ArgDescriptor::new("Flag ID", ArgType::U32))
                .arg(ArgDescriptor::new("State", ArgType::U8)),
        )
        .instruction(
            InstructionDef::new(1001, 0, "Wait Seconds")
                .arg(ArgDescriptor::new("Seconds", ArgType::F32)),
        )
        .build()
        .unwrap()
}

fuzz_target!(|data: &[u8]| {
    let schema = schema();
    let Ok(decoded) = decode_document(data, &schema, &Limits::for_testing()) else {
        return;
    };

    // Anything that decodes must encode and decode back to the same document.
    let bytes = encode_document(&decoded.document, &schema).unwrap();
    let again = decode_document(&bytes, &schema, &Limits::unlimited()).unwrap();
    assert_eq!(again.document, decoded.document);
});
