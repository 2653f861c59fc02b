//! Inspection and debugging tools for the emevd codec.
//!
//! This crate provides utilities for looking inside event-script files:
//!
//! - Summarize the header and table layout without a schema
//! - Decode a file into structured JSON or a readable listing
//! - Check that decode followed by encode reproduces the input
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use bytestream::ByteReader;
use codec::{
    decode_document, decode_header, encode_document, ArgValue, DecodeWarning, Header, Limits,
};
use schema::{InstructionDef, InstructionSchema};
use serde::{Deserialize, Serialize};

/// Schema documents are either a bare list of definitions or an object with
/// an `instructions` list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SchemaFile {
    List(Vec<InstructionDef>),
    Wrapped { instructions: Vec<InstructionDef> },
}

/// Parses and validates a JSON schema document.
pub fn parse_schema(json: &str) -> Result<InstructionSchema> {
    let file: SchemaFile = serde_json::from_str(json).context("parse schema json")?;
    let instructions = match file {
        SchemaFile::List(instructions) | SchemaFile::Wrapped { instructions } => instructions,
    };
    InstructionSchema::new(instructions).context("schema validation failed")
}

/// Header and table summary of one file.
#[derive(Debug, Clone)]
pub struct InspectReport {
    pub header: Header,
    pub warnings: Vec<DecodeWarning>,
    pub sections: Vec<SectionSummary>,
}

/// One table or pool as laid out in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSummary {
    pub name: &'static str,
    pub offset: u64,
    /// Record count; `None` for byte pools.
    pub count: Option<u64>,
    pub byte_len: u64,
}

/// Reads the header of a file and summarizes its sections.
pub fn inspect_document(bytes: &[u8], limits: &Limits) -> Result<InspectReport> {
    let mut reader = ByteReader::new(bytes);
    let mut warnings = Vec::new();
    let header = decode_header(&mut reader, limits, &mut warnings).context("decode header")?;
    let variant = header.variant;
    let table = |name, offset, count: u64, size: usize| SectionSummary {
        name,
        offset,
        count: Some(count),
        byte_len: count * size as u64,
    };
    let sections = vec![
        table(
            "events",
            header.event_offset,
            header.event_count,
            variant.event_size(),
        ),
        table(
            "instructions",
            header.instruction_offset,
            header.instruction_count,
            variant.instruction_size(),
        ),
        table(
            "layers",
            header.layer_offset,
            header.layer_count,
            variant.layer_size(),
        ),
        SectionSummary {
            name: "argument data",
            offset: header.argument_offset,
            count: None,
            byte_len: header.argument_length,
        },
        table(
            "parameters",
            header.parameter_offset,
            header.parameter_count,
            variant.parameter_size(),
        ),
        table(
            "linked files",
            header.linked_file_offset,
            header.linked_file_count,
            variant.linked_file_size(),
        ),
        SectionSummary {
            name: "string data",
            offset: header.string_offset,
            count: None,
            byte_len: header.string_length,
        },
    ];
    Ok(InspectReport {
        header,
        warnings,
        sections,
    })
}

/// JSON view of a decoded document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentJson {
    pub variant: String,
    pub events: Vec<EventJson>,
    pub linked_files: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventJson {
    pub id: u64,
    pub bonfire_handler: String,
    pub instructions: Vec<InstructionJson>,
    pub parameters: Vec<ParameterJson>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstructionJson {
    pub class_id: u32,
    pub instruction_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<u32>,
    pub arguments: Vec<ArgumentJson>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArgumentJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParameterJson {
    pub instruction_number: u64,
    pub destination_start_byte: u64,
    pub source_start_byte: u64,
    pub length: u64,
}

/// Decodes a file and converts it to its JSON view, attaching schema names.
pub fn decode_document_json(
    bytes: &[u8],
    schema: &InstructionSchema,
    limits: &Limits,
) -> Result<DocumentJson> {
    let decoded = decode_document(bytes, schema, limits).context("decode document")?;
    let document = decoded.document;
    let events = document
        .events
        .iter()
        .map(|event| EventJson {
            id: event.id,
            bonfire_handler: format!("{:?}", event.bonfire_handler),
            instructions: event
                .instructions
                .iter()
                .map(|instruction| {
                    let def = schema.get(instruction.class_id, instruction.instruction_id);
                    InstructionJson {
                        class_id: instruction.class_id,
                        instruction_id: instruction.instruction_id,
                        name: def.map(|def| def.name.clone()),
                        layer: instruction.layer.map(|layer| layer.layer_number),
                        arguments: instruction
                            .arguments
                            .iter()
                            .enumerate()
                            .map(|(index, value)| ArgumentJson {
                                name: def
                                    .and_then(|def| def.args.get(index))
                                    .map(|arg| arg.name.clone()),
                                type_name: value.type_name(),
                                value: json_value(*value),
                            })
                            .collect(),
                    }
                })
                .collect(),
            parameters: event
                .parameters
                .iter()
                .map(|parameter| ParameterJson {
                    instruction_number: parameter.instruction_number,
                    destination_start_byte: parameter.destination_start_byte,
                    source_start_byte: parameter.source_start_byte,
                    length: parameter.length,
                })
                .collect(),
        })
        .collect();
    Ok(DocumentJson {
        variant: format!("{:?}", document.variant),
        events,
        linked_files: document
            .linked_files
            .into_iter()
            .map(|file| file.name)
            .collect(),
        warnings: decoded.warnings.iter().map(ToString::to_string).collect(),
    })
}

fn json_value(value: ArgValue) -> serde_json::Value {
    match value {
        ArgValue::U8(v) => v.into(),
        ArgValue::I8(v) => v.into(),
        ArgValue::U16(v) => v.into(),
        ArgValue::I16(v) => v.into(),
        ArgValue::U32(v) => v.into(),
        ArgValue::I32(v) => v.into(),
        ArgValue::F32(v) => f64::from(v).into(),
    }
}

/// Renders the JSON view as an indented listing.
pub fn format_decode_pretty(document: &DocumentJson) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} document: {} events",
        document.variant,
        document.events.len()
    );
    for warning in &document.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    for name in &document.linked_files {
        let _ = writeln!(out, "linked file: {name}");
    }
    for event in &document.events {
        let _ = writeln!(out, "event {} ({}):", event.id, event.bonfire_handler);
        for instruction in &event.instructions {
            let args: Vec<String> = instruction
                .arguments
                .iter()
                .map(|arg| arg.value.to_string())
                .collect();
            let _ = write!(
                out,
                "  {}[{:02}]",
                instruction.class_id, instruction.instruction_id
            );
            if let Some(name) = &instruction.name {
                let _ = write!(out, " {name}");
            }
            let _ = write!(out, " ({})", args.join(", "));
            if let Some(layer) = instruction.layer {
                let _ = write!(out, " layer {layer}");
            }
            out.push('\n');
        }
        for parameter in &event.parameters {
            let _ = writeln!(
                out,
                "  param: instruction {} bytes {}..{} <- {}",
                parameter.instruction_number,
                parameter.destination_start_byte,
                parameter.destination_start_byte + parameter.length,
                parameter.source_start_byte
            );
        }
    }
    out
}

/// Outcome of decoding a file and encoding it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundtripReport {
    pub input_len: usize,
    pub output_len: usize,
    /// First byte offset at which input and output differ.
    pub first_difference: Option<usize>,
}

impl RoundtripReport {
    /// Returns `true` if the output is byte-identical to the input.
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.first_difference.is_none()
    }
}

/// Decodes and re-encodes a file, comparing the bytes.
pub fn roundtrip(
    bytes: &[u8],
    schema: &InstructionSchema,
    limits: &Limits,
) -> Result<RoundtripReport> {
    let decoded = decode_document(bytes, schema, limits).context("decode document")?;
    let output = encode_document(&decoded.document, schema).context("encode document")?;
    let first_difference = bytes
        .iter()
        .zip(&output)
        .position(|(a, b)| a != b)
        .or_else(|| (bytes.len() != output.len()).then_some(bytes.len().min(output.len())));
    Ok(RoundtripReport {
        input_len: bytes.len(),
        output_len: output.len(),
        first_difference,
    })
}
