//! Instruction definitions, validation and lookup.

use std::collections::HashMap;

use crate::descriptor::{ArgDescriptor, ArgType};
use crate::error::{SchemaError, SchemaResult};

/// Resolves the argument layout of an instruction.
///
/// The codec consumes this as an opaque service; [`InstructionSchema`] is the
/// in-crate implementation.
pub trait SchemaLookup {
    /// Returns the ordered argument descriptors for an instruction, or `None`
    /// if the instruction is unknown.
    fn arguments_for(&self, class_id: u32, instruction_id: u32) -> Option<&[ArgDescriptor]>;
}

/// An instruction definition within a schema.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstructionDef {
    pub class_id: u32,
    pub instruction_id: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub args: Vec<ArgDescriptor>,
}

impl InstructionDef {
    /// Creates an instruction with no arguments.
    #[must_use]
    pub fn new(class_id: u32, instruction_id: u32, name: impl Into<String>) -> Self {
        Self {
            class_id,
            instruction_id,
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn arg(mut self, arg: ArgDescriptor) -> Self {
        self.args.push(arg);
        self
    }
}

/// A validated set of instruction definitions keyed by `(class, instruction)`.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionSchema {
    instructions: Vec<InstructionDef>,
    index: HashMap<(u32, u32), usize>,
}

impl InstructionSchema {
    /// Creates a schema from definitions after validation.
    pub fn new(instructions: Vec<InstructionDef>) -> SchemaResult<Self> {
        let mut index = HashMap::with_capacity(instructions.len());
        for (position, def) in instructions.iter().enumerate() {
            let key = (def.class_id, def.instruction_id);
            if index.insert(key, position).is_some() {
                return Err(SchemaError::DuplicateInstruction {
                    class_id: def.class_id,
                    instruction_id: def.instruction_id,
                });
            }
            validate_instruction(def)?;
        }
        Ok(Self {
            instructions,
            index,
        })
    }

    /// Creates a schema builder.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder {
            instructions: Vec::new(),
        }
    }

    /// Returns the definition for an instruction.
    #[must_use]
    pub fn get(&self, class_id: u32, instruction_id: u32) -> Option<&InstructionDef> {
        self.index
            .get(&(class_id, instruction_id))
            .map(|&position| &self.instructions[position])
    }

    /// Returns the definitions in declaration order.
    #[must_use]
    pub fn instructions(&self) -> &[InstructionDef] {
        &self.instructions
    }

    /// Returns the number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the schema has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl SchemaLookup for InstructionSchema {
    fn arguments_for(&self, class_id: u32, instruction_id: u32) -> Option<&[ArgDescriptor]> {
        self.get(class_id, instruction_id).map(|def| def.args.as_slice())
    }
}

/// Builder for `InstructionSchema`.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    instructions: Vec<InstructionDef>,
}

impl SchemaBuilder {
    /// Adds an instruction definition.
    #[must_use]
    pub fn instruction(mut self, def: InstructionDef) -> Self {
        self.instructions.push(def);
        self
    }

    /// Builds the schema after validation.
    pub fn build(self) -> SchemaResult<InstructionSchema> {
        InstructionSchema::new(self.instructions)
    }
}

fn validate_instruction(def: &InstructionDef) -> SchemaResult<()> {
    for (index, arg) in def.args.iter().enumerate() {
        if ArgType::from_tag(arg.type_tag).is_none() {
            return Err(SchemaError::UnsupportedArgType {
                class_id: def.class_id,
                instruction_id: def.instruction_id,
                index,
                tag: arg.type_tag,
            });
        }
        if let (Some(min), Some(max)) = (arg.min, arg.max) {
            if min > max {
                return Err(SchemaError::InvalidBounds {
                    class_id: def.class_id,
                    instruction_id: def.instruction_id,
                    index,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_flag() -> InstructionDef {
        InstructionDef::new(2003, 66, "Set Event Flag")
            .arg(ArgDescriptor::new("Target", ArgType::U8))
            .arg(ArgDescriptor::new("Flag ID", ArgType::U32))
            .arg(ArgDescriptor::new("State", ArgType::U8).enum_name("ON/OFF"))
    }

    #[test]
    fn schema_builder_roundtrip() {
        let schema = InstructionSchema::builder()
            .instruction(set_flag())
            .instruction(InstructionDef::new(1000, 0, "Wait"))
            .build()
            .unwrap();
        assert_eq!(schema.len(), 2);
        assert!(!schema.is_empty());
        assert_eq!(schema.get(2003, 66).unwrap().name, "Set Event Flag");
    }

    #[test]
    fn lookup_returns_ordered_arguments() {
        let schema = InstructionSchema::new(vec![set_flag()]).unwrap();
        let args = schema.arguments_for(2003, 66).unwrap();
        let types: Vec<_> = args.iter().map(|a| a.arg_type().unwrap()).collect();
        assert_eq!(types, vec![ArgType::U8, ArgType::U32, ArgType::U8]);
    }

    #[test]
    fn lookup_miss() {
        let schema = InstructionSchema::new(vec![set_flag()]).unwrap();
        assert!(schema.arguments_for(2003, 67).is_none());
        assert!(schema.arguments_for(66, 2003).is_none());
    }

    #[test]
    fn schema_rejects_duplicate_instruction() {
        let err = InstructionSchema::new(vec![set_flag(), set_flag()]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateInstruction {
                class_id: 2003,
                instruction_id: 66
            }
        );
    }

    #[test]
    fn schema_rejects_unknown_type_tag() {
        let def = InstructionDef::new(1, 2, "Odd").arg(ArgDescriptor::with_tag("x", 7));
        let err = InstructionSchema::new(vec![def]).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnsupportedArgType {
                index: 0,
                tag: 7,
                ..
            }
        ));
    }

    #[test]
    fn schema_rejects_inverted_bounds() {
        let def = InstructionDef::new(1, 2, "Odd")
            .arg(ArgDescriptor::new("x", ArgType::I32).bounds(5.0, -5.0));
        let err = InstructionSchema::new(vec![def]).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidBounds { index: 0, .. }));
    }

    #[test]
    fn empty_schema() {
        let schema = InstructionSchema::builder().build().unwrap();
        assert!(schema.is_empty());
        assert!(schema.arguments_for(0, 0).is_none());
    }
}
