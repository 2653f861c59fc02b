//! In-memory document model.
//!
//! The model is tree-shaped: a document owns its events, and each event owns
//! its instructions and parameters. Table offsets never appear here; they are
//! resolved on decode and recomputed from append order on encode.

use layout::{DecodeWarning, Variant};

use crate::types::{ArgValue, BonfireHandler};

/// A decoded event-script file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub variant: Variant,
    pub events: Vec<Event>,
    pub linked_files: Vec<LinkedFile>,
}

impl Document {
    /// Creates an empty document for a variant.
    #[must_use]
    pub const fn new(variant: Variant) -> Self {
        Self {
            variant,
            events: Vec::new(),
            linked_files: Vec::new(),
        }
    }

    /// Returns the first event with the given id.
    #[must_use]
    pub fn event(&self, id: u64) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Returns the first event with the given id, mutably.
    pub fn event_mut(&mut self, id: u64) -> Option<&mut Event> {
        self.events.iter_mut().find(|event| event.id == id)
    }

    /// Returns the total number of instructions across all events.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.events.iter().map(|event| event.instructions.len()).sum()
    }
}

/// One event: an ordered instruction list plus its parameter patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: u64,
    pub bonfire_handler: BonfireHandler,
    pub instructions: Vec<Instruction>,
    pub parameters: Vec<Parameter>,
}

impl Event {
    /// Creates an empty event with the `Normal` bonfire handler.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self {
            id,
            bonfire_handler: BonfireHandler::Normal,
            instructions: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Sets the bonfire handler.
    #[must_use]
    pub fn with_bonfire_handler(mut self, handler: BonfireHandler) -> Self {
        self.bonfire_handler = handler;
        self
    }

    /// Appends an instruction.
    #[must_use]
    pub fn instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// One instruction call.
///
/// `(class_id, instruction_id)` keys the schema entry that gives the argument
/// layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub class_id: u32,
    pub instruction_id: u32,
    pub arguments: Vec<ArgValue>,
    pub layer: Option<Layer>,
}

impl Instruction {
    /// Creates an instruction with no arguments and no layer.
    #[must_use]
    pub const fn new(class_id: u32, instruction_id: u32) -> Self {
        Self {
            class_id,
            instruction_id,
            arguments: Vec::new(),
            layer: None,
        }
    }

    /// Sets the arguments.
    #[must_use]
    pub fn with_arguments(mut self, arguments: Vec<ArgValue>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Sets the layer.
    #[must_use]
    pub fn with_layer(mut self, layer_number: u32) -> Self {
        self.layer = Some(Layer::new(layer_number));
        self
    }
}

/// A layer reference. Instructions share layers by number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Layer {
    pub layer_number: u32,
}

impl Layer {
    #[must_use]
    pub const fn new(layer_number: u32) -> Self {
        Self { layer_number }
    }
}

/// A byte-range patch applied to an instruction's arguments when the event
/// is called from another event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// Index into the owning event's instruction list.
    pub instruction_number: u64,
    pub destination_start_byte: u64,
    pub source_start_byte: u64,
    pub length: u64,
}

impl Parameter {
    #[must_use]
    pub const fn new(
        instruction_number: u64,
        destination_start_byte: u64,
        source_start_byte: u64,
        length: u64,
    ) -> Self {
        Self {
            instruction_number,
            destination_start_byte,
            source_start_byte,
            length,
        }
    }
}

/// A file linked by name from the string pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkedFile {
    pub name: String,
}

impl LinkedFile {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A decoded document together with the non-fatal warnings raised on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub document: Document,
    pub warnings: Vec<DecodeWarning>,
}
