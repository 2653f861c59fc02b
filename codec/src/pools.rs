//! Accumulation pools for the two-pass writer.

use std::collections::HashMap;

use bytestream::ByteWriter;
use layout::Variant;

use crate::model::{Event, Instruction, Layer, Parameter};

/// Argument blobs start on this boundary within the argument pool.
pub(crate) const ARGUMENT_ALIGN: usize = 4;

/// Flat tables built while the event section is written.
///
/// Events append their instructions and parameters in document order, so a
/// record's offset is simply the pool length at the time it was appended.
/// A fresh set of pools is built for every encode call.
#[derive(Debug, Default)]
pub(crate) struct WritePools<'d> {
    pub(crate) instructions: Vec<&'d Instruction>,
    pub(crate) parameters: Vec<&'d Parameter>,
    layers: Vec<Layer>,
    layer_index: HashMap<u32, usize>,
    pub(crate) arguments: ByteWriter,
    pub(crate) strings: ByteWriter,
}

impl<'d> WritePools<'d> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Byte offset the next appended instruction will have in its table.
    pub(crate) fn next_instruction_offset(&self, variant: Variant) -> u64 {
        (self.instructions.len() * variant.instruction_size()) as u64
    }

    /// Byte offset the next appended parameter will have in its table.
    pub(crate) fn next_parameter_offset(&self, variant: Variant) -> u64 {
        (self.parameters.len() * variant.parameter_size()) as u64
    }

    /// Appends an event's instructions and parameters.
    pub(crate) fn append_event(&mut self, event: &'d Event) {
        self.instructions.extend(event.instructions.iter());
        self.parameters.extend(event.parameters.iter());
    }

    /// Returns the layer table offset of `layer`, adding it on first use.
    pub(crate) fn layer_offset(&mut self, layer: Layer, variant: Variant) -> u64 {
        let index = *self
            .layer_index
            .entry(layer.layer_number)
            .or_insert_with(|| {
                self.layers.push(layer);
                self.layers.len() - 1
            });
        (index * variant.layer_size()) as u64
    }

    /// Aligns the argument pool for the next blob and returns its offset.
    pub(crate) fn begin_arguments(&mut self) -> usize {
        self.arguments.pad_to(ARGUMENT_ALIGN);
        self.arguments.position()
    }

    pub(crate) fn layers(&self) -> &[Layer] {
        &self.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_append_order() {
        let first = Event::new(0)
            .instruction(Instruction::new(1, 0))
            .instruction(Instruction::new(1, 1))
            .parameter(Parameter::new(0, 0, 0, 4));
        let second = Event::new(1).instruction(Instruction::new(1, 2));

        let mut pools = WritePools::new();
        assert_eq!(pools.next_instruction_offset(Variant::Beta), 0);
        pools.append_event(&first);
        assert_eq!(pools.next_instruction_offset(Variant::Beta), 64);
        assert_eq!(pools.next_parameter_offset(Variant::Alpha), 20);
        pools.append_event(&second);
        assert_eq!(pools.next_instruction_offset(Variant::Alpha), 72);
        assert_eq!(pools.instructions[2].instruction_id, 2);
    }

    #[test]
    fn layers_are_shared_by_number() {
        let mut pools = WritePools::new();
        assert_eq!(pools.layer_offset(Layer::new(5), Variant::Alpha), 0);
        assert_eq!(pools.layer_offset(Layer::new(9), Variant::Alpha), 20);
        assert_eq!(pools.layer_offset(Layer::new(5), Variant::Alpha), 0);
        assert_eq!(pools.layers(), &[Layer::new(5), Layer::new(9)]);
    }

    #[test]
    fn argument_blobs_start_aligned() {
        let mut pools = WritePools::new();
        assert_eq!(pools.begin_arguments(), 0);
        pools.arguments.write_u8(1);
        assert_eq!(pools.begin_arguments(), 4);
        pools.arguments.write_u32(1);
        assert_eq!(pools.begin_arguments(), 8);
    }
}
