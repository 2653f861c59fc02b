//! Deterministic schema hashing.

use blake3::Hasher;

use crate::InstructionSchema;

/// Computes a deterministic fingerprint of a schema.
///
/// Covers instruction keys, declaration order and argument type tags, i.e.
/// everything that changes how argument blobs are laid out. Names and other
/// descriptor metadata are excluded.
#[must_use]
pub fn schema_hash(schema: &InstructionSchema) -> u64 {
    let mut hasher = Hasher::new();
    write_u32(&mut hasher, schema.len() as u32);

    for def in schema.instructions() {
        write_u32(&mut hasher, def.class_id);
        write_u32(&mut hasher, def.instruction_id);
        write_u32(&mut hasher, def.args.len() as u32);

        for arg in &def.args {
            write_u32(&mut hasher, arg.type_tag);
        }
    }

    let hash = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(prefix)
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}
