//! Serializing a module back to its binary form.
//!
//! Emission is the inverse of loading: header words, then every live
//! instruction in layout order. A module loaded and emitted without
//! modification reproduces the original words exactly; tombstoned slots are
//! simply skipped.

use crate::file::io::words_to_bytes;
use crate::file::MAGIC;
use crate::module::{Module, SECTION_ORDER};

/// Serializes the module to words in its stored endianness-independent form.
///
/// The returned words are plain integers; use [`emit_bytes`] for the byte
/// encoding in the module's original byte order.
#[must_use]
pub fn emit_words(module: &Module) -> Vec<u32> {
    let mut words = Vec::new();
    let (major, minor) = module.version();
    words.push(MAGIC);
    words.push((u32::from(major) << 16) | (u32::from(minor) << 8));
    words.push(module.generator());
    words.push(module.id_bound());
    words.push(module.schema());

    for section in SECTION_ORDER {
        for inst in module.section(section) {
            module.inst(inst).encode(&mut words);
        }
    }

    for function in module.functions() {
        if !module.is_live(function.def()) {
            continue;
        }
        module.inst(function.def()).encode(&mut words);
        for inst in function.header(module) {
            module.inst(inst).encode(&mut words);
        }
        for block in function.blocks() {
            if module.is_live(block.label()) {
                module.inst(block.label()).encode(&mut words);
            }
            for inst in block.instructions(module) {
                module.inst(inst).encode(&mut words);
            }
        }
        module.inst(function.end()).encode(&mut words);
    }

    words
}

/// Serializes the module to bytes in its original byte order.
#[must_use]
pub fn emit_bytes(module: &Module) -> Vec<u8> {
    words_to_bytes(&emit_words(module), module.endian())
}
