//! Binary word stream access for SPIR-V modules.
//!
//! This layer turns byte slices into decoded instructions and back. It knows
//! nothing about module structure; the [`InstructionSink`] callback contract
//! hands each decoded instruction to the module layer, which owns layout and
//! id validation.

pub mod io;
pub mod parser;

pub use io::Endianness;
pub use parser::{Header, InstructionSink, Parser, MAGIC};
