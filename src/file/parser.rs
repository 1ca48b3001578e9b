//! SPIR-V word stream parsing.
//!
//! The [`Parser`] walks a binary word stream and hands decoded instructions to
//! an [`InstructionSink`] — the callback contract between the binary layer and
//! the module container. The parser owns framing and operand decoding; the
//! sink owns module layout and id rules.
//!
//! # Example
//!
//! ```rust,ignore
//! use spirscope::file::{Parser, InstructionSink};
//!
//! let mut loader = ModuleLoader::new(&options);
//! Parser::new(&bytes, options.target_env)?.parse_into(&mut loader)?;
//! let module = loader.finish()?;
//! ```

use crate::config::TargetEnv;
use crate::file::io::{words_from_bytes, Endianness};
use crate::spirv::{decode_string, Instruction, Opcode, Operand, OperandKind, Tail};
use crate::{Error, Id, Result};

/// The SPIR-V magic number, as read in the stream's own byte order.
pub const MAGIC: u32 = 0x0723_0203;

/// Decoded module header fields, streamed to the sink before any instruction.
#[derive(Debug, Clone, Copy)]
pub struct Header {
    /// SPIR-V version as `(major, minor)`.
    pub version: (u8, u8),
    /// The tool that generated the module (registered generator magic).
    pub generator: u32,
    /// Exclusive upper bound on all ids in the module.
    pub id_bound: u32,
    /// Reserved header word, preserved verbatim.
    pub schema: u32,
    /// Byte order the module was encoded in.
    pub endian: Endianness,
}

/// Receiver for parsed header fields and instructions.
///
/// Implementations may reject input by returning an error; parsing stops at
/// the first error.
pub trait InstructionSink {
    /// Called once with the decoded header before any instruction.
    fn header(&mut self, header: &Header) -> Result<()>;

    /// Called for each decoded instruction. `word_index` is the index of the
    /// instruction's first word in the stream, for diagnostics.
    fn instruction(&mut self, inst: Instruction, word_index: usize) -> Result<()>;
}

/// A streaming parser over a SPIR-V binary.
#[derive(Debug)]
pub struct Parser {
    words: Vec<u32>,
    header: Header,
}

impl Parser {
    /// Creates a parser over `bytes`, detecting endianness from the magic
    /// number and validating the header against `target_env`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBinary`] if the stream is too short, misaligned, or
    ///   the magic number is wrong in both byte orders.
    /// - [`Error::WrongVersion`] if the header version exceeds the target
    ///   environment.
    pub fn new(bytes: &[u8], target_env: TargetEnv) -> Result<Self> {
        if bytes.len() < 20 || bytes.len() % 4 != 0 {
            return Err(Error::InvalidBinary(format!(
                "stream of {} bytes cannot hold a module header",
                bytes.len()
            )));
        }

        let first = [bytes[0], bytes[1], bytes[2], bytes[3]];
        let endian = if Endianness::Little.word_from_bytes(first) == MAGIC {
            Endianness::Little
        } else if Endianness::Big.word_from_bytes(first) == MAGIC {
            Endianness::Big
        } else {
            return Err(Error::InvalidBinary("wrong magic number".to_string()));
        };

        let words = words_from_bytes(bytes, endian)?;
        let version_word = words[1];
        let version = (
            u8::try_from((version_word >> 16) & 0xFF).unwrap_or(u8::MAX),
            u8::try_from((version_word >> 8) & 0xFF).unwrap_or(u8::MAX),
        );
        if version > target_env.max_version() {
            return Err(Error::WrongVersion(version.0, version.1));
        }

        let header = Header {
            version,
            generator: words[2],
            id_bound: words[3],
            schema: words[4],
            endian,
        };

        Ok(Parser { words, header })
    }

    /// The decoded header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Parses the whole instruction stream into `sink`.
    ///
    /// # Errors
    ///
    /// Framing errors surface as [`Error::InvalidBinary`], undecodable
    /// operands as [`Error::InvalidData`] or [`Error::InvalidId`]; sink errors
    /// propagate unchanged.
    pub fn parse_into(&self, sink: &mut impl InstructionSink) -> Result<()> {
        sink.header(&self.header)?;

        let mut index = 5;
        while index < self.words.len() {
            let first = self.words[index];
            let word_count = (first >> 16) as usize;
            let opcode_value = u16::try_from(first & 0xFFFF).unwrap_or(u16::MAX);

            if word_count == 0 {
                return Err(Error::InvalidBinary(format!(
                    "zero word count at word {index}"
                )));
            }
            if index + word_count > self.words.len() {
                return Err(Error::InvalidBinary(format!(
                    "instruction at word {index} runs past the end of the stream"
                )));
            }

            let Some(opcode) = Opcode::from_u16(opcode_value) else {
                return Err(Error::InvalidData(format!(
                    "unsupported opcode {opcode_value} at word {index}"
                )));
            };

            let operand_words = &self.words[index + 1..index + word_count];
            let inst = decode_instruction(opcode, operand_words)?;
            sink.instruction(inst, index)?;

            index += word_count;
        }

        Ok(())
    }
}

/// Decodes one instruction's operand words against the opcode's signature.
fn decode_instruction(opcode: Opcode, words: &[u32]) -> Result<Instruction> {
    let signature = opcode.signature();
    let mut cursor = 0usize;

    let take_word = |cursor: &mut usize| -> Result<u32> {
        let word = words
            .get(*cursor)
            .copied()
            .ok_or_else(|| Error::InvalidData(format!("{opcode} is missing operand words")))?;
        *cursor += 1;
        Ok(word)
    };
    let take_id = |word: u32| Id::new(word).ok_or(Error::InvalidId(0));

    let type_id = if signature.has_result_type {
        Some(take_id(take_word(&mut cursor)?)?)
    } else {
        None
    };
    let result_id = if signature.has_result {
        Some(take_id(take_word(&mut cursor)?)?)
    } else {
        None
    };

    let mut operands = Vec::new();
    for &kind in signature.fixed {
        match kind {
            OperandKind::IdRef => {
                operands.push(Operand::IdRef(take_id(take_word(&mut cursor)?)?));
            }
            OperandKind::LiteralInt => operands.push(Operand::Literal32(take_word(&mut cursor)?)),
            OperandKind::ValueEnum => operands.push(Operand::Enum(take_word(&mut cursor)?)),
            OperandKind::LiteralString => {
                let (s, consumed) = decode_string(&words[cursor..]).ok_or_else(|| {
                    Error::InvalidData(format!("{opcode} carries a malformed string literal"))
                })?;
                cursor += consumed;
                operands.push(Operand::String(s));
            }
        }
    }

    let rest = &words[cursor..];
    match signature.tail {
        Tail::None => {
            if !rest.is_empty() {
                return Err(Error::InvalidData(format!(
                    "{opcode} carries {} unexpected trailing words",
                    rest.len()
                )));
            }
        }
        Tail::Ids => {
            for &word in rest {
                operands.push(Operand::IdRef(take_id(word)?));
            }
        }
        Tail::Literals => {
            for &word in rest {
                operands.push(Operand::Literal32(word));
            }
        }
        Tail::IdIdPairs | Tail::LiteralIdPairs | Tail::IdLiteralPairs => {
            if rest.len() % 2 != 0 {
                return Err(Error::InvalidData(format!(
                    "{opcode} pair list has odd length {}",
                    rest.len()
                )));
            }
            for pair in rest.chunks_exact(2) {
                match signature.tail {
                    Tail::IdIdPairs => {
                        operands.push(Operand::IdRef(take_id(pair[0])?));
                        operands.push(Operand::IdRef(take_id(pair[1])?));
                    }
                    Tail::LiteralIdPairs => {
                        operands.push(Operand::Literal32(pair[0]));
                        operands.push(Operand::IdRef(take_id(pair[1])?));
                    }
                    Tail::IdLiteralPairs => {
                        operands.push(Operand::IdRef(take_id(pair[0])?));
                        operands.push(Operand::Literal32(pair[1]));
                    }
                    _ => unreachable!(),
                }
            }
        }
    }

    Ok(Instruction::new(opcode, type_id, result_id, operands))
}
