//! A two-pass assembler for the MIPS-I core integer instruction set.
//!
//! Source text goes through normalization, validation, a symbol-building
//! first pass, and a resolving second pass (directive execution, label
//! substitution, pseudo expansion) before each real instruction is encoded
//! into a 32-bit word and loaded into the memory image.

pub mod directives;
pub mod encoder;
pub mod error;
pub mod expander;
pub mod isa;
pub mod lexer;
pub mod resolver;
pub mod symbols;
pub mod tokenizer;
pub mod validator;

pub use error::AssemblerError;

use mipsim_types::constants::{DATA_BASE, TEXT_BASE};
use mipsim_types::Memory;
use symbols::SymbolTable;

/// Assembler context: the memory image it targets and the configurable
/// data-segment base.
pub struct Assembler<'m> {
    memory: &'m mut Memory,
    data_base: u32,
    text_words: usize,
}

impl<'m> Assembler<'m> {
    pub fn new(memory: &'m mut Memory) -> Self {
        Self {
            memory,
            data_base: DATA_BASE,
            text_words: 0,
        }
    }

    /// Override the data segment base (the reserved `.data` symbol).
    pub fn with_data_base(mut self, data_base: u32) -> Self {
        self.data_base = data_base;
        self
    }

    /// Assemble `source`, writing encoded text into memory starting at
    /// `base_address` and `.data` initializers into the data segment.
    /// Returns `base_address`.
    pub fn assemble(&mut self, source: &str, base_address: u32) -> Result<u32, AssemblerError> {
        let lines = lexer::normalize(source)?;
        validator::validate(&lines)?;

        let mut table = SymbolTable::new(TEXT_BASE, self.data_base);
        symbols::build(&lines, &mut table)?;
        resolver::fixup_symbols(&lines, &mut table)?;

        let program = resolver::resolve(&lines, &table, self.memory)?;
        let program = expander::expand_program(program)?;

        log::debug!(
            "assembled {} lines into {} instructions",
            lines.len(),
            program.len()
        );

        let mut address = base_address;
        for instruction in &program {
            let word = encoder::encode(instruction)?;
            self.memory
                .write(address, &word.to_le_bytes())
                .map_err(|source| AssemblerError::Memory {
                    line: instruction.line,
                    source,
                })?;
            address += 4;
        }

        self.text_words = program.len();
        Ok(base_address)
    }

    /// Number of instruction words loaded by the most recent
    /// [`assemble`](Self::assemble) call.
    pub fn text_words(&self) -> usize {
        self.text_words
    }
}

/// Assemble `source` into `memory` with the default data base. Returns the
/// base address the text was loaded at.
pub fn assemble(source: &str, base_address: u32, memory: &mut Memory) -> Result<u32, AssemblerError> {
    Assembler::new(memory).assemble(source, base_address)
}
