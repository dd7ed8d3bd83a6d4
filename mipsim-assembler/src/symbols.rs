//! The symbol table and the first assembler pass that populates it.

use crate::directives::{Directive, DirectiveKind};
use crate::error::AssemblerError;
use crate::lexer::Line;
use std::collections::HashMap;

/// Reserved entry naming the text segment base.
pub const TEXT_SYMBOL: &str = ".text";
/// Reserved entry naming the data segment base.
pub const DATA_SYMBOL: &str = ".data";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Segment {
    Text,
    Data,
}

/// Flat mapping from label name to absolute address. The reserved segment
/// entries are installed at construction and are never redefined.
#[derive(Debug)]
pub struct SymbolTable {
    map: HashMap<String, u32>,
}

impl SymbolTable {
    pub fn new(text_base: u32, data_base: u32) -> Self {
        let mut map = HashMap::new();
        map.insert(TEXT_SYMBOL.to_string(), text_base);
        map.insert(DATA_SYMBOL.to_string(), data_base);
        Self { map }
    }

    pub fn text_base(&self) -> u32 {
        self.map[TEXT_SYMBOL]
    }

    pub fn data_base(&self) -> u32 {
        self.map[DATA_SYMBOL]
    }

    /// Insert a new label. Redefining any existing entry, reserved ones
    /// included, is an error.
    pub fn define(&mut self, label: &str, address: u32, line: usize) -> Result<(), AssemblerError> {
        if self.map.contains_key(label) {
            return Err(AssemblerError::DuplicateLabel {
                line,
                label: label.to_string(),
            });
        }
        self.map.insert(label.to_string(), address);
        Ok(())
    }

    /// Overwrite a label's address during the pass-2 layout fixup.
    pub fn assign(&mut self, label: &str, address: u32) {
        self.map.insert(label.to_string(), address);
    }

    pub fn lookup(&self, label: &str) -> Option<u32> {
        self.map.get(label).copied()
    }

    /// Which segment an address falls in, judged against the data base.
    pub fn segment_of(&self, address: u32) -> Segment {
        if address < self.data_base() {
            Segment::Text
        } else {
            Segment::Data
        }
    }
}

/// Tracks the two location counters and the active segment during a walk
/// over the line stream.
pub struct LocationCounters {
    pub text: u32,
    pub data: u32,
    pub segment: Segment,
}

impl LocationCounters {
    pub fn new(table: &SymbolTable) -> Self {
        Self {
            text: table.text_base(),
            data: table.data_base(),
            segment: Segment::Text,
        }
    }

    pub fn current(&self) -> u32 {
        match self.segment {
            Segment::Text => self.text,
            Segment::Data => self.data,
        }
    }

    pub fn advance(&mut self, bytes: u32) {
        match self.segment {
            Segment::Text => self.text += bytes,
            Segment::Data => self.data += bytes,
        }
    }
}

/// Pass 1: record every label at the active location counter. Pseudo
/// instructions are charged four bytes here; pass 2 corrects the layout
/// once expansion lengths are known.
pub fn build(lines: &[Line], table: &mut SymbolTable) -> Result<(), AssemblerError> {
    let mut counters = LocationCounters::new(table);

    for line in lines {
        if let Some(label) = line.label() {
            table.define(label, counters.current(), line.num)?;
        } else if line.is_directive() {
            let directive = Directive::parse(line)?;
            match directive.kind {
                DirectiveKind::Text => counters.segment = Segment::Text,
                DirectiveKind::Data => counters.segment = Segment::Data,
                _ => {
                    let bytes = directive.forward_offset(counters.current())?;
                    counters.advance(bytes);
                }
            }
        } else {
            counters.advance(4);
        }
    }

    Ok(())
}
