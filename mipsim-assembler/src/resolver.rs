//! Pass 2, stages A and B: correct the symbol table for pseudo expansion
//! lengths, execute directives against memory, resolve labels, and flatten
//! the line stream down to typed instructions.

use crate::directives::{Directive, DirectiveKind};
use crate::error::AssemblerError;
use crate::expander;
use crate::lexer::Line;
use crate::symbols::{LocationCounters, Segment, SymbolTable};
use crate::tokenizer::{self, Operand, Value};
use either::Either;
use mipsim_types::Memory;

/// A fully numeric instruction argument.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Arg {
    Register(u8),
    Value(i64),
}

/// An instruction whose operands are all numeric: registers are canonical
/// indices and every label has been substituted with its address. Memory
/// operands are flattened to the `rt base offset` argument order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResolvedInstruction {
    pub operation: String,
    pub args: Vec<Arg>,
    pub line: usize,
}

impl ResolvedInstruction {
    pub fn new(operation: impl Into<String>, args: Vec<Arg>, line: usize) -> Self {
        Self {
            operation: operation.into(),
            args,
            line,
        }
    }

    pub fn arg(&self, index: usize) -> Result<Arg, AssemblerError> {
        self.args
            .get(index)
            .copied()
            .ok_or_else(|| self.shape_error())
    }

    pub fn reg(&self, index: usize) -> Result<u8, AssemblerError> {
        match self.arg(index)? {
            Arg::Register(register) => Ok(register),
            Arg::Value(_) => Err(self.shape_error()),
        }
    }

    pub fn val(&self, index: usize) -> Result<i64, AssemblerError> {
        match self.arg(index)? {
            Arg::Value(value) => Ok(value),
            Arg::Register(_) => Err(self.shape_error()),
        }
    }

    fn shape_error(&self) -> AssemblerError {
        AssemblerError::InstructionSyntax {
            line: self.line,
            text: format!("{} {:?}", self.operation, self.args),
        }
    }
}

/// The number of bytes a line occupies in the final, post-expansion layout.
fn final_size(line: &Line, counter: u32) -> Result<u32, AssemblerError> {
    if line.label().is_some() {
        return Ok(0);
    }
    if line.is_directive() {
        let directive = Directive::parse(line)?;
        return match directive.kind {
            DirectiveKind::Text | DirectiveKind::Data => Ok(0),
            _ => directive.forward_offset(counter),
        };
    }
    match expander::expansion_word_count(&line.mnemonic) {
        Some(words) => Ok(4 * words as u32),
        None => Ok(4),
    }
}

/// Stage A: walk the stream with final-layout counters and move every
/// label to the address it has once pseudo instructions occupy their
/// expanded lengths. Labels defined after a growing pseudo shift forward;
/// the reserved segment entries never move.
pub fn fixup_symbols(lines: &[Line], table: &mut SymbolTable) -> Result<(), AssemblerError> {
    let mut counters = LocationCounters::new(table);

    for line in lines {
        if let Some(label) = line.label() {
            table.assign(label, counters.current());
            continue;
        }

        if line.is_directive() {
            match Directive::parse(line)?.kind {
                DirectiveKind::Text => {
                    counters.segment = Segment::Text;
                    continue;
                }
                DirectiveKind::Data => {
                    counters.segment = Segment::Data;
                    continue;
                }
                _ => {}
            }
        }

        let bytes = final_size(line, counters.current())?;
        counters.advance(bytes);
    }

    Ok(())
}

/// Stage B: execute directives against memory at their recorded addresses,
/// substitute labels, de-alias registers, and drop label and directive
/// lines. The output still contains pseudo mnemonics; stage C expands them.
pub fn resolve(
    lines: &[Line],
    table: &SymbolTable,
    memory: &mut Memory,
) -> Result<Vec<ResolvedInstruction>, AssemblerError> {
    let mut counters = LocationCounters::new(table);
    let mut program = Vec::new();

    for line in lines {
        if line.label().is_some() {
            continue;
        }

        if line.is_directive() {
            let directive = Directive::parse(line)?;
            match directive.kind {
                DirectiveKind::Text => counters.segment = Segment::Text,
                DirectiveKind::Data => counters.segment = Segment::Data,
                _ => {
                    let address = counters.current();
                    directive.execute(address, memory)?;
                    counters.advance(directive.forward_offset(address)?);
                }
            }
            continue;
        }

        let source = tokenizer::tokenize(line)?;
        let mut args = Vec::with_capacity(source.operands.len() + 1);

        for operand in &source.operands {
            match operand {
                Operand::Register(register) => args.push(Arg::Register(register.0)),
                Operand::Immediate(value) => {
                    args.push(Arg::Value(resolve_value(value, table, line)?))
                }
                Operand::Memory { offset, base } => {
                    args.push(Arg::Register(base.0));
                    args.push(Arg::Value(resolve_value(offset, table, line)?));
                }
            }
        }

        program.push(ResolvedInstruction::new(source.operation, args, line.num));
        counters.advance(final_size(line, counters.current())?);
    }

    Ok(program)
}

fn resolve_value(
    value: &Value,
    table: &SymbolTable,
    line: &Line,
) -> Result<i64, AssemblerError> {
    match value {
        Either::Left(number) => Ok(*number),
        Either::Right(label) => table
            .lookup(label)
            .map(|address| address as i64)
            .ok_or_else(|| AssemblerError::UnknownLabel {
                line: line.num,
                label: label.clone(),
            }),
    }
}
