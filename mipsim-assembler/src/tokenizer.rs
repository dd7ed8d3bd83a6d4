//! Operand tokenizer: one normalized instruction line into a mnemonic and
//! typed operands.

use crate::error::AssemblerError;
use crate::lexer::Line;
use either::Either;
use mipsim_types::constants::REGISTER_NAMES;

/// A register reference, canonical index 0..=31.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Register(pub u8);

impl Register {
    /// Parse `$N` or an ABI alias such as `$t0`. Returns `None` for
    /// anything that is not a recognized register.
    pub fn parse(token: &str) -> Option<Register> {
        let name = token.strip_prefix('$')?;

        if let Ok(index) = name.parse::<u8>() {
            return if index < 32 { Some(Register(index)) } else { None };
        }

        REGISTER_NAMES
            .iter()
            .position(|&alias| &alias[1..] == name)
            .map(|index| Register(index as u8))
    }
}

/// An integer literal or a not-yet-resolved label name.
pub type Value = Either<i64, String>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Operand {
    Register(Register),
    Immediate(Value),
    Memory { offset: Value, base: Register },
}

/// A tokenized instruction, prior to label resolution.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SourceInstruction {
    pub operation: String,
    pub operands: Vec<Operand>,
}

/// Parse an integer literal: decimal, `0x` hex, or `0b` binary, with an
/// optional leading sign.
pub fn parse_int(token: &str) -> Option<i64> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };

    let value = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        i64::from_str_radix(bin, 2).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };

    Some(if negative { -value } else { value })
}

/// Tokenize one instruction line into `{ operation, operands }`.
pub fn tokenize(line: &Line) -> Result<SourceInstruction, AssemblerError> {
    let mut operands = Vec::with_capacity(line.args.len());

    for arg in &line.args {
        operands.push(classify(arg, line)?);
    }

    Ok(SourceInstruction {
        operation: line.mnemonic.clone(),
        operands,
    })
}

fn syntax_error(line: &Line) -> AssemblerError {
    AssemblerError::InstructionSyntax {
        line: line.num,
        text: line.text(),
    }
}

fn classify(arg: &str, line: &Line) -> Result<Operand, AssemblerError> {
    if let Some(open) = arg.find('(') {
        return memory_operand(arg, open, line);
    }

    if arg.starts_with('$') {
        return Register::parse(arg)
            .map(Operand::Register)
            .ok_or_else(|| syntax_error(line));
    }

    Ok(Operand::Immediate(value_of(arg)))
}

/// Split `offset(base)` at the opening parenthesis. An empty offset means
/// 0; the base must be a register.
fn memory_operand(arg: &str, open: usize, line: &Line) -> Result<Operand, AssemblerError> {
    let close = arg.rfind(')').filter(|&close| close > open && arg[close + 1..].trim().is_empty());
    let close = close.ok_or_else(|| syntax_error(line))?;

    let offset_text = arg[..open].trim();
    let base_text = arg[open + 1..close].trim();

    if !base_text.starts_with('$') {
        return Err(syntax_error(line));
    }
    let base = Register::parse(base_text).ok_or_else(|| syntax_error(line))?;

    let offset = if offset_text.is_empty() {
        Either::Left(0)
    } else {
        value_of(offset_text)
    };

    Ok(Operand::Memory { offset, base })
}

fn value_of(token: &str) -> Value {
    match parse_int(token) {
        Some(value) => Either::Left(value),
        None => Either::Right(token.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(mnemonic: &str, args: &[&str]) -> Line {
        Line {
            num: 1,
            mnemonic: mnemonic.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn registers_by_number_and_alias() {
        assert_eq!(Register::parse("$8"), Some(Register(8)));
        assert_eq!(Register::parse("$t0"), Some(Register(8)));
        assert_eq!(Register::parse("$zero"), Some(Register(0)));
        assert_eq!(Register::parse("$ra"), Some(Register(31)));
        assert_eq!(Register::parse("$32"), None);
        assert_eq!(Register::parse("$t99"), None);
        assert_eq!(Register::parse("t0"), None);
    }

    #[test]
    fn classifies_all_operand_kinds() {
        let ins = tokenize(&line("lw", &["$t0", "8($sp)"])).unwrap();
        assert_eq!(ins.operation, "lw");
        assert_eq!(
            ins.operands,
            vec![
                Operand::Register(Register(8)),
                Operand::Memory {
                    offset: Either::Left(8),
                    base: Register(29),
                },
            ]
        );

        let ins = tokenize(&line("beq", &["$t0", "$t1", "loop"])).unwrap();
        assert_eq!(
            ins.operands[2],
            Operand::Immediate(Either::Right("loop".to_string()))
        );

        let ins = tokenize(&line("addi", &["$t0", "$zero", "-5"])).unwrap();
        assert_eq!(ins.operands[2], Operand::Immediate(Either::Left(-5)));
    }

    #[test]
    fn label_offsets_and_empty_offsets() {
        let ins = tokenize(&line("lw", &["$t0", "msg($t1)"])).unwrap();
        assert_eq!(
            ins.operands[1],
            Operand::Memory {
                offset: Either::Right("msg".to_string()),
                base: Register(9),
            }
        );

        let ins = tokenize(&line("lw", &["$t0", "($t1)"])).unwrap();
        assert_eq!(
            ins.operands[1],
            Operand::Memory {
                offset: Either::Left(0),
                base: Register(9),
            }
        );
    }

    #[test]
    fn unmatched_parenthesis_is_rejected() {
        assert!(tokenize(&line("lw", &["$t0", "8($sp"])).is_err());
        assert!(tokenize(&line("lw", &["$t0", "8($sp)x"])).is_err());
    }

    #[test]
    fn unknown_register_is_rejected() {
        assert!(tokenize(&line("add", &["$bogus", "$t0", "$t1"])).is_err());
        assert!(tokenize(&line("lw", &["$t0", "8($bogus)"])).is_err());
    }

    #[test]
    fn integer_bases() {
        assert_eq!(parse_int("10"), Some(10));
        assert_eq!(parse_int("-10"), Some(-10));
        assert_eq!(parse_int("0x1234"), Some(0x1234));
        assert_eq!(parse_int("0b101"), Some(5));
        assert_eq!(parse_int("ten"), None);
    }
}
