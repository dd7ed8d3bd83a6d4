//! Pass 2, stage C: rewrite pseudo-instructions into real instructions.
//!
//! Expansion runs after resolution, so every argument reaching this table
//! is already numeric. `abs` emits a `bge`, which is itself a pseudo; a
//! second flattening walk turns it real, and anything still pseudo after
//! that is an error.

use crate::error::AssemblerError;
use crate::isa;
use crate::resolver::{Arg, ResolvedInstruction};
use mipsim_types::constants::{REG_AT, REG_ZERO};

/// How many real instructions a pseudo mnemonic becomes once fully
/// flattened. `None` for real instructions.
pub fn expansion_word_count(mnemonic: &str) -> Option<usize> {
    let words = match mnemonic {
        "neg" | "negu" | "not" | "move" | "beqz" | "sgt" => 1,
        "li" | "la" | "blt" | "bgt" | "ble" | "bge" | "sge" => 2,
        // sub + (bge -> slt, beq) + sub
        "abs" => 4,
        _ => return None,
    };
    Some(words)
}

/// Expand every pseudo in the program, flattening nested expansions.
pub fn expand_program(
    program: Vec<ResolvedInstruction>,
) -> Result<Vec<ResolvedInstruction>, AssemblerError> {
    let mut current = program;

    for _ in 0..2 {
        if !current.iter().any(isa_pseudo) {
            return Ok(current);
        }

        let mut next = Vec::with_capacity(current.len());
        for instruction in current {
            match expand_one(&instruction)? {
                Some(expansion) => next.extend(expansion),
                None => next.push(instruction),
            }
        }
        current = next;
    }

    match current.iter().find(|i| isa_pseudo(i)) {
        Some(stuck) => Err(AssemblerError::InstructionSyntax {
            line: stuck.line,
            text: format!("pseudo-instruction '{}' did not fully expand", stuck.operation),
        }),
        None => Ok(current),
    }
}

fn isa_pseudo(instruction: &ResolvedInstruction) -> bool {
    isa::is_pseudo(&instruction.operation)
}

fn at() -> Arg {
    Arg::Register(REG_AT)
}

fn zero() -> Arg {
    Arg::Register(REG_ZERO)
}

/// One level of the fixed expansion table. Returns `None` for real
/// instructions.
fn expand_one(
    ins: &ResolvedInstruction,
) -> Result<Option<Vec<ResolvedInstruction>>, AssemblerError> {
    let line = ins.line;
    let emit = |operation: &str, args: Vec<Arg>| ResolvedInstruction::new(operation, args, line);

    let expansion = match ins.operation.as_str() {
        "abs" => {
            let (dst, src) = (ins.arg(0)?, ins.arg(1)?);
            vec![
                emit("sub", vec![dst, zero(), src]),
                emit("bge", vec![src, zero(), Arg::Value(1)]),
                emit("sub", vec![dst, zero(), src]),
            ]
        }
        "neg" => vec![emit("sub", vec![ins.arg(0)?, zero(), ins.arg(1)?])],
        "negu" => vec![emit("subu", vec![ins.arg(0)?, zero(), ins.arg(1)?])],
        "not" => vec![emit("nor", vec![ins.arg(0)?, ins.arg(1)?, zero()])],
        "move" => vec![emit("add", vec![ins.arg(0)?, zero(), ins.arg(1)?])],
        "li" | "la" => {
            let dst = ins.arg(0)?;
            let value = ins.val(1)?;
            vec![
                emit("lui", vec![dst, Arg::Value((value >> 16) & 0xFFFF)]),
                emit("ori", vec![dst, dst, Arg::Value(value & 0xFFFF)]),
            ]
        }
        "blt" => vec![
            emit("slt", vec![at(), ins.arg(0)?, ins.arg(1)?]),
            emit("bne", vec![at(), zero(), ins.arg(2)?]),
        ],
        "bgt" => vec![
            emit("slt", vec![at(), ins.arg(1)?, ins.arg(0)?]),
            emit("bne", vec![at(), zero(), ins.arg(2)?]),
        ],
        "ble" => vec![
            emit("slt", vec![at(), ins.arg(1)?, ins.arg(0)?]),
            emit("beq", vec![at(), zero(), ins.arg(2)?]),
        ],
        "bge" => vec![
            emit("slt", vec![at(), ins.arg(1)?, ins.arg(0)?]),
            emit("beq", vec![at(), zero(), ins.arg(2)?]),
        ],
        "beqz" => vec![emit("beq", vec![ins.arg(0)?, zero(), ins.arg(1)?])],
        "sge" => vec![
            emit("slt", vec![at(), ins.arg(2)?, ins.arg(1)?]),
            emit("xori", vec![ins.arg(0)?, at(), Arg::Value(1)]),
        ],
        "sgt" => vec![emit("slt", vec![ins.arg(0)?, ins.arg(2)?, ins.arg(1)?])],
        _ => return Ok(None),
    };

    Ok(Some(expansion))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pseudo(operation: &str, args: Vec<Arg>) -> ResolvedInstruction {
        ResolvedInstruction::new(operation, args, 1)
    }

    fn expanded(operation: &str, args: Vec<Arg>) -> Vec<ResolvedInstruction> {
        expand_program(vec![pseudo(operation, args)]).unwrap()
    }

    #[test]
    fn li_splits_the_immediate() {
        let out = expanded("li", vec![Arg::Register(8), Arg::Value(0x12345678)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].operation, "lui");
        assert_eq!(out[0].args, vec![Arg::Register(8), Arg::Value(0x1234)]);
        assert_eq!(out[1].operation, "ori");
        assert_eq!(
            out[1].args,
            vec![Arg::Register(8), Arg::Register(8), Arg::Value(0x5678)]
        );
    }

    #[test]
    fn branches_compare_through_the_assembler_temporary() {
        let out = expanded(
            "blt",
            vec![Arg::Register(8), Arg::Register(9), Arg::Value(0x40)],
        );
        assert_eq!(out[0].operation, "slt");
        assert_eq!(
            out[0].args,
            vec![Arg::Register(1), Arg::Register(8), Arg::Register(9)]
        );
        assert_eq!(out[1].operation, "bne");
        assert_eq!(
            out[1].args,
            vec![Arg::Register(1), Arg::Register(0), Arg::Value(0x40)]
        );
    }

    #[test]
    fn abs_flattens_its_nested_branch() {
        let out = expanded("abs", vec![Arg::Register(8), Arg::Register(9)]);
        let ops: Vec<&str> = out.iter().map(|i| i.operation.as_str()).collect();
        assert_eq!(ops, vec!["sub", "slt", "beq", "sub"]);
    }

    #[test]
    fn counts_match_actual_expansions() {
        let reg = Arg::Register(8);
        let val = Arg::Value(4);
        let samples: Vec<(&str, Vec<Arg>)> = vec![
            ("abs", vec![reg, Arg::Register(9)]),
            ("blt", vec![reg, Arg::Register(9), val]),
            ("bgt", vec![reg, Arg::Register(9), val]),
            ("ble", vec![reg, Arg::Register(9), val]),
            ("bge", vec![reg, Arg::Register(9), val]),
            ("beqz", vec![reg, val]),
            ("neg", vec![reg, Arg::Register(9)]),
            ("negu", vec![reg, Arg::Register(9)]),
            ("not", vec![reg, Arg::Register(9)]),
            ("li", vec![reg, val]),
            ("la", vec![reg, val]),
            ("move", vec![reg, Arg::Register(9)]),
            ("sge", vec![reg, Arg::Register(9), Arg::Register(10)]),
            ("sgt", vec![reg, Arg::Register(9), Arg::Register(10)]),
        ];

        for (operation, args) in samples {
            let out = expanded(operation, args);
            assert_eq!(
                out.len(),
                expansion_word_count(operation).unwrap(),
                "word count mismatch for {}",
                operation
            );
            assert!(out.iter().all(|i| !isa_pseudo(i)));
        }
    }

    #[test]
    fn zero_is_never_an_expansion_destination() {
        let cases = vec![
            expanded("li", vec![Arg::Register(8), Arg::Value(3)]),
            expanded("abs", vec![Arg::Register(8), Arg::Register(9)]),
            expanded("sge", vec![Arg::Register(8), Arg::Register(9), Arg::Register(10)]),
        ];
        for out in cases {
            for ins in out {
                if let Some(Arg::Register(dst)) = ins.args.first() {
                    assert_ne!(*dst, 0, "{} writes $0", ins.operation);
                }
            }
        }
    }

    #[test]
    fn real_instructions_pass_through() {
        let real = pseudo("add", vec![Arg::Register(1), Arg::Register(2), Arg::Register(3)]);
        let out = expand_program(vec![real.clone()]).unwrap();
        assert_eq!(out, vec![real]);
    }
}
