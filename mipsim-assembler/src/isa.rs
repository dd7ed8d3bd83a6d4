//! Instruction metadata: format, codes, and operand arity for the MIPS-I
//! core integer set, plus the fixed pseudo-instruction table membership.

use mipsim_types::constants::*;

/// The three MIPS-I field layouts.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Format {
    R,
    I,
    J,
}

/// How the encoder packs an instruction's operands into fields.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Class {
    /// `rd, rs, rt` three-register arithmetic/logical/compare
    RArith,
    /// `rd, rt, shamt` shift by constant
    RShift,
    /// `rs` jump through register
    RJump,
    /// `rt, rs, imm16`
    IArith,
    /// `rt, offset(base)`, normalized to `rt base offset`
    ILoadStore,
    /// `rs, rt, offset` two-register branch
    IBranch2,
    /// `rs, offset` one-register branch; `rt` carries the selector
    IBranch1,
    /// `rt, imm16` load upper immediate
    IUpper,
    /// `target` jump
    Jump,
    /// opcode + funct only
    NoOperand,
}

#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    pub format: Format,
    pub class: Class,
    pub opcode: u8,
    /// R-type function code; 0 for other formats
    pub funct: u8,
    /// Fixed `rt` field for the one-register branches
    pub rt: u8,
    /// Number of source operands
    pub operands: usize,
}

impl OpInfo {
    const fn new(format: Format, class: Class, opcode: u8, funct: u8, rt: u8, operands: usize) -> Self {
        Self {
            format,
            class,
            opcode,
            funct,
            rt,
            operands,
        }
    }
}

const fn r_arith(funct: u8) -> OpInfo {
    OpInfo::new(Format::R, Class::RArith, OP_R_TYPE, funct, 0, 3)
}

const fn r_shift(funct: u8) -> OpInfo {
    OpInfo::new(Format::R, Class::RShift, OP_R_TYPE, funct, 0, 3)
}

const fn r_jump(funct: u8) -> OpInfo {
    OpInfo::new(Format::R, Class::RJump, OP_R_TYPE, funct, 0, 1)
}

const fn i_arith(opcode: u8) -> OpInfo {
    OpInfo::new(Format::I, Class::IArith, opcode, 0, 0, 3)
}

const fn i_mem(opcode: u8) -> OpInfo {
    OpInfo::new(Format::I, Class::ILoadStore, opcode, 0, 0, 2)
}

const fn i_branch2(opcode: u8) -> OpInfo {
    OpInfo::new(Format::I, Class::IBranch2, opcode, 0, 0, 3)
}

const fn i_branch1(opcode: u8, rt: u8) -> OpInfo {
    OpInfo::new(Format::I, Class::IBranch1, opcode, 0, rt, 2)
}

const fn no_operand(funct: u8) -> OpInfo {
    OpInfo::new(Format::R, Class::NoOperand, OP_R_TYPE, funct, 0, 0)
}

/// Metadata for a real (non-pseudo) mnemonic.
pub fn op_info(mnemonic: &str) -> Option<OpInfo> {
    let info = match mnemonic {
        "add" => r_arith(FUNCTION_ADD),
        "addu" => r_arith(FUNCTION_ADDU),
        "sub" => r_arith(FUNCTION_SUB),
        "subu" => r_arith(FUNCTION_SUBU),
        "and" => r_arith(FUNCTION_AND),
        "or" => r_arith(FUNCTION_OR),
        "xor" => r_arith(FUNCTION_XOR),
        "nor" => r_arith(FUNCTION_NOR),
        "slt" => r_arith(FUNCTION_SLT),
        "sltu" => r_arith(FUNCTION_SLTU),
        "sllv" => r_arith(FUNCTION_SLLV),
        "srlv" => r_arith(FUNCTION_SRLV),
        "srav" => r_arith(FUNCTION_SRAV),

        "sll" => r_shift(FUNCTION_SLL),
        "srl" => r_shift(FUNCTION_SRL),
        "sra" => r_shift(FUNCTION_SRA),

        "jr" => r_jump(FUNCTION_JR),
        "jalr" => r_jump(FUNCTION_JALR),

        "addi" => i_arith(OP_ADDI),
        "addiu" => i_arith(OP_ADDIU),
        "andi" => i_arith(OP_ANDI),
        "ori" => i_arith(OP_ORI),
        "xori" => i_arith(OP_XORI),
        "slti" => i_arith(OP_SLTI),
        "sltiu" => i_arith(OP_SLTIU),

        "lw" => i_mem(OP_LW),
        "lh" => i_mem(OP_LH),
        "lhu" => i_mem(OP_LHU),
        "lb" => i_mem(OP_LB),
        "lbu" => i_mem(OP_LBU),
        "ll" => i_mem(OP_LL),
        "sw" => i_mem(OP_SW),
        "sb" => i_mem(OP_SB),
        "sh" => i_mem(OP_SH),
        "sc" => i_mem(OP_SC),

        "beq" => i_branch2(OP_BEQ),
        "bne" => i_branch2(OP_BNE),

        "bgez" => i_branch1(OP_BCOND, RT_BGEZ),
        "bgezal" => i_branch1(OP_BCOND, RT_BGEZAL),
        "bltz" => i_branch1(OP_BCOND, RT_BLTZ),
        "bltzal" => i_branch1(OP_BCOND, RT_BLTZAL),
        "blez" => i_branch1(OP_BLEZ, 0),
        "bgtz" => i_branch1(OP_BGTZ, 0),

        "lui" => OpInfo::new(Format::I, Class::IUpper, OP_LUI, 0, 0, 2),

        "j" => OpInfo::new(Format::J, Class::Jump, OP_J, 0, 0, 1),
        "jal" => OpInfo::new(Format::J, Class::Jump, OP_JAL, 0, 0, 1),

        "nop" => no_operand(FUNCTION_SLL),
        "syscall" => no_operand(FUNCTION_SYSCALL),
        "break" => no_operand(FUNCTION_BREAK),

        _ => return None,
    };

    Some(info)
}

/// Operand arity of a pseudo-instruction mnemonic, or `None` if the
/// mnemonic is not in the fixed pseudo set.
pub fn pseudo_arity(mnemonic: &str) -> Option<usize> {
    match mnemonic {
        "abs" | "beqz" | "neg" | "negu" | "not" | "li" | "la" | "move" => Some(2),
        "blt" | "bgt" | "ble" | "bge" | "sge" | "sgt" => Some(3),
        _ => None,
    }
}

pub fn is_pseudo(mnemonic: &str) -> bool {
    pseudo_arity(mnemonic).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_the_mips_tables() {
        assert_eq!(op_info("add").unwrap().funct, 0x20);
        assert_eq!(op_info("addi").unwrap().opcode, 0x08);
        assert_eq!(op_info("lw").unwrap().opcode, 0x23);
        assert_eq!(op_info("beq").unwrap().opcode, 0x04);
        assert_eq!(op_info("bgezal").unwrap().rt, 0x11);
        assert_eq!(op_info("jal").unwrap().opcode, 0x03);
        assert!(op_info("mult").is_none());
    }

    #[test]
    fn pseudo_set_is_closed() {
        for mnemonic in &[
            "abs", "blt", "bgt", "ble", "bge", "beqz", "neg", "negu", "not", "li", "la", "move",
            "sge", "sgt",
        ] {
            assert!(is_pseudo(mnemonic), "{} should be a pseudo", mnemonic);
            assert!(op_info(mnemonic).is_none());
        }
        assert!(!is_pseudo("add"));
    }
}
