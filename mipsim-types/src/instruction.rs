use crate::constants::{
    FUNCTION_ADD, FUNCTION_ADDU, FUNCTION_AND, FUNCTION_BREAK, FUNCTION_JALR, FUNCTION_JR,
    FUNCTION_NOR, FUNCTION_OR, FUNCTION_SLL, FUNCTION_SLLV, FUNCTION_SLT, FUNCTION_SLTU,
    FUNCTION_SRA, FUNCTION_SRAV, FUNCTION_SRL, FUNCTION_SRLV, FUNCTION_SUB, FUNCTION_SUBU,
    FUNCTION_SYSCALL, FUNCTION_XOR, OP_ADDI, OP_ADDIU, OP_ANDI, OP_BEQ, OP_BGTZ, OP_BLEZ, OP_BNE,
    OP_J, OP_JAL, OP_LB, OP_LBU, OP_LH, OP_LHU, OP_LUI, OP_LW, OP_ORI, OP_R_TYPE, OP_SB, OP_SH,
    OP_SLTI, OP_SLTIU, OP_SW, OP_XORI, REGISTER_NAMES,
};
use std::fmt;
use std::fmt::{Display, Formatter};

/// A MIPS instruction word
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Instruction(pub u32);

impl Instruction {
    /// Get the operation code
    pub fn op_code(&self) -> u8 {
        ((self.0 & 0xFC00_0000) >> 26) as u8
    }

    /// Get the s register (for R and I type instructions)
    pub fn s_register(&self) -> u8 {
        ((self.0 & 0x03E0_0000) >> 21) as u8
    }

    /// Get the t register (for R and I type instructions)
    pub fn t_register(&self) -> u8 {
        ((self.0 & 0x001F_0000) >> 16) as u8
    }

    /// Get the d register (for R type instructions)
    pub fn d_register(&self) -> u8 {
        ((self.0 & 0x0000_F800) >> 11) as u8
    }

    /// Get the shift amount (for R type instructions)
    pub fn shift_amount(&self) -> u8 {
        ((self.0 & 0x0000_07C0) >> 6) as u8
    }

    /// Get the ALU function (for R type instructions)
    pub fn function(&self) -> u8 {
        (self.0 & 0x0000_003F) as u8
    }

    /// Get the immediate value (for I type instructions)
    pub fn immediate(&self) -> i16 {
        (self.0 & 0x0000_FFFF) as i16
    }

    /// Get the target field (for J type instructions)
    pub fn pseudo_address(&self) -> u32 {
        self.0 & 0x03FF_FFFF
    }
}

/// Pretty-print a register field using its name
struct Register(u8);

impl Display for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(REGISTER_NAMES[(self.0 & 0x1F) as usize])
    }
}

impl Display for Instruction {
    /// Decode and format the instruction. Words that do not decode to a
    /// known operation render as a raw `.word`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rs = Register(self.s_register());
        let rt = Register(self.t_register());
        let rd = Register(self.d_register());

        match self.op_code() {
            OP_R_TYPE => {
                let name = match self.function() {
                    FUNCTION_SLL if self.0 == 0 => return f.write_str("nop"),
                    FUNCTION_SLL => "sll",
                    FUNCTION_SRL => "srl",
                    FUNCTION_SRA => "sra",
                    FUNCTION_SLLV => "sllv",
                    FUNCTION_SRLV => "srlv",
                    FUNCTION_SRAV => "srav",
                    FUNCTION_JR => return write!(f, "jr {}", rs),
                    FUNCTION_JALR => return write!(f, "jalr {}", rs),
                    FUNCTION_SYSCALL => return f.write_str("syscall"),
                    FUNCTION_BREAK => return f.write_str("break"),
                    FUNCTION_ADD => "add",
                    FUNCTION_ADDU => "addu",
                    FUNCTION_SUB => "sub",
                    FUNCTION_SUBU => "subu",
                    FUNCTION_AND => "and",
                    FUNCTION_OR => "or",
                    FUNCTION_XOR => "xor",
                    FUNCTION_NOR => "nor",
                    FUNCTION_SLT => "slt",
                    FUNCTION_SLTU => "sltu",
                    _ => return write!(f, ".word 0x{:08x}", self.0),
                };

                match self.function() {
                    FUNCTION_SLL | FUNCTION_SRL | FUNCTION_SRA => {
                        write!(f, "{} {}, {}, {}", name, rd, rt, self.shift_amount())
                    }
                    _ => write!(f, "{} {}, {}, {}", name, rd, rs, rt),
                }
            }
            OP_J => write!(f, "j 0x{:x}", self.pseudo_address()),
            OP_JAL => write!(f, "jal 0x{:x}", self.pseudo_address()),
            OP_BEQ => write!(f, "beq {}, {}, {}", rs, rt, self.immediate()),
            OP_BNE => write!(f, "bne {}, {}, {}", rs, rt, self.immediate()),
            OP_BLEZ => write!(f, "blez {}, {}", rs, self.immediate()),
            OP_BGTZ => write!(f, "bgtz {}, {}", rs, self.immediate()),
            OP_ADDI => write!(f, "addi {}, {}, {}", rt, rs, self.immediate()),
            OP_ADDIU => write!(f, "addiu {}, {}, {}", rt, rs, self.immediate()),
            OP_SLTI => write!(f, "slti {}, {}, {}", rt, rs, self.immediate()),
            OP_SLTIU => write!(f, "sltiu {}, {}, {}", rt, rs, self.immediate()),
            OP_ANDI => write!(f, "andi {}, {}, 0x{:x}", rt, rs, self.immediate() as u16),
            OP_ORI => write!(f, "ori {}, {}, 0x{:x}", rt, rs, self.immediate() as u16),
            OP_XORI => write!(f, "xori {}, {}, 0x{:x}", rt, rs, self.immediate() as u16),
            OP_LUI => write!(f, "lui {}, 0x{:x}", rt, self.immediate() as u16),
            OP_LB => write!(f, "lb {}, {}({})", rt, self.immediate(), rs),
            OP_LH => write!(f, "lh {}, {}({})", rt, self.immediate(), rs),
            OP_LW => write!(f, "lw {}, {}({})", rt, self.immediate(), rs),
            OP_LBU => write!(f, "lbu {}, {}({})", rt, self.immediate(), rs),
            OP_LHU => write!(f, "lhu {}, {}({})", rt, self.immediate(), rs),
            OP_SB => write!(f, "sb {}, {}({})", rt, self.immediate(), rs),
            OP_SH => write!(f, "sh {}, {}({})", rt, self.immediate(), rs),
            OP_SW => write!(f, "sw {}, {}({})", rt, self.immediate(), rs),
            _ => write!(f, ".word 0x{:08x}", self.0),
        }
    }
}
