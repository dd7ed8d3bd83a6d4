// Operation codes
pub const OP_R_TYPE: u8 = 0;
pub const OP_BCOND: u8 = 0x01;
pub const OP_J: u8 = 0x02;
pub const OP_JAL: u8 = 0x03;
pub const OP_BEQ: u8 = 0x04;
pub const OP_BNE: u8 = 0x05;
pub const OP_BLEZ: u8 = 0x06;
pub const OP_BGTZ: u8 = 0x07;
pub const OP_ADDI: u8 = 0x08;
pub const OP_ADDIU: u8 = 0x09;
pub const OP_SLTI: u8 = 0x0A;
pub const OP_SLTIU: u8 = 0x0B;
pub const OP_ANDI: u8 = 0x0C;
pub const OP_ORI: u8 = 0x0D;
pub const OP_XORI: u8 = 0x0E;
pub const OP_LUI: u8 = 0x0F;
pub const OP_LB: u8 = 0x20;
pub const OP_LH: u8 = 0x21;
pub const OP_LW: u8 = 0x23;
pub const OP_LBU: u8 = 0x24;
pub const OP_LHU: u8 = 0x25;
pub const OP_SB: u8 = 0x28;
pub const OP_SH: u8 = 0x29;
pub const OP_SW: u8 = 0x2B;
pub const OP_LL: u8 = 0x30;
pub const OP_SC: u8 = 0x38;

// R-type function codes
pub const FUNCTION_SLL: u8 = 0x00;
pub const FUNCTION_SRL: u8 = 0x02;
pub const FUNCTION_SRA: u8 = 0x03;
pub const FUNCTION_SLLV: u8 = 0x04;
pub const FUNCTION_SRLV: u8 = 0x06;
pub const FUNCTION_SRAV: u8 = 0x07;
pub const FUNCTION_JR: u8 = 0x08;
pub const FUNCTION_JALR: u8 = 0x09;
pub const FUNCTION_SYSCALL: u8 = 0x0C;
pub const FUNCTION_BREAK: u8 = 0x0D;
pub const FUNCTION_ADD: u8 = 0x20;
pub const FUNCTION_ADDU: u8 = 0x21;
pub const FUNCTION_SUB: u8 = 0x22;
pub const FUNCTION_SUBU: u8 = 0x23;
pub const FUNCTION_AND: u8 = 0x24;
pub const FUNCTION_OR: u8 = 0x25;
pub const FUNCTION_XOR: u8 = 0x26;
pub const FUNCTION_NOR: u8 = 0x27;
pub const FUNCTION_SLT: u8 = 0x2A;
pub const FUNCTION_SLTU: u8 = 0x2B;

// BCOND (REGIMM) rt field selectors
pub const RT_BLTZ: u8 = 0x00;
pub const RT_BGEZ: u8 = 0x01;
pub const RT_BLTZAL: u8 = 0x10;
pub const RT_BGEZAL: u8 = 0x11;

// Register numbers
pub const REG_ZERO: u8 = 0;
/// The assembler temporary, reserved for pseudo-instruction expansions
pub const REG_AT: u8 = 1;
pub const REG_SP: u8 = 29;
pub const REG_RA: u8 = 31;

pub static REGISTER_NAMES: [&str; 32] = [
    "$zero", "$at", "$v0", "$v1", "$a0", "$a1", "$a2", "$a3", "$t0", "$t1", "$t2", "$t3",
    "$t4", "$t5", "$t6", "$t7", "$s0", "$s1", "$s2", "$s3", "$s4", "$s5", "$s6", "$s7",
    "$t8", "$t9", "$k0", "$k1", "$gp", "$sp", "$fp", "$ra",
];

// Memory layout
/// Base address of the text segment, recorded as the reserved `.text` symbol
pub const TEXT_BASE: u32 = 0x0000_0000;
/// Default base address of the data segment (the reserved `.data` symbol).
/// Configurable on the assembler.
pub const DATA_BASE: u32 = 0x0000_0800;
/// Default size of the memory image in bytes
pub const MEMORY_SIZE: usize = 0x1_0000;
