//! The datapath component library: combinational elements, the clocked
//! register, and the domain units of the single-cycle MIPS machine.

use crate::component::Component;
use crate::wire::Wire;
use mipsim_types::constants::{OP_ADDI, OP_ADDIU, OP_BEQ, OP_LW, OP_R_TYPE, OP_SW};
use mipsim_types::constants::{
    FUNCTION_ADD, FUNCTION_ADDU, FUNCTION_AND, FUNCTION_NOR, FUNCTION_OR, FUNCTION_SLT,
    FUNCTION_SLTU, FUNCTION_SUB, FUNCTION_SUBU, FUNCTION_XOR,
};
use mipsim_types::{Instruction, Memory, MemoryError};
use std::cell::RefCell;
use std::rc::Rc;

// 4-bit ALU operation codes produced by AluControl
pub const ALU_AND: u32 = 0b0000;
pub const ALU_OR: u32 = 0b0001;
pub const ALU_ADD: u32 = 0b0010;
pub const ALU_XOR: u32 = 0b0011;
pub const ALU_SUB: u32 = 0b0110;
pub const ALU_SLT: u32 = 0b0111;
pub const ALU_NOR: u32 = 0b1100;

// AluControl's ALUOp input values
pub const ALU_OP_ADD: u32 = 0;
pub const ALU_OP_SUB: u32 = 1;
pub const ALU_OP_FUNCT: u32 = 2;

/// Sticky bus-fault line shared by the memory ports and checked by the
/// tick loop after each sweep.
pub type FaultLine = Rc<RefCell<Option<MemoryError>>>;

fn raise(fault: &FaultLine, error: MemoryError) {
    let mut slot = fault.borrow_mut();
    if slot.is_none() {
        *slot = Some(error);
    }
}

/// Two-way multiplexer: `select` low routes `a`, high routes `b`.
pub struct Mux {
    select: Wire,
    a: Wire,
    b: Wire,
    out: Wire,
}

impl Mux {
    pub fn new(select: Wire, a: Wire, b: Wire, out: Wire) -> Self {
        Self { select, a, b, out }
    }
}

impl Component for Mux {
    fn update(&mut self) -> bool {
        let value = if self.select.get() == 0 {
            self.a.get()
        } else {
            self.b.get()
        };
        self.out.set(value)
    }
}

pub struct Adder {
    a: Wire,
    b: Wire,
    out: Wire,
}

impl Adder {
    pub fn new(a: Wire, b: Wire, out: Wire) -> Self {
        Self { a, b, out }
    }
}

impl Component for Adder {
    fn update(&mut self) -> bool {
        self.out.set(self.a.get().wrapping_add(self.b.get()))
    }
}

pub struct AndGate {
    a: Wire,
    b: Wire,
    out: Wire,
}

impl AndGate {
    pub fn new(a: Wire, b: Wire, out: Wire) -> Self {
        Self { a, b, out }
    }
}

impl Component for AndGate {
    fn update(&mut self) -> bool {
        self.out.set(self.a.get() & self.b.get())
    }
}

pub struct OrGate {
    a: Wire,
    b: Wire,
    out: Wire,
}

impl OrGate {
    pub fn new(a: Wire, b: Wire, out: Wire) -> Self {
        Self { a, b, out }
    }
}

impl Component for OrGate {
    fn update(&mut self) -> bool {
        self.out.set(self.a.get() | self.b.get())
    }
}

pub struct NotGate {
    input: Wire,
    out: Wire,
}

impl NotGate {
    pub fn new(input: Wire, out: Wire) -> Self {
        Self { input, out }
    }
}

impl Component for NotGate {
    fn update(&mut self) -> bool {
        self.out.set(!self.input.get())
    }
}

/// Widens a narrow signal to the output wire's width, either zero-filled
/// or sign-extended from `in_width` bits.
pub struct Extender {
    input: Wire,
    out: Wire,
    in_width: u32,
    sign: bool,
}

impl Extender {
    pub fn zero(input: Wire, out: Wire, in_width: u32) -> Self {
        Self {
            input,
            out,
            in_width,
            sign: false,
        }
    }

    pub fn sign(input: Wire, out: Wire, in_width: u32) -> Self {
        Self {
            input,
            out,
            in_width,
            sign: true,
        }
    }
}

impl Component for Extender {
    fn update(&mut self) -> bool {
        let value = self.input.get();
        let extended = if self.sign && value >> (self.in_width - 1) & 1 == 1 {
            value | !((1u32 << self.in_width) - 1)
        } else {
            value
        };
        self.out.set(extended)
    }
}

pub struct ShiftLeft {
    input: Wire,
    out: Wire,
    amount: u32,
}

impl ShiftLeft {
    pub fn new(input: Wire, out: Wire, amount: u32) -> Self {
        Self { input, out, amount }
    }
}

impl Component for ShiftLeft {
    fn update(&mut self) -> bool {
        self.out.set(self.input.get() << self.amount)
    }
}

/// Splits a fetched instruction word into its fields.
pub struct InstructionSplitter {
    input: Wire,
    pub opcode: Wire,
    pub rs: Wire,
    pub rt: Wire,
    pub rd: Wire,
    pub shamt: Wire,
    pub funct: Wire,
    pub imm: Wire,
    pub addr: Wire,
}

impl InstructionSplitter {
    pub fn new(input: Wire) -> Self {
        Self {
            input,
            opcode: Wire::new(6),
            rs: Wire::new(5),
            rt: Wire::new(5),
            rd: Wire::new(5),
            shamt: Wire::new(5),
            funct: Wire::new(6),
            imm: Wire::new(16),
            addr: Wire::new(26),
        }
    }
}

impl Component for InstructionSplitter {
    fn update(&mut self) -> bool {
        let word = Instruction(self.input.get());
        let mut changed = false;
        changed |= self.opcode.set(word.op_code() as u32);
        changed |= self.rs.set(word.s_register() as u32);
        changed |= self.rt.set(word.t_register() as u32);
        changed |= self.rd.set(word.d_register() as u32);
        changed |= self.shamt.set(word.shift_amount() as u32);
        changed |= self.funct.set(word.function() as u32);
        changed |= self.imm.set(word.immediate() as u16 as u32);
        changed |= self.addr.set(word.pseudo_address());
        changed
    }
}

/// The one sequential element: presents its captured value on the output
/// and takes the next one at latch time.
pub struct Register {
    input: Wire,
    out: Wire,
    value: u32,
}

impl Register {
    pub fn new(input: Wire, out: Wire, initial: u32) -> Self {
        out.set(initial);
        Self {
            input,
            out,
            value: initial,
        }
    }
}

impl Component for Register {
    fn update(&mut self) -> bool {
        self.out.set(self.value)
    }

    fn latch(&mut self) {
        self.value = self.input.get();
        self.out.set(self.value);
    }
}

/// Whether the ALU implements an R-type function code. Shifts and the
/// jump/trap functs are outside the single-cycle subset; writes for them
/// are suppressed so the instruction passes through inert.
fn alu_implements(funct: u8) -> bool {
    matches!(
        funct,
        FUNCTION_ADD
            | FUNCTION_ADDU
            | FUNCTION_SUB
            | FUNCTION_SUBU
            | FUNCTION_AND
            | FUNCTION_OR
            | FUNCTION_XOR
            | FUNCTION_NOR
            | FUNCTION_SLT
            | FUNCTION_SLTU
    )
}

/// Main control: opcode (plus the funct field for R-type write gating) in,
/// the single-cycle control lines out.
///
/// Covers the classic single-cycle subset: R-type with an ALU-implemented
/// funct, `lw`, `sw`, `beq`, and `addi`/`addiu`. Any other opcode — and
/// any R-type funct outside [`alu_implements`] — deasserts every line,
/// making the instruction a no-op in the datapath.
pub struct ControlUnit {
    opcode: Wire,
    funct: Wire,
    pub reg_dst: Wire,
    pub alu_src: Wire,
    pub mem_to_reg: Wire,
    pub reg_write: Wire,
    pub mem_read: Wire,
    pub mem_write: Wire,
    pub branch: Wire,
    pub alu_op: Wire,
}

impl ControlUnit {
    pub fn new(opcode: Wire, funct: Wire) -> Self {
        Self {
            opcode,
            funct,
            reg_dst: Wire::new(1),
            alu_src: Wire::new(1),
            mem_to_reg: Wire::new(1),
            reg_write: Wire::new(1),
            mem_read: Wire::new(1),
            mem_write: Wire::new(1),
            branch: Wire::new(1),
            alu_op: Wire::new(2),
        }
    }
}

impl Component for ControlUnit {
    fn update(&mut self) -> bool {
        // (reg_dst, alu_src, mem_to_reg, reg_write, mem_read, mem_write, branch, alu_op)
        let lines = match self.opcode.get() as u8 {
            OP_R_TYPE if alu_implements(self.funct.get() as u8) => {
                (1, 0, 0, 1, 0, 0, 0, ALU_OP_FUNCT)
            }
            OP_LW => (0, 1, 1, 1, 1, 0, 0, ALU_OP_ADD),
            OP_SW => (0, 1, 0, 0, 0, 1, 0, ALU_OP_ADD),
            OP_BEQ => (0, 0, 0, 0, 0, 0, 1, ALU_OP_SUB),
            OP_ADDI | OP_ADDIU => (0, 1, 0, 1, 0, 0, 0, ALU_OP_ADD),
            _ => (0, 0, 0, 0, 0, 0, 0, ALU_OP_ADD),
        };

        let mut changed = false;
        changed |= self.reg_dst.set(lines.0);
        changed |= self.alu_src.set(lines.1);
        changed |= self.mem_to_reg.set(lines.2);
        changed |= self.reg_write.set(lines.3);
        changed |= self.mem_read.set(lines.4);
        changed |= self.mem_write.set(lines.5);
        changed |= self.branch.set(lines.6);
        changed |= self.alu_op.set(lines.7);
        changed
    }
}

/// Second-level control: ALUOp plus the R-type function code select the
/// 4-bit ALU operation.
pub struct AluControl {
    alu_op: Wire,
    funct: Wire,
    pub operation: Wire,
}

impl AluControl {
    pub fn new(alu_op: Wire, funct: Wire) -> Self {
        Self {
            alu_op,
            funct,
            operation: Wire::new(4),
        }
    }
}

impl Component for AluControl {
    fn update(&mut self) -> bool {
        let operation = match self.alu_op.get() {
            ALU_OP_ADD => ALU_ADD,
            ALU_OP_SUB => ALU_SUB,
            _ => match self.funct.get() as u8 {
                FUNCTION_ADD | FUNCTION_ADDU => ALU_ADD,
                FUNCTION_SUB | FUNCTION_SUBU => ALU_SUB,
                FUNCTION_AND => ALU_AND,
                FUNCTION_OR => ALU_OR,
                FUNCTION_XOR => ALU_XOR,
                FUNCTION_NOR => ALU_NOR,
                FUNCTION_SLT | FUNCTION_SLTU => ALU_SLT,
                _ => ALU_ADD,
            },
        };
        self.operation.set(operation)
    }
}

/// 32-bit ALU with a zero flag.
pub struct Alu {
    a: Wire,
    b: Wire,
    operation: Wire,
    pub result: Wire,
    pub zero: Wire,
}

impl Alu {
    pub fn new(a: Wire, b: Wire, operation: Wire) -> Self {
        Self {
            a,
            b,
            operation,
            result: Wire::new(32),
            zero: Wire::new(1),
        }
    }
}

impl Component for Alu {
    fn update(&mut self) -> bool {
        let a = self.a.get();
        let b = self.b.get();
        let result = match self.operation.get() {
            ALU_AND => a & b,
            ALU_OR => a | b,
            ALU_ADD => a.wrapping_add(b),
            ALU_XOR => a ^ b,
            ALU_SUB => a.wrapping_sub(b),
            ALU_SLT => ((a as i32) < b as i32) as u32,
            ALU_NOR => !(a | b),
            _ => 0,
        };

        let mut changed = self.result.set(result);
        changed |= self.zero.set((result == 0) as u32);
        changed
    }
}

/// Two read ports, one write port. Reads are combinational; the write
/// lands at latch time when `reg_write` is asserted. Register 0 reads as
/// zero and ignores writes.
pub struct RegisterFile {
    read1: Wire,
    read2: Wire,
    write_reg: Wire,
    write_data: Wire,
    reg_write: Wire,
    pub out1: Wire,
    pub out2: Wire,
    registers: Rc<RefCell<[u32; 32]>>,
}

impl RegisterFile {
    pub fn new(
        read1: Wire,
        read2: Wire,
        write_reg: Wire,
        write_data: Wire,
        reg_write: Wire,
        registers: Rc<RefCell<[u32; 32]>>,
    ) -> Self {
        Self {
            read1,
            read2,
            write_reg,
            write_data,
            reg_write,
            out1: Wire::new(32),
            out2: Wire::new(32),
            registers,
        }
    }

    fn read(&self, index: u32) -> u32 {
        if index == 0 {
            0
        } else {
            self.registers.borrow()[index as usize]
        }
    }
}

impl Component for RegisterFile {
    fn update(&mut self) -> bool {
        let mut changed = self.out1.set(self.read(self.read1.get()));
        changed |= self.out2.set(self.read(self.read2.get()));
        changed
    }

    fn latch(&mut self) {
        if self.reg_write.get() != 0 {
            let index = self.write_reg.get() as usize;
            if index != 0 {
                self.registers.borrow_mut()[index] = self.write_data.get();
            }
        }
    }
}

/// Instruction port: combinational fetch of the word at the address wire.
/// Words are assembled little-endian, matching the loader's in-buffer
/// order. Out-of-bounds fetches raise the fault line and present zero.
pub struct InstructionMemory {
    memory: Rc<RefCell<Memory>>,
    address: Wire,
    pub instruction: Wire,
    fault: FaultLine,
}

impl InstructionMemory {
    pub fn new(memory: Rc<RefCell<Memory>>, address: Wire, fault: FaultLine) -> Self {
        Self {
            memory,
            address,
            instruction: Wire::new(32),
            fault,
        }
    }
}

fn read_word_le(memory: &Memory, address: u32) -> Result<u32, MemoryError> {
    Ok(u32::from_le_bytes([
        memory.read_byte(address)?,
        memory.read_byte(address + 1)?,
        memory.read_byte(address + 2)?,
        memory.read_byte(address + 3)?,
    ]))
}

impl Component for InstructionMemory {
    fn update(&mut self) -> bool {
        let word = match read_word_le(&self.memory.borrow(), self.address.get()) {
            Ok(word) => word,
            Err(error) => {
                raise(&self.fault, error);
                0
            }
        };
        self.instruction.set(word)
    }
}

/// Data port: combinational read gated by `mem_read`, write applied at
/// latch time when `mem_write` is asserted.
pub struct DataMemory {
    memory: Rc<RefCell<Memory>>,
    address: Wire,
    write_data: Wire,
    mem_read: Wire,
    mem_write: Wire,
    pub read_data: Wire,
    fault: FaultLine,
}

impl DataMemory {
    pub fn new(
        memory: Rc<RefCell<Memory>>,
        address: Wire,
        write_data: Wire,
        mem_read: Wire,
        mem_write: Wire,
        fault: FaultLine,
    ) -> Self {
        Self {
            memory,
            address,
            write_data,
            mem_read,
            mem_write,
            read_data: Wire::new(32),
            fault,
        }
    }
}

impl Component for DataMemory {
    fn update(&mut self) -> bool {
        let value = if self.mem_read.get() != 0 {
            match read_word_le(&self.memory.borrow(), self.address.get()) {
                Ok(word) => word,
                Err(error) => {
                    raise(&self.fault, error);
                    0
                }
            }
        } else {
            0
        };
        self.read_data.set(value)
    }

    fn latch(&mut self) {
        if self.mem_write.get() != 0 {
            let bytes = self.write_data.get().to_le_bytes();
            if let Err(error) = self.memory.borrow_mut().write(self.address.get(), &bytes) {
                raise(&self.fault, error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mux_routes_by_select() {
        let select = Wire::new(1);
        let a = Wire::new(32);
        let b = Wire::new(32);
        let out = Wire::new(32);
        a.set(11);
        b.set(22);

        let mut mux = Mux::new(select.clone(), a, b, out.clone());
        mux.update();
        assert_eq!(out.get(), 11);

        select.set(1);
        mux.update();
        assert_eq!(out.get(), 22);
    }

    #[test]
    fn logic_gates() {
        let a = Wire::new(4);
        let b = Wire::new(4);
        a.set(0b1100);
        b.set(0b1010);

        let and_out = Wire::new(4);
        AndGate::new(a.clone(), b.clone(), and_out.clone()).update();
        assert_eq!(and_out.get(), 0b1000);

        let or_out = Wire::new(4);
        OrGate::new(a.clone(), b.clone(), or_out.clone()).update();
        assert_eq!(or_out.get(), 0b1110);

        let not_out = Wire::new(4);
        NotGate::new(a.clone(), not_out.clone()).update();
        assert_eq!(not_out.get(), 0b0011);
    }

    #[test]
    fn register_delays_until_latch() {
        let input = Wire::new(32);
        let out = Wire::new(32);
        let mut register = Register::new(input.clone(), out.clone(), 0x40);

        register.update();
        assert_eq!(out.get(), 0x40);

        input.set(0x44);
        assert!(!register.update());
        assert_eq!(out.get(), 0x40);

        register.latch();
        register.update();
        assert_eq!(out.get(), 0x44);
    }

    #[test]
    fn sign_extension() {
        let input = Wire::new(16);
        let out = Wire::new(32);
        let mut extender = Extender::sign(input.clone(), out.clone(), 16);

        input.set(0x7FFF);
        extender.update();
        assert_eq!(out.get(), 0x7FFF);

        input.set(0xFFFF);
        extender.update();
        assert_eq!(out.get(), 0xFFFF_FFFF);

        let mut zero_ext = Extender::zero(input.clone(), out.clone(), 16);
        zero_ext.update();
        assert_eq!(out.get(), 0xFFFF);
    }

    #[test]
    fn splitter_extracts_fields() {
        let input = Wire::new(32);
        input.set(0x0109_5020); // add $t2, $t0, $t1
        let mut splitter = InstructionSplitter::new(input);
        splitter.update();

        assert_eq!(splitter.opcode.get(), 0);
        assert_eq!(splitter.rs.get(), 8);
        assert_eq!(splitter.rt.get(), 9);
        assert_eq!(splitter.rd.get(), 10);
        assert_eq!(splitter.funct.get(), 0x20);
    }

    #[test]
    fn alu_subtract_drives_zero_flag() {
        let a = Wire::new(32);
        let b = Wire::new(32);
        let operation = Wire::new(4);
        a.set(7);
        b.set(7);
        operation.set(ALU_SUB);

        let mut alu = Alu::new(a.clone(), b, operation);
        alu.update();
        assert_eq!(alu.result.get(), 0);
        assert_eq!(alu.zero.get(), 1);

        a.set(9);
        alu.update();
        assert_eq!(alu.result.get(), 2);
        assert_eq!(alu.zero.get(), 0);
    }

    #[test]
    fn alu_slt_is_signed() {
        let a = Wire::new(32);
        let b = Wire::new(32);
        let operation = Wire::new(4);
        a.set(-1i32 as u32);
        b.set(1);
        operation.set(ALU_SLT);

        let mut alu = Alu::new(a, b, operation);
        alu.update();
        assert_eq!(alu.result.get(), 1);
    }

    #[test]
    fn register_file_hardwires_zero() {
        let read1 = Wire::new(5);
        let read2 = Wire::new(5);
        let write_reg = Wire::new(5);
        let write_data = Wire::new(32);
        let reg_write = Wire::new(1);
        let registers = Rc::new(RefCell::new([0u32; 32]));

        let mut file = RegisterFile::new(
            read1.clone(),
            read2,
            write_reg.clone(),
            write_data.clone(),
            reg_write.clone(),
            Rc::clone(&registers),
        );

        // A write to $0 is ignored
        reg_write.set(1);
        write_data.set(99);
        file.latch();
        file.update();
        assert_eq!(file.out1.get(), 0);

        // A gated-off write does not land
        write_reg.set(5);
        reg_write.set(0);
        file.latch();
        assert_eq!(registers.borrow()[5], 0);

        reg_write.set(1);
        file.latch();
        read1.set(5);
        file.update();
        assert_eq!(file.out1.get(), 99);
    }

    #[test]
    fn control_unit_lines() {
        let opcode = Wire::new(6);
        let funct = Wire::new(6);
        let mut control = ControlUnit::new(opcode.clone(), funct.clone());

        opcode.set(OP_R_TYPE as u32);
        funct.set(FUNCTION_ADD as u32);
        control.update();
        assert_eq!(control.reg_dst.get(), 1);
        assert_eq!(control.reg_write.get(), 1);
        assert_eq!(control.alu_op.get(), ALU_OP_FUNCT);

        opcode.set(OP_LW as u32);
        control.update();
        assert_eq!(control.alu_src.get(), 1);
        assert_eq!(control.mem_to_reg.get(), 1);
        assert_eq!(control.mem_read.get(), 1);
        assert_eq!(control.mem_write.get(), 0);

        opcode.set(OP_BEQ as u32);
        control.update();
        assert_eq!(control.branch.get(), 1);
        assert_eq!(control.reg_write.get(), 0);
        assert_eq!(control.alu_op.get(), ALU_OP_SUB);
    }

    #[test]
    fn unimplemented_functs_suppress_the_write() {
        use mipsim_types::constants::{FUNCTION_JR, FUNCTION_SLL, FUNCTION_SRAV};

        let opcode = Wire::new(6);
        let funct = Wire::new(6);
        let mut control = ControlUnit::new(opcode.clone(), funct.clone());
        opcode.set(OP_R_TYPE as u32);

        for unimplemented in &[FUNCTION_SLL, FUNCTION_SRAV, FUNCTION_JR] {
            funct.set(*unimplemented as u32);
            control.update();
            assert_eq!(control.reg_write.get(), 0, "funct 0x{:02x}", unimplemented);
            assert_eq!(control.mem_write.get(), 0);
        }

        funct.set(FUNCTION_SUB as u32);
        control.update();
        assert_eq!(control.reg_write.get(), 1);
    }

    #[test]
    fn data_memory_gates_and_faults() {
        let memory = Rc::new(RefCell::new(Memory::new(32)));
        let address = Wire::new(32);
        let write_data = Wire::new(32);
        let mem_read = Wire::new(1);
        let mem_write = Wire::new(1);
        let fault: FaultLine = Rc::new(RefCell::new(None));

        let mut port = DataMemory::new(
            Rc::clone(&memory),
            address.clone(),
            write_data.clone(),
            mem_read.clone(),
            mem_write.clone(),
            Rc::clone(&fault),
        );

        address.set(8);
        write_data.set(0x1234_5678);
        mem_write.set(1);
        port.latch();

        mem_read.set(1);
        port.update();
        assert_eq!(port.read_data.get(), 0x1234_5678);

        address.set(64);
        port.update();
        assert!(fault.borrow().is_some());
    }
}
