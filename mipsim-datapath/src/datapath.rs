//! The single-cycle MIPS datapath: component graph construction and the
//! two-phase fixpoint clock.

use crate::component::Component;
use crate::error::ExecutionError;
use crate::units::{
    Adder, Alu, AluControl, AndGate, ControlUnit, DataMemory, Extender, FaultLine,
    InstructionMemory, InstructionSplitter, Mux, Register, RegisterFile, ShiftLeft,
};
use crate::wire::Wire;
use mipsim_types::constants::{REGISTER_NAMES, REG_SP};
use mipsim_types::{Instruction, Memory};
use std::cell::RefCell;
use std::rc::Rc;

/// Update sweeps allowed per tick before the graph is declared divergent.
const MAX_SWEEPS: usize = 1000;

/// The simulator context: owns every component in registration order plus
/// handles for inspecting the machine state between ticks.
pub struct Datapath {
    components: Vec<Box<dyn Component>>,
    pc: Wire,
    instruction: Wire,
    registers: Rc<RefCell<[u32; 32]>>,
    fault: FaultLine,
}

impl Datapath {
    /// Wire up the classic single-cycle graph over `memory`, starting
    /// execution at `entry`.
    pub fn new(memory: Rc<RefCell<Memory>>, entry: u32) -> Self {
        let fault: FaultLine = Rc::new(RefCell::new(None));
        let registers = Rc::new(RefCell::new([0u32; 32]));
        registers.borrow_mut()[REG_SP as usize] = memory.borrow().size() as u32;

        let mut components: Vec<Box<dyn Component>> = Vec::new();

        // IF: the PC register and instruction fetch
        let pc = Wire::new(32);
        let pc_next = Wire::new(32);
        components.push(Box::new(Register::new(pc_next.clone(), pc.clone(), entry)));

        let instruction_memory =
            InstructionMemory::new(Rc::clone(&memory), pc.clone(), Rc::clone(&fault));
        let instruction = instruction_memory.instruction.clone();
        components.push(Box::new(instruction_memory));

        // ID: split the word, derive control, read the register file
        let splitter = InstructionSplitter::new(instruction.clone());
        let (rs, rt, rd) = (splitter.rs.clone(), splitter.rt.clone(), splitter.rd.clone());
        let (opcode, funct, imm) = (
            splitter.opcode.clone(),
            splitter.funct.clone(),
            splitter.imm.clone(),
        );
        components.push(Box::new(splitter));

        let control = ControlUnit::new(opcode, funct.clone());
        let reg_dst = control.reg_dst.clone();
        let alu_src = control.alu_src.clone();
        let mem_to_reg = control.mem_to_reg.clone();
        let reg_write = control.reg_write.clone();
        let mem_read = control.mem_read.clone();
        let mem_write = control.mem_write.clone();
        let branch = control.branch.clone();
        let alu_op = control.alu_op.clone();
        components.push(Box::new(control));

        let write_reg = Wire::new(5);
        components.push(Box::new(Mux::new(reg_dst, rt.clone(), rd, write_reg.clone())));

        let write_back = Wire::new(32);
        let register_file = RegisterFile::new(
            rs,
            rt,
            write_reg,
            write_back.clone(),
            reg_write,
            Rc::clone(&registers),
        );
        let read1 = register_file.out1.clone();
        let read2 = register_file.out2.clone();
        components.push(Box::new(register_file));

        // EX: immediate extension, operand select, the ALU
        let imm_ext = Wire::new(32);
        components.push(Box::new(Extender::sign(imm.clone(), imm_ext.clone(), 16)));

        let alu_b = Wire::new(32);
        components.push(Box::new(Mux::new(
            alu_src,
            read2.clone(),
            imm_ext.clone(),
            alu_b.clone(),
        )));

        let alu_control = AluControl::new(alu_op, funct);
        let alu_operation = alu_control.operation.clone();
        components.push(Box::new(alu_control));

        let alu = Alu::new(read1, alu_b, alu_operation);
        let alu_result = alu.result.clone();
        let alu_zero = alu.zero.clone();
        components.push(Box::new(alu));

        // MEM
        let data_memory = DataMemory::new(
            memory,
            alu_result.clone(),
            read2,
            mem_read,
            mem_write,
            Rc::clone(&fault),
        );
        let mem_out = data_memory.read_data.clone();
        components.push(Box::new(data_memory));

        // WB
        components.push(Box::new(Mux::new(
            mem_to_reg,
            alu_result,
            mem_out,
            write_back,
        )));

        // Next-PC: sequential or branch target
        let four = Wire::new(32);
        four.set(4);
        let pc_plus_4 = Wire::new(32);
        components.push(Box::new(Adder::new(pc.clone(), four, pc_plus_4.clone())));

        let branch_offset = Wire::new(32);
        components.push(Box::new(ShiftLeft::new(imm_ext, branch_offset.clone(), 2)));

        let branch_target = Wire::new(32);
        components.push(Box::new(Adder::new(
            pc_plus_4.clone(),
            branch_offset,
            branch_target.clone(),
        )));

        let take_branch = Wire::new(1);
        components.push(Box::new(AndGate::new(branch, alu_zero, take_branch.clone())));

        components.push(Box::new(Mux::new(
            take_branch,
            pc_plus_4,
            branch_target,
            pc_next,
        )));

        Self {
            components,
            pc,
            instruction,
            registers,
            fault,
        }
    }

    /// One clock tick: sweep `update()` over the components in
    /// registration order until a sweep changes nothing, then latch all
    /// state-holding components.
    pub fn tick(&mut self) -> Result<(), ExecutionError> {
        for sweep in 0..MAX_SWEEPS {
            let mut changed = false;
            for component in &mut self.components {
                changed |= component.update();
            }

            if let Some(error) = self.fault.borrow_mut().take() {
                return Err(ExecutionError::MemoryAccess(error));
            }

            if !changed {
                log::trace!(
                    "pc=0x{:08x} settled after {} sweeps: {}",
                    self.pc.get(),
                    sweep + 1,
                    Instruction(self.instruction.get())
                );
                for component in &mut self.components {
                    component.latch();
                }
                if let Some(error) = self.fault.borrow_mut().take() {
                    return Err(ExecutionError::MemoryAccess(error));
                }
                return Ok(());
            }
        }

        Err(ExecutionError::NonConverging {
            iterations: MAX_SWEEPS,
        })
    }

    /// Run a fixed number of ticks.
    pub fn run(&mut self, ticks: usize) -> Result<(), ExecutionError> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    /// The PC as of the start of the current cycle.
    pub fn pc(&self) -> u32 {
        self.pc.get()
    }

    pub fn register(&self, index: u8) -> u32 {
        if index == 0 {
            0
        } else {
            self.registers.borrow()[(index & 0x1F) as usize]
        }
    }

    /// Look a register up by its `$`-prefixed name or number.
    pub fn register_by_name(&self, name: &str) -> Result<u32, ExecutionError> {
        let unknown = || ExecutionError::UnknownRegister {
            name: name.to_string(),
        };

        if let Some(index) = REGISTER_NAMES.iter().position(|&alias| alias == name) {
            return Ok(self.register(index as u8));
        }

        let digits = name.strip_prefix('$').ok_or_else(unknown)?;
        match digits.parse::<u8>() {
            Ok(index) if index < 32 => Ok(self.register(index)),
            _ => Err(unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Wire;

    /// A component that flips its output on every update and so never
    /// settles.
    struct Oscillator {
        out: Wire,
    }

    impl Component for Oscillator {
        fn update(&mut self) -> bool {
            self.out.set(self.out.get() ^ 1)
        }
    }

    fn datapath_with(components: Vec<Box<dyn Component>>) -> Datapath {
        Datapath {
            components,
            pc: Wire::new(32),
            instruction: Wire::new(32),
            registers: Rc::new(RefCell::new([0; 32])),
            fault: Rc::new(RefCell::new(None)),
        }
    }

    #[test]
    fn an_unstable_graph_is_reported() {
        let mut datapath = datapath_with(vec![Box::new(Oscillator { out: Wire::new(1) })]);
        let err = datapath.tick().unwrap_err();
        assert!(matches!(err, ExecutionError::NonConverging { .. }));
    }

    #[test]
    fn an_empty_graph_settles_immediately() {
        let mut datapath = datapath_with(Vec::new());
        datapath.tick().unwrap();
    }

    #[test]
    fn registers_read_back_and_zero_is_pinned() {
        let memory = Rc::new(RefCell::new(Memory::new(256)));
        let datapath = Datapath::new(memory, 0);

        datapath.registers.borrow_mut()[8] = 42;
        assert_eq!(datapath.register(8), 42);
        assert_eq!(datapath.register(0), 0);
        assert_eq!(datapath.register_by_name("$t0").unwrap(), 42);
        assert_eq!(datapath.register_by_name("$8").unwrap(), 42);
        assert!(datapath.register_by_name("$nope").is_err());
    }

    #[test]
    fn stack_pointer_starts_at_the_top_of_memory() {
        let memory = Rc::new(RefCell::new(Memory::new(512)));
        let datapath = Datapath::new(memory, 0);
        assert_eq!(datapath.register(REG_SP), 512);
    }
}
