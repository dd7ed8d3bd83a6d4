//! Assemble small programs and drive them through the datapath.

use mipsim_assembler::assemble;
use mipsim_datapath::Datapath;
use mipsim_types::Memory;
use std::cell::RefCell;
use std::rc::Rc;

fn run(source: &str, ticks: usize) -> (Datapath, Rc<RefCell<Memory>>) {
    let mut memory = Memory::default();
    let entry = assemble(source, 0, &mut memory).unwrap();

    let memory = Rc::new(RefCell::new(memory));
    let mut datapath = Datapath::new(Rc::clone(&memory), entry);
    datapath.run(ticks).unwrap();
    (datapath, memory)
}

#[test]
fn immediate_adds_accumulate() {
    let (datapath, _) = run(
        "addi $t0, $zero, 5\n\
         addi $t1, $t0, 3\n\
         add $t2, $t0, $t1",
        3,
    );

    assert_eq!(datapath.register(8), 5);
    assert_eq!(datapath.register(9), 8);
    assert_eq!(datapath.register(10), 13);
    assert_eq!(datapath.pc(), 12);
}

#[test]
fn r_type_operations_flow_through_the_alu() {
    let (datapath, _) = run(
        "addi $t0, $zero, 12\n\
         addi $t1, $zero, 10\n\
         sub $t2, $t0, $t1\n\
         and $t3, $t0, $t1\n\
         or $t4, $t0, $t1\n\
         slt $t5, $t1, $t0",
        6,
    );

    assert_eq!(datapath.register(10), 2);
    assert_eq!(datapath.register(11), 8);
    assert_eq!(datapath.register(12), 14);
    assert_eq!(datapath.register(13), 1);
}

#[test]
fn store_then_load_round_trips_through_memory() {
    let (datapath, memory) = run(
        "addi $t0, $zero, 256\n\
         addi $t1, $zero, 7\n\
         sw $t1, 4($t0)\n\
         lw $t2, 4($t0)",
        4,
    );

    assert_eq!(datapath.register(10), 7);
    assert_eq!(memory.borrow().read_byte(260).unwrap(), 7);
}

#[test]
fn taken_branch_skips_ahead() {
    // beq with a raw word offset: target = pc+4 + (2 << 2)
    let (datapath, _) = run(
        "beq $zero, $zero, 2\n\
         addi $t0, $zero, 1\n\
         addi $t0, $zero, 2\n\
         addi $t1, $zero, 9",
        2,
    );

    assert_eq!(datapath.register(8), 0);
    assert_eq!(datapath.register(9), 9);
    assert_eq!(datapath.pc(), 16);
}

#[test]
fn untaken_branch_falls_through() {
    let (datapath, _) = run(
        "addi $t0, $zero, 1\n\
         beq $t0, $zero, 4\n\
         addi $t1, $zero, 3",
        3,
    );

    assert_eq!(datapath.register(9), 3);
}

#[test]
fn unimplemented_r_type_functs_are_inert() {
    // The ALU has no shifter; sll must not write a bogus sum into $t1
    let (datapath, _) = run(
        "addi $t0, $zero, 3\n\
         sll $t1, $t0, 2\n\
         add $t2, $t0, $t0",
        3,
    );

    assert_eq!(datapath.register(9), 0);
    assert_eq!(datapath.register(10), 6);
}

#[test]
fn writes_to_zero_are_dropped() {
    let (datapath, _) = run("addi $zero, $zero, 5\nadd $t0, $zero, $zero", 2);
    assert_eq!(datapath.register(0), 0);
    assert_eq!(datapath.register(8), 0);
}

#[test]
fn fetching_past_memory_faults() {
    let mut memory = Memory::new(64);
    assemble("nop", 0, &mut memory).unwrap();

    let mut datapath = Datapath::new(Rc::new(RefCell::new(memory)), 0);
    // 16 nop slots fit in 64 bytes; the 17th fetch is out of bounds
    let result = datapath.run(32);
    assert!(result.is_err());
}
