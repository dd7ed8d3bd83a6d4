pub mod constants;
mod instruction;
mod memory;

pub use {instruction::*, memory::*};
