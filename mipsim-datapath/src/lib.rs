//! A single-cycle MIPS datapath simulator.
//!
//! The machine is a graph of fixed-width [`Wire`]s connecting components
//! that expose one capability: `update() -> bool`. Each clock tick sweeps
//! the graph to a fixpoint and then latches the state-holding components
//! (the PC, the register file write port, and the data-memory write port).

pub mod component;
pub mod datapath;
pub mod error;
pub mod units;
pub mod wire;

pub use component::Component;
pub use datapath::Datapath;
pub use error::{ExecutionError, ProcessorError};
pub use wire::Wire;
