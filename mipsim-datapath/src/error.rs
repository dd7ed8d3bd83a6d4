use mipsim_assembler::AssemblerError;
use mipsim_types::MemoryError;
use thiserror::Error;

/// Failures raised while the datapath is running.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    MemoryAccess(#[from] MemoryError),

    #[error("unknown register '{name}'")]
    UnknownRegister { name: String },

    /// The combinational network kept changing past the iteration cap,
    /// which means the component graph has a loop outside a `Register`.
    #[error("datapath did not settle after {iterations} update sweeps")]
    NonConverging { iterations: usize },
}

/// Root of the error taxonomy: everything the assemble-and-run pipeline
/// can fail with.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error(transparent)]
    Assembler(#[from] AssemblerError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
