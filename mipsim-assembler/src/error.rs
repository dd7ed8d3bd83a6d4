use mipsim_types::MemoryError;
use thiserror::Error;

/// Fatal assembly failures. Every variant carries the 1-based source line
/// the failure was detected on; assembly stops at the first one.
#[derive(Debug, Error)]
pub enum AssemblerError {
    /// A line that is not a directive, a label, or a known instruction,
    /// or a token of unrecognizable shape.
    #[error("line {line}: syntax error: {text}")]
    Syntax { line: usize, text: String },

    /// A recognized directive with the wrong number or shape of arguments.
    #[error("line {line}: malformed directive: {text}")]
    DirectiveSyntax { line: usize, text: String },

    /// A recognized instruction with the wrong arity or operand shapes.
    #[error("line {line}: malformed instruction: {text}")]
    InstructionSyntax { line: usize, text: String },

    /// A directive whose arguments parse but do not make sense
    /// (e.g. `.align` with a non-integer).
    #[error("line {line}: {message}")]
    DirectiveSemantic { line: usize, message: String },

    /// A label reference that never resolved during pass 2.
    #[error("line {line}: unknown label '{label}'")]
    UnknownLabel { line: usize, label: String },

    /// A mnemonic the encoder has no entry for.
    #[error("line {line}: unknown instruction '{text}'")]
    UnknownInstruction { line: usize, text: String },

    /// A non-reserved label defined twice.
    #[error("line {line}: label '{label}' redefined")]
    DuplicateLabel { line: usize, label: String },

    /// A directive or the loader wrote past the end of the memory image.
    #[error("line {line}: {source}")]
    Memory { line: usize, source: MemoryError },
}

impl AssemblerError {
    /// The 1-based source line the error was reported on.
    pub fn line(&self) -> usize {
        match self {
            AssemblerError::Syntax { line, .. }
            | AssemblerError::DirectiveSyntax { line, .. }
            | AssemblerError::InstructionSyntax { line, .. }
            | AssemblerError::DirectiveSemantic { line, .. }
            | AssemblerError::UnknownLabel { line, .. }
            | AssemblerError::UnknownInstruction { line, .. }
            | AssemblerError::DuplicateLabel { line, .. }
            | AssemblerError::Memory { line, .. } => *line,
        }
    }
}
