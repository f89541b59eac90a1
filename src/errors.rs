use std::io;
use thiserror::Error;

use crate::utils::Word;

/// Faults raised while the engine is fetching or executing instructions.
///
/// None of these stop the run on their own; the engine records them in its
/// error slot and carries on, except where noted.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("attempted to pop off of an empty stack")]
    EmptyStack,
    #[error("command with opcode [{opcode}] not found")]
    CommandNotFound { opcode: u8 },
    #[error("invalid address {0:#06X}")]
    InvalidAddress(Word),
    #[error("division by zero")]
    DivisionByZero,
    /// `in` hit end of input. Stops the run.
    #[error("input source exhausted")]
    InputExhausted,
    /// Stops the run.
    #[error("step limit of {0} instructions reached")]
    StepLimit(u64),
    #[error("failed to read input: {0}")]
    Input(#[source] io::Error),
    #[error("failed to write to terminal: {0}")]
    Terminal(#[source] io::Error),
    #[error("machine has already been started")]
    AlreadyStarted,
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<VmError>,
    },
}

impl VmError {
    pub fn context(self, context:impl Into<String>) -> Self {
        VmError::Context { context: context.into(), source: Box::new(self) }
    }

    /// Innermost error, skipping any context wrappers.
    pub fn root(&self) -> &VmError {
        match self {
            VmError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Faults while reading a program image. Always fatal to startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read program image: {0}")]
    Io(#[from] io::Error),
    #[error("program image ends with a dangling byte at offset {offset}")]
    TrailingByte { offset: usize },
    #[error("program image exceeds the address space ({words} words read)")]
    ImageTooLarge { words: usize },
}
