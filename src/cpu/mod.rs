mod registry;
mod stack;

pub use registry::Registry;
pub use stack::Stack;

/// Register bank plus operand stack.
#[derive(Debug, Default, Clone)]
pub struct Cpu {
    pub registers: Registry,
    pub stack: Stack,
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registers
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }
}
