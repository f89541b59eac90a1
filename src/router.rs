//! Single place deciding whether an address means RAM or a register.
//!
//! Addresses below `MAX` hit memory. `MAX..MAX+8` alias registers 0..7.
//! Everything above that is rejected with `InvalidAddress` rather than being
//! folded back onto a register by modulus.

use tracing::trace;

use crate::constants::MAX;
use crate::cpu::Registry;
use crate::errors::VmError;
use crate::memory::Memory;
use crate::utils::{register_index, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Memory(Word),
    Register(usize),
}

impl Target {
    pub fn of(addr:Word) -> Result<Target, VmError> {
        if addr < MAX {
            Ok(Target::Memory(addr))
        } else {
            register_index(addr)
                .map(Target::Register)
                .ok_or(VmError::InvalidAddress(addr))
        }
    }
}

pub struct AddressRouter<'a> {
    memory: &'a mut Memory,
    registry: &'a mut Registry,
}

impl<'a> AddressRouter<'a> {
    pub fn new(memory:&'a mut Memory, registry:&'a mut Registry) -> Self {
        Self { memory, registry }
    }

    pub fn resolve_read(&self, addr:Word) -> Result<Word, VmError> {
        let target = Target::of(addr)?;
        trace!(addr, ?target, "read");
        Ok(match target {
            Target::Memory(a) => self.memory.get(a),
            Target::Register(r) => self.registry.get(r),
        })
    }

    /// Stores `value % MAX` at `addr`.
    pub fn resolve_write(&mut self, addr:Word, value:Word) -> Result<(), VmError> {
        let target = Target::of(addr)?;
        let value = value % MAX;
        trace!(addr, ?target, value, "write");
        match target {
            Target::Memory(a) => self.memory.set(a, value),
            Target::Register(r) => self.registry.set(r, value),
        }
        Ok(())
    }

    /// Interprets a raw operand as a value: a literal below `MAX`, otherwise
    /// the contents of the aliased register.
    pub fn resolve_value(&self, raw:Word) -> Result<Word, VmError> {
        if raw < MAX {
            Ok(raw)
        } else {
            self.resolve_read(raw)
        }
    }
}
