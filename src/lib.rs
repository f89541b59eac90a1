//! Interpreter for the synacor 15-bit virtual machine.
//!
//! Memory and the eight registers share one address space: `0..0x8000` is RAM,
//! `0x8000..0x8008` are the registers. Programs are flat little-endian images
//! loaded at address 0.

pub mod config;
pub mod constants;
pub mod cpu;
pub mod errors;
pub mod hypervisor_controller;
pub mod instruction;
pub mod loader;
pub mod machine;
pub mod memory;
pub mod opcode;
pub mod router;
pub mod terminal;
pub mod utils;


pub use config::VmConfig;
pub use constants::{MAX, NUM_REG, TOM};
pub use errors::{LoadError, VmError};
pub use machine::{Machine, Monitor, Snapshot, Status};
pub use terminal::SharedTerminal;
pub use utils::Word;
