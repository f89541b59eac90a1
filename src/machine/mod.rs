mod monitor;

pub use monitor::{Monitor, Snapshot, Status};

use std::io::{self, Read, Write};
use std::thread;
use tracing::{debug, error, info, warn};

use crate::config::VmConfig;
use crate::cpu::{Cpu, Registry, Stack};
use crate::errors::{LoadError, VmError};
use crate::instruction::{Effect, ExecContext, Instruction};
use crate::loader;
use crate::memory::Memory;
use crate::router::{AddressRouter, Target};
use crate::utils::{wrap, Word};

/// The fetch-decode-execute engine.
///
/// Faults inside the loop are recorded in a single error slot and execution
/// carries on with the next instruction. Only `halt`, `ret` on an empty stack,
/// exhausted input, the step limit or a stop request end a run.
pub struct Machine {
    pub cpu: Cpu,
    pub mem: Memory,
    pc: Word,
    status: Status,
    last_error: Option<VmError>,
    // rendered once per fault, snapshots copy it
    last_error_msg: Option<String>,
    error_count: u64,
    counter: u64,
    last_instruction: Option<Instruction>,
    terminal: Box<dyn Write + Send>,
    input: Box<dyn Read + Send>,
    config: VmConfig,
    monitor: Monitor,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    pub fn with_config(config:VmConfig) -> Self {
        let m0 = Self {
            cpu: Cpu::new(),
            mem: Memory::new(),
            pc: 0,
            status: Status::New,
            last_error: None,
            last_error_msg: None,
            error_count: 0,
            counter: 0,
            last_instruction: None,
            terminal: Box::new(io::sink()),
            input: Box::new(io::empty()),
            config,
            monitor: Monitor::new(),
        };
        m0.publish();
        debug!("vm created");
        m0
    }

    /// Builds a machine whose memory holds the image read from `source`.
    /// No machine exists if the image cannot be read in full.
    pub fn from_image(source:impl Read, config:VmConfig) -> Result<Self, LoadError> {
        let mut m0 = Self::with_config(config);
        loader::load(source, &mut m0.mem)?;
        Ok(m0)
    }

    pub fn set_terminal(&mut self, terminal:impl Write + Send + 'static) {
        self.terminal = Box::new(terminal);
    }

    pub fn set_input(&mut self, input:impl Read + Send + 'static) {
        self.input = Box::new(input);
    }

    pub fn monitor(&self) -> Monitor {
        self.monitor.clone()
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_halted(&self) -> bool {
        self.status == Status::Finished
    }

    /// Current program counter.
    pub fn address(&self) -> Word {
        self.pc
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn last_error(&self) -> Option<&VmError> {
        self.last_error.as_ref()
    }

    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    pub fn last_instruction(&self) -> Option<&Instruction> {
        self.last_instruction.as_ref()
    }

    pub fn registry(&self) -> &Registry {
        &self.cpu.registers
    }

    pub fn stack(&self) -> &Stack {
        &self.cpu.stack
    }

    /// Reads through the same memory/register aliasing instructions use.
    pub fn peek(&self, addr:Word) -> Result<Word, VmError> {
        Ok(match Target::of(addr)? {
            Target::Memory(a) => self.mem.get(a),
            Target::Register(r) => self.cpu.registers.get(r),
        })
    }

    pub fn poke(&mut self, addr:Word, value:Word) -> Result<(), VmError> {
        AddressRouter::new(&mut self.mem, &mut self.cpu.registers).resolve_write(addr, value)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.status,
            address: self.pc,
            registers: self.cpu.registers.values(),
            stack_len: self.cpu.stack.len(),
            stack_head: self.cpu.stack.head(self.config.stack_head_len),
            counter: self.counter,
            error_count: self.error_count,
            last_error: self.last_error_msg.clone(),
        }
    }

    /// Runs until the machine finishes. A machine runs at most once.
    pub fn run(&mut self) -> Result<(), VmError> {
        if self.status != Status::New {
            return Err(VmError::AlreadyStarted);
        }
        let pacing = self.config.pacing();

        while self.step() == Status::Running {
            if self.monitor.stop_requested() {
                info!(addr = self.pc, cnt = self.counter, "stop requested");
                self.finish();
                break;
            }
            if !pacing.is_zero() {
                thread::sleep(pacing);
            }
        }
        self.publish();

        info!(addr = self.pc, cnt = self.counter, errors = self.error_count, "finished");
        Ok(())
    }

    /// Executes a single instruction and returns the resulting status.
    pub fn step(&mut self) -> Status {
        match self.status {
            Status::Finished => return Status::Finished,
            Status::New => {
                self.status = Status::Running;
                info!("started");
            }
            Status::Running => {}
        }
        self.fetch_and_execute();
        self.publish();
        self.status
    }

    fn fetch_and_execute(&mut self) {
        let address = self.pc;
        let decoded = {
            let router = AddressRouter::new(&mut self.mem, &mut self.cpu.registers);
            Instruction::decode(address, |a| router.resolve_read(a))
        };

        let instr = match decoded {
            Ok(instr) => instr,
            Err(e) => {
                // skip the offending word and keep going
                self.pc = wrap(address as u32 + 1);
                self.record(e.context(format!("decode at {:#06X}", address)));
                self.tick();
                return;
            }
        };
        self.pc = wrap(address as u32 + instr.len() as u32);
        debug!(addr = address, cnt = self.counter, ops = ?instr.operands(), "{}", instr.opcode);

        let result = instr.execute(ExecContext {
            cpu: &mut self.cpu,
            memory: &mut self.mem,
            next_pc: self.pc,
            input: &mut *self.input,
        });
        self.last_instruction = Some(instr);

        match result {
            Ok(Effect::Halt) => {
                self.halt();
                return;
            }
            Ok(Effect::Jump(target)) => self.pc = target,
            Ok(Effect::Output(byte)) => self.emit(&[byte]),
            Ok(Effect::Continue) => {}
            Err(VmError::InputExhausted) => {
                warn!(addr = address, "input exhausted, stopping");
                self.record(VmError::InputExhausted);
                self.finish();
                return;
            }
            Err(e) => self.record(e.context(format!("{} at {:#06X}", instr.opcode, address))),
        }
        self.tick();
    }

    fn tick(&mut self) {
        self.counter += 1;
        if let Some(limit) = self.config.max_steps {
            if self.counter >= limit && self.status == Status::Running {
                self.record(VmError::StepLimit(limit));
                self.finish();
            }
        }
    }

    fn halt(&mut self) {
        let summary = match &self.last_instruction {
            Some(instr) => format!("TERMINATING: mem ind = {}, {}\n", self.pc, instr),
            None => format!("TERMINATING: mem ind = {}\n", self.pc),
        };
        self.emit(summary.as_bytes());
        self.finish();
    }

    fn finish(&mut self) {
        self.status = Status::Finished;
    }

    fn emit(&mut self, bytes:&[u8]) {
        let written = self.terminal.write_all(bytes).and_then(|_| self.terminal.flush());
        if let Err(e) = written {
            self.record(VmError::Terminal(e));
        }
    }

    fn record(&mut self, e:VmError) {
        error!(addr = self.pc, cnt = self.counter, "{}", e);
        self.error_count += 1;
        self.last_error_msg = Some(e.to_string());
        self.last_error = Some(e);
    }

    fn publish(&self) {
        self.monitor.publish(self.snapshot());
    }
}
