use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::constants::NUM_REG;
use crate::utils::Word;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    New,
    Running,
    Finished,
}

impl fmt::Display for Status {
    fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result {
        use Status::*;

        match self {
            New => write!(f, "new"),
            Running => write!(f, "running"),
            Finished => write!(f, "finished"),
        }
    }
}

/// Point-in-time view of the engine, published after every instruction.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub status: Status,
    pub address: Word,
    pub registers: [Word; NUM_REG],
    pub stack_len: usize,
    /// Most recent first.
    pub stack_head: Vec<Word>,
    pub counter: u64,
    pub error_count: u64,
    pub last_error: Option<String>,
}

impl Snapshot {
    pub fn registers_human(&self) -> Vec<String> {
        self.registers.iter().map(|v| v.to_string()).collect()
    }
}

/// Read-only handle on a running engine. Cheap to clone and `Send`.
#[derive(Debug, Default, Clone)]
pub struct Monitor {
    latest: Arc<Mutex<Snapshot>>,
    stop: Arc<AtomicBool>,
}

impl Monitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn status(&self) -> Status {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner).status
    }

    /// Asks the engine to finish at its next pacing point.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub(crate) fn publish(&self, snapshot:Snapshot) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}
