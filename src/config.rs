use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use std::{fs, io};

use crate::constants::{DEFAULT_PACING_MICROS, STACK_HEAD_LEN};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Delay between instructions. Zero disables pacing.
    pub pacing_micros: u64,
    /// How many stack entries a snapshot carries.
    pub stack_head_len: usize,
    pub max_steps: Option<u64>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            pacing_micros: DEFAULT_PACING_MICROS,
            stack_head_len: STACK_HEAD_LEN,
            max_steps: None,
        }
    }
}

impl VmConfig {
    /// Unpaced config, used by tests and batch runs.
    pub fn unpaced() -> Self {
        Self { pacing_micros: 0, ..Self::default() }
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_micros(self.pacing_micros)
    }

    pub fn from_json_str(s:&str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn from_file(path:impl AsRef<Path>) -> io::Result<Self> {
        let str = fs::read_to_string(path)?;
        Self::from_json_str(&str).map_err(io::Error::from)
    }
}
