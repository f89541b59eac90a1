use std::ops::{Index, IndexMut};

use crate::constants::NUM_REG;
use crate::utils::Word;

/// The eight general purpose registers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Registry([Word; NUM_REG]);

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index:usize) -> Word {
        self.0[index]
    }

    pub fn set(&mut self, index:usize, value:Word) {
        self.0[index] = value;
    }

    pub fn values(&self) -> [Word; NUM_REG] {
        self.0
    }
}

impl Index<usize> for Registry {
    type Output = Word;

    fn index(&self, index:usize) -> &Word {
        &self.0[index]
    }
}

impl IndexMut<usize> for Registry {
    fn index_mut(&mut self, index:usize) -> &mut Word {
        &mut self.0[index]
    }
}
