use std::ops::{Index, IndexMut};

use crate::constants::TOM;
use crate::utils::Word;

/// Flat RAM covering the whole address space, zeroed on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    // heap allocated; 64KiB is too much to keep moving around on the stack
    mem: Vec<Word>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self { mem: vec![0; TOM] }
    }

    pub fn get(&self, addr:Word) -> Word {
        self.mem[addr as usize]
    }

    pub fn set(&mut self, addr:Word, value:Word) {
        self.mem[addr as usize] = value;
    }

    pub fn len(&self) -> usize {
        self.mem.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mem.is_empty()
    }

    /// Copies `words` in starting at address 0. Words are stored verbatim.
    pub fn write_program(&mut self, words:&[Word]) {
        self.mem[..words.len()].copy_from_slice(words);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Word> {
        self.mem.iter()
    }
}

impl Index<Word> for Memory {
    type Output = Word;

    fn index(&self, addr:Word) -> &Word {
        &self.mem[addr as usize]
    }
}

impl IndexMut<Word> for Memory {
    fn index_mut(&mut self, addr:Word) -> &mut Word {
        &mut self.mem[addr as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_rw() {
        let mut mem = Memory::new();

        assert_eq!(mem[(TOM - 1) as u16], 0); // last word in memory
        assert_eq!(mem[0], 0);

        mem[(TOM - 1) as u16] = 0x0F0F;
        mem.set(0, 0x00AA);

        assert_eq!(mem.get((TOM - 1) as u16), 0x0F0F);
        assert_eq!(mem[0], 0x00AA);
    }

    #[test]
    #[should_panic]
    fn test_mem_read_invalid() {
        let mem = Memory::new();
        mem.get(TOM as u16);
    }
}
