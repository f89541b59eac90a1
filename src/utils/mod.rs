use crate::constants::{MAX, REG_BASE, REG_END};

/// Machine word. Logically 15 bits; the top bit is headroom used by raw operands
/// to signal a register reference.
pub type Word = u16;

/// Reduces a wide arithmetic result into the address space.
pub fn wrap(value:u32) -> Word {
    (value % MAX as u32) as Word
}

pub fn is_register(raw:Word) -> bool {
    (REG_BASE..REG_END).contains(&raw)
}

/// Register index for a raw word, if it aliases one.
pub fn register_index(raw:Word) -> Option<usize> {
    if is_register(raw) {
        Some((raw - REG_BASE) as usize)
    } else {
        None
    }
}

pub fn word_from_le(bytes:[u8; 2]) -> Word {
    u16::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(32758 + 15), 5);
        assert_eq!(wrap(MAX as u32), 0);
        assert_eq!(wrap(12), 12);
    }

    #[test]
    fn test_register_index() {
        assert_eq!(register_index(32768), Some(0));
        assert_eq!(register_index(32775), Some(7));
        assert_eq!(register_index(32776), None);
        assert_eq!(register_index(42), None);
    }

    #[test]
    fn test_word_from_le() {
        assert_eq!(word_from_le([0x13, 0x00]), 19);
        assert_eq!(word_from_le([0x00, 0x80]), 0x8000);
    }
}
