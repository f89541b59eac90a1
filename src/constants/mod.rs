pub const TOM:usize = 0x8000; // Top Of Memory, exclusive (mem: 0x0000-0x7FFF inclusive)
pub const NUM_REG:usize = 8;

/// Address space size, also the modulus for every stored value.
pub const MAX:u16 = TOM as u16;

// raw words in [REG_BASE, REG_END) alias registers 0..7
pub const REG_BASE:u16 = MAX;
pub const REG_END:u16 = MAX + NUM_REG as u16;

pub const STACK_HEAD_LEN:usize = 10;
pub const DEFAULT_PACING_MICROS:u64 = 10;
