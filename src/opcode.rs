use std::fmt;

use crate::errors::VmError;
use crate::utils::Word;

/// Every instruction the machine understands, tagged by its encoded value.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Halt = 0,
    Set = 1,
    Push = 2,
    Pop = 3,
    Eq = 4,
    Gt = 5,
    Jmp = 6,
    Jt = 7,
    Jf = 8,
    Add = 9,
    Mult = 10,
    Mod = 11,
    And = 12,
    Or = 13,
    Not = 14,
    Rmem = 15,
    Wmem = 16,
    Call = 17,
    Ret = 18,
    Out = 19,
    In = 20,
    Noop = 21,
}

impl Opcode {
    pub const ALL:[Opcode; 22] = [
        Opcode::Halt, Opcode::Set, Opcode::Push, Opcode::Pop, Opcode::Eq, Opcode::Gt,
        Opcode::Jmp, Opcode::Jt, Opcode::Jf, Opcode::Add, Opcode::Mult, Opcode::Mod,
        Opcode::And, Opcode::Or, Opcode::Not, Opcode::Rmem, Opcode::Wmem, Opcode::Call,
        Opcode::Ret, Opcode::Out, Opcode::In, Opcode::Noop,
    ];

    /// Opcodes are 8 bits wide; only the low byte of the fetched word counts.
    pub fn from_word(word:Word) -> Result<Opcode, VmError> {
        let opcode = word as u8;
        Self::ALL
            .get(opcode as usize)
            .copied()
            .ok_or(VmError::CommandNotFound { opcode })
    }

    /// Number of operand words following the opcode.
    pub fn arity(self) -> usize {
        use Opcode::*;

        match self {
            Halt | Ret | Noop => 0,
            Push | Pop | Jmp | Call | Out | In => 1,
            Set | Jt | Jf | Not | Rmem | Wmem => 2,
            Eq | Gt | Add | Mult | Mod | And | Or => 3,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;

        match self {
            Halt => "halt",
            Set => "set",
            Push => "push",
            Pop => "pop",
            Eq => "eq",
            Gt => "gt",
            Jmp => "jmp",
            Jt => "jt",
            Jf => "jf",
            Add => "add",
            Mult => "mult",
            Mod => "mod",
            And => "and",
            Or => "or",
            Not => "not",
            Rmem => "rmem",
            Wmem => "wmem",
            Call => "call",
            Ret => "ret",
            Out => "out",
            In => "in",
            Noop => "noop",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
