use std::fmt;
use std::io::{ErrorKind, Read};

use crate::constants::MAX;
use crate::cpu::{Cpu, Stack};
use crate::errors::VmError;
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::router::AddressRouter;
use crate::utils::{register_index, wrap, Word};

/// What an executed instruction asks the engine to do next.
///
/// Actions never touch the program counter themselves; a `Jump` is committed
/// by the engine after the action returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Continue,
    Jump(Word),
    Output(u8),
    Halt,
}

/// Mutable state an instruction may touch while executing.
pub struct ExecContext<'a> {
    pub cpu: &'a mut Cpu,
    pub memory: &'a mut Memory,
    /// Address of the instruction following this one.
    pub next_pc: Word,
    pub input: &'a mut dyn Read,
}

/// One decoded instruction. Built fresh every fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub address: Word,
    pub opcode: Opcode,
    operands: [Word; 3],
}

impl Instruction {
    pub fn new(address:Word, opcode:Opcode, args:&[Word]) -> Self {
        let mut operands = [0; 3];
        operands[..args.len()].copy_from_slice(args);
        Self { address, opcode, operands }
    }

    /// Decodes the instruction at `address` using `read` to fetch words.
    /// Operand words wrap around the top of memory.
    pub fn decode<F>(address:Word, mut read:F) -> Result<Instruction, VmError>
    where
        F: FnMut(Word) -> Result<Word, VmError>,
    {
        let opcode = Opcode::from_word(read(address)?)?;
        let mut operands = [0; 3];
        for (i, slot) in operands.iter_mut().take(opcode.arity()).enumerate() {
            *slot = read(wrap(address as u32 + 1 + i as u32))?;
        }
        Ok(Self { address, opcode, operands })
    }

    pub fn operands(&self) -> &[Word] {
        &self.operands[..self.opcode.arity()]
    }

    /// Encoded length in words.
    pub fn len(&self) -> Word {
        1 + self.opcode.arity() as Word
    }

    pub fn execute(&self, ctx:ExecContext<'_>) -> Result<Effect, VmError> {
        use Opcode::*;

        let ExecContext { cpu, memory, next_pc, input } = ctx;
        let Cpu { registers, stack } = cpu;
        let mut router = AddressRouter::new(memory, registers);
        let [a, b, c] = self.operands;

        match self.opcode {
            Halt => Ok(Effect::Halt),
            Set => {
                let v = router.resolve_value(b)?;
                store(&mut router, a, v)
            }
            Push => {
                stack.push(router.resolve_value(a)?);
                Ok(Effect::Continue)
            }
            Pop => {
                let v = stack.pop()?;
                store(&mut router, a, v)
            }
            Eq => {
                let v = router.resolve_value(b)? == router.resolve_value(c)?;
                store(&mut router, a, v as Word)
            }
            Gt => {
                let v = router.resolve_value(b)? > router.resolve_value(c)?;
                store(&mut router, a, v as Word)
            }
            Jmp => Ok(Effect::Jump(router.resolve_value(a)? % MAX)),
            Jt => {
                if router.resolve_value(a)? % MAX != 0 {
                    Ok(Effect::Jump(router.resolve_value(b)? % MAX))
                } else {
                    Ok(Effect::Continue)
                }
            }
            Jf => {
                if router.resolve_value(a)? % MAX == 0 {
                    Ok(Effect::Jump(router.resolve_value(b)? % MAX))
                } else {
                    Ok(Effect::Continue)
                }
            }
            Add => binary(&mut router, a, b, c, |x, y| Ok(wrap(x as u32 + y as u32))),
            Mult => binary(&mut router, a, b, c, |x, y| Ok(wrap(x as u32 * y as u32))),
            Mod => binary(&mut router, a, b, c, |x, y| {
                if y == 0 {
                    Err(VmError::DivisionByZero)
                } else {
                    Ok(x % y)
                }
            }),
            And => binary(&mut router, a, b, c, |x, y| Ok(x & y)),
            Or => binary(&mut router, a, b, c, |x, y| Ok(x | y)),
            Not => {
                let v = !router.resolve_value(b)? % MAX;
                store(&mut router, a, v)
            }
            Rmem => {
                let v = router.resolve_read(router.resolve_value(b)?)?;
                store(&mut router, a, v)
            }
            Wmem => {
                let addr = router.resolve_value(a)?;
                let v = router.resolve_value(b)?;
                store(&mut router, addr, v)
            }
            Call => {
                let target = router.resolve_value(a)?;
                stack.push(next_pc);
                Ok(Effect::Jump(target % MAX))
            }
            Ret => Ok(ret(stack)),
            Out => Ok(Effect::Output(router.resolve_value(a)? as u8)),
            In => {
                let byte = read_byte(input)?;
                store(&mut router, a, byte as Word)
            }
            Noop => Ok(Effect::Continue),
        }
    }
}

fn store(router:&mut AddressRouter<'_>, addr:Word, value:Word) -> Result<Effect, VmError> {
    router.resolve_write(addr, value)?;
    Ok(Effect::Continue)
}

fn binary<F>(router:&mut AddressRouter<'_>, a:Word, b:Word, c:Word, f:F) -> Result<Effect, VmError>
where
    F: FnOnce(Word, Word) -> Result<Word, VmError>,
{
    let v = f(router.resolve_value(b)?, router.resolve_value(c)?)?;
    store(router, a, v)
}

// empty stack on ret halts the machine
fn ret(stack:&mut Stack) -> Effect {
    match stack.pop() {
        Ok(addr) => Effect::Jump(addr % MAX),
        Err(_) => Effect::Halt,
    }
}

fn read_byte(input:&mut dyn Read) -> Result<u8, VmError> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Err(VmError::InputExhausted),
            Ok(_) => return Ok(buf[0]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(VmError::Input(e)),
        }
    }
}

fn fmt_operand(f:&mut fmt::Formatter, raw:Word) -> fmt::Result {
    match register_index(raw) {
        Some(r) => write!(f, "r{}", r),
        None if raw < MAX => write!(f, "{:#06X}", raw),
        None => write!(f, "??{:#06X}", raw),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for raw in self.operands() {
            f.write_str("\t")?;
            fmt_operand(f, *raw)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct Fixture {
        cpu: Cpu,
        memory: Memory,
        input: io::Cursor<Vec<u8>>,
    }

    impl Fixture {
        fn new() -> Self {
            Self { cpu: Cpu::new(), memory: Memory::new(), input: io::Cursor::new(Vec::new()) }
        }

        fn run(&mut self, opcode:Opcode, args:&[Word]) -> Result<Effect, VmError> {
            let instr = Instruction::new(100, opcode, args);
            instr.execute(ExecContext {
                cpu: &mut self.cpu,
                memory: &mut self.memory,
                next_pc: 100 + instr.len(),
                input: &mut self.input,
            })
        }
    }

    const A:Word = MAX;
    const B:Word = MAX + 1;

    #[test]
    fn test_jump_family() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run(Opcode::Jmp, &[5]).unwrap(), Effect::Jump(5));
        assert_eq!(fx.run(Opcode::Jt, &[1, 7]).unwrap(), Effect::Jump(7));
        assert_eq!(fx.run(Opcode::Jt, &[0, 7]).unwrap(), Effect::Continue);
        assert_eq!(fx.run(Opcode::Jf, &[0, 7]).unwrap(), Effect::Jump(7));
        assert_eq!(fx.run(Opcode::Jf, &[1, 7]).unwrap(), Effect::Continue);
    }

    #[test]
    fn test_jump_through_register() {
        let mut fx = Fixture::new();
        fx.cpu.registers[1] = 1234;
        assert_eq!(fx.run(Opcode::Jt, &[B, B]).unwrap(), Effect::Jump(1234));
        assert_eq!(fx.run(Opcode::Jf, &[A, B]).unwrap(), Effect::Jump(1234));
    }

    #[test]
    fn test_out_low_byte() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run(Opcode::Out, &[65]).unwrap(), Effect::Output(b'A'));
        fx.cpu.registers[0] = 0x0142;
        assert_eq!(fx.run(Opcode::Out, &[A]).unwrap(), Effect::Output(0x42));
    }

    #[test]
    fn test_arithmetic_wraps() {
        let mut fx = Fixture::new();
        fx.run(Opcode::Add, &[A, 32758, 15]).unwrap();
        assert_eq!(fx.cpu.registers[0], 5);
        fx.run(Opcode::Mult, &[A, 0x00FF, 4]).unwrap();
        assert_eq!(fx.cpu.registers[0], 0x00FF * 4);
        fx.run(Opcode::Mod, &[A, 0x00FF, 10]).unwrap();
        assert_eq!(fx.cpu.registers[0], 5);
        fx.run(Opcode::Not, &[A, 0x00AA]).unwrap();
        assert_eq!(fx.cpu.registers[0], 0x7F55);
        fx.run(Opcode::Or, &[A, 0x00AA, 0x00DE]).unwrap();
        assert_eq!(fx.cpu.registers[0], 254);
    }

    #[test]
    fn test_mod_by_zero() {
        let mut fx = Fixture::new();
        fx.cpu.registers[0] = 9;
        assert!(matches!(fx.run(Opcode::Mod, &[A, 4, 0]), Err(VmError::DivisionByZero)));
        assert_eq!(fx.cpu.registers[0], 9);
    }

    #[test]
    fn test_pop_empty() {
        let mut fx = Fixture::new();
        assert!(matches!(fx.run(Opcode::Pop, &[A]), Err(VmError::EmptyStack)));
    }

    #[test]
    fn test_call_and_ret() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run(Opcode::Call, &[40]).unwrap(), Effect::Jump(40));
        assert_eq!(fx.cpu.stack.head(1), vec![102]);
        assert_eq!(fx.run(Opcode::Ret, &[]).unwrap(), Effect::Jump(102));
        assert_eq!(fx.run(Opcode::Ret, &[]).unwrap(), Effect::Halt);
    }

    #[test]
    fn test_rmem_wmem() {
        let mut fx = Fixture::new();
        fx.cpu.registers[1] = 300;
        fx.run(Opcode::Wmem, &[B, 77]).unwrap();
        assert_eq!(fx.memory.get(300), 77);
        fx.run(Opcode::Rmem, &[A, B]).unwrap();
        assert_eq!(fx.cpu.registers[0], 77);
    }

    #[test]
    fn test_in() {
        let mut fx = Fixture::new();
        fx.input = io::Cursor::new(b"x".to_vec());
        fx.run(Opcode::In, &[A]).unwrap();
        assert_eq!(fx.cpu.registers[0], b'x' as Word);
        assert!(matches!(fx.run(Opcode::In, &[A]), Err(VmError::InputExhausted)));
    }

    #[test]
    fn test_invalid_operand() {
        let mut fx = Fixture::new();
        assert!(matches!(fx.run(Opcode::Push, &[0x9000]), Err(VmError::InvalidAddress(0x9000))));
        assert!(fx.cpu.stack.is_empty());
    }

    #[test]
    fn test_decode_and_display() {
        let mut memory = Memory::new();
        memory.write_program(&[9, MAX, MAX + 1, 4]);
        let instr = Instruction::decode(0, |a| Ok(memory.get(a))).unwrap();
        assert_eq!(instr.opcode, Opcode::Add);
        assert_eq!(instr.operands(), &[MAX, MAX + 1, 4]);
        assert_eq!(instr.len(), 4);
        assert_eq!(instr.to_string(), "add\tr0\tr1\t0x0004");
    }
}
