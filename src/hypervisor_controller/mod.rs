use crate::constants::MAX;
use crate::instruction::Instruction;
use crate::machine::Snapshot;
use crate::memory::Memory;
use crate::utils::{wrap, Word};

/// Disassembles `start..=end`, one line per instruction.
///
/// Words that are not a known opcode print as `???` and advance by one word.
pub fn disassemble_range(mem:&Memory, start:Word, end:Word) -> Vec<String> {
    let end = end.min(MAX - 1) as u32;
    let mut lines = Vec::new();
    let mut addr = start as u32;
    while addr <= end {
        let here = addr as Word;
        match Instruction::decode(here, |a| Ok(mem.get(a))) {
            Ok(instr) => {
                lines.push(format!("{:#06X}:\t{}", here, instr));
                addr += instr.len() as u32;
            }
            Err(_) => {
                lines.push(format!("{:#06X}:\t??? ({:#06X})", here, mem.get(here)));
                addr += 1;
            }
        }
    }
    lines
}

/// Like `disassemble_range`, but starting at `addr` and stopping after `count`
/// instructions. Wraps around the top of memory.
pub fn disassemble_count(mem:&Memory, addr:Word, count:usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(count);
    let mut addr = addr;
    for _ in 0..count {
        match Instruction::decode(addr, |a| Ok(mem.get(a))) {
            Ok(instr) => {
                lines.push(format!("{:#06X}:\t{}", addr, instr));
                addr = wrap(addr as u32 + instr.len() as u32);
            }
            Err(_) => {
                lines.push(format!("{:#06X}:\t??? ({:#06X})", addr, mem.get(addr)));
                addr = wrap(addr as u32 + 1);
            }
        }
    }
    lines
}

pub fn dump_state(snapshot:&Snapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

pub fn format_registers(snapshot:&Snapshot) -> String {
    snapshot
        .registers_human()
        .iter()
        .enumerate()
        .map(|(i, v)| format!("r{}: {}", i, v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line summary for periodic status logging.
pub fn format_status(snapshot:&Snapshot) -> String {
    format!(
        "[status]: {} [addr]: {:#06X} [cnt]: {} [stack depth]: {} [errors]: {}",
        snapshot.status, snapshot.address, snapshot.counter, snapshot.stack_len, snapshot.error_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Status;

    #[test]
    fn test_disassemble_range() {
        let mut mem = Memory::new();
        mem.write_program(&[19, 65, 250, 7, MAX + 1, 9, 0]);
        let lines = disassemble_range(&mem, 0, 6);
        assert_eq!(
            lines,
            vec![
                "0x0000:\tout\t0x0041",
                "0x0002:\t??? (0x00FA)",
                "0x0003:\tjt\tr1\t0x0009",
                "0x0006:\thalt",
            ]
        );
    }

    #[test]
    fn test_disassemble_clamps_to_memory() {
        let mem = Memory::new();
        let lines = disassemble_range(&mem, MAX - 2, 0xFFFF);
        assert_eq!(lines, vec!["0x7FFE:\thalt", "0x7FFF:\thalt"]);
    }

    #[test]
    fn test_disassemble_count_wraps() {
        let mut mem = Memory::new();
        mem[MAX - 1] = 21;
        let lines = disassemble_count(&mem, MAX - 1, 2);
        assert_eq!(lines, vec!["0x7FFF:\tnoop", "0x0000:\thalt"]);
    }

    #[test]
    fn test_dump_state() {
        let snapshot = Snapshot { status: Status::Finished, address: 7, counter: 2, ..Snapshot::default() };
        let json = dump_state(&snapshot).unwrap();
        let back:Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
        assert!(json.contains("\"Finished\""));
    }

    #[test]
    fn test_format_registers() {
        let mut snapshot = Snapshot::default();
        snapshot.registers[3] = 42;
        let text = format_registers(&snapshot);
        assert_eq!(text.lines().count(), 8);
        assert_eq!(text.lines().nth(3), Some("r3: 42"));
    }
}
