use std::io::{BufReader, ErrorKind, Read};
use tracing::debug;

use crate::constants::TOM;
use crate::errors::LoadError;
use crate::memory::Memory;
use crate::utils::{word_from_le, Word};

/// Reads a headerless little-endian image of 16-bit words.
///
/// The image only reaches `memory` once it has been read completely, so a
/// failed load never leaves a partial program behind.
pub fn load(source:impl Read, memory:&mut Memory) -> Result<usize, LoadError> {
    let words = read_image(source)?;
    memory.write_program(&words);
    debug!(words = words.len(), "program image loaded");
    Ok(words.len())
}

pub fn read_image(source:impl Read) -> Result<Vec<Word>, LoadError> {
    let mut reader = BufReader::new(source);
    let mut words = Vec::new();
    loop {
        let mut pair = [0u8; 2];
        match fill(&mut reader, &mut pair)? {
            0 => break,
            1 => return Err(LoadError::TrailingByte { offset: words.len() * 2 }),
            _ => {}
        }
        if words.len() == TOM {
            return Err(LoadError::ImageTooLarge { words: words.len() + 1 });
        }
        words.push(word_from_le(pair));
    }
    Ok(words)
}

// like read_exact, but reports how much was read before a clean EOF
fn fill(reader:&mut impl Read, buf:&mut [u8]) -> Result<usize, LoadError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(LoadError::Io(e)),
        }
    }
    Ok(filled)
}
