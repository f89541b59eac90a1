use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Append-only byte buffer shared between the engine and whoever renders it.
#[derive(Debug, Default, Clone)]
pub struct SharedTerminal {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl SharedTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buf.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn contents(&self) -> Vec<u8> {
        self.lock().clone()
    }

    pub fn contents_lossy(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    /// Drains everything written so far.
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.lock())
    }
}

impl Write for SharedTerminal {
    fn write(&mut self, data:&[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() {
        let term = SharedTerminal::new();
        let mut writer = term.clone();
        writer.write_all(b"hi").unwrap();
        assert_eq!(term.contents(), b"hi");
        assert_eq!(term.take(), b"hi");
        assert!(term.contents().is_empty());
    }
}
