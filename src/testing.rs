//! Helpers shared by tests that run a whole program.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Writer whose bytes stay readable after the program that owned it ends.
#[derive(Clone, Default)]
pub struct SharedOutput(Arc<Mutex<Vec<u8>>>);

impl SharedOutput {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }

    /// Feed everything written so far through an 80x24 terminal emulator.
    pub fn parser(&self) -> vt100::Parser {
        let mut parser = vt100::Parser::new(24, 80, 0);
        parser.process(&self.bytes());
        parser
    }

    /// What the terminal shows.
    pub fn screen(&self) -> String {
        self.parser().screen().contents()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
