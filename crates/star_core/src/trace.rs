//! Optional diagnostic trace output.
//!
//! The engine emits free-text lines describing each step; a sink is purely
//! observational and never affects results.

/// Receives diagnostic lines from a simulation run.
pub trait TraceSink {
    fn line(&mut self, text: &str);
}

/// Discards all trace output. Use when no diagnostics are wanted.
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn line(&mut self, _text: &str) {}
}

impl<F: FnMut(&str)> TraceSink for F {
    fn line(&mut self, text: &str) {
        self(text);
    }
}

/// Collects trace lines into a vector, mainly for tests.
#[derive(Default)]
pub struct BufferTrace {
    pub lines: Vec<String>,
}

impl TraceSink for BufferTrace {
    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}
