//! Human-readable progress output.
//!
//! A `Console` is handed to whoever reports progress; it owns the cursor
//! position instead of keeping it in process-wide state. Every line is also
//! mirrored to `tracing`. Output errors are ignored: progress text is best
//! effort and must never fail an install.

use std::io::{self, Write};

pub struct Console {
    out: Box<dyn Write + Send>,
    column: usize,
    line: usize,
}

impl Console {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            column: 0,
            line: 0,
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Discards output (still logs).
    pub fn sink() -> Self {
        Self::new(Box::new(io::sink()))
    }

    /// Current cursor position as `(column, line)`.
    pub fn position(&self) -> (usize, usize) {
        (self.column, self.line)
    }

    /// Reset the cursor and print the banner.
    pub fn clear(&mut self) {
        self.column = 0;
        self.line = 0;
        self.info(&format!(
            "bootstrap {} - verify and repair",
            env!("CARGO_PKG_VERSION")
        ));
        self.blank();
    }

    /// Print an empty line (not logged).
    pub fn blank(&mut self) {
        self.emit("\n");
    }

    /// Print one line of progress.
    pub fn info(&mut self, msg: &str) {
        tracing::info!("{}", msg);
        self.emit(msg);
        self.emit("\n");
    }

    /// Print one line describing a recoverable problem.
    pub fn warn(&mut self, msg: &str) {
        tracing::warn!("{}", msg);
        self.emit(msg);
        self.emit("\n");
    }

    fn emit(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
    }
}
