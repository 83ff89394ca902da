// src/exec/line_buffer.rs

/// Incremental splitter for a byte stream.
///
/// Pipes deliver output in arbitrary chunks: one chunk may hold several
/// lines, and a line may span several chunks. `LineBuffer` keeps the
/// trailing partial line until its terminator arrives.
///
/// Lines end at `\n`; a `\r` right before it is stripped as well. Bytes are
/// decoded per complete line, so multi-byte characters split across chunks
/// survive. Invalid UTF-8 is replaced, not rejected.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Feed a chunk and return every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.pending.extend_from_slice(&rest[..pos]);
            lines.push(self.take_line());
            rest = &rest[pos + 1..];
        }
        self.pending.extend_from_slice(rest);

        lines
    }

    /// Flush an unterminated last line at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        Some(self.take_line())
    }

    /// Whether a partial line is waiting for its terminator.
    pub fn has_partial(&self) -> bool {
        !self.pending.is_empty()
    }

    fn take_line(&mut self) -> String {
        if self.pending.last() == Some(&b'\r') {
            self.pending.pop();
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        line
    }
}
