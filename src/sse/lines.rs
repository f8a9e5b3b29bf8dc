//! Byte-chunk to line splitting.
//!
//! Transport chunks are arbitrary: a chunk may end in the middle of a line,
//! between `\r` and `\n`, or inside a multi-byte UTF-8 sequence. Bytes are
//! buffered until a `\n` arrives and only complete lines are decoded.

/// Incremental line splitter for a single response body.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buffer: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completes, in order.
    ///
    /// Returned lines carry no `\n`; a single trailing `\r` is stripped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let scan_from = self.buffer.len();
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut line_start = 0;
        for idx in scan_from..self.buffer.len() {
            if self.buffer[idx] == b'\n' {
                lines.push(Self::decode_line(&self.buffer[line_start..idx]));
                line_start = idx + 1;
            }
        }
        if line_start > 0 {
            self.buffer.drain(..line_start);
        }
        lines
    }

    /// Take whatever is left after the final newline, if anything.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        Some(Self::decode_line(&rest))
    }

    /// Bytes received but not yet terminated by a newline.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    fn decode_line(raw: &[u8]) -> String {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        String::from_utf8_lossy(raw).into_owned()
    }
}
