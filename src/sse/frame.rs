//! Line-oriented SSE frame decoding.
//!
//! Only the subset of the SSE wire format the server actually emits is
//! honored:
//!
//! ```text
//! event: <name>
//! data: <json fragment>
//! data: <json fragment>      (optional, concatenated without separator)
//!                            (blank line terminates the frame)
//! ```
//!
//! `id:`, `retry:` and `:` comment lines are recognized only so that they
//! can be ignored.

pub const EVENT_PREFIX: &str = "event:";
pub const DATA_PREFIX: &str = "data:";

/// Classification of a single line of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// `event: <name>`, remainder trimmed
    Event(String),
    /// `data: <payload>`, remainder trimmed
    Data(String),
    /// Frame terminator
    Empty,
    /// Anything else: comments, ids, retry directives, unknown prefixes
    Ignored,
}

/// Classify one line. The line must not contain its terminating newline.
pub fn parse_sse_line(line: &str) -> SseLine {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(rest) = line.strip_prefix(EVENT_PREFIX) {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix(DATA_PREFIX) {
        return SseLine::Data(rest.trim().to_string());
    }

    SseLine::Ignored
}

/// One decoded unit of the stream, before JSON interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Event name from the last `event:` line of the frame.
    pub event: String,
    /// Every `data:` remainder of the frame, joined with no separator.
    pub data: String,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }
}

/// Stateful frame accumulator.
///
/// A frame is emitted only when a blank line arrives after an event name
/// was recorded. A blank line with no event name is a no-op and leaves any
/// accumulated data in place. Each decoder belongs to exactly one stream.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    current_event: Option<String>,
    data: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line, returning the frame it completes, if any.
    pub fn feed_line(&mut self, line: &str) -> Option<Frame> {
        match parse_sse_line(line) {
            SseLine::Event(name) => {
                self.current_event = Some(name);
                None
            }
            SseLine::Data(fragment) => {
                self.data.push_str(&fragment);
                None
            }
            SseLine::Empty => self.flush(),
            SseLine::Ignored => None,
        }
    }

    /// End-of-stream flush for a frame that never saw its blank line.
    ///
    /// The default pipeline does not call this; a trailing unterminated
    /// frame is dropped unless the caller opts in.
    pub fn finish(&mut self) -> Option<Frame> {
        self.flush()
    }

    /// True when an event name has been recorded but not yet flushed.
    pub fn has_pending(&self) -> bool {
        self.current_event.is_some()
    }

    pub fn reset(&mut self) {
        self.current_event = None;
        self.data.clear();
    }

    fn flush(&mut self) -> Option<Frame> {
        let event = self.current_event.take()?;
        let data = std::mem::take(&mut self.data);
        Some(Frame { event, data })
    }
}

/// Decode a completed body in one pass.
///
/// Lines are cut exactly as [`LineSplitter`](super::LineSplitter) cuts a
/// live stream: only `\n`-terminated lines count, one trailing `\r` is
/// stripped, and whatever follows the last newline is discarded.
pub fn decode_text(text: &str) -> Vec<Frame> {
    let mut decoder = FrameDecoder::new();
    text.split_inclusive('\n')
        .filter_map(|line| line.strip_suffix('\n'))
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter_map(|line| decoder.feed_line(line))
        .collect()
}
