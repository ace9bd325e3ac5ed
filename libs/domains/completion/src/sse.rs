//! Incremental decoder for `text/event-stream` bodies.
//!
//! Network reads do not respect frame boundaries: one read may hold several
//! frames, half a frame, or half of a multi-byte character. The decoder keeps
//! the unterminated tail and only emits frames once their blank-line
//! terminator has arrived.

/// Payload that marks the end of a stream.
pub const DONE_MARKER: &str = "[DONE]";

/// One dispatched server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// The `event:` field, when present.
    pub event: Option<String>,
    /// All `data:` lines joined with `\n`.
    pub data: String,
}

impl SseFrame {
    pub fn is_done(&self) -> bool {
        self.data.trim() == DONE_MARKER
    }

    pub fn is_error(&self) -> bool {
        self.event.as_deref() == Some("error")
    }
}

/// Lines may end in `\r\n`, `\n` or `\r`; a frame ends at the first empty line.
#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Bytes before this offset hold no frame terminator.
    scanned: usize,
    at_line_start: bool,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            at_line_start: true,
        }
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return every frame completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        let mut consumed = 0;
        while let Some((end, terminator)) = self.next_frame_end() {
            if let Some(frame) = parse_block(&String::from_utf8_lossy(&self.buffer[consumed..end])) {
                frames.push(frame);
            }
            consumed = end + terminator;
        }

        if consumed > 0 {
            self.buffer.drain(..consumed);
            self.scanned -= consumed;
        }
        frames
    }

    /// Flush a trailing frame that was never terminated by a blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        self.at_line_start = true;
        parse_block(&String::from_utf8_lossy(&rest))
    }

    /// Advance the scan to the next empty line and return its offset and length.
    ///
    /// A `\r` at the end of the buffer that closes a non-empty line is left
    /// unscanned until the next byte shows whether it is half of a `\r\n`.
    fn next_frame_end(&mut self) -> Option<(usize, usize)> {
        while self.scanned < self.buffer.len() {
            let i = self.scanned;
            let terminator = match self.buffer[i] {
                b'\n' => 1,
                b'\r' => match self.buffer.get(i + 1) {
                    Some(b'\n') => 2,
                    Some(_) => 1,
                    None if self.at_line_start => 1,
                    None => return None,
                },
                _ => {
                    self.at_line_start = false;
                    self.scanned += 1;
                    continue;
                }
            };

            self.scanned += terminator;
            if self.at_line_start {
                return Some((i, terminator));
            }
            self.at_line_start = true;
        }
        None
    }
}

fn parse_block(block: &str) -> Option<SseFrame> {
    let mut frame = SseFrame::default();
    let mut data_lines: Vec<&str> = Vec::new();

    for line in block.split(['\r', '\n']) {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => data_lines.push(value),
            "event" => frame.event = Some(value.to_string()),
            _ => {}
        }
    }

    if data_lines.is_empty() {
        return None;
    }
    frame.data = data_lines.join("\n");
    Some(frame)
}
