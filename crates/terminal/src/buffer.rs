//! Local command-buffer tracking (§4.7 "Command buffer tracking"): an
//! advisory, byte-wise view of what's been typed, kept only to give the
//! suggestion engine context. It is NOT a terminal emulator and may drift
//! from the remote shell's true cursor state.

const MAX_HISTORY: usize = 100;

#[derive(Debug, Default)]
pub struct CommandBuffer {
    current: String,
    history: Vec<String>,
}

impl CommandBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk of bytes written to the PTY's stdin, interpreting
    /// them per §4.7: `\r`/`\n` finalizes the line, `\x7f`/`\b` pops the
    /// last character, printable bytes (>= 0x20) append.
    pub fn feed(&mut self, data: &[u8]) {
        for &b in data {
            match b {
                b'\r' | b'\n' => self.finalize_line(),
                0x7f | 0x08 => {
                    self.current.pop();
                }
                b if b >= 0x20 => self.current.push(b as char),
                _ => {}
            }
        }
    }

    fn finalize_line(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let line = std::mem::take(&mut self.current);
        self.history.push(line);
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }
    }

    #[must_use]
    pub fn current_line(&self) -> &str {
        &self.current
    }

    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carriage_return_finalizes_current_line() {
        let mut buf = CommandBuffer::new();
        buf.feed(b"echo hi\r");
        assert_eq!(buf.current_line(), "");
        assert_eq!(buf.history(), ["echo hi"]);
    }

    #[test]
    fn backspace_pops_last_character() {
        let mut buf = CommandBuffer::new();
        buf.feed(b"lsz");
        buf.feed(&[0x7f]);
        assert_eq!(buf.current_line(), "ls");
    }

    #[test]
    fn history_caps_at_one_hundred_entries() {
        let mut buf = CommandBuffer::new();
        for i in 0..150 {
            buf.feed(format!("cmd{i}\r").as_bytes());
        }
        assert_eq!(buf.history().len(), 100);
        assert_eq!(buf.history()[0], "cmd50");
    }

    #[test]
    fn empty_line_finalize_is_a_no_op() {
        let mut buf = CommandBuffer::new();
        buf.feed(b"\r\r\r");
        assert!(buf.history().is_empty());
    }
}
