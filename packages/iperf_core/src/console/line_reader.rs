use super::LINE_BUF_LEN;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7f;

pub enum LineEvent<'a> {
    None,
    /// A whole character was accepted; the terminal should echo it.
    Echo(&'a str),
    /// Last character removed; the terminal should rub it out.
    Erased,
    Complete(&'a str),
    Overflow,
    /// Line ended but was not valid UTF-8.
    Garbled,
}

pub struct LineReader<const N: usize = LINE_BUF_LEN> {
    line_buf: [u8; N],
    line_len: usize,
    overflowed: bool,
}

impl<const N: usize> LineReader<N> {
    pub const fn new() -> Self {
        Self {
            line_buf: [0; N],
            line_len: 0,
            overflowed: false,
        }
    }

    pub fn push_byte(&mut self, byte: u8) -> LineEvent<'_> {
        if byte == b'\r' || byte == b'\n' {
            if self.overflowed {
                self.overflowed = false;
                return LineEvent::None;
            }
            if self.line_len == 0 {
                return LineEvent::None;
            }
            let complete_len = self.line_len;
            self.line_len = 0;
            return match core::str::from_utf8(&self.line_buf[..complete_len]) {
                Ok(line) => LineEvent::Complete(line),
                Err(_) => LineEvent::Garbled,
            };
        }

        if self.overflowed {
            return LineEvent::None;
        }

        if byte == BACKSPACE || byte == DELETE {
            if self.line_len == 0 {
                return LineEvent::None;
            }
            self.line_len = self.char_start(self.line_len - 1);
            return LineEvent::Erased;
        }

        if self.line_len < N {
            self.line_buf[self.line_len] = byte;
            self.line_len += 1;
            return self.echo_last_char();
        }

        self.line_len = 0;
        self.overflowed = true;
        LineEvent::Overflow
    }
}

impl<const N: usize> LineReader<N> {
    /// Start of the character whose last byte is at `end`.
    fn char_start(&self, end: usize) -> usize {
        let mut start = end;
        while start > 0 && end - start < 3 && is_continuation(self.line_buf[start]) {
            start -= 1;
        }
        start
    }

    /// Echoes the trailing character once all of its bytes are in.
    fn echo_last_char(&self) -> LineEvent<'_> {
        let end = self.line_len;
        let start = self.char_start(end - 1);
        let expected = match self.line_buf[start] {
            0x00..=0x7f => 1,
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => return LineEvent::None,
        };
        if end - start != expected {
            return LineEvent::None;
        }
        match core::str::from_utf8(&self.line_buf[start..end]) {
            Ok(text) => LineEvent::Echo(text),
            Err(_) => LineEvent::None,
        }
    }
}

const fn is_continuation(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}

impl<const N: usize> Default for LineReader<N> {
    fn default() -> Self {
        Self::new()
    }
}
