/// A byte cursor over a selector string.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being parsed.
    pub s: &'a str,
    /// Current index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Consumes `b` if it is next.
    pub fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.i += 1;
            true
        } else {
            false
        }
    }

    /// Consumes bytes while `pred` holds and returns them.
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.i;
        while self.peek().is_some_and(&pred) {
            self.i += 1;
        }
        &self.s[start..self.i]
    }

    /// Skips ASCII whitespace, returning whether any was skipped.
    pub fn skip_whitespace(&mut self) -> bool {
        !self.eat_while(|b| b.is_ascii_whitespace()).is_empty()
    }

    /// Everything not yet consumed.
    pub fn rest(&self) -> &'a str {
        &self.s[self.i.min(self.s.len())..]
    }
}
