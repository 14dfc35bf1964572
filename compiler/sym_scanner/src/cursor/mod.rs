//! Position-tracked cursor over a scalar slice.
//!
//! Every fallible operation reports the same [`ScanError`], which only
//! carries the position the cursor was at when the read was attempted.
//! Failed operations never move the cursor: a `read_scalars(5)` with three
//! scalars left fails and leaves the position where it was.

use thiserror::Error;

/// Uniform "unexpected input" failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("unexpected input at position {position}")]
pub struct ScanError {
    /// Number of scalars consumed before the failing read.
    pub position: usize,
}

/// Reader over a borrowed scalar slice.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    scalars: &'a [char],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(scalars: &'a [char]) -> Self {
        Cursor { scalars, pos: 0 }
    }

    /// Scalars consumed so far.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Total number of scalars in the input.
    #[inline]
    pub fn len(&self) -> usize {
        self.scalars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty()
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.scalars.len()
    }

    /// The error a failed read at the current position produces.
    #[inline]
    pub fn unexpected(&self) -> ScanError {
        ScanError { position: self.pos }
    }

    /// Rewind to the start of the input.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Next scalar without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.scalars.get(self.pos).copied()
    }

    /// Like [`peek`](Self::peek) but fails at end of input.
    #[inline]
    pub fn require_peek(&self) -> Result<char, ScanError> {
        self.peek().ok_or_else(|| self.unexpected())
    }

    /// Consume one scalar.
    #[inline]
    pub fn read_scalar(&mut self) -> Result<char, ScanError> {
        let c = self.require_peek()?;
        self.pos += 1;
        Ok(c)
    }

    /// Consume one scalar that satisfies `pred`.
    pub fn read(&mut self, pred: impl Fn(char) -> bool) -> Result<char, ScanError> {
        match self.peek() {
            Some(c) if pred(c) => {
                self.pos += 1;
                Ok(c)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Consume exactly `count` scalars.
    pub fn read_scalars(&mut self, count: usize) -> Result<String, ScanError> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|&end| end <= self.scalars.len())
            .ok_or_else(|| self.unexpected())?;
        let text = self.scalars[self.pos..end].iter().collect();
        self.pos = end;
        Ok(text)
    }

    /// Consume scalars for as long as `pred` holds. May return an empty string.
    pub fn read_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.scalars[start..self.pos].iter().collect()
    }

    /// Consume scalars up to (not including) `stop`. Fails if `stop` never appears.
    pub fn read_until(&mut self, stop: char) -> Result<String, ScanError> {
        let rest = &self.scalars[self.pos.min(self.scalars.len())..];
        let offset = rest
            .iter()
            .position(|&c| c == stop)
            .ok_or_else(|| self.unexpected())?;
        let text = rest[..offset].iter().collect();
        self.pos += offset;
        Ok(text)
    }

    /// Consume `expected` if it is next. Returns whether it was consumed.
    #[inline]
    pub fn conditional(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume the whole literal `expected` if it is next, otherwise nothing.
    pub fn conditional_str(&mut self, expected: &str) -> bool {
        let mut at = self.pos;
        for c in expected.chars() {
            if self.scalars.get(at) != Some(&c) {
                return false;
            }
            at += 1;
        }
        self.pos = at;
        true
    }

    /// Consume `expected` or fail.
    pub fn match_scalar(&mut self, expected: char) -> Result<(), ScanError> {
        if self.conditional(expected) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Consume the literal `expected` or fail without moving.
    pub fn match_str(&mut self, expected: &str) -> Result<(), ScanError> {
        if self.conditional_str(expected) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Advance `count` scalars.
    pub fn skip(&mut self, count: usize) -> Result<(), ScanError> {
        if count > self.scalars.len().saturating_sub(self.pos) {
            return Err(self.unexpected());
        }
        self.pos += count;
        Ok(())
    }

    /// Move back `count` scalars. Fails if fewer than `count` were consumed.
    pub fn backtrack(&mut self, count: usize) -> Result<(), ScanError> {
        if count > self.pos {
            return Err(self.unexpected());
        }
        self.pos -= count;
        Ok(())
    }

    /// Consume and return everything left.
    pub fn remainder(&mut self) -> String {
        let start = self.pos.min(self.scalars.len());
        self.pos = self.scalars.len();
        self.scalars[start..].iter().collect()
    }

    /// Everything in the input, regardless of position.
    pub fn source(&self) -> String {
        self.scalars.iter().collect()
    }

    /// Read a run of decimal digits, if one is next.
    ///
    /// Overflow saturates at `u64::MAX`, so an oversized count always fails
    /// whatever bound the caller checks it against.
    pub fn conditional_int(&mut self) -> Option<u64> {
        let start = self.pos;
        let mut value: u64 = 0;
        while let Some(digit) = self.peek().and_then(|c| c.to_digit(10)) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(digit)))
                .unwrap_or(u64::MAX);
            self.pos += 1;
        }
        (self.pos != start).then_some(value)
    }

    /// Read a run of decimal digits or fail.
    pub fn read_int(&mut self) -> Result<u64, ScanError> {
        self.conditional_int().ok_or_else(|| self.unexpected())
    }
}

#[cfg(test)]
mod tests;
