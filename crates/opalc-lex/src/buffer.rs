//! Twin-buffer input stream.
//!
//! The lexer never touches the source stream directly; it reads single
//! bytes through a [`TwinBuffer`], a byte array of length `2 * SEGMENT`
//! treated as two segments that are refilled alternately from the
//! underlying reader. The forward cursor moves modulo the array length, so
//! a lexeme that straddles the midpoint or the wrap-around point is still
//! addressable as a begin/end cursor pair.
//!
//! Retraction is what makes maximal munch cheap: a state that reads one
//! character past the end of a lexeme calls [`TwinBuffer::retract`] and the
//! character is simply re-read on the next advance. When a retraction steps
//! back across a segment boundary, a one-slot flag suppresses the next
//! refill so the segment being re-read is not overwritten.
//!
//! End of input is modeled in-band: the refill that drains the reader
//! plants a NUL byte immediately after the last real byte, and the DFA
//! treats NUL as the input-ending sentinel.

use std::io::{self, Read};

/// Size of one buffer segment in bytes.
pub const SEGMENT: usize = 256;

/// Total buffer capacity (two segments).
const CAPACITY: usize = 2 * SEGMENT;

/// Double-segment byte buffer with a single forward cursor.
pub struct TwinBuffer<R> {
    source: R,
    bytes: [u8; CAPACITY],
    /// Next byte to be consumed, in `[0, CAPACITY)`.
    forward: usize,
    /// Suppresses exactly one refill after a retraction crossed a
    /// segment boundary.
    skip_refill: bool,
}

impl<R: Read> TwinBuffer<R> {
    /// Create a buffer over `source` and fill the first segment.
    pub fn new(source: R) -> io::Result<Self> {
        let mut buffer = Self {
            source,
            bytes: [0; CAPACITY],
            forward: 0,
            skip_refill: false,
        };
        buffer.refill(0)?;
        Ok(buffer)
    }

    /// Current cursor position. Valid as a lexeme begin/end marker.
    pub fn pos(&self) -> usize {
        self.forward
    }

    /// Consume and return the next byte.
    ///
    /// Crossing from one segment into the other refills the segment being
    /// entered, unless a prior boundary-crossing retraction armed the
    /// skip flag.
    pub fn advance(&mut self) -> io::Result<u8> {
        let byte = self.bytes[self.forward];
        let next = (self.forward + 1) % CAPACITY;
        if next == SEGMENT || next == 0 {
            if self.skip_refill {
                self.skip_refill = false;
            } else {
                self.refill(next)?;
            }
        }
        self.forward = next;
        Ok(byte)
    }

    /// Move the cursor back one byte.
    ///
    /// If the step crosses a segment boundary, the next refill is
    /// suppressed so the segment about to be re-read survives.
    pub fn retract(&mut self) {
        if self.forward == 0 || self.forward == SEGMENT {
            self.skip_refill = true;
        }
        self.forward = (self.forward + CAPACITY - 1) % CAPACITY;
    }

    /// Move the cursor back two bytes.
    ///
    /// Used by states that peek two characters ahead (`12.x`, `<-x`).
    /// Crossing either boundary arms the skip flag.
    pub fn retract_two(&mut self) {
        self.retract();
        self.retract();
    }

    /// Copy the lexeme between two cursor positions, handling wrap-around.
    ///
    /// `begin` is the cursor position saved before the first character of
    /// the lexeme was consumed; `end` is the position after the last.
    pub fn lexeme(&self, begin: usize, end: usize) -> Vec<u8> {
        if begin <= end {
            self.bytes[begin..end].to_vec()
        } else {
            let mut out = Vec::with_capacity(CAPACITY - begin + end);
            out.extend_from_slice(&self.bytes[begin..]);
            out.extend_from_slice(&self.bytes[..end]);
            out
        }
    }

    /// Refill one segment starting at `start` (0 or `SEGMENT`).
    ///
    /// Reads until the segment is full or the reader is drained; a partial
    /// fill gets a NUL sentinel planted right after the last real byte.
    fn refill(&mut self, start: usize) -> io::Result<()> {
        let mut filled = 0;
        while filled < SEGMENT {
            let n = self
                .source
                .read(&mut self.bytes[start + filled..start + SEGMENT])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled < SEGMENT {
            self.bytes[start + filled] = 0;
        }
        Ok(())
    }
}
