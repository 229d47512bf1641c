//! UTF-8 byte-sequence decoder
//!
//! Decodes one code point at a time from a raw byte buffer. Unlike
//! `std::str::from_utf8`, the decoder never gives up on bad input: an
//! undecodable span is reported as a byte count to skip, so callers can
//! escape or replace it and carry on from the next valid sequence.

/// Result of a single [`decode`] step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// Number of bytes consumed by this step
    pub len: usize,
    /// The decoded character, or `None` when `len` bytes are undecodable
    pub ch: Option<char>,
}

impl Decoded {
    /// Whether this step covers an undecodable span
    pub fn is_invalid(&self) -> bool {
        self.ch.is_none()
    }
}

/// Decode the sequence starting at `start`.
///
/// Returns `None` once `start` reaches the end of `buf`. When no valid
/// sequence starts at `start`, the returned length is the distance to the
/// next position where one does, or the rest of the buffer if none does.
pub fn decode(buf: &[u8], start: usize) -> Option<Decoded> {
    if start >= buf.len() {
        return None;
    }

    if let Some((len, ch)) = sequence_at(buf, start) {
        return Some(Decoded { len, ch: Some(ch) });
    }

    let len = (start + 1..buf.len())
        .find(|&i| sequence_at(buf, i).is_some())
        .map_or(buf.len() - start, |i| i - start);

    Some(Decoded { len, ch: None })
}

/// Match one well-formed sequence at `i`.
///
/// The byte ranges follow the Unicode well-formed UTF-8 table, which rules
/// out overlong forms, the surrogate block behind `ED`, and code points past
/// U+10FFFF behind `F4`.
fn sequence_at(buf: &[u8], i: usize) -> Option<(usize, char)> {
    let rest = &buf[i..];
    let len = match *rest {
        [0x00..=0x7F, ..] => 1,
        [0xC2..=0xDF, 0x80..=0xBF, ..] => 2,
        [0xE0, 0xA0..=0xBF, 0x80..=0xBF, ..]
        | [0xE1..=0xEC, 0x80..=0xBF, 0x80..=0xBF, ..]
        | [0xED, 0x80..=0x9F, 0x80..=0xBF, ..]
        | [0xEE..=0xEF, 0x80..=0xBF, 0x80..=0xBF, ..] => 3,
        [0xF0, 0x90..=0xBF, 0x80..=0xBF, 0x80..=0xBF, ..]
        | [0xF1..=0xF3, 0x80..=0xBF, 0x80..=0xBF, 0x80..=0xBF, ..]
        | [0xF4, 0x80..=0x8F, 0x80..=0xBF, 0x80..=0xBF, ..] => 4,
        _ => return None,
    };

    let ch = std::str::from_utf8(&rest[..len]).ok()?.chars().next()?;
    Some((len, ch))
}

/// Iterator over the decoded spans of a buffer.
///
/// Yields `(offset, Decoded)` pairs that tile the whole buffer.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    /// Create a decoder over `buf`
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }
}

impl Iterator for Decoder<'_> {
    type Item = (usize, Decoded);

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.pos;
        let decoded = decode(self.buf, offset)?;
        self.pos += decoded.len;
        Some((offset, decoded))
    }
}
