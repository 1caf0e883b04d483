//! Stream primitives: a borrowing read cursor and an append-only build buffer

use crate::error::{Error, Result};

/// Read cursor over an immutable byte slice.
///
/// Parsing borrows the caller's input; no copies are taken until a field
/// materializes its value.
#[derive(Debug)]
pub struct ReadStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ReadStream<'a> {
    /// Wrap a byte slice in a cursor positioned at the start
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Current cursor position from the start of the input
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Read exactly `length` bytes, advancing the cursor.
    ///
    /// Fails when fewer than `length` bytes remain.
    pub fn read_exact(&mut self, length: usize) -> Result<&'a [u8]> {
        if self.remaining() < length {
            return Err(Error::FieldSize {
                expected: length,
                actual: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + length];
        self.pos += length;
        Ok(out)
    }
}

/// Append-only output buffer for building.
///
/// Owned by the top-level build call and handed down the recursion by
/// reference; children only append.
#[derive(Debug, Default)]
pub struct WriteStream {
    buf: Vec<u8>,
}

impl WriteStream {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View the bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the stream, returning the built bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Append raw bytes unconditionally
    pub fn append(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Append `data` after checking it is exactly `length` bytes long
    pub fn write_exact(&mut self, length: usize, data: &[u8]) -> Result<()> {
        if data.len() != length {
            return Err(Error::FieldSize {
                expected: length,
                actual: data.len(),
            });
        }
        self.append(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_in_sequence() {
        let data = [1u8, 2, 3, 4, 5];
        let mut s = ReadStream::new(&data);
        assert_eq!(s.read_exact(2).unwrap(), &[1, 2]);
        assert_eq!(s.remaining(), 3);
        assert_eq!(s.read_exact(3).unwrap(), &[3, 4, 5]);
        assert_eq!(s.remaining(), 0);
    }

    #[test]
    fn short_read_reports_sizes() {
        let data = [1u8, 2];
        let mut s = ReadStream::new(&data);
        let err = s.read_exact(3).unwrap_err();
        assert_eq!(
            err,
            Error::FieldSize {
                expected: 3,
                actual: 2
            }
        );
        // A failed read does not advance the cursor
        assert_eq!(s.read_exact(2).unwrap(), &[1, 2]);
    }

    #[test]
    fn write_exact_checks_length() {
        let mut out = WriteStream::new();
        out.write_exact(2, &[0xAA, 0xBB]).unwrap();
        assert!(out.write_exact(3, &[1, 2]).is_err());
        assert_eq!(out.into_bytes(), vec![0xAA, 0xBB]);
    }
}
