//! Seekable byte reader with bounded operations.

use std::ops::{Deref, DerefMut};

use crate::error::{ByteError, ByteResult};
use crate::width::Width;

/// A little-endian reader over an in-memory byte buffer.
///
/// All read operations are bounds-checked and return errors on failure.
/// The reader never panics on malformed input.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` positioned at the start of `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the length of the underlying buffer.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of bytes remaining after the current position.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current absolute position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to an absolute position.
    ///
    /// Seeking to exactly the end of the buffer is allowed.
    pub fn seek(&mut self, position: u64) -> ByteResult<()> {
        self.pos = self.check_position(position)?;
        Ok(())
    }

    /// Moves the cursor to `position` for the lifetime of the returned guard.
    ///
    /// The previous position is restored when the guard is dropped, including
    /// when the caller returns early with an error. Guards nest: an inner guard
    /// restores the position the outer guard set.
    pub fn at(&mut self, position: u64) -> ByteResult<Scoped<'_, 'a>> {
        let target = self.check_position(position)?;
        let restore = self.pos;
        self.pos = target;
        Ok(Scoped {
            reader: self,
            restore,
        })
    }

    /// Returns `len` bytes starting at absolute `offset` without moving the cursor.
    pub fn slice(&self, offset: u64, len: u64) -> ByteResult<&'a [u8]> {
        let start = self.check_position(offset)?;
        let end = offset
            .checked_add(len)
            .ok_or(ByteError::SeekOutOfBounds {
                position: u64::MAX,
                len: self.data.len(),
            })
            .and_then(|end| self.check_position(end))?;
        Ok(&self.data[start..end])
    }

    /// Skips padding until the position is a multiple of `align`.
    ///
    /// Alignment is relative to the start of this reader's buffer.
    pub fn align_to(&mut self, align: usize) -> ByteResult<()> {
        if align <= 1 {
            return Ok(());
        }
        let rem = self.pos % align;
        if rem == 0 {
            return Ok(());
        }
        let skip = align - rem;
        self.ensure_bytes(skip)?;
        self.pos += skip;
        Ok(())
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> ByteResult<&'a [u8]> {
        self.ensure_bytes(len)?;
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> ByteResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Reads an `i8`.
    pub fn read_i8(&mut self) -> ByteResult<i8> {
        Ok(i8::from_le_bytes(self.read_array::<1>()?))
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16(&mut self) -> ByteResult<u16> {
        Ok(u16::from_le_bytes(self.read_array::<2>()?))
    }

    /// Reads a little-endian `i16`.
    pub fn read_i16(&mut self) -> ByteResult<i16> {
        Ok(i16::from_le_bytes(self.read_array::<2>()?))
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> ByteResult<u32> {
        Ok(u32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32(&mut self) -> ByteResult<i32> {
        Ok(i32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads a little-endian `u64`.
    pub fn read_u64(&mut self) -> ByteResult<u64> {
        Ok(u64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Reads a little-endian `i64`.
    pub fn read_i64(&mut self) -> ByteResult<i64> {
        Ok(i64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Reads a little-endian `f32`.
    pub fn read_f32(&mut self) -> ByteResult<f32> {
        Ok(f32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads an unsigned word of the given width, widened to `u64`.
    pub fn read_word(&mut self, width: Width) -> ByteResult<u64> {
        match width {
            Width::W32 => self.read_u32().map(u64::from),
            Width::W64 => self.read_u64(),
        }
    }

    /// Reads a signed word of the given width, sign-extended to `i64`.
    pub fn read_sword(&mut self, width: Width) -> ByteResult<i64> {
        match width {
            Width::W32 => self.read_i32().map(i64::from),
            Width::W64 => self.read_i64(),
        }
    }

    fn check_position(&self, position: u64) -> ByteResult<usize> {
        match usize::try_from(position) {
            Ok(pos) if pos <= self.data.len() => Ok(pos),
            _ => Err(ByteError::SeekOutOfBounds {
                position,
                len: self.data.len(),
            }),
        }
    }

    fn ensure_bytes(&self, bytes: usize) -> ByteResult<()> {
        let available = self.remaining();
        if bytes > available {
            return Err(ByteError::UnexpectedEof {
                requested: bytes,
                available,
            });
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> ByteResult<[u8; N]> {
        self.ensure_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }
}

/// A reader temporarily moved to another position.
///
/// Dereferences to the underlying [`ByteReader`]; dropping it restores the
/// position that was current when [`ByteReader::at`] was called.
#[derive(Debug)]
pub struct Scoped<'r, 'a> {
    reader: &'r mut ByteReader<'a>,
    restore: usize,
}

impl<'a> Deref for Scoped<'_, 'a> {
    type Target = ByteReader<'a>;

    fn deref(&self) -> &Self::Target {
        self.reader
    }
}

impl DerefMut for Scoped<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.reader
    }
}

impl Drop for Scoped<'_, '_> {
    fn drop(&mut self) {
        self.reader.pos = self.restore;
    }
}
