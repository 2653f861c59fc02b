//! Growable byte writer with reservation and back-patching.

use crate::error::{ByteError, ByteResult};
use crate::width::Width;

/// A slot written as zeros whose final value is filled in later.
///
/// Returned by [`ByteWriter::reserve`] and consumed by [`ByteWriter::fill`],
/// so a reservation can be filled exactly once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a reservation must be filled before the writer is finished"]
pub struct Reservation {
    name: &'static str,
    position: usize,
    width: Width,
}

impl Reservation {
    /// Returns the name given when the slot was reserved.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the absolute position of the slot.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the width of the slot.
    #[must_use]
    pub const fn width(&self) -> Width {
        self.width
    }
}

/// A little-endian writer accumulating into a growable buffer.
///
/// Call [`finish`](Self::finish) to get the final bytes; it fails if any
/// reservation is still outstanding.
#[derive(Debug, Default)]
pub struct ByteWriter {
    bytes: Vec<u8>,
    /// Outstanding reservations as (position, name).
    pending: Vec<(usize, &'static str)>,
}

impl ByteWriter {
    /// Creates a new empty `ByteWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `ByteWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            pending: Vec::new(),
        }
    }

    /// Returns the current write position (the number of bytes written).
    #[must_use]
    pub fn position(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Writes a `u8`.
    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    /// Writes an `i8`.
    pub fn write_i8(&mut self, value: i8) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian `u16`.
    pub fn write_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian `i16`.
    pub fn write_i16(&mut self, value: i16) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian `i32`.
    pub fn write_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian `u64`.
    pub fn write_u64(&mut self, value: u64) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian `i64`.
    pub fn write_i64(&mut self, value: i64) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian `f32`.
    pub fn write_f32(&mut self, value: f32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes an unsigned word of the given width.
    ///
    /// # Errors
    ///
    /// Returns [`ByteError::ValueOutOfRange`] if `value` doesn't fit in `width`.
    pub fn write_word(&mut self, width: Width, value: u64) -> ByteResult<()> {
        if !width.fits_unsigned(value) {
            return Err(ByteError::ValueOutOfRange {
                value,
                bits: width.bits(),
            });
        }
        match width {
            Width::W32 => self.write_u32(value as u32),
            Width::W64 => self.write_u64(value),
        }
        Ok(())
    }

    /// Writes a signed word of the given width.
    ///
    /// # Errors
    ///
    /// Returns [`ByteError::ValueOutOfRange`] if `value` doesn't fit in `width`.
    pub fn write_sword(&mut self, width: Width, value: i64) -> ByteResult<()> {
        if !width.fits_signed(value) {
            return Err(ByteError::ValueOutOfRange {
                value: value as u64,
                bits: width.bits(),
            });
        }
        match width {
            Width::W32 => self.write_i32(value as i32),
            Width::W64 => self.write_i64(value),
        }
        Ok(())
    }

    /// Writes `count` zero bytes.
    pub fn write_zeros(&mut self, count: usize) {
        self.bytes.resize(self.bytes.len() + count, 0);
    }

    /// Writes zeros until the position is a multiple of `align`.
    pub fn pad_to(&mut self, align: usize) {
        if align <= 1 {
            return;
        }
        let rem = self.bytes.len() % align;
        if rem != 0 {
            self.bytes.resize(self.bytes.len() + align - rem, 0);
        }
    }

    /// Reserves a zeroed word slot to be filled later.
    pub fn reserve(&mut self, name: &'static str, width: Width) -> Reservation {
        let position = self.bytes.len();
        self.bytes.resize(position + width.bytes(), 0);
        self.pending.push((position, name));
        Reservation {
            name,
            position,
            width,
        }
    }

    /// Back-patches a reserved slot with its final value.
    ///
    /// # Errors
    ///
    /// Returns [`ByteError::ValueOutOfRange`] if `value` doesn't fit in the
    /// slot, or [`ByteError::UnknownReservation`] if the slot was not handed
    /// out by this writer.
    pub fn fill(&mut self, reservation: Reservation, value: u64) -> ByteResult<()> {
        let Reservation {
            position, width, ..
        } = reservation;
        let idx = self
            .pending
            .iter()
            .position(|(pos, _)| *pos == position)
            .ok_or(ByteError::UnknownReservation { position })?;
        if !width.fits_unsigned(value) {
            return Err(ByteError::ValueOutOfRange {
                value,
                bits: width.bits(),
            });
        }
        let end = position + width.bytes();
        match width {
            Width::W32 => self.bytes[position..end].copy_from_slice(&(value as u32).to_le_bytes()),
            Width::W64 => self.bytes[position..end].copy_from_slice(&value.to_le_bytes()),
        }
        self.pending.swap_remove(idx);
        Ok(())
    }

    /// Back-patches a reserved slot with the current write position.
    pub fn fill_with_position(&mut self, reservation: Reservation) -> ByteResult<()> {
        let position = self.bytes.len() as u64;
        self.fill(reservation, position)
    }

    /// Returns the number of reservations not yet filled.
    #[must_use]
    pub fn pending_reservations(&self) -> usize {
        self.pending.len()
    }

    /// Finishes writing and returns the byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ByteError::UnfilledReservation`] naming the first slot that
    /// was reserved but never filled.
    pub fn finish(self) -> ByteResult<Vec<u8>> {
        if let Some((_, name)) = self.pending.iter().min_by_key(|(pos, _)| *pos) {
            return Err(ByteError::UnfilledReservation { name });
        }
        Ok(self.bytes)
    }
}
