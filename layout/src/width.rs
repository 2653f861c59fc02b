//! Natural-word field codec.
//!
//! Every table codec reads and writes its variable-size fields through
//! [`WidthCodec`] so that only this module branches on the word width.

use bytestream::{ByteReader, ByteWriter, Reservation, Width};

use crate::error::{FormatError, FormatResult};
use crate::variant::Variant;

/// Reads and writes natural-width words for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthCodec {
    width: Width,
}

impl WidthCodec {
    /// Creates the codec for a variant.
    #[must_use]
    pub const fn for_variant(variant: Variant) -> Self {
        Self {
            width: variant.width(),
        }
    }

    /// Returns the natural width.
    #[must_use]
    pub const fn width(self) -> Width {
        self.width
    }

    /// Returns the natural word size in bytes.
    #[must_use]
    pub const fn word_size(self) -> usize {
        self.width.bytes()
    }

    /// Reads an unsigned natural word.
    pub fn read_natural(self, reader: &mut ByteReader<'_>) -> FormatResult<u64> {
        Ok(reader.read_word(self.width)?)
    }

    /// Reads a signed natural word.
    pub fn read_signed(self, reader: &mut ByteReader<'_>) -> FormatResult<i64> {
        Ok(reader.read_sword(self.width)?)
    }

    /// Reads a natural word that must be zero.
    pub fn read_zero(self, reader: &mut ByteReader<'_>, field: &'static str) -> FormatResult<()> {
        let value = self.read_signed(reader)?;
        expect_value(field, value, 0)
    }

    /// Reads a natural word that must equal `expected`.
    pub fn read_expected(
        self,
        reader: &mut ByteReader<'_>,
        field: &'static str,
        expected: i64,
    ) -> FormatResult<()> {
        let value = self.read_signed(reader)?;
        expect_value(field, value, expected)
    }

    /// Writes an unsigned natural word, failing if it does not fit.
    pub fn write_natural(self, writer: &mut ByteWriter, value: u64) -> FormatResult<()> {
        Ok(writer.write_word(self.width, value)?)
    }

    /// Writes a signed natural word, failing if it does not fit.
    pub fn write_signed(self, writer: &mut ByteWriter, value: i64) -> FormatResult<()> {
        Ok(writer.write_sword(self.width, value)?)
    }

    /// Reserves a natural word slot to be back-patched.
    pub fn reserve(self, writer: &mut ByteWriter, name: &'static str) -> Reservation {
        writer.reserve(name, self.width)
    }
}

/// Reads a 32-bit field that must equal `expected`.
pub fn read_expected_u32(
    reader: &mut ByteReader<'_>,
    field: &'static str,
    expected: u32,
) -> FormatResult<()> {
    let value = reader.read_u32()?;
    expect_value(field, i64::from(value), i64::from(expected))
}

/// Reads a 32-bit signed field that must equal `expected`.
pub fn read_expected_i32(
    reader: &mut ByteReader<'_>,
    field: &'static str,
    expected: i32,
) -> FormatResult<()> {
    let value = reader.read_i32()?;
    expect_value(field, i64::from(value), i64::from(expected))
}

fn expect_value(field: &'static str, found: i64, expected: i64) -> FormatResult<()> {
    if found != expected {
        return Err(FormatError::UnexpectedValue { field, found });
    }
    Ok(())
}
