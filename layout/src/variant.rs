//! Variant detection and per-variant record layout.

use bytestream::Width;

use crate::error::{FormatError, FormatResult};

/// Magic bytes at the start of every file.
pub const MAGIC: [u8; 4] = *b"EVD\0";

/// The supported targets.
///
/// The variant fixes the natural word width and a handful of per-record
/// quirks; everything else about the layout is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// 32-bit target.
    Alpha,
    /// 64-bit target with a split 32-bit parameter offset.
    Beta,
    /// 64-bit target with 64-bit layer references.
    Gamma,
}

impl Variant {
    /// All variants, in tag order.
    pub const ALL: [Self; 3] = [Self::Alpha, Self::Beta, Self::Gamma];

    /// Detects the variant from the two tag words following the magic.
    pub fn from_tags(tag1: u32, tag2: u32) -> FormatResult<Self> {
        match (tag1, tag2) {
            (0x0000_0000, 0x0000_00CC) => Ok(Self::Alpha),
            (0x0000_FF00, 0x0000_00CC) => Ok(Self::Beta),
            (0x0001_FF00, 0x0000_00CD) => Ok(Self::Gamma),
            _ => Err(FormatError::UnknownVariant { tag1, tag2 }),
        }
    }

    /// Returns the two tag words written after the magic.
    #[must_use]
    pub const fn tags(self) -> (u32, u32) {
        match self {
            Self::Alpha => (0x0000_0000, 0x0000_00CC),
            Self::Beta => (0x0000_FF00, 0x0000_00CC),
            Self::Gamma => (0x0001_FF00, 0x0000_00CD),
        }
    }

    /// Returns the natural word width.
    #[must_use]
    pub const fn width(self) -> Width {
        match self {
            Self::Alpha => Width::W32,
            Self::Beta | Self::Gamma => Width::W64,
        }
    }

    /// Returns `true` if the variant uses 32-bit natural words.
    #[must_use]
    pub const fn is_narrow(self) -> bool {
        matches!(self, Self::Alpha)
    }

    /// Returns `true` if the event parameter offset is a 32-bit value
    /// followed by a 32-bit zero.
    #[must_use]
    pub const fn has_split_parameter_offset(self) -> bool {
        matches!(self, Self::Beta)
    }

    /// Returns `true` if instruction layer references are 64-bit.
    #[must_use]
    pub const fn has_wide_layer_reference(self) -> bool {
        matches!(self, Self::Gamma)
    }

    /// Returns `true` if the header ends with a zero word after the string
    /// offset.
    #[must_use]
    pub const fn has_header_trailer(self) -> bool {
        self.is_narrow()
    }

    /// Returns `true` if instruction records carry a zero word after the
    /// argument offset.
    #[must_use]
    pub const fn has_instruction_padding(self) -> bool {
        !self.is_narrow()
    }

    /// Returns `true` if parameter records end with a zero word.
    #[must_use]
    pub const fn has_parameter_padding(self) -> bool {
        self.is_narrow()
    }

    /// Header size in bytes.
    #[must_use]
    pub const fn header_size(self) -> usize {
        if self.is_narrow() {
            84
        } else {
            148
        }
    }

    /// Event record size in bytes.
    #[must_use]
    pub const fn event_size(self) -> usize {
        if self.is_narrow() {
            28
        } else {
            48
        }
    }

    /// Instruction record size in bytes.
    #[must_use]
    pub const fn instruction_size(self) -> usize {
        if self.is_narrow() {
            24
        } else {
            32
        }
    }

    /// Layer record size in bytes.
    #[must_use]
    pub const fn layer_size(self) -> usize {
        if self.is_narrow() {
            20
        } else {
            32
        }
    }

    /// Parameter record size in bytes.
    #[must_use]
    pub const fn parameter_size(self) -> usize {
        if self.is_narrow() {
            20
        } else {
            32
        }
    }

    /// Zero bytes appended to the argument pool and counted in the header's
    /// argument length.
    #[must_use]
    pub const fn argument_trailer_len(self) -> usize {
        if self.is_narrow() {
            4
        } else {
            0
        }
    }

    /// Linked-file record size in bytes.
    #[must_use]
    pub const fn linked_file_size(self) -> usize {
        self.width().bytes()
    }
}
