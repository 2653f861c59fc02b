//! Word widths for fields whose size depends on the target.

/// Width of a variable-size word field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// 32-bit word.
    W32,
    /// 64-bit word.
    W64,
}

impl Width {
    /// Returns the size of the word in bytes.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::W32 => 4,
            Self::W64 => 8,
        }
    }

    /// Returns the size of the word in bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::W32 => 32,
            Self::W64 => 64,
        }
    }

    /// Returns `true` if `value` fits in an unsigned word of this width.
    #[must_use]
    pub const fn fits_unsigned(self, value: u64) -> bool {
        match self {
            Self::W32 => value <= u32::MAX as u64,
            Self::W64 => true,
        }
    }

    /// Returns `true` if `value` fits in a signed word of this width.
    #[must_use]
    pub const fn fits_signed(self, value: i64) -> bool {
        match self {
            Self::W32 => value >= i32::MIN as i64 && value <= i32::MAX as i64,
            Self::W64 => true,
        }
    }
}
