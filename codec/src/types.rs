//! Core value types for the codec.

use schema::ArgType;

/// One decoded instruction argument.
///
/// The variant is chosen by the schema descriptor, not by the file.
/// `F32` compares by bit pattern so that decoded documents compare equal to
/// themselves even when an argument holds a NaN.
#[derive(Debug, Clone, Copy)]
pub enum ArgValue {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    F32(f32),
}

impl ArgValue {
    /// Returns the short type name used in diagnostics.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::U8(_) => "u8",
            Self::I8(_) => "i8",
            Self::U16(_) => "u16",
            Self::I16(_) => "i16",
            Self::U32(_) => "u32",
            Self::I32(_) => "i32",
            Self::F32(_) => "f32",
        }
    }

    /// Returns `true` if this value can be encoded as `arg_type`.
    #[must_use]
    pub fn matches(self, arg_type: ArgType) -> bool {
        matches!(
            (self, arg_type),
            (Self::U8(_), ArgType::U8)
                | (Self::I8(_), ArgType::I8)
                | (Self::U16(_), ArgType::U16)
                | (Self::I16(_), ArgType::I16)
                | (Self::U32(_), ArgType::U32 | ArgType::U32Alt)
                | (Self::I32(_), ArgType::I32)
                | (Self::F32(_), ArgType::F32)
        )
    }
}

impl PartialEq for ArgValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::U8(a), Self::U8(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::U16(a), Self::U16(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for ArgValue {}

impl std::fmt::Display for ArgValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::U8(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v:?}"),
        }
    }
}

/// What happens to an event when the player rests at a bonfire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BonfireHandler {
    #[default]
    Normal,
    Restart,
    End,
}

impl BonfireHandler {
    /// Parses the raw 32-bit tag.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Normal),
            1 => Some(Self::Restart),
            2 => Some(Self::End),
            _ => None,
        }
    }

    /// Returns the raw 32-bit tag.
    #[must_use]
    pub const fn raw(self) -> u32 {
        match self {
            Self::Normal => 0,
            Self::Restart => 1,
            Self::End => 2,
        }
    }
}
