//! Argument type tags and descriptors.

/// Primitive type of one instruction argument.
///
/// Tags follow the numbering used by the external schema documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgType {
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    F32,
    /// Second unsigned 32-bit tag; encoded exactly like [`ArgType::U32`].
    U32Alt,
}

impl ArgType {
    /// Parses a raw type tag.
    #[must_use]
    pub const fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(Self::U8),
            1 => Some(Self::U16),
            2 => Some(Self::U32),
            3 => Some(Self::I8),
            4 => Some(Self::I16),
            5 => Some(Self::I32),
            6 => Some(Self::F32),
            8 => Some(Self::U32Alt),
            _ => None,
        }
    }

    /// Returns the raw type tag.
    #[must_use]
    pub const fn tag(self) -> u32 {
        match self {
            Self::U8 => 0,
            Self::U16 => 1,
            Self::U32 => 2,
            Self::I8 => 3,
            Self::I16 => 4,
            Self::I32 => 5,
            Self::F32 => 6,
            Self::U32Alt => 8,
        }
    }

    /// Size of the encoded value in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 | Self::U32Alt => 4,
        }
    }

    /// Alignment of the value inside an argument blob.
    ///
    /// Always equal to the size: blobs follow natural struct packing.
    #[must_use]
    pub const fn align(self) -> usize {
        self.size()
    }

    /// Short name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::F32 => "f32",
            Self::U32Alt => "u32 (alt)",
        }
    }
}

/// One argument of an instruction as declared by the schema.
///
/// Only `type_tag` drives encoding. The remaining fields are carried for
/// callers that render or edit arguments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArgDescriptor {
    pub name: String,
    /// Raw type tag, see [`ArgType::from_tag`].
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub type_tag: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub enum_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub default: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub min: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub format: Option<String>,
}

impl ArgDescriptor {
    /// Creates a descriptor with no metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, arg_type: ArgType) -> Self {
        Self::with_tag(name, arg_type.tag())
    }

    /// Creates a descriptor from a raw, possibly unknown, type tag.
    #[must_use]
    pub fn with_tag(name: impl Into<String>, type_tag: u32) -> Self {
        Self {
            name: name.into(),
            type_tag,
            enum_name: None,
            default: None,
            min: None,
            max: None,
            format: None,
        }
    }

    /// Returns the parsed type, or `None` for an unknown tag.
    #[must_use]
    pub const fn arg_type(&self) -> Option<ArgType> {
        ArgType::from_tag(self.type_tag)
    }

    /// Sets the enum name.
    #[must_use]
    pub fn enum_name(mut self, name: impl Into<String>) -> Self {
        self.enum_name = Some(name.into());
        self
    }

    /// Sets the inclusive bounds.
    #[must_use]
    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: f64) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the display format string.
    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}
