//! Registry value kinds and read-side type restrictions.

/// Registry value data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// No value type.
    None,

    /// String (null-terminated).
    String,

    /// String with environment variables.
    ExpandString,

    /// Binary data.
    Binary,

    /// 32-bit little-endian integer.
    Dword,

    /// Multiple strings.
    MultiString,

    /// 64-bit little-endian integer.
    Qword,

    /// Any other value type.
    /// Contains the raw type value.
    Unknown(u32),
}

impl ValueType {
    /// Returns the raw type value passed to the store.
    pub fn to_u32(&self) -> u32 {
        match self {
            ValueType::None => 0,
            ValueType::String => 1,
            ValueType::ExpandString => 2,
            ValueType::Binary => 3,
            ValueType::Dword => 4,
            ValueType::MultiString => 7,
            ValueType::Qword => 11,
            ValueType::Unknown(value) => *value,
        }
    }
}

/// Type restriction flags for a value read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeRestriction(pub u32);

impl TypeRestriction {
    /// Accept `REG_SZ`.
    pub const REG_SZ: u32 = 0x0000_0002;

    /// Accept `REG_EXPAND_SZ`.
    pub const REG_EXPAND_SZ: u32 = 0x0000_0004;

    /// Return `REG_EXPAND_SZ` data without substituting placeholders.
    pub const NO_EXPAND: u32 = 0x1000_0000;

    /// Plain or expandable strings, returned literally.
    pub const STRINGS: TypeRestriction =
        TypeRestriction(Self::REG_SZ | Self::REG_EXPAND_SZ | Self::NO_EXPAND);

    /// Creates a restriction from raw flags.
    pub fn new(flags: u32) -> Self {
        Self(flags)
    }

    /// Returns the raw flags.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Returns true if the specified flag is set.
    pub fn has_flag(&self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Returns true if a value of `kind` satisfies this restriction.
    pub fn allows(&self, kind: ValueType) -> bool {
        match kind {
            ValueType::String => self.has_flag(Self::REG_SZ),
            ValueType::ExpandString => self.has_flag(Self::REG_EXPAND_SZ),
            _ => false,
        }
    }
}
