//! Raw status codes returned by the registry store.

use std::fmt;

/// Status code returned by a store call.
///
/// On Windows these are Win32 error codes; `MemoryStore` reuses the same
/// numbering so callers see identical codes on every target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub u32);

impl Status {
    /// The call succeeded.
    pub const SUCCESS: Status = Status(0);

    /// Sub-key or value does not exist.
    pub const FILE_NOT_FOUND: Status = Status(2);

    /// Access denied.
    pub const ACCESS_DENIED: Status = Status(5);

    /// Key handle is not valid.
    pub const INVALID_HANDLE: Status = Status(6);

    /// Not enough memory to complete the call.
    pub const NOT_ENOUGH_MEMORY: Status = Status(8);

    /// A parameter was rejected.
    pub const INVALID_PARAMETER: Status = Status(87);

    /// Buffer too small; the reported size is the required size.
    pub const MORE_DATA: Status = Status(234);

    /// Value type does not match the requested restriction.
    pub const UNSUPPORTED_TYPE: Status = Status(1630);

    /// Returns true for `SUCCESS`.
    pub fn is_success(&self) -> bool {
        *self == Self::SUCCESS
    }

    /// Returns the raw code.
    pub fn code(&self) -> u32 {
        self.0
    }

    /// Returns the symbolic name of this status.
    pub fn name(&self) -> &'static str {
        match *self {
            Self::SUCCESS => "ERROR_SUCCESS",
            Self::FILE_NOT_FOUND => "ERROR_FILE_NOT_FOUND",
            Self::ACCESS_DENIED => "ERROR_ACCESS_DENIED",
            Self::INVALID_HANDLE => "ERROR_INVALID_HANDLE",
            Self::NOT_ENOUGH_MEMORY => "ERROR_NOT_ENOUGH_MEMORY",
            Self::INVALID_PARAMETER => "ERROR_INVALID_PARAMETER",
            Self::MORE_DATA => "ERROR_MORE_DATA",
            Self::UNSUPPORTED_TYPE => "ERROR_UNSUPPORTED_TYPE",
            _ => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.name())
    }
}

impl From<Status> for u32 {
    fn from(status: Status) -> Self {
        status.0
    }
}
