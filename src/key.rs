//! Opaque registry key handles.

use std::fmt;

/// Handle to an open or predefined registry key.
///
/// The accessor borrows the handle for one call and never validates it; a
/// bad handle is reported by the store as `INVALID_HANDLE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHandle(pub u64);

impl KeyHandle {
    /// `HKEY_CLASSES_ROOT`.
    pub const CLASSES_ROOT: KeyHandle = KeyHandle::predefined(0x8000_0000);

    /// `HKEY_CURRENT_USER`.
    pub const CURRENT_USER: KeyHandle = KeyHandle::predefined(0x8000_0001);

    /// `HKEY_LOCAL_MACHINE`.
    pub const LOCAL_MACHINE: KeyHandle = KeyHandle::predefined(0x8000_0002);

    /// `HKEY_USERS`.
    pub const USERS: KeyHandle = KeyHandle::predefined(0x8000_0003);

    /// `HKEY_CURRENT_CONFIG`.
    pub const CURRENT_CONFIG: KeyHandle = KeyHandle::predefined(0x8000_0005);

    /// All predefined root keys.
    pub const PREDEFINED: [KeyHandle; 5] = [
        Self::CLASSES_ROOT,
        Self::CURRENT_USER,
        Self::LOCAL_MACHINE,
        Self::USERS,
        Self::CURRENT_CONFIG,
    ];

    // Predefined HKEYs are 32-bit LONGs widened to pointer size, so the high
    // half is sign-extended on 64-bit targets.
    const fn predefined(value: u32) -> Self {
        KeyHandle(value as i32 as i64 as u64)
    }

    /// Wraps a raw handle value received from a caller.
    pub fn from_raw(raw: u64) -> Self {
        KeyHandle(raw)
    }

    /// Returns the raw handle value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns true if this is one of the predefined root keys.
    pub fn is_predefined(&self) -> bool {
        Self::PREDEFINED.contains(self)
    }

    /// Returns the native handle for OS calls.
    #[cfg(windows)]
    pub fn as_raw(&self) -> windows_sys::Win32::System::Registry::HKEY {
        self.0 as usize as windows_sys::Win32::System::Registry::HKEY
    }
}

impl fmt::Display for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::CLASSES_ROOT => f.write_str("HKEY_CLASSES_ROOT"),
            Self::CURRENT_USER => f.write_str("HKEY_CURRENT_USER"),
            Self::LOCAL_MACHINE => f.write_str("HKEY_LOCAL_MACHINE"),
            Self::USERS => f.write_str("HKEY_USERS"),
            Self::CURRENT_CONFIG => f.write_str("HKEY_CURRENT_CONFIG"),
            KeyHandle(raw) => write!(f, "{:#x}", raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_handles_are_sign_extended() {
        assert_eq!(KeyHandle::CURRENT_USER.as_u64(), 0xFFFF_FFFF_8000_0001);
        assert_eq!(KeyHandle::LOCAL_MACHINE.as_u64(), 0xFFFF_FFFF_8000_0002);
        assert!(KeyHandle::USERS.is_predefined());
        assert!(!KeyHandle::from_raw(0x8000_0001).is_predefined());
    }

    #[test]
    fn test_display() {
        assert_eq!(KeyHandle::CURRENT_USER.to_string(), "HKEY_CURRENT_USER");
        assert_eq!(KeyHandle::from_raw(0x1234).to_string(), "0x1234");
    }

    #[cfg(windows)]
    #[test]
    fn test_matches_native_predefined_keys() {
        use windows_sys::Win32::System::Registry::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

        assert_eq!(KeyHandle::CURRENT_USER.as_raw(), HKEY_CURRENT_USER);
        assert_eq!(KeyHandle::LOCAL_MACHINE.as_raw(), HKEY_LOCAL_MACHINE);
    }
}
