//! Registry store backed by the Windows registry API.

use crate::key::KeyHandle;
use crate::status::Status;
use crate::store::{clamp_len, Query, RegistryStore};
use crate::value::{TypeRestriction, ValueType};
use std::ffi::CStr;
use std::ptr;
use windows_sys::Win32::System::Registry::{RegGetValueA, RegSetKeyValueA};

/// The operating system registry, via the ANSI `RegGetValueA` and
/// `RegSetKeyValueA` calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsStore;

impl RegistryStore for WindowsStore {
    fn get_value(
        &self,
        key: KeyHandle,
        sub_key: &CStr,
        value: &CStr,
        restriction: TypeRestriction,
        buf: &mut [u8],
    ) -> Query {
        let mut size = clamp_len(buf.len());
        // SAFETY: `sub_key` and `value` are NUL-terminated and outlive the
        // call. `buf` is writable for `size` bytes since `size` never exceeds
        // its length, and `size` is a valid out-pointer. The type out-pointer
        // is optional and passed as null. An invalid handle is reported by
        // the OS as an error status.
        let status = unsafe {
            RegGetValueA(
                key.as_raw(),
                sub_key.as_ptr().cast(),
                value.as_ptr().cast(),
                restriction.bits(),
                ptr::null_mut(),
                buf.as_mut_ptr().cast(),
                &mut size,
            )
        };
        Query::new(Status(status), size)
    }

    fn set_value(
        &self,
        key: KeyHandle,
        sub_key: &CStr,
        value: &CStr,
        kind: ValueType,
        data: &[u8],
    ) -> Status {
        let Ok(len) = u32::try_from(data.len()) else {
            return Status::INVALID_PARAMETER;
        };
        // SAFETY: the strings are NUL-terminated and `data` is readable for
        // `len` bytes for the duration of the call; the OS copies it.
        let status = unsafe {
            RegSetKeyValueA(
                key.as_raw(),
                sub_key.as_ptr().cast(),
                value.as_ptr().cast(),
                kind.to_u32(),
                data.as_ptr().cast(),
                len,
            )
        };
        Status(status)
    }
}
