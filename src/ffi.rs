//! C-callable exports.
//!
//! `windows_get_registry` and `windows_set_registry` are exported unmangled on
//! Windows targets and run against the OS registry. Strings returned by
//! `windows_get_registry` are owned by this library's allocator and must be
//! released with `windows_free_registry`.
//!
//! The store-generic helpers carry all of the logic so that it can be driven
//! by any [`RegistryStore`]. No panic crosses the boundary: a caught panic
//! reads as null or `ERROR_INVALID_PARAMETER`.

use crate::accessor::RegistryAccessor;
use crate::key::KeyHandle;
use crate::status::Status;
use crate::store::RegistryStore;
use std::ffi::{c_char, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::{ptr, slice};
use tracing::debug;

/// Borrows a NUL-terminated string; null reads as the empty string.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for `'a`.
unsafe fn borrow_c_str<'a>(ptr: *const c_char) -> &'a CStr {
    if ptr.is_null() {
        <&CStr>::default()
    } else {
        // SAFETY: non-null and NUL-terminated per the caller contract.
        unsafe { CStr::from_ptr(ptr) }
    }
}

/// Reads a string value through `store` and hands ownership to the caller.
///
/// Returns null if the value cannot be read for any reason.
///
/// # Safety
///
/// `sub_key` and `value` must each be null or a valid NUL-terminated string.
/// A non-null result must be released with [`windows_free_registry`].
pub unsafe fn get_registry_with<S: RegistryStore>(
    store: S,
    key: u64,
    sub_key: *const c_char,
    value: *const c_char,
) -> *mut c_char {
    // SAFETY: forwarded caller contract.
    let (sub_key, value) = unsafe { (borrow_c_str(sub_key), borrow_c_str(value)) };
    let accessor = RegistryAccessor::new(store);

    match catch_unwind(AssertUnwindSafe(|| {
        accessor.get(KeyHandle::from_raw(key), sub_key, value)
    })) {
        Ok(Some(data)) => data.into_raw(),
        Ok(None) => ptr::null_mut(),
        Err(_) => {
            debug!("panic caught in registry read");
            ptr::null_mut()
        }
    }
}

/// Writes `num_bytes` of `data` as a plain string value through `store`.
///
/// Returns the raw store status, `0` on success. A null `data` with a
/// non-zero length, or a length beyond 32 bits, is rejected with
/// `ERROR_INVALID_PARAMETER` before the store is called.
///
/// # Safety
///
/// `sub_key` and `value` must each be null or a valid NUL-terminated string,
/// and `data` must be null or readable for `num_bytes` bytes.
pub unsafe fn set_registry_with<S: RegistryStore>(
    store: S,
    key: u64,
    sub_key: *const c_char,
    value: *const c_char,
    data: *const c_char,
    num_bytes: u64,
) -> u32 {
    let Ok(len) = u32::try_from(num_bytes) else {
        return Status::INVALID_PARAMETER.code();
    };
    let data: &[u8] = if len == 0 {
        &[]
    } else if data.is_null() {
        return Status::INVALID_PARAMETER.code();
    } else {
        // SAFETY: non-null and readable for `len` bytes per the caller contract.
        unsafe { slice::from_raw_parts(data.cast::<u8>(), len as usize) }
    };
    // SAFETY: forwarded caller contract.
    let (sub_key, value) = unsafe { (borrow_c_str(sub_key), borrow_c_str(value)) };
    let accessor = RegistryAccessor::new(store);

    match catch_unwind(AssertUnwindSafe(|| {
        accessor.set(KeyHandle::from_raw(key), sub_key, value, data)
    })) {
        Ok(status) => status.code(),
        Err(_) => {
            debug!("panic caught in registry write");
            Status::INVALID_PARAMETER.code()
        }
    }
}

/// Returns the string value `value` under `sub_key` of `key`, or null.
///
/// # Safety
///
/// See [`get_registry_with`].
#[cfg(windows)]
#[no_mangle]
pub unsafe extern "C" fn windows_get_registry(
    key: u64,
    sub_key: *const c_char,
    value: *const c_char,
) -> *mut c_char {
    // SAFETY: forwarded caller contract.
    unsafe { get_registry_with(crate::windows::WindowsStore, key, sub_key, value) }
}

/// Sets the string value `value` under `sub_key` of `key`; returns 0 on success.
///
/// # Safety
///
/// See [`set_registry_with`].
#[cfg(windows)]
#[no_mangle]
pub unsafe extern "C" fn windows_set_registry(
    key: u64,
    sub_key: *const c_char,
    value: *const c_char,
    data: *const c_char,
    num_bytes: u64,
) -> u32 {
    // SAFETY: forwarded caller contract.
    unsafe {
        set_registry_with(
            crate::windows::WindowsStore,
            key,
            sub_key,
            value,
            data,
            num_bytes,
        )
    }
}

/// Releases a string returned by `windows_get_registry`. Null is ignored.
///
/// # Safety
///
/// `data` must be null or a pointer returned by `windows_get_registry` (or
/// [`get_registry_with`]) that has not been released yet.
#[no_mangle]
pub unsafe extern "C" fn windows_free_registry(data: *mut c_char) {
    if !data.is_null() {
        // SAFETY: produced by `CString::into_raw` and not yet released.
        drop(unsafe { CString::from_raw(data) });
    }
}
