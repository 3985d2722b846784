//! The registry store seam.
//!
//! A store performs the two raw calls the accessor is built on: a sized read
//! into a caller buffer and a single write. Implementations:
//!
//! - [`WindowsStore`](crate::windows::WindowsStore) calls the OS registry
//!   (Windows only).
//! - [`MemoryStore`](crate::memory::MemoryStore) keeps a hierarchy in process
//!   with the same status semantics.

use crate::key::KeyHandle;
use crate::status::Status;
use crate::value::{TypeRestriction, ValueType};
use std::ffi::CStr;

/// Outcome of one read call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    /// Status of the call.
    pub status: Status,

    /// Bytes written on success (terminator included), or the required
    /// buffer size on `MORE_DATA`. Meaningless for other statuses.
    pub size: u32,
}

impl Query {
    /// Creates a query result.
    pub fn new(status: Status, size: u32) -> Self {
        Self { status, size }
    }

    /// A failed query with no size information.
    pub fn failed(status: Status) -> Self {
        Self { status, size: 0 }
    }
}

/// A hierarchical key/value store addressed by handle, sub-key path and
/// value name.
pub trait RegistryStore {
    /// Reads a value into `buf`.
    ///
    /// An empty `sub_key` addresses `key` itself and an empty `value`
    /// addresses its default value. Values whose type `restriction` does not
    /// allow fail with `UNSUPPORTED_TYPE`. When `buf` is too small the status
    /// is `MORE_DATA` and `size` carries the required length.
    fn get_value(
        &self,
        key: KeyHandle,
        sub_key: &CStr,
        value: &CStr,
        restriction: TypeRestriction,
        buf: &mut [u8],
    ) -> Query;

    /// Writes a value, creating `sub_key` if it does not exist.
    fn set_value(
        &self,
        key: KeyHandle,
        sub_key: &CStr,
        value: &CStr,
        kind: ValueType,
        data: &[u8],
    ) -> Status;
}

impl<S: RegistryStore + ?Sized> RegistryStore for &S {
    fn get_value(
        &self,
        key: KeyHandle,
        sub_key: &CStr,
        value: &CStr,
        restriction: TypeRestriction,
        buf: &mut [u8],
    ) -> Query {
        (**self).get_value(key, sub_key, value, restriction, buf)
    }

    fn set_value(
        &self,
        key: KeyHandle,
        sub_key: &CStr,
        value: &CStr,
        kind: ValueType,
        data: &[u8],
    ) -> Status {
        (**self).set_value(key, sub_key, value, kind, data)
    }
}

/// Clamps a buffer length to the 32-bit size the store calls take.
pub(crate) fn clamp_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
