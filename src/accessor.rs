//! Registry value accessor.
//!
//! The store does not report a value's size up front, so [`RegistryAccessor::read_value`]
//! reads into a fixed-size guess first. If the store answers `MORE_DATA` with
//! the required size, the buffer is resized to exactly that and the read is
//! retried once. A second undersized answer is a failure; there is no third
//! attempt.
//!
//! ```text
//! FirstAttempt --Complete------------------------> Success
//!              --NeedsResize--> SecondAttempt --Complete--> Success
//!              |                              \--*---------> Fail
//!              \--Failed-------------------------> Fail
//! ```
//!
//! Writes are a single store call with no buffer management.

use crate::error::{RegistryError, Result};
use crate::key::KeyHandle;
use crate::status::Status;
use crate::store::RegistryStore;
use crate::utils::{decode_ansi, to_c_string};
use crate::value::{TypeRestriction, ValueType};
use std::ffi::{CStr, CString};
use tracing::{debug, instrument, trace};

/// Size of the first read buffer, large enough for most string values.
pub const INITIAL_BUFFER_SIZE: usize = 512;

/// Result of one read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    /// The value fits; holds the number of bytes written.
    Complete(usize),
    /// The buffer is too small; holds the size the store requires.
    NeedsResize(usize),
    /// Any other status.
    Failed(Status),
}

/// Reads and writes single string values through a [`RegistryStore`].
///
/// The accessor holds no state between calls: every read owns a fresh buffer
/// that is either handed to the caller or dropped.
#[derive(Debug, Clone)]
pub struct RegistryAccessor<S> {
    store: S,
    initial_capacity: usize,
}

impl<S: RegistryStore> RegistryAccessor<S> {
    /// Creates an accessor with the default initial buffer size.
    pub fn new(store: S) -> Self {
        Self::with_initial_capacity(store, INITIAL_BUFFER_SIZE)
    }

    /// Creates an accessor whose first read attempt uses `initial_capacity` bytes.
    pub fn with_initial_capacity(store: S, initial_capacity: usize) -> Self {
        Self {
            store,
            initial_capacity,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the size of the first read buffer.
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Reads a plain or expandable string value.
    ///
    /// Expandable values are returned literally; placeholders are never
    /// substituted. The returned string ends at the first NUL.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or value is missing, inaccessible or not a
    /// string, if the store still reports the buffer as too small after one
    /// resize, or if the buffer cannot be allocated.
    #[instrument(level = "debug", skip(self, key), fields(key = %key))]
    pub fn read_value(&self, key: KeyHandle, sub_key: &CStr, value: &CStr) -> Result<CString> {
        let mut buf = allocate(self.initial_capacity)?;

        let len = match self.attempt(key, sub_key, value, &mut buf) {
            Attempt::Complete(len) => len,
            Attempt::NeedsResize(required) => {
                debug!(
                    required,
                    offered = buf.len(),
                    "value buffer too small, retrying once"
                );
                resize(&mut buf, required)?;
                match self.attempt(key, sub_key, value, &mut buf) {
                    Attempt::Complete(len) => len,
                    Attempt::NeedsResize(required) => {
                        debug!(
                            required,
                            offered = buf.len(),
                            "value buffer still too small"
                        );
                        return Err(RegistryError::BufferTooSmall {
                            required,
                            capacity: buf.len(),
                        });
                    }
                    Attempt::Failed(status) => {
                        return Err(self.failure(status, key, sub_key, value));
                    }
                }
            }
            Attempt::Failed(status) => return Err(self.failure(status, key, sub_key, value)),
        };

        into_c_string(buf, len)
    }

    /// Reads a string value, collapsing every failure to `None`.
    pub fn get(&self, key: KeyHandle, sub_key: &CStr, value: &CStr) -> Option<CString> {
        self.read_value(key, sub_key, value).ok()
    }

    /// Reads a string value by UTF-8 names and decodes it.
    ///
    /// Returns `None` on any failure, including names with interior NULs.
    pub fn get_string(&self, key: KeyHandle, sub_key: &str, value: &str) -> Option<String> {
        let sub_key = to_c_string(sub_key).ok()?;
        let value = to_c_string(value).ok()?;
        self.get(key, &sub_key, &value).map(|s| decode_ansi(s.as_bytes()))
    }

    /// Writes `data` as a plain string value.
    ///
    /// `data` is stored as given; include a NUL terminator if readers expect
    /// one.
    ///
    /// # Errors
    ///
    /// Returns the classified store status if the write fails.
    #[instrument(level = "debug", skip(self, key, data), fields(key = %key, len = data.len()))]
    pub fn write_value(
        &self,
        key: KeyHandle,
        sub_key: &CStr,
        value: &CStr,
        data: &[u8],
    ) -> Result<()> {
        if u32::try_from(data.len()).is_err() {
            return Err(RegistryError::DataTooLarge {
                size: data.len(),
                max: u32::MAX as usize,
            });
        }
        match self.set(key, sub_key, value, data) {
            Status::SUCCESS => Ok(()),
            status => Err(self.failure(status, key, sub_key, value)),
        }
    }

    /// Writes `data` as a plain string value and returns the raw store status.
    pub fn set(&self, key: KeyHandle, sub_key: &CStr, value: &CStr, data: &[u8]) -> Status {
        self.store.set_value(key, sub_key, value, ValueType::String, data)
    }

    /// Writes UTF-8 text as a NUL-terminated plain string value.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidString` if any argument contains an
    /// interior NUL, or the classified store status if the write fails.
    pub fn set_string(&self, key: KeyHandle, sub_key: &str, value: &str, data: &str) -> Result<()> {
        let sub_key = to_c_string(sub_key)?;
        let value = to_c_string(value)?;
        let data = to_c_string(data)?;
        self.write_value(key, &sub_key, &value, data.as_bytes_with_nul())
    }

    fn attempt(&self, key: KeyHandle, sub_key: &CStr, value: &CStr, buf: &mut [u8]) -> Attempt {
        let query = self.store.get_value(key, sub_key, value, TypeRestriction::STRINGS, buf);
        trace!(status = %query.status, size = query.size, "store read attempt");
        match query.status {
            Status::SUCCESS => Attempt::Complete(query.size as usize),
            Status::MORE_DATA => Attempt::NeedsResize(query.size as usize),
            status => Attempt::Failed(status),
        }
    }

    fn failure(
        &self,
        status: Status,
        key: KeyHandle,
        sub_key: &CStr,
        value: &CStr,
    ) -> RegistryError {
        debug!(status = %status, "registry call failed");
        RegistryError::from_status(status, key, sub_key, value)
    }
}

/// Allocates a zeroed buffer, reporting allocation failure as an error.
fn allocate(size: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)?;
    buf.resize(size, 0);
    Ok(buf)
}

/// Resizes `buf` to exactly `size` bytes.
fn resize(buf: &mut Vec<u8>, size: usize) -> Result<()> {
    buf.try_reserve_exact(size.saturating_sub(buf.len()))?;
    buf.resize(size, 0);
    Ok(())
}

/// Converts the first `len` bytes of `buf` into a string ending at the first NUL.
fn into_c_string(mut buf: Vec<u8>, len: usize) -> Result<CString> {
    buf.truncate(len);
    if let Some(nul) = buf.iter().position(|&b| b == 0) {
        buf.truncate(nul);
    }
    // Room for the terminator, so the conversion never reallocates to grow.
    buf.try_reserve_exact(1)?;
    Ok(CString::new(buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::Query;
    use std::cell::RefCell;

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    /// Replays canned answers and records the buffer size of every call.
    struct Scripted {
        answers: RefCell<Vec<(Query, &'static [u8])>>,
        offered: RefCell<Vec<usize>>,
    }

    impl Scripted {
        fn new(mut answers: Vec<(Query, &'static [u8])>) -> Self {
            answers.reverse();
            Self {
                answers: RefCell::new(answers),
                offered: RefCell::new(Vec::new()),
            }
        }
    }

    impl RegistryStore for Scripted {
        fn get_value(
            &self,
            _key: KeyHandle,
            _sub_key: &CStr,
            _value: &CStr,
            _restriction: TypeRestriction,
            buf: &mut [u8],
        ) -> Query {
            self.offered.borrow_mut().push(buf.len());
            let (query, bytes) = self
                .answers
                .borrow_mut()
                .pop()
                .expect("unexpected store call");
            buf[..bytes.len()].copy_from_slice(bytes);
            query
        }

        fn set_value(&self, _: KeyHandle, _: &CStr, _: &CStr, _: ValueType, _: &[u8]) -> Status {
            Status::SUCCESS
        }
    }

    #[test]
    fn test_resizes_to_exactly_the_reported_size() {
        let store = Scripted::new(vec![
            (Query::new(Status::MORE_DATA, 700), b""),
            (Query::new(Status::SUCCESS, 4), b"abc\0"),
        ]);
        let accessor = RegistryAccessor::new(&store);

        let value = accessor
            .read_value(KeyHandle::CURRENT_USER, &c("K"), &c("V"))
            .unwrap();
        assert_eq!(value.as_bytes(), b"abc");
        assert_eq!(*store.offered.borrow(), vec![INITIAL_BUFFER_SIZE, 700]);
    }

    #[test]
    fn test_second_undersized_answer_is_final() {
        let store = Scripted::new(vec![
            (Query::new(Status::MORE_DATA, 700), b""),
            (Query::new(Status::MORE_DATA, 900), b""),
        ]);
        let accessor = RegistryAccessor::new(&store);

        let err = accessor
            .read_value(KeyHandle::CURRENT_USER, &c("K"), &c("V"))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::BufferTooSmall { required: 900, capacity: 700 }
        ));
        assert_eq!(store.offered.borrow().len(), 2);
    }

    #[test]
    fn test_failure_after_resize() {
        let store = Scripted::new(vec![
            (Query::new(Status::MORE_DATA, 600), b""),
            (Query::failed(Status::FILE_NOT_FOUND), b""),
        ]);
        let accessor = RegistryAccessor::new(&store);

        assert!(accessor.get(KeyHandle::CURRENT_USER, &c("K"), &c("V")).is_none());
    }

    #[test]
    fn test_reported_size_beyond_terminator_is_cut_at_nul() {
        let store = Scripted::new(vec![(Query::new(Status::SUCCESS, 8), b"ab\0junk\0")]);
        let accessor = RegistryAccessor::new(&store);

        let value = accessor.read_value(KeyHandle::USERS, &c(""), &c("")).unwrap();
        assert_eq!(value.as_bytes(), b"ab");
    }

    #[test]
    fn test_zero_initial_capacity_still_reads() {
        let store = MemoryStore::new();
        let accessor = RegistryAccessor::with_initial_capacity(store, 0);
        accessor
            .set_string(KeyHandle::CURRENT_USER, "Software\\App", "Name", "value")
            .unwrap();

        assert_eq!(
            accessor
                .get_string(KeyHandle::CURRENT_USER, "Software\\App", "Name")
                .as_deref(),
            Some("value")
        );
        assert_eq!(accessor.initial_capacity(), 0);
    }

    #[test]
    fn test_allocation_failure_is_an_error() {
        let accessor = RegistryAccessor::with_initial_capacity(MemoryStore::new(), usize::MAX);
        let err = accessor
            .read_value(KeyHandle::CURRENT_USER, &c("K"), &c("V"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Allocation(_)));
    }

    #[test]
    fn test_write_value_classifies_failure() {
        let accessor = RegistryAccessor::new(MemoryStore::new());
        let err = accessor
            .write_value(KeyHandle::from_raw(42), &c("K"), &c("V"), b"x\0")
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidHandle(KeyHandle(42))));
    }

    #[test]
    fn test_set_string_rejects_interior_nul() {
        let accessor = RegistryAccessor::new(MemoryStore::new());
        let err = accessor
            .set_string(KeyHandle::CURRENT_USER, "K", "V", "a\0b")
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidString(_)));
        assert!(accessor.get_string(KeyHandle::CURRENT_USER, "K\0", "V").is_none());
    }
}
