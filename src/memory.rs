//! In-process registry store.
//!
//! `MemoryStore` keeps a key hierarchy under each predefined root and answers
//! reads and writes with the same statuses the OS registry uses, including the
//! `MORE_DATA` sizing handshake. It backs the test suites and lets the
//! accessor run on targets without a registry.

use crate::key::KeyHandle;
use crate::status::Status;
use crate::store::{clamp_len, Query, RegistryStore};
use crate::utils::with_terminator;
use crate::value::{TypeRestriction, ValueType};
use std::collections::HashMap;
use std::ffi::CStr;
use std::sync::{PoisonError, RwLock};
use tracing::trace;

/// A stored value.
#[derive(Debug, Clone)]
struct StoredValue {
    kind: ValueType,
    data: Vec<u8>,
}

/// A key with its sub-keys and values. Names are stored lowercased.
#[derive(Debug, Default)]
struct Node {
    subkeys: HashMap<Vec<u8>, Node>,
    values: HashMap<Vec<u8>, StoredValue>,
    denied: bool,
}

/// Splits a `\`-separated path into lowercased segments, skipping empty ones.
fn segments(path: &[u8]) -> impl Iterator<Item = Vec<u8>> + '_ {
    path.split(|&b| b == b'\\')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_ascii_lowercase())
}

impl Node {
    fn find(&self, path: &[u8]) -> Result<&Node, Status> {
        if self.denied {
            return Err(Status::ACCESS_DENIED);
        }
        let mut node = self;
        for segment in segments(path) {
            node = node.subkeys.get(&segment).ok_or(Status::FILE_NOT_FOUND)?;
            if node.denied {
                return Err(Status::ACCESS_DENIED);
            }
        }
        Ok(node)
    }

    /// Walks the existing part of `path` and fails if any key on it is denied.
    fn check_access(&self, path: &[u8]) -> Result<(), Status> {
        if self.denied {
            return Err(Status::ACCESS_DENIED);
        }
        let mut node = self;
        for segment in segments(path) {
            match node.subkeys.get(&segment) {
                Some(child) if child.denied => return Err(Status::ACCESS_DENIED),
                Some(child) => node = child,
                None => break,
            }
        }
        Ok(())
    }

    fn find_or_create(&mut self, path: &[u8]) -> Result<&mut Node, Status> {
        self.check_access(path)?;
        let mut node = self;
        for segment in segments(path) {
            node = node.subkeys.entry(segment).or_default();
        }
        Ok(node)
    }

    fn exists(&self, path: &[u8]) -> bool {
        let mut node = self;
        for segment in segments(path) {
            match node.subkeys.get(&segment) {
                Some(child) => node = child,
                None => return false,
            }
        }
        true
    }
}

/// In-memory registry store rooted at the predefined keys.
#[derive(Debug)]
pub struct MemoryStore {
    roots: RwLock<HashMap<KeyHandle, Node>>,
}

impl MemoryStore {
    /// Creates an empty store with every predefined root key present.
    pub fn new() -> Self {
        let roots = KeyHandle::PREDEFINED
            .iter()
            .map(|&key| (key, Node::default()))
            .collect();
        Self {
            roots: RwLock::new(roots),
        }
    }

    /// Marks a key as inaccessible. The key and everything below it answer
    /// reads and writes with `ACCESS_DENIED`. The key is created if missing.
    pub fn deny_access(&self, key: KeyHandle, sub_key: &str) -> Status {
        let mut roots = self.roots.write().unwrap_or_else(PoisonError::into_inner);
        let Some(root) = roots.get_mut(&key) else {
            return Status::INVALID_HANDLE;
        };
        match root.find_or_create(sub_key.as_bytes()) {
            Ok(node) => {
                node.denied = true;
                Status::SUCCESS
            }
            Err(status) => status,
        }
    }

    /// Returns true if the key exists, whether or not it is accessible.
    pub fn contains_key(&self, key: KeyHandle, sub_key: &str) -> bool {
        let roots = self.roots.read().unwrap_or_else(PoisonError::into_inner);
        roots
            .get(&key)
            .map(|root| root.exists(sub_key.as_bytes()))
            .unwrap_or(false)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryStore for MemoryStore {
    fn get_value(
        &self,
        key: KeyHandle,
        sub_key: &CStr,
        value: &CStr,
        restriction: TypeRestriction,
        buf: &mut [u8],
    ) -> Query {
        let roots = self.roots.read().unwrap_or_else(PoisonError::into_inner);
        let Some(root) = roots.get(&key) else {
            return Query::failed(Status::INVALID_HANDLE);
        };
        let node = match root.find(sub_key.to_bytes()) {
            Ok(node) => node,
            Err(status) => return Query::failed(status),
        };
        let Some(stored) = node.values.get(&value.to_bytes().to_ascii_lowercase()) else {
            return Query::failed(Status::FILE_NOT_FOUND);
        };
        if !restriction.allows(stored.kind) {
            return Query::failed(Status::UNSUPPORTED_TYPE);
        }

        let data = with_terminator(&stored.data);
        let required = clamp_len(data.len());
        trace!(required, offered = buf.len(), "memory store read");
        if buf.len() < data.len() {
            return Query::new(Status::MORE_DATA, required);
        }
        buf[..data.len()].copy_from_slice(&data);
        Query::new(Status::SUCCESS, required)
    }

    fn set_value(
        &self,
        key: KeyHandle,
        sub_key: &CStr,
        value: &CStr,
        kind: ValueType,
        data: &[u8],
    ) -> Status {
        if u32::try_from(data.len()).is_err() {
            return Status::INVALID_PARAMETER;
        }
        let mut roots = self.roots.write().unwrap_or_else(PoisonError::into_inner);
        let Some(root) = roots.get_mut(&key) else {
            return Status::INVALID_HANDLE;
        };
        match root.find_or_create(sub_key.to_bytes()) {
            Ok(node) => {
                node.values.insert(
                    value.to_bytes().to_ascii_lowercase(),
                    StoredValue {
                        kind,
                        data: data.to_vec(),
                    },
                );
                Status::SUCCESS
            }
            Err(status) => status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    fn read(
        store: &MemoryStore,
        key: KeyHandle,
        sub_key: &str,
        value: &str,
        buf: &mut [u8],
    ) -> Query {
        store.get_value(key, &c(sub_key), &c(value), TypeRestriction::STRINGS, buf)
    }

    fn write(
        store: &MemoryStore,
        key: KeyHandle,
        sub_key: &str,
        value: &str,
        data: &[u8],
    ) -> Status {
        store.set_value(key, &c(sub_key), &c(value), ValueType::String, data)
    }

    #[test]
    fn test_read_reports_required_size() {
        let store = MemoryStore::new();
        let key = KeyHandle::CURRENT_USER;
        assert_eq!(
            write(&store, key, "Software\\App", "Name", b"hello"),
            Status::SUCCESS
        );

        let mut small = [0u8; 3];
        let query = read(&store, key, "Software\\App", "Name", &mut small);
        assert_eq!(query, Query::new(Status::MORE_DATA, 6));

        let mut exact = [0xFFu8; 6];
        let query = read(&store, key, "Software\\App", "Name", &mut exact);
        assert_eq!(query, Query::new(Status::SUCCESS, 6));
        assert_eq!(&exact, b"hello\0");
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let store = MemoryStore::new();
        let key = KeyHandle::LOCAL_MACHINE;
        write(&store, key, "SOFTWARE\\Vendor", "Path", b"x\0");

        let mut buf = [0u8; 16];
        let query = read(&store, key, "software\\\\vendor\\", "PATH", &mut buf);
        assert_eq!(query, Query::new(Status::SUCCESS, 2));
        assert!(store.contains_key(key, "Software"));
    }

    #[test]
    fn test_missing_key_and_value() {
        let store = MemoryStore::new();
        let key = KeyHandle::CURRENT_USER;
        let mut buf = [0u8; 16];

        let query = read(&store, key, "Nope", "Name", &mut buf);
        assert_eq!(query.status, Status::FILE_NOT_FOUND);

        write(&store, key, "Yes", "Other", b"1");
        let query = read(&store, key, "Yes", "Name", &mut buf);
        assert_eq!(query.status, Status::FILE_NOT_FOUND);
    }

    #[test]
    fn test_unknown_handle() {
        let store = MemoryStore::new();
        let bogus = KeyHandle::from_raw(0xDEAD_BEEF);
        let mut buf = [0u8; 16];

        let query = read(&store, bogus, "", "", &mut buf);
        assert_eq!(query.status, Status::INVALID_HANDLE);
        assert_eq!(write(&store, bogus, "A", "B", b"x"), Status::INVALID_HANDLE);
    }

    #[test]
    fn test_type_restriction() {
        let store = MemoryStore::new();
        let key = KeyHandle::CURRENT_USER;
        store.set_value(
            key,
            &c("T"),
            &c("Count"),
            ValueType::Dword,
            &7u32.to_le_bytes(),
        );

        let mut buf = [0u8; 16];
        let query = read(&store, key, "T", "Count", &mut buf);
        assert_eq!(query.status, Status::UNSUPPORTED_TYPE);
    }

    #[test]
    fn test_denied_subtree() {
        let store = MemoryStore::new();
        let key = KeyHandle::LOCAL_MACHINE;
        assert_eq!(store.deny_access(key, "SAM"), Status::SUCCESS);

        let mut buf = [0u8; 16];
        let query = read(&store, key, "SAM\\Domains", "F", &mut buf);
        assert_eq!(query.status, Status::ACCESS_DENIED);
        assert_eq!(
            write(&store, key, "SAM\\Domains", "F", b"x"),
            Status::ACCESS_DENIED
        );
    }

    #[test]
    fn test_refused_write_creates_no_keys() {
        let store = MemoryStore::new();
        let key = KeyHandle::LOCAL_MACHINE;
        store.deny_access(key, "SAM");

        assert_eq!(
            write(&store, key, "SAM\\Domains\\Account", "F", b"x"),
            Status::ACCESS_DENIED
        );
        assert_eq!(store.deny_access(key, "SAM\\Builtin"), Status::ACCESS_DENIED);

        assert!(store.contains_key(key, "SAM"));
        assert!(!store.contains_key(key, "SAM\\Domains"));
        assert!(!store.contains_key(key, "SAM\\Builtin"));
    }

    #[test]
    fn test_default_value_on_root() {
        let store = MemoryStore::new();
        let key = KeyHandle::CLASSES_ROOT;
        store.set_value(key, &c(""), &c(""), ValueType::ExpandString, b"%SystemRoot%");

        let mut buf = [0u8; 32];
        let query = read(&store, key, "", "", &mut buf);
        assert_eq!(query, Query::new(Status::SUCCESS, 13));
        assert_eq!(&buf[..13], b"%SystemRoot%\0");
    }
}
