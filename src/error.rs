//! Error types for registry value access.
//!
//! The store reports failures as raw status codes. This module classifies the
//! common ones so Rust callers can tell them apart; the exported C surface
//! still collapses every read failure to null and passes write statuses
//! through untouched.

use crate::key::KeyHandle;
use crate::status::Status;
use std::collections::TryReserveError;
use std::ffi::{CStr, NulError};
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur while reading or writing a registry value.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Sub-key or value does not exist.
    #[error("Not found: value '{value}' under '{sub_key}'")]
    NotFound {
        /// Sub-key path that was queried.
        sub_key: String,
        /// Value name that was queried.
        value: String,
    },

    /// The caller lacks the rights to open the key.
    #[error("Access denied: '{sub_key}'")]
    AccessDenied {
        /// Sub-key path that was queried.
        sub_key: String,
    },

    /// The key handle is not an open key.
    #[error("Invalid key handle: {0}")]
    InvalidHandle(KeyHandle),

    /// The value exists but is not a plain or expandable string.
    #[error("Unsupported value type for '{value}'")]
    UnsupportedType {
        /// Value name that was queried.
        value: String,
    },

    /// The store asked for a larger buffer a second time.
    #[error("Buffer too small after resize: store requires {required} bytes, buffer holds {capacity} bytes")]
    BufferTooSmall {
        /// Size the store reported on the final attempt.
        required: usize,
        /// Size of the buffer that was offered.
        capacity: usize,
    },

    /// The value buffer could not be allocated or grown.
    #[error("Allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// A key path, value name or data string contains an interior NUL.
    #[error("Invalid string: {0}")]
    InvalidString(#[from] NulError),

    /// Value data exceeds what a single store call can write.
    #[error("Value data too large: {size} bytes (max: {max} bytes)")]
    DataTooLarge {
        /// Length of the rejected data.
        size: usize,
        /// Largest length the store accepts.
        max: usize,
    },

    /// Any other store status.
    #[error("Registry store error: {0}")]
    Store(Status),
}

impl RegistryError {
    /// Classifies a failing store status.
    ///
    /// # Arguments
    ///
    /// * `status` - Status returned by the store (must not be `SUCCESS`)
    /// * `key` - Handle the call was made against
    /// * `sub_key` - Sub-key path of the call, for context
    /// * `value` - Value name of the call, for context
    pub fn from_status(status: Status, key: KeyHandle, sub_key: &CStr, value: &CStr) -> Self {
        match status {
            Status::FILE_NOT_FOUND => Self::NotFound {
                sub_key: sub_key.to_string_lossy().into_owned(),
                value: value.to_string_lossy().into_owned(),
            },
            Status::ACCESS_DENIED => Self::AccessDenied {
                sub_key: sub_key.to_string_lossy().into_owned(),
            },
            Status::INVALID_HANDLE => Self::InvalidHandle(key),
            Status::UNSUPPORTED_TYPE => Self::UnsupportedType {
                value: value.to_string_lossy().into_owned(),
            },
            other => Self::Store(other),
        }
    }

    /// Returns the raw store status closest to this error.
    pub fn status(&self) -> Status {
        match self {
            Self::NotFound { .. } => Status::FILE_NOT_FOUND,
            Self::AccessDenied { .. } => Status::ACCESS_DENIED,
            Self::InvalidHandle(_) => Status::INVALID_HANDLE,
            Self::UnsupportedType { .. } => Status::UNSUPPORTED_TYPE,
            Self::BufferTooSmall { .. } => Status::MORE_DATA,
            Self::Allocation(_) => Status::NOT_ENOUGH_MEMORY,
            Self::InvalidString(_) | Self::DataTooLarge { .. } => Status::INVALID_PARAMETER,
            Self::Store(status) => *status,
        }
    }

    /// Returns true if the sub-key or value does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
