//! # Windows Registry Value Accessor
//!
//! A minimal accessor that reads and writes single string values in the
//! Windows registry, with C-callable exports for foreign callers.
//!
//! ## Features
//!
//! - **Sized reads**: values are read into a 512-byte guess and, if the store
//!   reports a larger size, resized and retried exactly once
//! - **Pass-through writes**: one store call per write, raw status returned
//! - **No hidden state**: nothing is cached or retained between calls
//! - **Portable core**: the retry protocol runs against any [`RegistryStore`];
//!   [`MemoryStore`] provides an in-process registry for tests and non-Windows
//!   targets
//!
//! ## Architecture
//!
//! 1. **Store** ([`RegistryStore`]): the two raw calls, a sized read and a write
//! 2. **Accessor** ([`RegistryAccessor`]): the read protocol and error
//!    classification
//! 3. **Exports** (`ffi`): `windows_get_registry`, `windows_set_registry` and
//!    `windows_free_registry` for callers across a C boundary
//!
//! ## Examples
//!
//! ```
//! use reg_accessor::{KeyHandle, MemoryStore, RegistryAccessor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let accessor = RegistryAccessor::new(MemoryStore::new());
//! accessor.set_string(KeyHandle::CURRENT_USER, "Software\\Example", "Greeting", "hello")?;
//!
//! let value = accessor.get_string(KeyHandle::CURRENT_USER, "Software\\Example", "Greeting");
//! assert_eq!(value.as_deref(), Some("hello"));
//!
//! // Missing keys and values read as absent
//! let missing = accessor.get_string(KeyHandle::CURRENT_USER, "Software\\Missing", "Greeting");
//! assert!(missing.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! On Windows, [`WindowsStore`] talks to the real registry:
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() {
//! use reg_accessor::{KeyHandle, RegistryAccessor, WindowsStore};
//!
//! let accessor = RegistryAccessor::new(WindowsStore);
//! let product = accessor.get_string(
//!     KeyHandle::LOCAL_MACHINE,
//!     "SOFTWARE\\Microsoft\\Windows NT\\CurrentVersion",
//!     "ProductName",
//! );
//! println!("{:?}", product);
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accessor;
pub mod error;
pub mod key;
pub mod memory;
pub mod status;
pub mod store;
pub mod utils;
pub mod value;

#[cfg(windows)]
pub mod windows;

// C exports (only compiled when ffi feature is enabled)
#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export main types for convenience
pub use accessor::{RegistryAccessor, INITIAL_BUFFER_SIZE};
pub use error::{RegistryError, Result};
pub use key::KeyHandle;
pub use memory::MemoryStore;
pub use status::Status;
pub use store::{Query, RegistryStore};
pub use value::{TypeRestriction, ValueType};

#[cfg(windows)]
pub use windows::WindowsStore;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
