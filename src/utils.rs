//! Utility functions for string conversion at the store boundary.

use crate::error::Result;
use encoding_rs::WINDOWS_1252;
use std::ffi::CString;

/// Converts a key path or value name into a NUL-terminated string.
///
/// # Errors
///
/// Returns `RegistryError::InvalidString` if `s` contains an interior NUL.
pub fn to_c_string(s: &str) -> Result<CString> {
    Ok(CString::new(s)?)
}

/// Decodes ANSI string data, trimming null terminators.
///
/// The ANSI store calls return bytes in the system code page; Windows-1252
/// is decoded here since every byte maps to a character.
pub fn decode_ansi(data: &[u8]) -> String {
    let (decoded, _encoding, _had_errors) = WINDOWS_1252.decode(data);
    decoded.trim_end_matches('\0').to_string()
}

/// Returns `data` with exactly one trailing NUL terminator.
pub fn with_terminator(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 1);
    out.extend_from_slice(data);
    if out.last() != Some(&0) {
        out.push(0);
    }
    out
}
