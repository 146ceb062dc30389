//! Win32 plumbing
//!
//! Thin wrappers over the loader, version resource and service manager APIs.

mod library;
mod service;
mod version_info;

pub use library::{set_dll_directory, Library};
pub use service::stop_and_wait;
pub use version_info::file_version;

use std::path::PathBuf;
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::sysinfoapi::GetSystemDirectoryW;

/// Null-terminated UTF-16 copy of `s`
pub(crate) fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Calling thread's last Win32 error
pub(crate) fn last_error() -> u32 {
    unsafe { GetLastError() }
}

/// `%SystemRoot%\System32`
pub fn system_directory() -> Option<PathBuf> {
    let mut buffer = [0u16; 260];
    let len = unsafe { GetSystemDirectoryW(buffer.as_mut_ptr(), buffer.len() as u32) } as usize;
    if len == 0 || len > buffer.len() {
        return None;
    }
    Some(PathBuf::from(String::from_utf16_lossy(&buffer[..len])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_wide_terminates() {
        let wide = to_wide("netfilter2");
        assert_eq!(wide.len(), 11);
        assert_eq!(wide.last(), Some(&0));
    }

    #[test]
    fn test_system_directory() {
        let dir = system_directory().unwrap();
        assert!(dir.join("drivers").exists());
    }
}
