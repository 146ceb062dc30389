//! Runtime DLL loading

use super::{last_error, to_wide};
use crate::error::{PlatformError, Result};
use std::ffi::CString;
use std::path::Path;
use tracing::debug;
use winapi::shared::minwindef::{FARPROC, HMODULE};
use winapi::um::libloaderapi::{FreeLibrary, GetProcAddress, LoadLibraryW};
use winapi::um::winbase::SetDllDirectoryW;

/// Add `path` to the DLL search path of this process
pub fn set_dll_directory(path: &Path) -> Result<()> {
    let wide = to_wide(&path.to_string_lossy());
    if unsafe { SetDllDirectoryW(wide.as_ptr()) } == 0 {
        return Err(PlatformError::LibraryDirectory {
            path: path.display().to_string(),
            code: last_error(),
        });
    }
    debug!(path = %path.display(), "Set DLL directory");
    Ok(())
}

/// Loaded module, freed on drop
pub struct Library {
    name: &'static str,
    module: HMODULE,
}

// Safety: module handles are process-wide and may be used from any thread
unsafe impl Send for Library {}
unsafe impl Sync for Library {}

impl Library {
    /// Load a DLL through the normal search order
    pub fn load(name: &'static str) -> Result<Self> {
        let wide = to_wide(name);
        let module = unsafe { LoadLibraryW(wide.as_ptr()) };
        if module.is_null() {
            return Err(PlatformError::LibraryLoad {
                name,
                code: last_error(),
            });
        }
        debug!(library = name, "Loaded native library");
        Ok(Self { name, module })
    }

    /// Raw address of an export
    pub fn symbol(&self, symbol: &'static str) -> Result<FARPROC> {
        let missing = || PlatformError::MissingSymbol {
            library: self.name,
            symbol,
        };
        let c_name = CString::new(symbol).map_err(|_| missing())?;
        let address = unsafe { GetProcAddress(self.module, c_name.as_ptr()) };
        if address.is_null() {
            return Err(missing());
        }
        Ok(address)
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        unsafe {
            FreeLibrary(self.module);
        }
    }
}
