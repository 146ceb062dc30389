//! Redirector.dll binding
//!
//! The library is loaded at runtime so that its directory can be chosen by
//! the caller, the way the application ships it next to the bundled driver.

use crate::error::Result;
use nfapi_core::{DialOption, Redirector};
use std::path::Path;
use tracing::info;

/// File name of the native redirector
pub const REDIRECTOR_DLL: &str = "Redirector.dll";

/// Add a search directory for [`REDIRECTOR_DLL`].
pub fn set_library_directory(path: &Path) -> Result<()> {
    #[cfg(windows)]
    {
        crate::windows::set_dll_directory(path)
    }

    #[cfg(not(windows))]
    {
        let _ = path;
        Err(crate::PlatformError::Unsupported("Setting the library directory"))
    }
}

#[cfg(windows)]
mod exports {
    // Exported functions return a one-byte C++ bool; read it as u8 so any
    // non-zero byte counts as true.
    pub type NameFn = unsafe extern "C" fn(*const u16) -> u8;
    pub type DialFn = unsafe extern "C" fn(i32, *const u16) -> u8;
    pub type ActionFn = unsafe extern "C" fn() -> u8;
    pub type CounterFn = unsafe extern "C" fn() -> u64;

    pub struct Exports {
        pub register: NameFn,
        pub unregister: NameFn,
        pub dial: DialFn,
        pub init: ActionFn,
        pub free: ActionFn,
        pub ht_start: ActionFn,
        pub get_up: CounterFn,
        pub get_dl: CounterFn,
    }
}

/// Runtime-loaded `Redirector.dll`
pub struct NativeRedirector {
    #[cfg(windows)]
    exports: exports::Exports,
    // Keeps the module mapped while the function pointers are in use
    #[cfg(windows)]
    _library: crate::windows::Library,
    #[cfg(not(windows))]
    _private: (),
}

impl NativeRedirector {
    /// Load the redirector, optionally from `library_dir`
    #[cfg(windows)]
    pub fn load(library_dir: Option<&Path>) -> Result<Self> {
        use crate::windows::Library;
        use std::mem::transmute;

        if let Some(dir) = library_dir {
            set_library_directory(dir)?;
        }

        let library = Library::load(REDIRECTOR_DLL)?;

        // Safety: signatures match the redirector's exported C ABI
        let exports = unsafe {
            exports::Exports {
                register: transmute(library.symbol("aio_register")?),
                unregister: transmute(library.symbol("aio_unregister")?),
                dial: transmute(library.symbol("aio_dial")?),
                init: transmute(library.symbol("aio_init")?),
                free: transmute(library.symbol("aio_free")?),
                ht_start: transmute(library.symbol("ht_start")?),
                get_up: transmute(library.symbol("aio_getUP")?),
                get_dl: transmute(library.symbol("aio_getDL")?),
            }
        };

        info!(library = REDIRECTOR_DLL, "Redirector loaded");
        Ok(Self {
            exports,
            _library: library,
        })
    }

    /// Stub implementation for non-Windows
    #[cfg(not(windows))]
    pub fn load(library_dir: Option<&Path>) -> Result<Self> {
        let _ = library_dir;
        info!(library = REDIRECTOR_DLL, "Redirector requested on unsupported platform");
        Err(crate::PlatformError::Unsupported(REDIRECTOR_DLL))
    }
}

#[cfg(windows)]
impl Redirector for NativeRedirector {
    fn register(&self, name: &str) -> bool {
        let wide = crate::windows::to_wide(name);
        unsafe { (self.exports.register)(wide.as_ptr()) != 0 }
    }

    fn unregister(&self, name: &str) -> bool {
        let wide = crate::windows::to_wide(name);
        unsafe { (self.exports.unregister)(wide.as_ptr()) != 0 }
    }

    fn dial(&self, option: DialOption, value: &str) -> bool {
        let wide = crate::windows::to_wide(value);
        unsafe { (self.exports.dial)(option.ordinal(), wide.as_ptr()) != 0 }
    }

    fn init(&self) -> bool {
        unsafe { (self.exports.init)() != 0 }
    }

    fn init_http(&self) -> bool {
        unsafe { (self.exports.ht_start)() != 0 }
    }

    fn free(&self) -> bool {
        unsafe { (self.exports.free)() != 0 }
    }

    fn uploaded(&self) -> u64 {
        unsafe { (self.exports.get_up)() }
    }

    fn downloaded(&self) -> u64 {
        unsafe { (self.exports.get_dl)() }
    }
}

// `load` never succeeds off Windows, so these are unreachable in practice.
#[cfg(not(windows))]
impl Redirector for NativeRedirector {
    fn register(&self, _name: &str) -> bool {
        false
    }

    fn unregister(&self, _name: &str) -> bool {
        false
    }

    fn dial(&self, _option: DialOption, _value: &str) -> bool {
        false
    }

    fn init(&self) -> bool {
        false
    }

    fn init_http(&self) -> bool {
        false
    }

    fn free(&self) -> bool {
        false
    }

    fn uploaded(&self) -> u64 {
        0
    }

    fn downloaded(&self) -> u64 {
        0
    }
}
