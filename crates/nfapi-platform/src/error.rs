//! Platform-specific errors

use thiserror::Error;

/// Platform-specific errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Native library could not be loaded
    #[error("Failed to load {name} (error {code})")]
    LibraryLoad {
        /// Library file name
        name: &'static str,
        /// Win32 error code
        code: u32,
    },

    /// Native library is missing an export
    #[error("{library} does not export {symbol}")]
    MissingSymbol {
        /// Library file name
        library: &'static str,
        /// Export name
        symbol: &'static str,
    },

    /// Setting the DLL search directory failed
    #[error("Failed to set library directory {path} (error {code})")]
    LibraryDirectory {
        /// Requested directory
        path: String,
        /// Win32 error code
        code: u32,
    },

    /// Service control manager error
    #[error("Service error: {0}")]
    Service(String),

    /// Operation needs Windows
    #[error("{0} is only available on Windows")]
    Unsupported(&'static str),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Platform result type
pub type Result<T> = std::result::Result<T, PlatformError>;
