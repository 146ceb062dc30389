//! # NetFilter Core
//!
//! Platform-independent control plane for the netfilter2 kernel driver and
//! its native redirector library.
//!
//! ## Architecture
//!
//! This crate provides:
//! - **Option dial protocol** - typed requests for the redirector's named options
//! - **Driver reconciliation** - install, upgrade and downgrade decisions
//! - **Lifecycle** - guarded start/stop of a redirection session
//! - **Configuration** - TOML session configuration
//!
//! The native library and the OS are reached through the [`Redirector`],
//! [`driver::DriverHost`] and [`proxy::ProcessLocator`] traits, implemented
//! by `nfapi-platform`.
//!
//! ## Example
//!
//! ```rust,no_run
//! # async fn run(netfilter: nfapi_core::NetFilter) -> nfapi_core::Result<()> {
//! use nfapi_core::{RuleSet, SessionConfig};
//!
//! let session = SessionConfig::new("127.0.0.1", 1080)
//!     .with_rules(RuleSet::new(vec!["chrome.exe".into()], vec![]));
//!
//! netfilter.start(&session).await?;
//! // ...
//! netfilter.stop().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod dial;
pub mod driver;
pub mod error;
pub mod netfilter;
pub mod proxy;
pub mod redirector;
pub mod session;

// Re-exports for convenience
pub use config::Config;
pub use dial::{Dial, DialOption};
pub use driver::{DriverAction, DriverManager, DriverPaths, DriverStatus, DriverVersion};
pub use error::{invalid_rules_message, Error, Result};
pub use netfilter::{LifecycleState, NetFilter};
pub use redirector::{Redirector, TrafficStats};
pub use session::{Credentials, RuleSet, SessionConfig};
