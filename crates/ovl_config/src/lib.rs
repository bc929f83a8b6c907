//! Parsing and validation of `overlay.toml` session configuration files.
//!
//! This crate reads the session configuration and produces a strongly-typed
//! [`SessionConfig`]: the IP driver catalog, hierarchy driver candidates,
//! default drivers, and the interrupt topology conventions used by the views.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{resolve_session, ResolvedSession, SessionOverrides};
pub use types::*;
