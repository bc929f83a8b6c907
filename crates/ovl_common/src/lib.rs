//! Shared foundational types for overlay design metadata.
//!
//! This crate provides interned identifiers, versioned IP type identifiers,
//! opaque driver/device/overlay handles, and the fatal error taxonomy shared
//! by every view and pass.

#![warn(missing_docs)]

pub mod error;
pub mod handle;
pub mod ident;
pub mod vlnv;

pub use error::{MetadataError, MetadataResult};
pub use handle::{DeviceRef, DriverName, OverlayRef};
pub use ident::{Ident, Interner};
pub use vlnv::Vlnv;
