//! Driver assignment for overlay designs.
//!
//! Three pieces live here:
//!
//! - [`resolver`]: version-aware lookup of an IP type identifier in the driver
//!   catalog, and binding the result onto a port or core annotation.
//! - [`pass`]: the binding pass over a whole design (every register-bearing
//!   subordinate port plus the processing system).
//! - [`hierarchy`]: hierarchy driver candidates and the matchers that decide
//!   which one claims a hierarchy.
//!
//! Version mismatches never fail a binding. They fall back to the default
//! driver and emit [`codes::W301`] into the caller's diagnostic sink.

#![warn(missing_docs)]

pub mod codes;
pub mod hierarchy;
pub mod pass;
pub mod resolver;

pub use hierarchy::{HierarchyCandidate, HierarchyDrivers, HierarchySummary, Matcher, TypePattern};
pub use pass::bind_drivers;
pub use resolver::{bind, resolve, BindingContext, DriverCatalog, Resolution};
