//! Opaque handles for drivers, devices, and overlays.
//!
//! The metadata core never instantiates drivers or talks to devices; it only
//! records which handle was chosen. Handles are plain names that the host
//! application maps back onto its own driver classes and device objects.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a handle from its name.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Returns the handle name.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_string())
            }
        }
    };
}

define_handle!(
    /// A driver implementation chosen for a core, port, or hierarchy.
    DriverName
);

define_handle!(
    /// The device a bound driver will operate on.
    DeviceRef
);

define_handle!(
    /// The overlay a hierarchy driver belongs to.
    OverlayRef
);
