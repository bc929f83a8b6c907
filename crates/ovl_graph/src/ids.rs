//! Typed handles for the node kinds of the connectivity graph.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! node_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Wraps a slot number.
            pub fn from_raw(slot: u32) -> Self {
                Self(slot)
            }

            /// The slot number.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(slot: u32) -> Self {
                $name::from_raw(slot)
            }

            fn as_raw(self) -> u32 {
                $name::as_raw(self)
            }
        }
    };
}

node_handle!(
    /// An IP core, the processing system included.
    CoreId
);
node_handle!(
    /// A port of a core.
    PortId
);
node_handle!(
    /// A register of a subordinate port.
    RegisterId
);
node_handle!(
    /// The signal attached to a port.
    SignalId
);
node_handle!(
    /// A hierarchy level.
    HierarchyId
);
