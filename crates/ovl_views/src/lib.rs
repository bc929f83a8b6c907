//! Queryable views over an overlay design.
//!
//! Each view is a dictionary recomputed on demand from the connectivity graph
//! plus the annotations cached on its nodes:
//!
//! - [`ip`]: register-addressable cores and the processing system.
//! - [`memory`]: memories the processing system maps, with image attributes
//!   served from the [`MemoryImageCache`].
//! - [`gpio`]: the processing system's GPIO lines.
//! - [`interrupts`]: interrupt controllers and pins, numbered by walking the
//!   interrupt fan-in topology.
//! - [`hierarchy`]: the pruned, flattened hierarchy tree with hierarchy
//!   drivers.
//!
//! [`MetadataSession`] owns a design and hands out all of them.

#![warn(missing_docs)]

pub mod codes;
pub mod gpio;
pub mod hierarchy;
pub mod interrupts;
pub mod ip;
pub mod memory;
pub mod session;
pub mod view;

pub use gpio::{gpio_view, GpioEntry, GpioView};
pub use hierarchy::{hierarchy_view, HierarchyContext, HierarchyRecord, HierarchyView};
pub use interrupts::{
    interrupt_controllers, interrupt_pins, walk_controllers, walk_pins, ControllerEntry,
    ControllerView, ControllerWalk, InterruptConventions, PinAssignment, PinEntry, PinView,
    WalkState,
};
pub use ip::{ip_view, FieldEntry, IpEntry, IpView, RegisterEntry};
pub use memory::{
    collect_memories, memory_view, ImageAttributes, MemoryEntry, MemoryImageBuilder,
    MemoryImageCache, MemoryView, SequentialImageBuilder,
};
pub use session::{MetadataSession, SessionSettings};
pub use view::ViewDict;
