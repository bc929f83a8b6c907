//! The connectivity graph of an overlay design.
//!
//! Cores, ports, registers, signals, and hierarchies live in dense arenas and
//! refer to each other by copyable IDs ([`CoreId`], [`PortId`], ...). Parent
//! and connection links are plain IDs, never owning references, so the
//! back-referenced graph has no lifetime cycles.
//!
//! Derived facts (driver bindings, interrupt indices) are attached through the
//! [`Annotations`] side-table owned by the [`Design`].

#![warn(missing_docs)]

pub mod annotation;
pub mod arena;
pub mod builder;
pub mod design;
pub mod hierarchy;
pub mod ids;
pub mod ipcore;
pub mod loader;
pub mod port;
pub mod register;
pub mod signal;

pub use annotation::{
    Annotation, AnnotationKind, Annotations, ControllerIndex, DriverBinding, HierarchyDriver,
    InterruptIndex, NodeRef,
};
pub use arena::Arena;
pub use builder::{DesignBuilder, FieldSpec, RegisterSpec};
pub use design::Design;
pub use hierarchy::Hierarchy;
pub use ids::{CoreId, HierarchyId, PortId, RegisterId, SignalId};
pub use ipcore::{Core, CoreKind, GpioLine, Parameter, ProcessingSystem};
pub use loader::{build_design, load_design, load_design_from_str, DesignDescription, LoadError};
pub use port::{AddressMapEntry, AddressSpace, ManagerPort, Port, PortKind, SubordinatePort};
pub use register::{Access, Bitfield, Register};
pub use signal::Signal;
