//! Derived facts attached to graph nodes.
//!
//! Each derivation pass writes one [`Annotation`] per node and concern into the
//! design's [`Annotations`] side-table. Later requests for the same view read
//! the cached annotation instead of recomputing it, which is what makes
//! repeated view materialization idempotent.

use crate::ids::{CoreId, HierarchyId, PortId, SignalId};
use ovl_common::{DeviceRef, DriverName, OverlayRef};
use serde::Serialize;
use std::collections::HashMap;

/// A handle to any annotatable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeRef {
    /// A core.
    Core(CoreId),
    /// A port.
    Port(PortId),
    /// A signal.
    Signal(SignalId),
    /// A hierarchy.
    Hierarchy(HierarchyId),
}

/// The concern an annotation belongs to. A node carries at most one
/// annotation per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnnotationKind {
    /// IP driver bound to a subordinate port or to the processing system.
    DriverBinding,
    /// Interrupt pin index.
    InterruptIndex,
    /// Interrupt controller index.
    ControllerIndex,
    /// Driver bound to a hierarchy.
    HierarchyDriver,
}

/// The driver chosen for a port or core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverBinding {
    /// The chosen driver.
    pub driver: DriverName,
    /// The device the driver will operate on.
    pub device: DeviceRef,
}

/// The interrupt index assigned to a pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterruptIndex {
    /// Global pin index.
    pub index: u32,
    /// Hierarchy path of the controller (or processing system) the pin reaches.
    pub controller: String,
}

/// The index assigned to an interrupt controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControllerIndex {
    /// Controller index, starting at 0.
    pub index: u32,
}

/// The driver chosen for a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyDriver {
    /// The chosen driver.
    pub driver: DriverName,
    /// The device the driver will operate on.
    pub device: DeviceRef,
    /// The overlay the hierarchy belongs to.
    pub overlay: OverlayRef,
}

/// A derived fact about one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// See [`DriverBinding`].
    DriverBinding(DriverBinding),
    /// See [`InterruptIndex`].
    InterruptIndex(InterruptIndex),
    /// See [`ControllerIndex`].
    ControllerIndex(ControllerIndex),
    /// See [`HierarchyDriver`].
    HierarchyDriver(HierarchyDriver),
}

impl Annotation {
    /// The concern this annotation belongs to.
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::DriverBinding(_) => AnnotationKind::DriverBinding,
            Annotation::InterruptIndex(_) => AnnotationKind::InterruptIndex,
            Annotation::ControllerIndex(_) => AnnotationKind::ControllerIndex,
            Annotation::HierarchyDriver(_) => AnnotationKind::HierarchyDriver,
        }
    }
}

/// Side-table of annotations keyed by node and concern.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    entries: HashMap<(NodeRef, AnnotationKind), Annotation>,
}

impl Annotations {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes an annotation, replacing any previous one of the same kind on
    /// the node. Returns the replaced annotation.
    pub fn insert(&mut self, node: NodeRef, annotation: Annotation) -> Option<Annotation> {
        self.entries.insert((node, annotation.kind()), annotation)
    }

    /// Reads the annotation of the given kind on a node.
    pub fn get(&self, node: NodeRef, kind: AnnotationKind) -> Option<&Annotation> {
        self.entries.get(&(node, kind))
    }

    /// Returns `true` if the node carries an annotation of the given kind.
    pub fn contains(&self, node: NodeRef, kind: AnnotationKind) -> bool {
        self.entries.contains_key(&(node, kind))
    }

    /// The driver bound to a port or core.
    pub fn driver_binding(&self, node: NodeRef) -> Option<&DriverBinding> {
        match self.get(node, AnnotationKind::DriverBinding) {
            Some(Annotation::DriverBinding(binding)) => Some(binding),
            _ => None,
        }
    }

    /// The interrupt index of a pin.
    pub fn interrupt_index(&self, node: NodeRef) -> Option<&InterruptIndex> {
        match self.get(node, AnnotationKind::InterruptIndex) {
            Some(Annotation::InterruptIndex(index)) => Some(index),
            _ => None,
        }
    }

    /// The index of an interrupt controller.
    pub fn controller_index(&self, node: NodeRef) -> Option<u32> {
        match self.get(node, AnnotationKind::ControllerIndex) {
            Some(Annotation::ControllerIndex(c)) => Some(c.index),
            _ => None,
        }
    }

    /// The driver bound to a hierarchy.
    pub fn hierarchy_driver(&self, node: NodeRef) -> Option<&HierarchyDriver> {
        match self.get(node, AnnotationKind::HierarchyDriver) {
            Some(Annotation::HierarchyDriver(binding)) => Some(binding),
            _ => None,
        }
    }

    /// Iterates over every annotation of one kind, in unspecified order.
    pub fn of_kind(&self, kind: AnnotationKind) -> impl Iterator<Item = (NodeRef, &Annotation)> {
        self.entries
            .iter()
            .filter(move |((_, k), _)| *k == kind)
            .map(|((node, _), annotation)| (*node, annotation))
    }

    /// Drops every annotation of one kind. Returns how many were removed.
    pub fn clear_kind(&mut self, kind: AnnotationKind) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(_, k), _| *k != kind);
        before - self.entries.len()
    }

    /// Total number of annotations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no annotations have been written.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
