//! Top-level design container.
//!
//! A [`Design`] owns every node arena, the name interner, and the annotation
//! side-table. It lives for one design session; views borrow it to read the
//! graph and write derived annotations back.

use crate::annotation::Annotations;
use crate::arena::Arena;
use crate::hierarchy::Hierarchy;
use crate::ids::{CoreId, HierarchyId, PortId, RegisterId, SignalId};
use crate::ipcore::Core;
use crate::port::Port;
use crate::register::Register;
use crate::signal::Signal;
use ovl_common::{Ident, Interner, MetadataError, MetadataResult};

/// A complete overlay design: the connectivity graph plus derived annotations.
#[derive(Debug)]
pub struct Design {
    /// Interner for every name in the design.
    pub interner: Interner,
    /// All hierarchies, the root first.
    pub hierarchies: Arena<HierarchyId, Hierarchy>,
    /// All cores, the processing system included.
    pub cores: Arena<CoreId, Core>,
    /// All ports.
    pub ports: Arena<PortId, Port>,
    /// All registers.
    pub registers: Arena<RegisterId, Register>,
    /// All signals.
    pub signals: Arena<SignalId, Signal>,
    /// The root hierarchy.
    pub root: HierarchyId,
    /// Derived facts attached to nodes.
    pub annotations: Annotations,
}

impl Design {
    /// Creates an empty design with only a root hierarchy.
    pub fn new() -> Self {
        let interner = Interner::new();
        let mut hierarchies = Arena::new();
        let root = hierarchies.next_id();
        hierarchies.alloc(Hierarchy {
            id: root,
            name: interner.get_or_intern(""),
            parent: None,
            path: String::new(),
            cores: Vec::new(),
            children: Vec::new(),
        });
        Self {
            interner,
            hierarchies,
            cores: Arena::new(),
            ports: Arena::new(),
            registers: Arena::new(),
            signals: Arena::new(),
            root,
            annotations: Annotations::new(),
        }
    }

    /// Resolves an interned name.
    pub fn name(&self, ident: Ident) -> &str {
        self.interner.resolve(ident)
    }

    /// Returns the root hierarchy.
    pub fn root_hierarchy(&self) -> &Hierarchy {
        &self.hierarchies[self.root]
    }

    /// The instance name of a core.
    pub fn core_name(&self, core: CoreId) -> &str {
        self.name(self.cores[core].name)
    }

    /// The name of a port.
    pub fn port_name(&self, port: PortId) -> &str {
        self.name(self.ports[port].name)
    }

    /// The core owning a port.
    pub fn port_core(&self, port: PortId) -> CoreId {
        self.ports[port].core
    }

    /// The core owning the port that carries a signal.
    pub fn signal_core(&self, signal: SignalId) -> CoreId {
        self.port_core(self.signals[signal].port)
    }

    /// The name of a signal.
    pub fn signal_name(&self, signal: SignalId) -> &str {
        self.name(self.signals[signal].name)
    }

    /// Every processing-system core, in creation order.
    pub fn processing_systems(&self) -> Vec<CoreId> {
        self.cores
            .iter()
            .filter(|(_, core)| core.is_processing_system())
            .map(|(id, _)| id)
            .collect()
    }

    /// The single processing system of the design.
    ///
    /// Fails with [`MetadataError::Configuration`] when the design has none
    /// or more than one.
    pub fn processing_system(&self) -> MetadataResult<CoreId> {
        match self.processing_systems().as_slice() {
            [single] => Ok(*single),
            [] => Err(MetadataError::configuration(
                "no processing system in design",
            )),
            many => Err(MetadataError::configuration(format!(
                "{} processing systems in design, expected exactly one",
                many.len()
            ))),
        }
    }

    /// Finds a core by its full hierarchy path.
    pub fn find_core_by_path(&self, path: &str) -> Option<CoreId> {
        self.cores
            .iter()
            .find(|(_, core)| core.path == path)
            .map(|(id, _)| id)
    }

    /// Finds a hierarchy by its full path. The empty path is the root.
    pub fn find_hierarchy_by_path(&self, path: &str) -> Option<HierarchyId> {
        self.hierarchies
            .iter()
            .find(|(_, h)| h.path == path)
            .map(|(id, _)| id)
    }

    /// Finds a port of a core by name.
    pub fn port_by_name(&self, core: CoreId, name: &str) -> Option<PortId> {
        let ident = self.interner.get(name)?;
        self.cores[core]
            .ports
            .iter()
            .copied()
            .find(|&port| self.ports[port].name == ident)
    }

    /// Read access to the annotation side-table.
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Write access to the annotation side-table.
    pub fn annotations_mut(&mut self) -> &mut Annotations {
        &mut self.annotations
    }
}

impl Default for Design {
    fn default() -> Self {
        Self::new()
    }
}
