//! IP core nodes.
//!
//! A [`Core`] is an instantiated IP block. The processing system is a core
//! too; what sets it apart (interrupt inputs, IRQ numbering, GPIO lines) lives
//! in the [`CoreKind::ProcessingSystem`] variant rather than a separate type.

use crate::ids::{CoreId, HierarchyId, PortId};
use ovl_common::{Ident, Vlnv};
use std::collections::BTreeMap;

/// A configuration parameter of a core (e.g. `C_GPIO_WIDTH = 8`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// The parameter name.
    pub name: Ident,
    /// The parameter value as written in the design.
    pub value: String,
}

/// A GPIO line driven by the processing system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpioLine {
    /// The line name.
    pub name: String,
    /// The line index within the processing system's GPIO bank.
    pub index: u32,
    /// The core pins wired to this line.
    pub pins: Vec<PortId>,
}

/// Processing-system specific metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingSystem {
    /// Interrupt request inputs, in declaration order.
    pub irq_pins: Vec<PortId>,
    /// Raw interrupt number for each interrupt controller index.
    pub irq_map: BTreeMap<u32, u32>,
    /// GPIO lines in declaration order.
    pub gpio: Vec<GpioLine>,
}

/// What kind of core this is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreKind {
    /// An ordinary IP block.
    Ip,
    /// The processing system.
    ProcessingSystem(ProcessingSystem),
}

/// An IP core instance.
#[derive(Debug, Clone)]
pub struct Core {
    /// This core's ID.
    pub id: CoreId,
    /// Instance name, unique within `hierarchy`.
    pub name: Ident,
    /// Type identifier; never changes after creation.
    pub vlnv: Vlnv,
    /// The hierarchy directly containing this core.
    pub hierarchy: HierarchyId,
    /// Full hierarchy path, e.g. `audio/codec_ctrl_0`.
    pub path: String,
    /// IP core or processing system.
    pub kind: CoreKind,
    /// Ports in declaration order.
    pub ports: Vec<PortId>,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
}

impl Core {
    /// Returns `true` for the processing system.
    pub fn is_processing_system(&self) -> bool {
        matches!(self.kind, CoreKind::ProcessingSystem(_))
    }

    /// Returns the processing-system metadata, if this is one.
    pub fn processing_system(&self) -> Option<&ProcessingSystem> {
        match &self.kind {
            CoreKind::ProcessingSystem(ps) => Some(ps),
            CoreKind::Ip => None,
        }
    }
}
