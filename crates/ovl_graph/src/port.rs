//! Ports: a core's connection points.
//!
//! Bus ports are either [`PortKind::Subordinate`] (register-addressable
//! targets) or [`PortKind::Manager`] (address-space initiators). Single wires
//! such as interrupt lines and concatenator inputs are [`PortKind::Scalar`].

use crate::ids::{CoreId, PortId, RegisterId, SignalId};
use ovl_common::Ident;
use serde::{Deserialize, Serialize};

/// How an address-map entry is used by the initiator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressSpace {
    /// The destination is a memory.
    Memory,
    /// The destination is a register file.
    Register,
}

/// One entry of a manager port's address map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressMapEntry {
    /// The subordinate port this range reaches.
    pub subordinate: PortId,
    /// Memory or register space.
    pub space: AddressSpace,
}

/// A register-addressable target port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubordinatePort {
    /// Physical base address.
    pub base_address: u64,
    /// Size of the address range in bytes.
    pub range: u64,
    /// Registers owned by this port, in declaration order.
    pub registers: Vec<RegisterId>,
}

/// An address-space initiator port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerPort {
    /// Ordered address map.
    pub address_map: Vec<AddressMapEntry>,
}

/// The kind of a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortKind {
    /// A register-addressable target.
    Subordinate(SubordinatePort),
    /// An address-space initiator.
    Manager(ManagerPort),
    /// A single wire.
    Scalar,
}

/// A port, exclusively owned by one core.
#[derive(Debug, Clone)]
pub struct Port {
    /// This port's ID.
    pub id: PortId,
    /// The port name, unique within its core.
    pub name: Ident,
    /// The owning core.
    pub core: CoreId,
    /// Subordinate, manager, or scalar.
    pub kind: PortKind,
    /// The signal carried by this port, if any.
    pub signal: Option<SignalId>,
}

impl Port {
    /// Returns the subordinate side of this port, if it is one.
    pub fn as_subordinate(&self) -> Option<&SubordinatePort> {
        match &self.kind {
            PortKind::Subordinate(sub) => Some(sub),
            _ => None,
        }
    }

    /// Returns the manager side of this port, if it is one.
    pub fn as_manager(&self) -> Option<&ManagerPort> {
        match &self.kind {
            PortKind::Manager(mgr) => Some(mgr),
            _ => None,
        }
    }

    /// Returns `true` for a subordinate port owning at least one register.
    pub fn has_registers(&self) -> bool {
        self.as_subordinate()
            .is_some_and(|sub| !sub.registers.is_empty())
    }
}
