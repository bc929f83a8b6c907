//! Signals: the wires behind scalar ports.

use crate::ids::{PortId, SignalId};
use ovl_common::Ident;

/// A wire carried by a port.
///
/// `connections` lists the signals on the other end of the wire. It is a
/// non-owning relation used only for traversal; the signals themselves are
/// owned by the design's arena.
#[derive(Debug, Clone)]
pub struct Signal {
    /// This signal's ID.
    pub id: SignalId,
    /// The signal name (the name of its port).
    pub name: Ident,
    /// The port carrying this signal.
    pub port: PortId,
    /// Connected signals in connection order.
    pub connections: Vec<SignalId>,
}

impl Signal {
    /// Returns `true` if the signal is wired to anything.
    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }
}
