//! The driver binding pass over a whole design.

use crate::resolver::{bind, BindingContext};
use ovl_common::MetadataResult;
use ovl_diagnostics::DiagnosticSink;
use ovl_graph::{Design, NodeRef};
use tracing::debug;

/// Binds a driver to every subordinate port that owns registers and to every
/// processing-system core.
///
/// Nodes that already carry a binding keep it, so running the pass again on
/// the same design changes nothing and emits no diagnostics. Returns the
/// number of nodes bound by this call.
pub fn bind_drivers(
    design: &mut Design,
    ctx: &BindingContext,
    sink: &DiagnosticSink,
) -> MetadataResult<usize> {
    let mut targets = Vec::new();
    for (id, core) in design.cores.iter() {
        for &port in &core.ports {
            if design.ports[port].has_registers() {
                targets.push(NodeRef::Port(port));
            }
        }
        if core.is_processing_system() {
            targets.push(NodeRef::Core(id));
        }
    }

    let mut bound = 0;
    for node in targets {
        if design.annotations.driver_binding(node).is_some() {
            continue;
        }
        bind(design, node, ctx, sink)?;
        bound += 1;
    }
    debug!(bound, "driver binding pass complete");
    Ok(bound)
}
