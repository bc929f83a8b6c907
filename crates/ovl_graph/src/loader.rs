//! Loading a design from a JSON design description.
//!
//! The description lists cores (with ports, registers, and parameters) and the
//! wires between scalar ports. Ports are referenced as `<core path>/<port>`,
//! e.g. `audio/xlconcat_0/In1`.
//!
//! ```json
//! {
//!   "cores": [
//!     { "path": "ps7_0", "vlnv": "xilinx.com:ip:processing_system7:5.5",
//!       "processing_system": { "irq_pins": ["IRQ_F2P"], "irq_map": { "0": 61 } },
//!       "ports": [ { "name": "IRQ_F2P", "kind": "scalar" } ] }
//!   ],
//!   "connections": [ ["ps7_0/IRQ_F2P", "axi_intc_0/irq"] ]
//! }
//! ```

use crate::builder::{DesignBuilder, RegisterSpec};
use crate::design::Design;
use crate::ids::PortId;
use crate::port::AddressSpace;
use ovl_common::MetadataError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading a design description.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The description file could not be read.
    #[error("failed to read design `{path}`: {source}")]
    Io {
        /// The file that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The description is not valid JSON for the expected schema.
    #[error("failed to parse design: {0}")]
    Json(#[from] serde_json::Error),

    /// The description violates a structural invariant of the graph.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// A port reference does not name an existing core and port.
    #[error("dangling port reference `{0}`")]
    DanglingReference(String),
}

/// Top-level JSON design description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DesignDescription {
    /// Every core in the design.
    #[serde(default)]
    pub cores: Vec<CoreDescription>,
    /// Pairs of connected scalar ports.
    #[serde(default)]
    pub connections: Vec<[String; 2]>,
}

/// One core of a [`DesignDescription`].
#[derive(Debug, Clone, Deserialize)]
pub struct CoreDescription {
    /// Full hierarchy path.
    pub path: String,
    /// Type identifier.
    pub vlnv: String,
    /// Parameter values.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Ports in declaration order.
    #[serde(default)]
    pub ports: Vec<PortDescription>,
    /// Present only on the processing system.
    #[serde(default)]
    pub processing_system: Option<PsDescription>,
}

/// One port of a [`CoreDescription`].
#[derive(Debug, Clone, Deserialize)]
pub struct PortDescription {
    /// Port name.
    pub name: String,
    /// Port kind and kind-specific data.
    #[serde(flatten)]
    pub kind: PortKindDescription,
}

/// Kind-specific port data, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PortKindDescription {
    /// A subordinate port with its address window and registers.
    Subordinate {
        /// Physical base address.
        #[serde(default)]
        base_address: u64,
        /// Window size in bytes.
        #[serde(default)]
        range: u64,
        /// Registers in declaration order.
        #[serde(default)]
        registers: Vec<RegisterSpec>,
    },
    /// A manager port with its address map.
    Manager {
        /// Address map entries in order.
        #[serde(default)]
        address_map: Vec<AddressMapDescription>,
    },
    /// A single wire.
    Scalar,
}

/// One address-map entry of a manager port.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressMapDescription {
    /// Destination subordinate port, `<core path>/<port>`.
    pub target: String,
    /// Memory or register space.
    pub space: AddressSpace,
}

/// Processing-system metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PsDescription {
    /// Names of the interrupt input ports, in order.
    #[serde(default)]
    pub irq_pins: Vec<String>,
    /// Controller index to raw interrupt number.
    #[serde(default)]
    pub irq_map: BTreeMap<u32, u32>,
    /// GPIO lines.
    #[serde(default)]
    pub gpio: Vec<GpioDescription>,
}

/// A processing-system GPIO line.
#[derive(Debug, Clone, Deserialize)]
pub struct GpioDescription {
    /// Line name.
    pub name: String,
    /// Index in the GPIO bank.
    pub index: u32,
    /// Connected pins, `<core path>/<port>`.
    #[serde(default)]
    pub pins: Vec<String>,
}

/// Loads a design description from a JSON file.
pub fn load_design(path: &Path) -> Result<Design, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_design_from_str(&content)
}

/// Loads a design description from a JSON string.
pub fn load_design_from_str(content: &str) -> Result<Design, LoadError> {
    let description: DesignDescription = serde_json::from_str(content)?;
    build_design(&description)
}

/// Builds a design from an already-parsed description.
///
/// Cores and their ports are created first so that address maps, wires, and
/// processing-system pin lists can refer to ports declared later in the file.
pub fn build_design(description: &DesignDescription) -> Result<Design, LoadError> {
    let mut builder = DesignBuilder::new();

    for core in &description.cores {
        let id = match core.processing_system {
            Some(_) => builder.processing_system(&core.path, &core.vlnv)?,
            None => builder.core(&core.path, &core.vlnv)?,
        };
        for (name, value) in &core.parameters {
            builder.parameter(id, name, value.as_str());
        }
        for port in &core.ports {
            match &port.kind {
                PortKindDescription::Subordinate {
                    base_address,
                    range,
                    registers,
                } => {
                    let pid = builder.subordinate_port(id, &port.name, *base_address, *range)?;
                    for reg in registers {
                        builder.register(pid, reg.clone())?;
                    }
                }
                PortKindDescription::Manager { .. } => {
                    builder.manager_port(id, &port.name)?;
                }
                PortKindDescription::Scalar => {
                    builder.scalar_port(id, &port.name)?;
                }
            }
        }
    }

    for core in &description.cores {
        for port in &core.ports {
            if let PortKindDescription::Manager { address_map } = &port.kind {
                let manager = resolve_port(&builder, &format!("{}/{}", core.path, port.name))?;
                for entry in address_map {
                    let target = resolve_port(&builder, &entry.target)?;
                    builder.map_address(manager, target, entry.space)?;
                }
            }
        }
        if let Some(ps) = &core.processing_system {
            let ps_id = builder
                .design()
                .find_core_by_path(&core.path)
                .ok_or_else(|| LoadError::DanglingReference(core.path.clone()))?;
            for pin in &ps.irq_pins {
                let port = resolve_port(&builder, &format!("{}/{}", core.path, pin))?;
                builder.irq_pin(ps_id, port)?;
            }
            for (&index, &raw) in &ps.irq_map {
                builder.irq_map(ps_id, index, raw)?;
            }
            for line in &ps.gpio {
                let pins = line
                    .pins
                    .iter()
                    .map(|p| resolve_port(&builder, p))
                    .collect::<Result<Vec<_>, _>>()?;
                builder.gpio(ps_id, &line.name, line.index, pins)?;
            }
        }
    }

    for [a, b] in &description.connections {
        let pa = resolve_port(&builder, a)?;
        let pb = resolve_port(&builder, b)?;
        builder.connect(pa, pb)?;
    }

    let design = builder.finish();
    tracing::debug!(
        cores = design.cores.len(),
        ports = design.ports.len(),
        signals = design.signals.len(),
        "loaded design description"
    );
    Ok(design)
}

fn resolve_port(builder: &DesignBuilder, reference: &str) -> Result<PortId, LoadError> {
    let dangling = || LoadError::DanglingReference(reference.to_string());
    let (core_path, port_name) = reference.rsplit_once('/').ok_or_else(dangling)?;
    let design = builder.design();
    let core = design.find_core_by_path(core_path).ok_or_else(dangling)?;
    design.port_by_name(core, port_name).ok_or_else(dangling)
}
