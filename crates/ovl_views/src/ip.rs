//! The IP view: every register-addressable core plus the processing system.

use crate::view::ViewDict;
use ovl_common::{DeviceRef, DriverName, MetadataResult};
use ovl_graph::{Access, Core, Design, NodeRef, PortId, RegisterId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Name of the IP view in errors.
pub const IP_VIEW: &str = "ip view";

/// The IP view, keyed by core hierarchy path.
pub type IpView = ViewDict<IpEntry>;

/// A bitfield of a register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldEntry {
    /// Least significant bit.
    pub bit_offset: u32,
    /// Number of bits.
    pub bit_width: u32,
    /// Free-form description.
    pub description: String,
    /// Access mode.
    pub access: Access,
}

/// A register of an IP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterEntry {
    /// Byte offset from the IP base address.
    pub address_offset: u64,
    /// Width in bits.
    pub width: u32,
    /// Free-form description.
    pub description: String,
    /// Access mode.
    pub access: Access,
    /// Bitfields keyed by name.
    pub fields: BTreeMap<String, FieldEntry>,
}

/// One IP of the design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpEntry {
    /// Versioned type identifier.
    #[serde(rename = "type")]
    pub type_id: String,
    /// Hierarchy path of the core.
    pub fullpath: String,
    /// Name of the subordinate port the registers sit behind.
    pub mem_id: Option<String>,
    /// Base address of that port.
    pub phys_addr: Option<u64>,
    /// Size of its address window.
    pub addr_range: Option<u64>,
    /// Core parameters.
    pub parameters: BTreeMap<String, String>,
    /// Registers keyed by name.
    pub registers: BTreeMap<String, RegisterEntry>,
    /// Bound driver, if the binding pass has run.
    pub driver: Option<DriverName>,
    /// Device of the bound driver.
    pub device: Option<DeviceRef>,
    /// Always `null`; the IP view is read only.
    pub state: Option<serde_json::Value>,
}

/// Collects a core's parameters.
pub(crate) fn parameters(design: &Design, core: &Core) -> BTreeMap<String, String> {
    core.parameters
        .iter()
        .map(|p| (design.name(p.name).to_string(), p.value.clone()))
        .collect()
}

/// Collects the registers behind a subordinate port.
pub(crate) fn registers(design: &Design, ids: &[RegisterId]) -> BTreeMap<String, RegisterEntry> {
    ids.iter()
        .map(|&id| {
            let reg = &design.registers[id];
            let fields = reg
                .bitfields
                .iter()
                .map(|f| {
                    (
                        design.name(f.name).to_string(),
                        FieldEntry {
                            bit_offset: f.low,
                            bit_width: f.width(),
                            description: f.description.clone(),
                            access: f.access,
                        },
                    )
                })
                .collect();
            (
                design.name(reg.name).to_string(),
                RegisterEntry {
                    address_offset: reg.offset,
                    width: reg.width,
                    description: reg.description.clone(),
                    access: reg.access,
                    fields,
                },
            )
        })
        .collect()
}

fn register_port(design: &Design, core: &Core) -> Option<PortId> {
    core.ports
        .iter()
        .copied()
        .find(|&p| design.ports[p].has_registers())
}

/// Materializes the IP view from the graph and the cached driver bindings.
///
/// A core is listed when one of its subordinate ports owns registers; the
/// first such port supplies address, registers, and driver. The processing
/// system is always listed, without registers, carrying its core-level
/// binding.
pub fn ip_view(design: &Design) -> MetadataResult<IpView> {
    let mut entries = BTreeMap::new();
    for (id, core) in design.cores.iter() {
        let entry = if core.is_processing_system() {
            let binding = design.annotations.driver_binding(NodeRef::Core(id));
            IpEntry {
                type_id: core.vlnv.to_string(),
                fullpath: core.path.clone(),
                mem_id: None,
                phys_addr: None,
                addr_range: None,
                parameters: parameters(design, core),
                registers: BTreeMap::new(),
                driver: binding.map(|b| b.driver.clone()),
                device: binding.map(|b| b.device.clone()),
                state: None,
            }
        } else if let Some(port) = register_port(design, core) {
            let Some(sub) = design.ports[port].as_subordinate() else {
                continue;
            };
            let binding = design.annotations.driver_binding(NodeRef::Port(port));
            IpEntry {
                type_id: core.vlnv.to_string(),
                fullpath: core.path.clone(),
                mem_id: Some(design.port_name(port).to_string()),
                phys_addr: Some(sub.base_address),
                addr_range: Some(sub.range),
                parameters: parameters(design, core),
                registers: registers(design, &sub.registers),
                driver: binding.map(|b| b.driver.clone()),
                device: binding.map(|b| b.device.clone()),
                state: None,
            }
        } else {
            continue;
        };
        entries.insert(core.path.clone(), Rc::new(entry));
    }
    Ok(ViewDict::read_only(IP_VIEW, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovl_common::MetadataError;
    use ovl_graph::{Annotation, DesignBuilder, DriverBinding, RegisterSpec};
    use serde_json::json;

    fn design() -> Design {
        let mut b = DesignBuilder::new();
        let ps = b
            .processing_system("ps7_0", "xilinx.com:ip:processing_system7:5.5")
            .unwrap();
        b.parameter(ps, "C_FCLK_CLK0_FREQ", "100000000");
        let gpio = b.core("leds/axi_gpio_0", "xilinx.com:ip:axi_gpio:2.0").unwrap();
        b.parameter(gpio, "C_GPIO_WIDTH", "4");
        let s = b.subordinate_port(gpio, "S_AXI", 0x4120_0000, 0x1_0000).unwrap();
        b.register(
            s,
            RegisterSpec::new("GPIO_DATA", 0)
                .description("Channel 1 AXI GPIO Data Register.")
                .field("Channel_1_GPIO_DATA", 0, 3, Access::ReadWrite),
        )
        .unwrap();
        b.register(s, RegisterSpec::new("GPIO_TRI", 4)).unwrap();
        let bram = b.core("bram", "xilinx.com:ip:axi_bram_ctrl:4.1").unwrap();
        b.subordinate_port(bram, "S_AXI", 0x4000_0000, 0x2000).unwrap();
        b.finish()
    }

    #[test]
    fn lists_register_cores_and_processing_system() {
        let view = ip_view(&design()).unwrap();
        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["leds/axi_gpio_0", "ps7_0"]);

        let gpio = view.get("leds/axi_gpio_0").unwrap();
        assert_eq!(gpio.type_id, "xilinx.com:ip:axi_gpio:2.0");
        assert_eq!(gpio.mem_id.as_deref(), Some("S_AXI"));
        assert_eq!(gpio.phys_addr, Some(0x4120_0000));
        assert_eq!(gpio.addr_range, Some(0x1_0000));
        assert_eq!(gpio.parameters["C_GPIO_WIDTH"], "4");
        assert_eq!(gpio.registers["GPIO_TRI"].address_offset, 4);
        let field = &gpio.registers["GPIO_DATA"].fields["Channel_1_GPIO_DATA"];
        assert_eq!(field.bit_offset, 0);
        assert_eq!(field.bit_width, 4);
        assert!(gpio.driver.is_none());

        let ps = view.get("ps7_0").unwrap();
        assert!(ps.registers.is_empty());
        assert!(ps.mem_id.is_none());
    }

    #[test]
    fn reads_cached_bindings() {
        let mut design = design();
        let gpio = design.find_core_by_path("leds/axi_gpio_0").unwrap();
        let port = design.port_by_name(gpio, "S_AXI").unwrap();
        design.annotations.insert(
            NodeRef::Port(port),
            Annotation::DriverBinding(DriverBinding {
                driver: DriverName::new("AxiGPIO"),
                device: DeviceRef::new("pynq-z2"),
            }),
        );
        let view = ip_view(&design).unwrap();
        let entry = view.get("leds/axi_gpio_0").unwrap();
        assert_eq!(entry.driver.as_ref().unwrap().as_str(), "AxiGPIO");
        assert_eq!(entry.device.as_ref().unwrap().as_str(), "pynq-z2");
    }

    #[test]
    fn ip_view_is_read_only() {
        let mut view = ip_view(&design()).unwrap();
        assert!(matches!(
            view.set("ps7_0", json!("x")),
            Err(MetadataError::UnsupportedOperation { view: IP_VIEW })
        ));
    }

    #[test]
    fn json_shape() {
        let view = ip_view(&design()).unwrap();
        let json = view.to_json().unwrap();
        let gpio = &json["leds/axi_gpio_0"];
        assert_eq!(gpio["type"], "xilinx.com:ip:axi_gpio:2.0");
        assert_eq!(gpio["registers"]["GPIO_DATA"]["access"], "read-write");
        assert_eq!(gpio["registers"]["GPIO_DATA"]["fields"]["Channel_1_GPIO_DATA"]["bit_width"], 4);
        assert_eq!(gpio["state"], json!(null));
    }
}
