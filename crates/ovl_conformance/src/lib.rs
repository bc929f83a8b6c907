//! Fixture designs for end-to-end tests of the metadata views.
//!
//! [`BASE_DESIGN`] is a small board overlay in the JSON description format:
//! a processing system, GPIO blocks, an audio and a video hierarchy, an
//! interrupt controller fed through concatenators, and two memories.
//! [`BASE_CONFIG`] is a matching `overlay.toml`. The remaining builders
//! produce targeted graphs for single properties.

#![warn(missing_docs)]

use ovl_common::{DeviceRef, DriverName};
use ovl_config::{load_config_from_str, resolve_session, ResolvedSession, SessionOverrides};
use ovl_drivers::{BindingContext, DriverCatalog};
use ovl_graph::{load_design_from_str, Design, DesignBuilder, PortId, RegisterSpec};
use ovl_views::{ImageAttributes, MemoryEntry, MemoryImageBuilder, MetadataSession, SequentialImageBuilder};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Type identifier of the processing system used by the fixtures.
pub const PS_VLNV: &str = "xilinx.com:ip:processing_system7:5.5";
/// Type identifier of the interrupt controller.
pub const INTC_VLNV: &str = "xilinx.com:ip:axi_intc:4.1";
/// Type identifier of the concatenator.
pub const CONCAT_VLNV: &str = "xilinx.com:ip:xlconcat:2.1";

/// A board overlay design description.
pub const BASE_DESIGN: &str = r#"{
  "cores": [
    {
      "path": "ps7_0",
      "vlnv": "xilinx.com:ip:processing_system7:5.5",
      "parameters": { "PCW_FPGA0_PERIPHERAL_FREQMHZ": "100" },
      "ports": [
        { "name": "IRQ_F2P", "kind": "scalar" },
        { "name": "M_AXI_GP0", "kind": "manager", "address_map": [
          { "target": "btns_gpio/S_AXI", "space": "register" },
          { "target": "leds_gpio/S_AXI", "space": "register" },
          { "target": "axi_intc_0/s_axi", "space": "register" },
          { "target": "audio/codec_ctrl/S_AXI", "space": "register" },
          { "target": "video/axi_dma_0/S_AXI_LITE", "space": "register" },
          { "target": "video/frames/axi_bram_ctrl_0/S_AXI", "space": "memory" }
        ] },
        { "name": "S_AXI_HP0", "kind": "manager", "address_map": [
          { "target": "PSDDR/S_AXI", "space": "memory" }
        ] }
      ],
      "processing_system": {
        "irq_pins": ["IRQ_F2P"],
        "irq_map": { "0": 61 },
        "gpio": [
          { "name": "rst_ps7_0_fclk0/aux_reset_in", "index": 0,
            "pins": ["rst_ps7_0_fclk0/aux_reset_in"] }
        ]
      }
    },
    {
      "path": "PSDDR",
      "vlnv": "xilinx.com:ip:ddr:1.0",
      "ports": [ { "name": "S_AXI", "kind": "subordinate", "base_address": 0, "range": 536870912 } ]
    },
    {
      "path": "rst_ps7_0_fclk0",
      "vlnv": "xilinx.com:ip:proc_sys_reset:5.0",
      "ports": [ { "name": "aux_reset_in", "kind": "scalar" } ]
    },
    {
      "path": "btns_gpio",
      "vlnv": "xilinx.com:ip:axi_gpio:2.0",
      "parameters": { "C_GPIO_WIDTH": "4", "C_INTERRUPT_PRESENT": "1" },
      "ports": [
        { "name": "S_AXI", "kind": "subordinate", "base_address": 1092616192, "range": 65536,
          "registers": [
            { "name": "GPIO_DATA", "offset": 0, "description": "Channel 1 AXI GPIO Data Register.",
              "fields": [ { "name": "Channel_1_GPIO_DATA", "low": 0, "high": 3 } ] },
            { "name": "GPIO_TRI", "offset": 4 }
          ] },
        { "name": "ip2intc_irpt", "kind": "scalar" }
      ]
    },
    {
      "path": "leds_gpio",
      "vlnv": "xilinx.com:ip:axi_gpio:2.0",
      "ports": [
        { "name": "S_AXI", "kind": "subordinate", "base_address": 1092681728, "range": 65536,
          "registers": [ { "name": "GPIO_DATA", "offset": 0 } ] }
      ]
    },
    {
      "path": "axi_intc_0",
      "vlnv": "xilinx.com:ip:axi_intc:4.1",
      "ports": [
        { "name": "s_axi", "kind": "subordinate", "base_address": 1098907648, "range": 65536,
          "registers": [ { "name": "ISR", "offset": 0 }, { "name": "IER", "offset": 8 } ] },
        { "name": "intr", "kind": "scalar" },
        { "name": "irq", "kind": "scalar" }
      ]
    },
    {
      "path": "xlconcat_0",
      "vlnv": "xilinx.com:ip:xlconcat:2.1",
      "ports": [
        { "name": "In0", "kind": "scalar" },
        { "name": "In1", "kind": "scalar" },
        { "name": "dout", "kind": "scalar" }
      ]
    },
    {
      "path": "xlconcat_ps",
      "vlnv": "xilinx.com:ip:xlconcat:2.1",
      "ports": [
        { "name": "In0", "kind": "scalar" },
        { "name": "In1", "kind": "scalar" },
        { "name": "dout", "kind": "scalar" }
      ]
    },
    {
      "path": "audio/codec_ctrl",
      "vlnv": "xilinx.com:user:audio_codec_ctrl:1.0",
      "ports": [
        { "name": "S_AXI", "kind": "subordinate", "base_address": 1136656384, "range": 65536,
          "registers": [ { "name": "I2S_DATA_RX_L_REG", "offset": 0, "access": "read-only" } ] }
      ]
    },
    {
      "path": "video/axi_dma_0",
      "vlnv": "xilinx.com:ip:axi_dma:7.1",
      "ports": [
        { "name": "S_AXI_LITE", "kind": "subordinate", "base_address": 1077936128, "range": 65536,
          "registers": [ { "name": "MM2S_DMACR", "offset": 0 } ] },
        { "name": "mm2s_introut", "kind": "scalar" },
        { "name": "s2mm_introut", "kind": "scalar" }
      ]
    },
    {
      "path": "video/frames/axi_bram_ctrl_0",
      "vlnv": "xilinx.com:ip:axi_bram_ctrl:4.1",
      "ports": [ { "name": "S_AXI", "kind": "subordinate", "base_address": 1073741824, "range": 8192 } ]
    },
    {
      "path": "unused/xlconstant_0",
      "vlnv": "xilinx.com:ip:xlconstant:1.1",
      "ports": [ { "name": "dout", "kind": "scalar" } ]
    }
  ],
  "connections": [
    ["ps7_0/IRQ_F2P", "xlconcat_ps/dout"],
    ["xlconcat_ps/In0", "axi_intc_0/irq"],
    ["xlconcat_ps/In1", "video/axi_dma_0/s2mm_introut"],
    ["axi_intc_0/intr", "xlconcat_0/dout"],
    ["xlconcat_0/In0", "btns_gpio/ip2intc_irpt"],
    ["xlconcat_0/In1", "video/axi_dma_0/mm2s_introut"]
  ]
}"#;

/// An `overlay.toml` for [`BASE_DESIGN`].
pub const BASE_CONFIG: &str = r#"
[session]
overlay = "base"
device = "pynq-z2"

[drivers.ip]
"xilinx.com:ip:axi_gpio:2.0" = "AxiGPIO"
"xilinx.com:ip:axi_intc:4.1" = "AxiIntc"
"xilinx.com:ip:axi_dma:7.0" = "DMA"

[[drivers.hierarchy]]
driver = "DmaHierarchy"
requires = ["xilinx.com:ip:axi_dma:*"]

[[drivers.hierarchy]]
driver = "AudioHierarchy"
requires = "xilinx.com:user:audio_codec_ctrl:*"
"#;

/// Parses [`BASE_DESIGN`].
pub fn base_design() -> Design {
    load_design_from_str(BASE_DESIGN).unwrap()
}

/// Parses and resolves a configuration.
pub fn resolved(config: &str, ignore_version: bool) -> ResolvedSession {
    let config = load_config_from_str(config).unwrap();
    let overrides = SessionOverrides {
        ignore_version,
        ..SessionOverrides::default()
    };
    resolve_session(&config, &overrides)
}

/// A session over [`BASE_DESIGN`] with [`BASE_CONFIG`].
pub fn base_session(ignore_version: bool) -> MetadataSession {
    MetadataSession::from_resolved(
        base_design(),
        &resolved(BASE_CONFIG, ignore_version),
        Box::new(SequentialImageBuilder),
    )
    .unwrap()
}

/// A binding context over an in-memory catalog.
pub fn binding_context(catalog: &[(&str, &str)], ignore_version: bool) -> BindingContext {
    let mut entries = DriverCatalog::new();
    for &(type_id, driver) in catalog {
        entries.insert(type_id, driver);
    }
    BindingContext {
        catalog: entries,
        default_ip: DriverName::new("DefaultIP"),
        device: DeviceRef::new("device0"),
        ignore_version,
    }
}

/// A processing system plus one register-bearing core of type `type_id` at
/// `uart_0`.
pub fn single_core(type_id: &str) -> Design {
    let mut b = DesignBuilder::new();
    b.processing_system("ps7_0", PS_VLNV).unwrap();
    let core = b.core("uart_0", type_id).unwrap();
    let port = b.subordinate_port(core, "S_AXI", 0x4260_0000, 0x1_0000).unwrap();
    b.register(port, RegisterSpec::new("RX_FIFO", 0)).unwrap();
    b.finish()
}

fn concat(b: &mut DesignBuilder, path: &str, inputs: usize) -> (PortId, Vec<PortId>) {
    let core = b.core(path, CONCAT_VLNV).unwrap();
    let ins = (0..inputs)
        .map(|i| b.scalar_port(core, &format!("In{i}")).unwrap())
        .collect();
    let dout = b.scalar_port(core, "dout").unwrap();
    (dout, ins)
}

fn controller(b: &mut DesignBuilder, path: &str) -> (PortId, PortId) {
    let core = b.core(path, INTC_VLNV).unwrap();
    let intr = b.scalar_port(core, "intr").unwrap();
    let irq = b.scalar_port(core, "irq").unwrap();
    (intr, irq)
}

/// `count` controllers on one concatenator in front of the processing
/// system. Controller `i` sits on input `In<i>` and serves one GPIO pin.
pub fn controller_fan_in(count: usize) -> Design {
    let mut b = DesignBuilder::new();
    let ps = b.processing_system("ps7_0", PS_VLNV).unwrap();
    let ps_irq = b.scalar_port(ps, "IRQ_F2P").unwrap();
    b.irq_pin(ps, ps_irq).unwrap();
    let (dout, inputs) = concat(&mut b, "xlconcat_0", count);
    b.connect(ps_irq, dout).unwrap();
    for (i, input) in inputs.into_iter().enumerate() {
        b.irq_map(ps, i as u32, 61 + i as u32).unwrap();
        let (intr, irq) = controller(&mut b, &format!("intc_{i}"));
        b.connect(input, irq).unwrap();
        let gpio = b.core(&format!("gpio_{i}"), "xilinx.com:ip:axi_gpio:2.0").unwrap();
        let pin = b.scalar_port(gpio, "ip2intc_irpt").unwrap();
        b.connect(intr, pin).unwrap();
    }
    b.finish()
}

/// Two chained concatenators in front of the processing system; both inputs
/// of the inner one and both inputs of the outer one lead to controller
/// `intc_c`.
pub fn chained_concatenators() -> Design {
    let mut b = DesignBuilder::new();
    let ps = b.processing_system("ps7_0", PS_VLNV).unwrap();
    let ps_irq = b.scalar_port(ps, "IRQ_F2P").unwrap();
    b.irq_pin(ps, ps_irq).unwrap();
    b.irq_map(ps, 0, 61).unwrap();
    let (outer, outer_in) = concat(&mut b, "xlconcat_a", 2);
    let (inner, inner_in) = concat(&mut b, "xlconcat_b", 2);
    let (_intr, irq) = controller(&mut b, "intc_c");
    b.connect(ps_irq, outer).unwrap();
    for &input in &outer_in {
        b.connect(input, inner).unwrap();
    }
    for &input in &inner_in {
        b.connect(input, irq).unwrap();
    }
    b.finish()
}

/// Wraps [`SequentialImageBuilder`] and counts its invocations.
#[derive(Debug, Clone, Default)]
pub struct CountingImageBuilder {
    /// Number of `build` calls so far, shared with clones.
    pub calls: Rc<Cell<usize>>,
}

impl MemoryImageBuilder for CountingImageBuilder {
    fn build(
        &mut self,
        proposed: &BTreeMap<String, MemoryEntry>,
    ) -> ovl_common::MetadataResult<BTreeMap<String, ImageAttributes>> {
        self.calls.set(self.calls.get() + 1);
        SequentialImageBuilder.build(proposed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_load() {
        let design = base_design();
        assert_eq!(design.processing_systems().len(), 1);
        assert!(design.find_hierarchy_by_path("video/frames").is_some());
        assert_eq!(controller_fan_in(3).cores.len(), 1 + 1 + 3 + 3);
    }
}
