//! String-addressed construction of a [`Design`].
//!
//! Hosts and tests describe the graph with paths and names; the builder
//! interns names, allocates arena nodes, and wires up the ID links. Structural
//! mistakes (duplicate names, connecting a bus port as a wire) are reported as
//! [`MetadataError::Configuration`].

use crate::design::Design;
use crate::hierarchy::Hierarchy;
use crate::ids::{CoreId, HierarchyId, PortId, RegisterId, SignalId};
use crate::ipcore::{Core, CoreKind, GpioLine, Parameter, ProcessingSystem};
use crate::port::{AddressMapEntry, AddressSpace, ManagerPort, Port, PortKind, SubordinatePort};
use crate::register::{Access, Bitfield, Register};
use crate::signal::Signal;
use ovl_common::{MetadataError, MetadataResult, Vlnv};
use serde::Deserialize;

/// Description of one bitfield, as accepted by [`RegisterSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Least significant bit.
    pub low: u32,
    /// Most significant bit.
    pub high: u32,
    /// Access mode.
    #[serde(default)]
    pub access: Access,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// Description of one register, as accepted by [`DesignBuilder::register`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterSpec {
    /// Register name.
    pub name: String,
    /// Byte offset from the port base address.
    pub offset: u64,
    /// Width in bits.
    #[serde(default = "default_register_width")]
    pub width: u32,
    /// Access mode.
    #[serde(default)]
    pub access: Access,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Bitfields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

fn default_register_width() -> u32 {
    32
}

impl RegisterSpec {
    /// A read-write 32-bit register with no fields.
    pub fn new(name: impl Into<String>, offset: u64) -> Self {
        Self {
            name: name.into(),
            offset,
            width: default_register_width(),
            access: Access::default(),
            description: String::new(),
            fields: Vec::new(),
        }
    }

    /// Sets the access mode.
    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a bitfield.
    pub fn field(mut self, name: impl Into<String>, low: u32, high: u32, access: Access) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            low,
            high,
            access,
            description: String::new(),
        });
        self
    }
}

/// Incrementally builds a [`Design`].
#[derive(Debug, Default)]
pub struct DesignBuilder {
    design: Design,
}

impl DesignBuilder {
    /// Starts a design containing only the root hierarchy.
    pub fn new() -> Self {
        Self {
            design: Design::new(),
        }
    }

    /// Returns the hierarchy at `path`, creating it and any missing ancestors.
    pub fn hierarchy(&mut self, path: &str) -> HierarchyId {
        let mut current = self.design.root;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self.child_hierarchy(current, segment);
        }
        current
    }

    fn child_hierarchy(&mut self, parent: HierarchyId, name: &str) -> HierarchyId {
        let ident = self.design.interner.get_or_intern(name);
        let existing = self.design.hierarchies[parent]
            .children
            .iter()
            .copied()
            .find(|&child| self.design.hierarchies[child].name == ident);
        if let Some(child) = existing {
            return child;
        }
        let id = self.design.hierarchies.next_id();
        let path = self.design.hierarchies[parent].child_path(name);
        self.design.hierarchies.alloc(Hierarchy {
            id,
            name: ident,
            parent: Some(parent),
            path,
            cores: Vec::new(),
            children: Vec::new(),
        });
        self.design.hierarchies[parent].children.push(id);
        id
    }

    /// Adds an IP core at a slash-separated path such as `audio/codec_0`.
    pub fn core(&mut self, path: &str, vlnv: &str) -> MetadataResult<CoreId> {
        self.add_core(path, vlnv, CoreKind::Ip)
    }

    /// Adds the processing system core.
    pub fn processing_system(&mut self, path: &str, vlnv: &str) -> MetadataResult<CoreId> {
        self.add_core(path, vlnv, CoreKind::ProcessingSystem(ProcessingSystem::default()))
    }

    fn add_core(&mut self, path: &str, vlnv: &str, kind: CoreKind) -> MetadataResult<CoreId> {
        let vlnv = Vlnv::parse(vlnv)?;
        let (parent_path, name) = match path.rsplit_once('/') {
            Some((parent, name)) => (parent, name),
            None => ("", path),
        };
        if name.is_empty() {
            return Err(MetadataError::Format {
                subject: path.to_string(),
                reason: "core path must end in an instance name".to_string(),
            });
        }
        let hierarchy = self.hierarchy(parent_path);
        let ident = self.design.interner.get_or_intern(name);
        let duplicate = self.design.hierarchies[hierarchy]
            .cores
            .iter()
            .any(|&c| self.design.cores[c].name == ident);
        if duplicate {
            return Err(MetadataError::configuration(format!(
                "duplicate core instance `{path}`"
            )));
        }
        let id = self.design.cores.next_id();
        let full_path = self.design.hierarchies[hierarchy].child_path(name);
        self.design.cores.alloc(Core {
            id,
            name: ident,
            vlnv,
            hierarchy,
            path: full_path,
            kind,
            ports: Vec::new(),
            parameters: Vec::new(),
        });
        self.design.hierarchies[hierarchy].cores.push(id);
        Ok(id)
    }

    /// Sets a core parameter. A later value for the same name replaces the
    /// earlier one.
    pub fn parameter(&mut self, core: CoreId, name: &str, value: impl Into<String>) {
        let ident = self.design.interner.get_or_intern(name);
        let value = value.into();
        let params = &mut self.design.cores[core].parameters;
        match params.iter_mut().find(|p| p.name == ident) {
            Some(existing) => existing.value = value,
            None => params.push(Parameter { name: ident, value }),
        }
    }

    fn add_port(&mut self, core: CoreId, name: &str, kind: PortKind) -> MetadataResult<PortId> {
        if self.design.port_by_name(core, name).is_some() {
            return Err(MetadataError::configuration(format!(
                "duplicate port `{}` on `{}`",
                name, self.design.cores[core].path
            )));
        }
        let ident = self.design.interner.get_or_intern(name);
        let id = self.design.ports.next_id();
        self.design.ports.alloc(Port {
            id,
            name: ident,
            core,
            kind,
            signal: None,
        });
        self.design.cores[core].ports.push(id);
        Ok(id)
    }

    /// Adds a register-addressable subordinate port.
    pub fn subordinate_port(
        &mut self,
        core: CoreId,
        name: &str,
        base_address: u64,
        range: u64,
    ) -> MetadataResult<PortId> {
        self.add_port(
            core,
            name,
            PortKind::Subordinate(SubordinatePort {
                base_address,
                range,
                registers: Vec::new(),
            }),
        )
    }

    /// Adds an address-space initiator port with an empty address map.
    pub fn manager_port(&mut self, core: CoreId, name: &str) -> MetadataResult<PortId> {
        self.add_port(core, name, PortKind::Manager(ManagerPort::default()))
    }

    /// Adds a single-wire port together with the signal it carries.
    pub fn scalar_port(&mut self, core: CoreId, name: &str) -> MetadataResult<PortId> {
        let port = self.add_port(core, name, PortKind::Scalar)?;
        let signal = self.design.signals.next_id();
        self.design.signals.alloc(Signal {
            id: signal,
            name: self.design.ports[port].name,
            port,
            connections: Vec::new(),
        });
        self.design.ports[port].signal = Some(signal);
        Ok(port)
    }

    /// Adds a register to a subordinate port.
    pub fn register(&mut self, port: PortId, spec: RegisterSpec) -> MetadataResult<RegisterId> {
        if self.design.ports[port].as_subordinate().is_none() {
            return Err(MetadataError::configuration(format!(
                "register `{}` placed on non-subordinate port `{}`",
                spec.name,
                self.design.port_name(port)
            )));
        }
        for f in &spec.fields {
            if f.low > f.high || f.high >= spec.width {
                return Err(MetadataError::Format {
                    subject: format!("{}/{}", spec.name, f.name),
                    reason: format!(
                        "bits {}..={} do not fit a {}-bit register",
                        f.low, f.high, spec.width
                    ),
                });
            }
        }
        let bitfields = spec
            .fields
            .into_iter()
            .map(|f| Bitfield {
                name: self.design.interner.get_or_intern(&f.name),
                low: f.low,
                high: f.high,
                access: f.access,
                description: f.description,
            })
            .collect();
        let id = self.design.registers.next_id();
        let name = self.design.interner.get_or_intern(&spec.name);
        self.design.registers.alloc(Register {
            id,
            name,
            port,
            offset: spec.offset,
            width: spec.width,
            access: spec.access,
            description: spec.description,
            bitfields,
        });
        if let PortKind::Subordinate(sub) = &mut self.design.ports[port].kind {
            sub.registers.push(id);
        }
        Ok(id)
    }

    /// Appends an address-map entry from a manager port to a subordinate port.
    pub fn map_address(
        &mut self,
        manager: PortId,
        subordinate: PortId,
        space: AddressSpace,
    ) -> MetadataResult<()> {
        if self.design.ports[subordinate].as_subordinate().is_none() {
            return Err(MetadataError::configuration(format!(
                "address map target `{}` is not a subordinate port",
                self.design.port_name(subordinate)
            )));
        }
        match &mut self.design.ports[manager].kind {
            PortKind::Manager(mgr) => {
                mgr.address_map.push(AddressMapEntry { subordinate, space });
                Ok(())
            }
            _ => Err(MetadataError::configuration(format!(
                "address map source `{}` is not a manager port",
                self.design.port_name(manager)
            ))),
        }
    }

    fn port_signal(&self, port: PortId) -> MetadataResult<SignalId> {
        self.design.ports[port].signal.ok_or_else(|| {
            MetadataError::configuration(format!(
                "port `{}` on `{}` carries no signal",
                self.design.port_name(port),
                self.design.cores[self.design.port_core(port)].path
            ))
        })
    }

    /// Wires two scalar ports together. The connection is recorded on both
    /// signals.
    pub fn connect(&mut self, a: PortId, b: PortId) -> MetadataResult<()> {
        let sa = self.port_signal(a)?;
        let sb = self.port_signal(b)?;
        if !self.design.signals[sa].connections.contains(&sb) {
            self.design.signals[sa].connections.push(sb);
        }
        if !self.design.signals[sb].connections.contains(&sa) {
            self.design.signals[sb].connections.push(sa);
        }
        Ok(())
    }

    fn ps_mut(&mut self, core: CoreId) -> MetadataResult<&mut ProcessingSystem> {
        let path = self.design.cores[core].path.clone();
        match &mut self.design.cores[core].kind {
            CoreKind::ProcessingSystem(ps) => Ok(ps),
            CoreKind::Ip => Err(MetadataError::configuration(format!(
                "`{path}` is not a processing system"
            ))),
        }
    }

    /// Declares a scalar port of the processing system as an interrupt input.
    pub fn irq_pin(&mut self, ps: CoreId, port: PortId) -> MetadataResult<()> {
        self.port_signal(port)?;
        self.ps_mut(ps)?.irq_pins.push(port);
        Ok(())
    }

    /// Records the raw interrupt number for an interrupt controller index.
    pub fn irq_map(&mut self, ps: CoreId, controller_index: u32, raw_irq: u32) -> MetadataResult<()> {
        self.ps_mut(ps)?.irq_map.insert(controller_index, raw_irq);
        Ok(())
    }

    /// Adds a GPIO line of the processing system.
    pub fn gpio(
        &mut self,
        ps: CoreId,
        name: &str,
        index: u32,
        pins: Vec<PortId>,
    ) -> MetadataResult<()> {
        self.ps_mut(ps)?.gpio.push(GpioLine {
            name: name.to_string(),
            index,
            pins,
        });
        Ok(())
    }

    /// Read access to the design under construction.
    pub fn design(&self) -> &Design {
        &self.design
    }

    /// Finishes construction.
    pub fn finish(self) -> Design {
        self.design
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GPIO: &str = "xilinx.com:ip:axi_gpio:2.0";

    #[test]
    fn core_creates_intermediate_hierarchies() {
        let mut b = DesignBuilder::new();
        let core = b.core("video/hdmi_in/vdma_0", "xilinx.com:ip:axi_vdma:6.3").unwrap();
        let design = b.finish();
        assert_eq!(design.cores[core].path, "video/hdmi_in/vdma_0");
        let video = design.find_hierarchy_by_path("video").unwrap();
        let hdmi = design.find_hierarchy_by_path("video/hdmi_in").unwrap();
        assert_eq!(design.hierarchies[hdmi].parent, Some(video));
        assert_eq!(design.hierarchies[hdmi].cores, vec![core]);
        assert_eq!(design.root_hierarchy().children, vec![video]);
    }

    #[test]
    fn hierarchy_is_reused() {
        let mut b = DesignBuilder::new();
        let a = b.hierarchy("audio");
        let again = b.hierarchy("audio/");
        assert_eq!(a, again);
    }

    #[test]
    fn duplicate_instance_name_rejected() {
        let mut b = DesignBuilder::new();
        b.core("leds/gpio", GPIO).unwrap();
        let err = b.core("leds/gpio", GPIO).unwrap_err();
        assert!(matches!(err, MetadataError::Configuration(_)));
        // Same name in a different hierarchy is fine.
        b.core("buttons/gpio", GPIO).unwrap();
    }

    #[test]
    fn bad_vlnv_rejected() {
        let mut b = DesignBuilder::new();
        assert!(matches!(
            b.core("x", "xilinx.com:axi_gpio"),
            Err(MetadataError::Format { .. })
        ));
    }

    #[test]
    fn registers_and_fields() {
        let mut b = DesignBuilder::new();
        let core = b.core("gpio_0", GPIO).unwrap();
        let port = b.subordinate_port(core, "S_AXI", 0x4120_0000, 0x1_0000).unwrap();
        let reg = b
            .register(
                port,
                RegisterSpec::new("GPIO_DATA", 0)
                    .description("Channel 1 data")
                    .field("DATA", 0, 7, Access::ReadWrite),
            )
            .unwrap();
        let design = b.finish();
        assert!(design.ports[port].has_registers());
        let r = &design.registers[reg];
        assert_eq!(r.width, 32);
        assert_eq!(r.bitfields[0].width(), 8);
        assert_eq!(design.name(r.bitfields[0].name), "DATA");
    }

    #[test]
    fn field_bounds_are_checked() {
        let mut b = DesignBuilder::new();
        let core = b.core("gpio_0", GPIO).unwrap();
        let port = b.subordinate_port(core, "S_AXI", 0x4120_0000, 0x1_0000).unwrap();
        let inverted = b.register(
            port,
            RegisterSpec::new("GPIO_DATA", 0).field("DATA", 7, 2, Access::ReadWrite),
        );
        match inverted {
            Err(MetadataError::Format { subject, .. }) => assert_eq!(subject, "GPIO_DATA/DATA"),
            other => panic!("expected format error, got {other:?}"),
        }
        let too_wide = b.register(
            port,
            RegisterSpec::new("GPIO_TRI", 4).field("TRI", 0, u32::MAX, Access::ReadWrite),
        );
        assert!(matches!(too_wide, Err(MetadataError::Format { .. })));
        let top_bit = b
            .register(port, RegisterSpec::new("GIER", 0x11c).field("GIE", 31, 31, Access::ReadWrite))
            .unwrap();
        let design = b.finish();
        assert_eq!(design.registers[top_bit].bitfields[0].width(), 1);
        assert_eq!(design.registers.len(), 1);
    }

    #[test]
    fn register_on_scalar_port_rejected() {
        let mut b = DesignBuilder::new();
        let core = b.core("gpio_0", GPIO).unwrap();
        let port = b.scalar_port(core, "ip2intc_irpt").unwrap();
        assert!(b.register(port, RegisterSpec::new("R", 0)).is_err());
    }

    #[test]
    fn connect_is_bidirectional() {
        let mut b = DesignBuilder::new();
        let gpio = b.core("gpio_0", GPIO).unwrap();
        let concat = b.core("xlconcat_0", "xilinx.com:ip:xlconcat:2.1").unwrap();
        let irq = b.scalar_port(gpio, "ip2intc_irpt").unwrap();
        let in0 = b.scalar_port(concat, "In0").unwrap();
        b.connect(irq, in0).unwrap();
        b.connect(in0, irq).unwrap();
        let design = b.finish();
        let s_irq = design.ports[irq].signal.unwrap();
        let s_in0 = design.ports[in0].signal.unwrap();
        assert_eq!(design.signals[s_irq].connections, vec![s_in0]);
        assert_eq!(design.signals[s_in0].connections, vec![s_irq]);
        assert_eq!(design.signal_core(s_in0), concat);
        assert_eq!(design.signal_name(s_in0), "In0");
    }

    #[test]
    fn connect_bus_port_rejected() {
        let mut b = DesignBuilder::new();
        let gpio = b.core("gpio_0", GPIO).unwrap();
        let s_axi = b.subordinate_port(gpio, "S_AXI", 0, 0x1000).unwrap();
        let irq = b.scalar_port(gpio, "ip2intc_irpt").unwrap();
        assert!(b.connect(s_axi, irq).is_err());
    }

    #[test]
    fn address_map_requires_manager_and_subordinate() {
        let mut b = DesignBuilder::new();
        let ps = b.processing_system("ps7_0", "xilinx.com:ip:processing_system7:5.5").unwrap();
        let m = b.manager_port(ps, "M_AXI_GP0").unwrap();
        let gpio = b.core("gpio_0", GPIO).unwrap();
        let s = b.subordinate_port(gpio, "S_AXI", 0x4120_0000, 0x1000).unwrap();
        b.map_address(m, s, AddressSpace::Register).unwrap();
        assert!(b.map_address(s, s, AddressSpace::Register).is_err());
        assert!(b.map_address(m, m, AddressSpace::Memory).is_err());
        let design = b.finish();
        let map = &design.ports[m].as_manager().unwrap().address_map;
        assert_eq!(map.len(), 1);
        assert_eq!(map[0].subordinate, s);
    }

    #[test]
    fn processing_system_metadata() {
        let mut b = DesignBuilder::new();
        let ps = b.processing_system("ps7_0", "xilinx.com:ip:processing_system7:5.5").unwrap();
        let irq = b.scalar_port(ps, "IRQ_F2P").unwrap();
        b.irq_pin(ps, irq).unwrap();
        b.irq_map(ps, 0, 61).unwrap();
        b.gpio(ps, "GPIO_O_0", 0, Vec::new()).unwrap();
        let ip = b.core("gpio_0", GPIO).unwrap();
        assert!(b.irq_map(ip, 0, 1).is_err());
        let design = b.finish();
        let meta = design.cores[ps].processing_system().unwrap();
        assert_eq!(meta.irq_pins, vec![irq]);
        assert_eq!(meta.irq_map[&0], 61);
        assert_eq!(meta.gpio[0].name, "GPIO_O_0");
    }

    #[test]
    fn parameter_overwrites() {
        let mut b = DesignBuilder::new();
        let core = b.core("gpio_0", GPIO).unwrap();
        b.parameter(core, "C_GPIO_WIDTH", "8");
        b.parameter(core, "C_GPIO_WIDTH", "4");
        let design = b.finish();
        assert_eq!(design.cores[core].parameters.len(), 1);
        assert_eq!(design.cores[core].parameters[0].value, "4");
    }
}
