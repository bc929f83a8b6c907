//! The memory view and the memory image cache.
//!
//! Memories are the cores the processing system reaches through a `memory`
//! address-map entry. Each one also gets low-level image attributes computed
//! by an external [`MemoryImageBuilder`]. Building the image is slow, so the
//! [`MemoryImageCache`] runs the builder on the first materialization only and
//! serves every later materialization from its cache.

use crate::ip::{parameters, registers, RegisterEntry};
use crate::view::ViewDict;
use ovl_common::{DeviceRef, DriverName, MetadataError, MetadataResult};
use ovl_graph::{AddressSpace, Design, NodeRef};
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// Name of the memory view in errors.
pub const MEMORY_VIEW: &str = "memory view";

/// Raw memory type tag for DDR4.
pub const MEM_DDR4: u32 = 1;

/// The memory view, keyed by core hierarchy path.
pub type MemoryView = ViewDict<MemoryEntry>;

/// Attributes of one memory inside the device image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAttributes {
    /// Index of the memory in the image.
    pub index: u32,
    /// Raw memory type tag.
    pub raw_type: u32,
    /// Base address as recorded in the image.
    pub base_address: u64,
    /// Size as recorded in the image.
    pub size: u64,
    /// Whether the memory is a streaming connection.
    pub streaming: bool,
    /// Positional tag.
    pub tag: String,
}

/// One memory of the design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryEntry {
    /// Hierarchy path of the memory core.
    pub fullpath: String,
    /// Always `memory`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Versioned type identifier of the memory core.
    pub vlnv: String,
    /// Name of the subordinate port the memory is reached through.
    pub mem_id: String,
    /// Base address of that port.
    pub phys_addr: u64,
    /// Size of its address window.
    pub addr_range: u64,
    /// Core parameters.
    pub parameters: BTreeMap<String, String>,
    /// Registers behind the port, usually none.
    pub registers: BTreeMap<String, RegisterEntry>,
    /// Memories in the view are always in use.
    pub used: bool,
    /// Bound driver, if the port owns registers.
    pub driver: Option<DriverName>,
    /// Device of the bound driver.
    pub device: Option<DeviceRef>,
    /// Attributes from the memory image, absent for excluded memories.
    #[serde(flatten)]
    pub image: Option<ImageAttributes>,
}

/// The external step that lays out memories in a device image.
pub trait MemoryImageBuilder {
    /// Computes image attributes for every proposed memory.
    fn build(
        &mut self,
        proposed: &BTreeMap<String, MemoryEntry>,
    ) -> MetadataResult<BTreeMap<String, ImageAttributes>>;
}

/// Lays memories out in key order as DDR4 banks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialImageBuilder;

impl MemoryImageBuilder for SequentialImageBuilder {
    fn build(
        &mut self,
        proposed: &BTreeMap<String, MemoryEntry>,
    ) -> MetadataResult<BTreeMap<String, ImageAttributes>> {
        Ok(proposed
            .iter()
            .enumerate()
            .map(|(index, (name, mem))| {
                (
                    name.clone(),
                    ImageAttributes {
                        index: index as u32,
                        raw_type: MEM_DDR4,
                        base_address: mem.phys_addr,
                        size: mem.addr_range,
                        streaming: false,
                        tag: format!("bank{index}"),
                    },
                )
            })
            .collect())
    }
}

/// Caches image attributes across memory view materializations.
pub struct MemoryImageCache {
    builder: Box<dyn MemoryImageBuilder>,
    exclude: Vec<String>,
    cache: Option<BTreeMap<String, ImageAttributes>>,
    builds: usize,
}

impl MemoryImageCache {
    /// Creates an empty cache around a builder. Memories named in `exclude`
    /// are never sent to the builder nor read from the cache.
    pub fn new(builder: Box<dyn MemoryImageBuilder>, exclude: Vec<String>) -> Self {
        Self {
            builder,
            exclude,
            cache: None,
            builds: 0,
        }
    }

    /// How many times the builder has run.
    pub fn build_count(&self) -> usize {
        self.builds
    }

    /// Returns `true` once the first materialization has populated the cache.
    pub fn is_populated(&self) -> bool {
        self.cache.is_some()
    }

    /// The cached attributes of a memory.
    pub fn cached(&self, name: &str) -> Option<&ImageAttributes> {
        self.cache.as_ref()?.get(name)
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|e| e == name)
    }

    /// Fills in the image attributes of every non-excluded entry.
    ///
    /// The first call runs the builder; a builder that leaves out a proposed
    /// memory fails the call and leaves the cache empty. Later calls read the
    /// cache, and a memory it has never seen is a [`MetadataError::Lookup`].
    pub fn attach(&mut self, entries: &mut BTreeMap<String, MemoryEntry>) -> MetadataResult<()> {
        if self.cache.is_none() {
            let built = self.populate(entries)?;
            self.cache = Some(built);
        } else {
            trace!(memories = entries.len(), "memory image cache hit");
        }
        let cache = self.cache.get_or_insert_with(BTreeMap::new);
        for (name, mem) in entries.iter_mut() {
            if self.exclude.iter().any(|e| e == name) {
                continue;
            }
            let attrs = cache
                .get(name)
                .ok_or_else(|| MetadataError::lookup("cached memory", name.as_str()))?;
            mem.image = Some(attrs.clone());
        }
        Ok(())
    }

    fn populate(
        &mut self,
        entries: &BTreeMap<String, MemoryEntry>,
    ) -> MetadataResult<BTreeMap<String, ImageAttributes>> {
        let proposed: BTreeMap<String, MemoryEntry> = entries
            .iter()
            .filter(|(name, _)| !self.is_excluded(name))
            .map(|(name, mem)| (name.clone(), mem.clone()))
            .collect();
        let built = self.builder.build(&proposed)?;
        self.builds += 1;
        let mut cache = BTreeMap::new();
        for name in proposed.keys() {
            let attrs = built
                .get(name)
                .ok_or_else(|| MetadataError::lookup("memory image entry", name.as_str()))?;
            cache.insert(name.clone(), attrs.clone());
        }
        debug!(memories = cache.len(), "memory image built");
        Ok(cache)
    }
}

impl std::fmt::Debug for MemoryImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryImageCache")
            .field("exclude", &self.exclude)
            .field("cache", &self.cache)
            .field("builds", &self.builds)
            .finish()
    }
}

/// Collects the memories the processing system maps, without image
/// attributes.
pub fn collect_memories(design: &Design) -> MetadataResult<BTreeMap<String, MemoryEntry>> {
    let ps = design.processing_system()?;
    let mut memories = BTreeMap::new();
    for &port in &design.cores[ps].ports {
        let Some(manager) = design.ports[port].as_manager() else {
            continue;
        };
        for entry in &manager.address_map {
            if entry.space != AddressSpace::Memory {
                continue;
            }
            let target = &design.ports[entry.subordinate];
            let Some(sub) = target.as_subordinate() else {
                continue;
            };
            let core = &design.cores[target.core];
            let binding = design
                .annotations
                .driver_binding(NodeRef::Port(entry.subordinate));
            memories.insert(
                core.path.clone(),
                MemoryEntry {
                    fullpath: core.path.clone(),
                    kind: "memory",
                    vlnv: core.vlnv.to_string(),
                    mem_id: design.port_name(entry.subordinate).to_string(),
                    phys_addr: sub.base_address,
                    addr_range: sub.range,
                    parameters: parameters(design, core),
                    registers: registers(design, &sub.registers),
                    used: true,
                    driver: binding.map(|b| b.driver.clone()),
                    device: binding.map(|b| b.device.clone()),
                    image: None,
                },
            );
        }
    }
    Ok(memories)
}

/// Materializes the memory view, attaching cached image attributes.
pub fn memory_view(design: &Design, cache: &mut MemoryImageCache) -> MetadataResult<MemoryView> {
    let mut memories = collect_memories(design)?;
    cache.attach(&mut memories)?;
    let entries = memories
        .into_iter()
        .map(|(name, mem)| (name, Rc::new(mem)))
        .collect();
    Ok(ViewDict::read_only(MEMORY_VIEW, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovl_graph::DesignBuilder;
    use std::cell::Cell;

    fn design(with_extra: bool) -> Design {
        let mut b = DesignBuilder::new();
        let ps = b
            .processing_system("ps_e", "xilinx.com:ip:zynq_ultra_ps_e:3.3")
            .unwrap();
        let hp0 = b.manager_port(ps, "S_AXI_HP0_FPD").unwrap();
        let m = b.manager_port(ps, "M_AXI_HPM0_FPD").unwrap();
        let ddr = b.core("PSDDR", "xilinx.com:ip:ddr4:2.2").unwrap();
        let ddr_s = b.subordinate_port(ddr, "C0_DDR4_S_AXI", 0, 0x8000_0000).unwrap();
        let bram = b.core("mem/axi_bram_ctrl_0", "xilinx.com:ip:axi_bram_ctrl:4.1").unwrap();
        let bram_s = b.subordinate_port(bram, "S_AXI", 0xA000_0000, 0x2000).unwrap();
        let gpio = b.core("gpio_0", "xilinx.com:ip:axi_gpio:2.0").unwrap();
        let gpio_s = b.subordinate_port(gpio, "S_AXI", 0xA001_0000, 0x1000).unwrap();
        b.map_address(hp0, ddr_s, AddressSpace::Memory).unwrap();
        b.map_address(m, bram_s, AddressSpace::Memory).unwrap();
        b.map_address(m, gpio_s, AddressSpace::Register).unwrap();
        if with_extra {
            let uram = b.core("mem/uram_0", "xilinx.com:ip:axi_bram_ctrl:4.1").unwrap();
            let uram_s = b.subordinate_port(uram, "S_AXI", 0xB000_0000, 0x4000).unwrap();
            b.map_address(m, uram_s, AddressSpace::Memory).unwrap();
        }
        b.finish()
    }

    struct CountingBuilder(std::rc::Rc<Cell<usize>>);

    impl MemoryImageBuilder for CountingBuilder {
        fn build(
            &mut self,
            proposed: &BTreeMap<String, MemoryEntry>,
        ) -> MetadataResult<BTreeMap<String, ImageAttributes>> {
            self.0.set(self.0.get() + 1);
            SequentialImageBuilder.build(proposed)
        }
    }

    struct ForgetfulBuilder;

    impl MemoryImageBuilder for ForgetfulBuilder {
        fn build(
            &mut self,
            _proposed: &BTreeMap<String, MemoryEntry>,
        ) -> MetadataResult<BTreeMap<String, ImageAttributes>> {
            Ok(BTreeMap::new())
        }
    }

    fn cache() -> MemoryImageCache {
        MemoryImageCache::new(Box::new(SequentialImageBuilder), vec!["PSDDR".to_string()])
    }

    #[test]
    fn only_memory_space_entries_are_listed() {
        let memories = collect_memories(&design(false)).unwrap();
        assert_eq!(
            memories.keys().collect::<Vec<_>>(),
            vec!["PSDDR", "mem/axi_bram_ctrl_0"]
        );
        let bram = &memories["mem/axi_bram_ctrl_0"];
        assert_eq!(bram.kind, "memory");
        assert_eq!(bram.mem_id, "S_AXI");
        assert_eq!(bram.phys_addr, 0xA000_0000);
        assert!(bram.used);
    }

    #[test]
    fn psddr_is_excluded_from_cache() {
        let mut cache = cache();
        let view = memory_view(&design(false), &mut cache).unwrap();
        assert!(view.get("PSDDR").unwrap().image.is_none());
        let bram = view.get("mem/axi_bram_ctrl_0").unwrap();
        assert_eq!(bram.image.as_ref().unwrap().raw_type, MEM_DDR4);
        assert!(cache.cached("PSDDR").is_none());
    }

    #[test]
    fn builder_runs_once() {
        let calls = std::rc::Rc::new(Cell::new(0));
        let mut cache = MemoryImageCache::new(
            Box::new(CountingBuilder(calls.clone())),
            vec!["PSDDR".to_string()],
        );
        let design = design(false);
        let first = memory_view(&design, &mut cache).unwrap();
        let second = memory_view(&design, &mut cache).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.build_count(), 1);
        assert_eq!(
            first.get("mem/axi_bram_ctrl_0").unwrap().image,
            second.get("mem/axi_bram_ctrl_0").unwrap().image
        );
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn memory_unseen_on_first_run_is_lookup_error() {
        let mut cache = cache();
        memory_view(&design(false), &mut cache).unwrap();
        let err = memory_view(&design(true), &mut cache).unwrap_err();
        assert_eq!(
            err,
            MetadataError::lookup("cached memory", "mem/uram_0")
        );
    }

    #[test]
    fn incomplete_build_leaves_cache_empty() {
        let mut cache = MemoryImageCache::new(Box::new(ForgetfulBuilder), Vec::new());
        let err = memory_view(&design(false), &mut cache).unwrap_err();
        assert!(matches!(err, MetadataError::Lookup { .. }));
        assert!(!cache.is_populated());
    }

    #[test]
    fn json_flattens_image_attributes() {
        let mut cache = cache();
        let view = memory_view(&design(false), &mut cache).unwrap();
        let json = view.to_json().unwrap();
        assert_eq!(json["mem/axi_bram_ctrl_0"]["index"], 0);
        assert_eq!(json["mem/axi_bram_ctrl_0"]["type"], "memory");
        assert!(json["PSDDR"].get("index").is_none());
    }

    #[test]
    fn memory_view_needs_processing_system() {
        let mut cache = cache();
        assert!(matches!(
            memory_view(&Design::new(), &mut cache),
            Err(MetadataError::Configuration(_))
        ));
    }
}
