//! The hierarchy view.
//!
//! Assembly runs in four passes over the design's hierarchy tree:
//!
//! 1. build (pre-order): every core directly inside a hierarchy lands in its
//!    `memories` map if the memory view lists it, else in its `ip` map if the
//!    IP view lists it, else nowhere;
//! 2. prune (post-order): hierarchies with no IP, no memories and no
//!    surviving children disappear;
//! 3. assign drivers (post-order): the cached [`HierarchyDriver`] annotation
//!    wins, otherwise the first matching candidate or the default is chosen
//!    and cached;
//! 4. freeze: drafts become shared [`HierarchyRecord`]s.
//!
//! The root map holds every surviving hierarchy keyed by its full path, so a
//! nested record is reachable both through its ancestors and directly. Both
//! routes yield the same `Rc`.

use crate::ip::{IpEntry, IpView};
use crate::memory::{MemoryEntry, MemoryView};
use crate::view::ViewDict;
use ovl_common::{DeviceRef, DriverName, MetadataError, MetadataResult, OverlayRef};
use ovl_drivers::{HierarchyDrivers, HierarchySummary};
use ovl_graph::{Annotation, Design, HierarchyDriver, HierarchyId, NodeRef};
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// Name of the hierarchy view in errors.
pub const HIERARCHY_VIEW: &str = "hierarchy view";

/// The hierarchy view, keyed by full hierarchy path.
pub type HierarchyView = ViewDict<HierarchyRecord>;

/// One assembled hierarchy.
#[derive(Debug, Serialize)]
pub struct HierarchyRecord {
    /// IP directly inside, keyed by instance name.
    pub ip: BTreeMap<String, Rc<IpEntry>>,
    /// Memories directly inside, keyed by instance name.
    pub memories: BTreeMap<String, Rc<MemoryEntry>>,
    /// Surviving child hierarchies, keyed by name.
    pub hierarchies: BTreeMap<String, Rc<HierarchyRecord>>,
    /// Full hierarchy path.
    pub fullpath: String,
    /// The hierarchy driver.
    pub driver: DriverName,
    /// Device of the hierarchy driver.
    pub device: DeviceRef,
    /// Overlay the hierarchy belongs to.
    pub overlay: OverlayRef,
}

/// What hierarchy driver assignment needs besides the design.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyContext<'a> {
    /// Prioritized candidates plus the fallback.
    pub drivers: &'a HierarchyDrivers,
    /// Device recorded next to every hierarchy driver.
    pub device: &'a DeviceRef,
    /// Overlay recorded on every hierarchy.
    pub overlay: &'a OverlayRef,
}

struct Draft {
    source: HierarchyId,
    name: String,
    fullpath: String,
    ip: BTreeMap<String, Rc<IpEntry>>,
    memories: BTreeMap<String, Rc<MemoryEntry>>,
    children: Vec<Draft>,
}

impl Draft {
    fn is_empty(&self) -> bool {
        self.ip.is_empty() && self.memories.is_empty() && self.children.is_empty()
    }

    fn summary(&self) -> HierarchySummary {
        HierarchySummary {
            fullpath: self.fullpath.clone(),
            ip_types: self.ip.values().map(|ip| ip.type_id.clone()).collect(),
            memories: self.memories.keys().cloned().collect(),
            children: self.children.iter().map(|c| c.name.clone()).collect(),
        }
    }
}

fn build(
    design: &Design,
    id: HierarchyId,
    ip: &IpView,
    memories: &MemoryView,
) -> MetadataResult<Draft> {
    let hier = design
        .hierarchies
        .try_get(id)
        .ok_or_else(|| MetadataError::lookup("hierarchy", format!("{id:?}")))?;
    let mut draft = Draft {
        source: id,
        name: design.name(hier.name).to_string(),
        fullpath: hier.path.clone(),
        ip: BTreeMap::new(),
        memories: BTreeMap::new(),
        children: Vec::new(),
    };
    for &core in &hier.cores {
        let path = &design.cores[core].path;
        let name = design.core_name(core).to_string();
        if let Some(mem) = memories.get(path) {
            draft.memories.insert(name, Rc::clone(mem));
        } else if let Some(entry) = ip.get(path) {
            draft.ip.insert(name, Rc::clone(entry));
        } else {
            trace!(%path, "core is neither IP nor memory");
        }
    }
    for &child in &hier.children {
        draft.children.push(build(design, child, ip, memories)?);
    }
    Ok(draft)
}

fn prune(draft: &mut Draft) {
    for child in &mut draft.children {
        prune(child);
    }
    draft.children.retain(|child| {
        if child.is_empty() {
            trace!(fullpath = %child.fullpath, "pruned empty hierarchy");
        }
        !child.is_empty()
    });
}

fn assign_driver(
    design: &mut Design,
    source: HierarchyId,
    summary: &HierarchySummary,
    ctx: &HierarchyContext<'_>,
) -> HierarchyDriver {
    let node = NodeRef::Hierarchy(source);
    if let Some(cached) = design.annotations.hierarchy_driver(node) {
        trace!(fullpath = %summary.fullpath, driver = %cached.driver, "cached hierarchy driver");
        return cached.clone();
    }
    let driver = ctx.drivers.select(summary).clone();
    debug!(fullpath = %summary.fullpath, %driver, "selected hierarchy driver");
    let annotation = HierarchyDriver {
        driver,
        device: ctx.device.clone(),
        overlay: ctx.overlay.clone(),
    };
    design
        .annotations
        .insert(node, Annotation::HierarchyDriver(annotation.clone()));
    annotation
}

/// Assigns drivers children first and turns the draft into a shared record,
/// registering every record in `flat` under its full path.
fn freeze(
    design: &mut Design,
    mut draft: Draft,
    ctx: &HierarchyContext<'_>,
    flat: &mut BTreeMap<String, Rc<HierarchyRecord>>,
) -> Rc<HierarchyRecord> {
    let summary = draft.summary();
    let mut hierarchies = BTreeMap::new();
    for child in std::mem::take(&mut draft.children) {
        let name = child.name.clone();
        hierarchies.insert(name, freeze(design, child, ctx, flat));
    }
    let binding = assign_driver(design, draft.source, &summary, ctx);
    let record = Rc::new(HierarchyRecord {
        ip: draft.ip,
        memories: draft.memories,
        hierarchies,
        fullpath: draft.fullpath,
        driver: binding.driver,
        device: binding.device,
        overlay: binding.overlay,
    });
    flat.insert(record.fullpath.clone(), Rc::clone(&record));
    record
}

/// Materializes the hierarchy view from the IP and memory views.
///
/// Cores sitting directly at the root are not part of any hierarchy and do
/// not appear.
pub fn hierarchy_view(
    design: &mut Design,
    ip: &IpView,
    memories: &MemoryView,
    ctx: &HierarchyContext<'_>,
) -> MetadataResult<HierarchyView> {
    let root = design.root;
    let mut tree = build(design, root, ip, memories)?;
    prune(&mut tree);

    let mut entries = BTreeMap::new();
    for draft in tree.children {
        freeze(design, draft, ctx, &mut entries);
    }
    debug!(hierarchies = entries.len(), "assembled hierarchy view");
    Ok(ViewDict::read_only(HIERARCHY_VIEW, entries))
}
