//! The runtime session: one design plus everything needed to materialize its
//! views.

use crate::gpio::{gpio_view, GpioView};
use crate::hierarchy::{hierarchy_view, HierarchyContext, HierarchyView};
use crate::interrupts::{interrupt_controllers, interrupt_pins, ControllerView, InterruptConventions, PinView};
use crate::ip::{ip_view, IpView};
use crate::memory::{memory_view, MemoryImageBuilder, MemoryImageCache, MemoryView};
use ovl_common::{MetadataError, MetadataResult, OverlayRef};
use ovl_config::ResolvedSession;
use ovl_diagnostics::DiagnosticSink;
use ovl_drivers::{bind_drivers, BindingContext, HierarchyDrivers};
use ovl_graph::{Design, DriverBinding};
use tracing::debug;

/// Session-wide settings that are not part of the design.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// IP driver catalog, default driver, device and version policy.
    pub binding: BindingContext,
    /// Hierarchy driver candidates.
    pub hierarchy_drivers: HierarchyDrivers,
    /// Overlay recorded on every hierarchy.
    pub overlay: OverlayRef,
    /// Interrupt topology naming conventions.
    pub conventions: InterruptConventions,
    /// Memories kept out of the image cache.
    pub cache_exclude: Vec<String>,
}

impl SessionSettings {
    /// Builds the settings from a resolved configuration. Malformed catalog
    /// keys are reported into `sink`.
    pub fn from_resolved(session: &ResolvedSession, sink: &DiagnosticSink) -> Self {
        Self {
            binding: BindingContext::from_session(session, sink),
            hierarchy_drivers: HierarchyDrivers::from_config(&session.drivers),
            overlay: OverlayRef::new(session.overlay.as_str()),
            conventions: InterruptConventions::from(&session.interrupts),
            cache_exclude: session.memory.cache_exclude.clone(),
        }
    }
}

/// A design under inspection.
///
/// Drivers are bound once, at construction. Every view accessor
/// materializes a fresh view from the graph and the cached annotations.
#[derive(Debug)]
pub struct MetadataSession {
    design: Design,
    settings: SessionSettings,
    memory_cache: MemoryImageCache,
    sink: DiagnosticSink,
}

impl MetadataSession {
    /// Creates a session and runs the driver binding pass.
    pub fn new(
        design: Design,
        settings: SessionSettings,
        image_builder: Box<dyn MemoryImageBuilder>,
    ) -> MetadataResult<Self> {
        Self::with_sink(design, settings, image_builder, DiagnosticSink::new())
    }

    /// Creates a session from a resolved configuration.
    pub fn from_resolved(
        design: Design,
        session: &ResolvedSession,
        image_builder: Box<dyn MemoryImageBuilder>,
    ) -> MetadataResult<Self> {
        let sink = DiagnosticSink::new();
        let settings = SessionSettings::from_resolved(session, &sink);
        Self::with_sink(design, settings, image_builder, sink)
    }

    fn with_sink(
        mut design: Design,
        settings: SessionSettings,
        image_builder: Box<dyn MemoryImageBuilder>,
        sink: DiagnosticSink,
    ) -> MetadataResult<Self> {
        let bound = bind_drivers(&mut design, &settings.binding, &sink)?;
        debug!(bound, overlay = %settings.overlay, "metadata session ready");
        let memory_cache = MemoryImageCache::new(image_builder, settings.cache_exclude.clone());
        Ok(Self {
            design,
            settings,
            memory_cache,
            sink,
        })
    }

    /// The design with its annotations.
    pub fn design(&self) -> &Design {
        &self.design
    }

    /// Mutable access to the design, e.g. to clear cached annotations.
    pub fn design_mut(&mut self) -> &mut Design {
        &mut self.design
    }

    /// The session settings.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Warnings collected so far.
    pub fn diagnostics(&self) -> &DiagnosticSink {
        &self.sink
    }

    /// The memory image cache.
    pub fn memory_cache(&self) -> &MemoryImageCache {
        &self.memory_cache
    }

    /// The IP view.
    pub fn ip_view(&self) -> MetadataResult<IpView> {
        ip_view(&self.design)
    }

    /// The memory view.
    pub fn memory_view(&mut self) -> MetadataResult<MemoryView> {
        memory_view(&self.design, &mut self.memory_cache)
    }

    /// The GPIO view.
    pub fn gpio_view(&self) -> MetadataResult<GpioView> {
        gpio_view(&self.design)
    }

    /// The interrupt controllers view.
    pub fn interrupt_controllers(&mut self) -> MetadataResult<ControllerView> {
        interrupt_controllers(&mut self.design, &self.settings.conventions)
    }

    /// The interrupt pins view.
    pub fn interrupt_pins(&mut self) -> MetadataResult<PinView> {
        interrupt_pins(&mut self.design, &self.settings.conventions, &self.sink)
    }

    /// The hierarchy view.
    pub fn hierarchy_view(&mut self) -> MetadataResult<HierarchyView> {
        let ip = ip_view(&self.design)?;
        let memories = memory_view(&self.design, &mut self.memory_cache)?;
        let ctx = HierarchyContext {
            drivers: &self.settings.hierarchy_drivers,
            device: &self.settings.binding.device,
            overlay: &self.settings.overlay,
        };
        hierarchy_view(&mut self.design, &ip, &memories, &ctx)
    }

    /// The driver bound to an IP (by core path) or to a hierarchy (by full
    /// path).
    pub fn driver_for(&mut self, name: &str) -> MetadataResult<DriverBinding> {
        let ip = self.ip_view()?;
        if let Some(entry) = ip.get(name) {
            if let (Some(driver), Some(device)) = (&entry.driver, &entry.device) {
                return Ok(DriverBinding {
                    driver: driver.clone(),
                    device: device.clone(),
                });
            }
        }
        let hierarchies = self.hierarchy_view()?;
        match hierarchies.get(name) {
            Some(record) => Ok(DriverBinding {
                driver: record.driver.clone(),
                device: record.device.clone(),
            }),
            None => Err(MetadataError::lookup("ip or hierarchy", name)),
        }
    }
}
