//! Version-aware driver lookup and binding.
//!
//! Lookup order for a core of type `v:l:n:ver`:
//!
//! 1. the exact key `v:l:n:ver`;
//! 2. otherwise the unversioned key `v:l:n` and the keys of other versions
//!    (`v:l:n:*`). With `ignore_version` the unversioned key wins, else the
//!    first other version; without it the default driver is bound and only
//!    the other-version keys are reported;
//! 3. otherwise the default driver, silently.

use crate::codes;
use ovl_common::{DeviceRef, DriverName, MetadataError, MetadataResult, Vlnv};
use ovl_config::ResolvedSession;
use ovl_diagnostics::DiagnosticSink;
use ovl_graph::{Annotation, Design, DriverBinding, NodeRef};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// IP drivers keyed by type identifier, versioned or unversioned.
#[derive(Debug, Clone, Default)]
pub struct DriverCatalog {
    entries: BTreeMap<String, DriverName>,
}

impl DriverCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from `[drivers.ip]`, warning about keys that can
    /// never match a type identifier.
    pub fn from_config(ip: &BTreeMap<String, String>, sink: &DiagnosticSink) -> Self {
        let mut catalog = Self::new();
        for (key, driver) in ip {
            let components = key.split(':').count();
            if !(3..=4).contains(&components) || key.split(':').any(str::is_empty) {
                sink.emit(codes::warn_malformed_catalog_key(key));
            }
            catalog.insert(key.clone(), driver.as_str());
        }
        catalog
    }

    /// Registers a driver for a type identifier.
    pub fn insert(&mut self, type_id: impl Into<String>, driver: impl Into<DriverName>) {
        self.entries.insert(type_id.into(), driver.into());
    }

    /// Looks up an exact key.
    pub fn get(&self, type_id: &str) -> Option<&DriverName> {
        self.entries.get(type_id)
    }

    /// Returns the number of registered drivers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no drivers are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys registered for some version of the IP, in key order.
    fn other_versions<'a>(&'a self, unversioned: &'a str) -> impl Iterator<Item = (&'a String, &'a DriverName)> {
        self.entries.iter().filter(move |(key, _)| {
            key.strip_prefix(unversioned)
                .is_some_and(|rest| rest.starts_with(':'))
        })
    }
}

/// The outcome of a catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The exact type identifier is registered.
    Exact(DriverName),
    /// Only other versions are registered and the version was ignored.
    IgnoredVersion {
        /// The driver of the chosen key.
        driver: DriverName,
        /// The key that was chosen.
        key: String,
    },
    /// Only other versions are registered; the default driver applies.
    VersionMismatch {
        /// Every key registered for another version of the IP.
        candidates: Vec<String>,
    },
    /// Nothing registered for this IP; the default driver applies.
    NoMatch,
}

impl Resolution {
    /// The driver to bind, given the default.
    pub fn driver<'a>(&'a self, default: &'a DriverName) -> &'a DriverName {
        match self {
            Resolution::Exact(driver) | Resolution::IgnoredVersion { driver, .. } => driver,
            Resolution::VersionMismatch { .. } | Resolution::NoMatch => default,
        }
    }
}

/// Looks up the driver for a type identifier.
pub fn resolve(catalog: &DriverCatalog, vlnv: &Vlnv, ignore_version: bool) -> Resolution {
    if let Some(driver) = catalog.get(vlnv.as_str()) {
        return Resolution::Exact(driver.clone());
    }
    let unversioned = vlnv.unversioned();
    let generic = catalog.entries.get_key_value(unversioned);
    let mut others = catalog.other_versions(unversioned).peekable();
    if generic.is_none() && others.peek().is_none() {
        return Resolution::NoMatch;
    }
    if ignore_version {
        if let Some((key, driver)) = generic.or_else(|| others.next()) {
            return Resolution::IgnoredVersion {
                driver: driver.clone(),
                key: key.clone(),
            };
        }
    }
    Resolution::VersionMismatch {
        candidates: others.map(|(key, _)| key.clone()).collect(),
    }
}

/// Everything a binding needs besides the node itself.
#[derive(Debug, Clone)]
pub struct BindingContext {
    /// The IP driver catalog.
    pub catalog: DriverCatalog,
    /// Bound when nothing in the catalog applies.
    pub default_ip: DriverName,
    /// Device recorded next to every driver.
    pub device: DeviceRef,
    /// Accept drivers registered for another version of the IP.
    pub ignore_version: bool,
}

impl BindingContext {
    /// Builds the context from resolved session settings.
    pub fn from_session(session: &ResolvedSession, sink: &DiagnosticSink) -> Self {
        Self {
            catalog: DriverCatalog::from_config(&session.drivers.ip, sink),
            default_ip: DriverName::new(session.drivers.default_ip.as_str()),
            device: DeviceRef::new(session.device.as_str()),
            ignore_version: session.ignore_version,
        }
    }
}

/// Binds a driver to a subordinate port or a core and returns the binding.
///
/// Any previous binding on the node is overwritten; callers that want the
/// cached binding check the annotation first.
pub fn bind(
    design: &mut Design,
    node: NodeRef,
    ctx: &BindingContext,
    sink: &DiagnosticSink,
) -> MetadataResult<DriverBinding> {
    let (core, subject) = match node {
        NodeRef::Core(core) => (core, design.cores[core].path.clone()),
        NodeRef::Port(port) => {
            let core = design.port_core(port);
            (core, format!("{}/{}", design.cores[core].path, design.port_name(port)))
        }
        NodeRef::Signal(_) | NodeRef::Hierarchy(_) => {
            return Err(MetadataError::lookup("core owning", format!("{node:?}")));
        }
    };
    let vlnv = &design.cores[core].vlnv;
    let resolution = resolve(&ctx.catalog, vlnv, ctx.ignore_version);
    match &resolution {
        Resolution::VersionMismatch { candidates } => {
            warn!(%subject, type_id = %vlnv, ?candidates, "only other driver versions available");
            sink.emit(codes::warn_ambiguous_version(&subject, vlnv.as_str(), candidates));
        }
        Resolution::IgnoredVersion { key, .. } => {
            debug!(%subject, type_id = %vlnv, %key, "binding driver for another version");
        }
        Resolution::Exact(_) | Resolution::NoMatch => {}
    }
    let binding = DriverBinding {
        driver: resolution.driver(&ctx.default_ip).clone(),
        device: ctx.device.clone(),
    };
    debug!(%subject, driver = %binding.driver, "bound driver");
    design
        .annotations
        .insert(node, Annotation::DriverBinding(binding.clone()));
    Ok(binding)
}
