//! The interrupt topology walk and the two interrupt views.
//!
//! The walk starts at the processing system's interrupt inputs and follows
//! signal connections. Each destination core is in one of three states:
//!
//! - `Controller`: terminal; the controller gets the next controller index.
//! - `Concatenator`: fan-in; every input pin except the output is walked in
//!   declared port order. Input pins must be named `<prefix><N>`.
//! - `Plain`: terminal; the destination pin itself is an interrupt pin.
//!
//! A second walk starts at each controller's input pin (in controller index
//! order) and numbers the pins it reaches with one global pin counter. Pins
//! wired to the processing system without a controller are numbered last.
//!
//! Indices are cached as annotations. A later walk reuses cached indices and
//! numbers only new nodes, starting above the highest cached index. All
//! annotations of a walk are written only once the whole walk succeeded.

use crate::codes;
use crate::view::ViewDict;
use ovl_common::{MetadataError, MetadataResult};
use ovl_config::InterruptConfig;
use ovl_diagnostics::DiagnosticSink;
use ovl_graph::{
    Annotation, AnnotationKind, ControllerIndex, CoreId, Design, InterruptIndex, NodeRef, SignalId,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use tracing::{debug, trace};

/// Name of the interrupt controllers view in errors.
pub const CONTROLLERS_VIEW: &str = "interrupt controllers view";

/// Name of the interrupt pins view in errors.
pub const PINS_VIEW: &str = "interrupt pins view";

/// Interrupt controllers keyed by core hierarchy path.
pub type ControllerView = ViewDict<ControllerEntry>;

/// Interrupt pins keyed by `<core path>/<pin>`.
pub type PinView = ViewDict<PinEntry>;

/// One interrupt controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerEntry {
    /// Always empty; controllers hang directly off the processing system.
    pub parent: String,
    /// Controller index.
    pub index: u32,
    /// Raw interrupt number of the processing-system input it drives.
    pub raw_irq: u32,
}

/// One interrupt pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinEntry {
    /// Hierarchy path of the controller (or processing system) it reaches.
    pub controller: String,
    /// Global pin index.
    pub index: u32,
    /// `<core path>/<pin>`.
    pub fullpath: String,
}

/// Naming conventions of the interrupt topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptConventions {
    /// IP names of interrupt controllers.
    pub controller_types: Vec<String>,
    /// IP names of concatenators.
    pub concat_types: Vec<String>,
    /// A concatenator's output pin.
    pub concat_output: String,
    /// A controller's input pin.
    pub controller_input: String,
    /// Prefix of concatenator input pins.
    pub concat_input_prefix: String,
}

impl Default for InterruptConventions {
    fn default() -> Self {
        Self::from(&InterruptConfig::default())
    }
}

impl From<&InterruptConfig> for InterruptConventions {
    fn from(config: &InterruptConfig) -> Self {
        Self {
            controller_types: config.controller_types.clone(),
            concat_types: config.concat_types.clone(),
            concat_output: config.concat_output.clone(),
            controller_input: config.controller_input.clone(),
            concat_input_prefix: config.concat_input_prefix.clone(),
        }
    }
}

/// The role a core plays in the interrupt topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// An interrupt controller.
    Controller,
    /// A fan-in concatenator.
    Concatenator,
    /// Anything else.
    Plain,
}

impl InterruptConventions {
    /// Classifies a core by the IP name of its type identifier.
    pub fn classify(&self, design: &Design, core: CoreId) -> WalkState {
        let name = design.cores[core].vlnv.name();
        if self.controller_types.iter().any(|t| t == name) {
            WalkState::Controller
        } else if self.concat_types.iter().any(|t| t == name) {
            WalkState::Concatenator
        } else {
            WalkState::Plain
        }
    }

    /// Parses the input number out of a concatenator pin name such as `In3`.
    pub fn input_number(&self, pin: &str) -> Option<u32> {
        let digits = pin.strip_prefix(self.concat_input_prefix.as_str())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

/// Result of the controller walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerWalk {
    /// The processing system the walk started from.
    pub processing_system: CoreId,
    /// Reached controllers with their indices, ascending by index.
    pub controllers: Vec<(CoreId, u32)>,
    /// Interrupt pins reached without passing a controller.
    pub direct_pins: Vec<SignalId>,
}

/// One numbered interrupt pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinAssignment {
    /// The pin's signal.
    pub signal: SignalId,
    /// Global pin index.
    pub index: u32,
    /// Controller (or processing system) the pin reaches.
    pub controller: CoreId,
}

struct Walker<'a> {
    design: &'a Design,
    conventions: &'a InterruptConventions,
    visited_concats: HashSet<CoreId>,
    seen_controllers: HashSet<CoreId>,
    seen_pins: HashSet<SignalId>,
}

impl<'a> Walker<'a> {
    fn new(design: &'a Design, conventions: &'a InterruptConventions) -> Self {
        Self {
            design,
            conventions,
            visited_concats: HashSet::new(),
            seen_controllers: HashSet::new(),
            seen_pins: HashSet::new(),
        }
    }

    /// A signal leaving a concatenator must be one of its numbered inputs.
    fn check_concat_input(&self, signal: SignalId) -> MetadataResult<()> {
        let core = self.design.signal_core(signal);
        if self.conventions.classify(self.design, core) != WalkState::Concatenator {
            return Ok(());
        }
        let name = self.design.signal_name(signal);
        if self.conventions.input_number(name).is_none() {
            return Err(MetadataError::Format {
                subject: format!("{}/{}", self.design.cores[core].path, name),
                reason: format!(
                    "expected a concatenator input named `{}<N>`",
                    self.conventions.concat_input_prefix
                ),
            });
        }
        Ok(())
    }

    fn concat_inputs(&self, core: CoreId) -> Vec<SignalId> {
        let design = self.design;
        design.cores[core]
            .ports
            .iter()
            .filter(|&&port| design.port_name(port) != self.conventions.concat_output)
            .filter_map(|&port| design.ports[port].signal)
            .collect()
    }

    fn walk_controllers(
        &mut self,
        signal: SignalId,
        controllers: &mut Vec<CoreId>,
        direct: &mut Vec<SignalId>,
    ) -> MetadataResult<()> {
        self.check_concat_input(signal)?;
        let design = self.design;
        for &dst in &design.signals[signal].connections {
            let core = design.signal_core(dst);
            let state = self.conventions.classify(design, core);
            trace!(from = design.signal_name(signal), to = %design.cores[core].path, ?state, "interrupt walk");
            match state {
                WalkState::Controller => {
                    if self.seen_controllers.insert(core) {
                        controllers.push(core);
                    }
                }
                WalkState::Concatenator => {
                    if self.visited_concats.insert(core) {
                        for input in self.concat_inputs(core) {
                            self.walk_controllers(input, controllers, direct)?;
                        }
                    }
                }
                WalkState::Plain => {
                    if self.seen_pins.insert(dst) {
                        direct.push(dst);
                    }
                }
            }
        }
        Ok(())
    }

    fn walk_pins(&mut self, signal: SignalId, pins: &mut Vec<SignalId>) -> MetadataResult<()> {
        self.check_concat_input(signal)?;
        let design = self.design;
        for &dst in &design.signals[signal].connections {
            let core = design.signal_core(dst);
            match self.conventions.classify(design, core) {
                WalkState::Concatenator => {
                    if self.visited_concats.insert(core) {
                        for input in self.concat_inputs(core) {
                            self.walk_pins(input, pins)?;
                        }
                    }
                }
                // A cascaded controller's output is not an interrupt pin.
                WalkState::Controller => {}
                WalkState::Plain => {
                    if self.seen_pins.insert(dst) {
                        pins.push(dst);
                    }
                }
            }
        }
        Ok(())
    }
}

fn next_free<I: Iterator<Item = u32>>(cached: I) -> u32 {
    cached.max().map_or(0, |max| max + 1)
}

/// Walks from the processing system's interrupt inputs to every reachable
/// controller and numbers the controllers.
///
/// Fails with [`MetadataError::Configuration`] unless the design has exactly
/// one processing system, and with [`MetadataError::Format`] on a
/// concatenator input whose name carries no input number. Does not write
/// annotations; see [`record_controllers`].
pub fn walk_controllers(
    design: &Design,
    conventions: &InterruptConventions,
) -> MetadataResult<ControllerWalk> {
    let ps = design.processing_system()?;
    let mut walker = Walker::new(design, conventions);
    let mut found = Vec::new();
    let mut direct = Vec::new();
    if let Some(meta) = design.cores[ps].processing_system() {
        for &pin in &meta.irq_pins {
            let signal = design.ports[pin].signal.ok_or_else(|| {
                MetadataError::lookup("signal of interrupt input", design.port_name(pin))
            })?;
            walker.walk_controllers(signal, &mut found, &mut direct)?;
        }
    }

    let annotations = &design.annotations;
    let mut next = next_free(
        annotations
            .of_kind(AnnotationKind::ControllerIndex)
            .filter_map(|(node, _)| annotations.controller_index(node)),
    );
    let mut controllers: Vec<(CoreId, u32)> = found
        .into_iter()
        .map(|core| {
            let index = annotations
                .controller_index(NodeRef::Core(core))
                .unwrap_or_else(|| {
                    let index = next;
                    next += 1;
                    index
                });
            (core, index)
        })
        .collect();
    controllers.sort_by_key(|&(_, index)| index);
    debug!(controllers = controllers.len(), direct_pins = direct.len(), "interrupt controller walk");
    Ok(ControllerWalk {
        processing_system: ps,
        controllers,
        direct_pins: direct,
    })
}

/// Writes the controller indices of a walk.
pub fn record_controllers(design: &mut Design, walk: &ControllerWalk) {
    for &(core, index) in &walk.controllers {
        let node = NodeRef::Core(core);
        if design.annotations.controller_index(node) != Some(index) {
            design
                .annotations
                .insert(node, Annotation::ControllerIndex(ControllerIndex { index }));
        }
    }
}

/// Walks from every controller's input pin and numbers the interrupt pins.
///
/// Controllers without an input pin are reported as [`codes::T101`], once
/// per sink, and skipped.
///
/// Numbering does not follow a single counter over the processing-system
/// walk: all pins behind controllers are numbered first, in controller index
/// order, and pins reached directly from the processing system come after
/// them, attributed to the processing system.
pub fn walk_pins(
    design: &Design,
    conventions: &InterruptConventions,
    controllers: &ControllerWalk,
    sink: &DiagnosticSink,
) -> MetadataResult<Vec<PinAssignment>> {
    let mut walker = Walker::new(design, conventions);
    let mut reached: Vec<(SignalId, CoreId)> = Vec::new();
    for &(controller, _) in &controllers.controllers {
        let Some(signal) = design
            .port_by_name(controller, &conventions.controller_input)
            .and_then(|port| design.ports[port].signal)
        else {
            sink.emit_once(codes::warn_controller_without_input(
                &design.cores[controller].path,
                &conventions.controller_input,
            ));
            continue;
        };
        let mut pins = Vec::new();
        walker.walk_pins(signal, &mut pins)?;
        reached.extend(pins.into_iter().map(|pin| (pin, controller)));
    }
    for &pin in &controllers.direct_pins {
        if walker.seen_pins.insert(pin) {
            reached.push((pin, controllers.processing_system));
        }
    }

    let annotations = &design.annotations;
    let mut next = next_free(
        annotations
            .of_kind(AnnotationKind::InterruptIndex)
            .filter_map(|(node, _)| annotations.interrupt_index(node).map(|i| i.index)),
    );
    let mut assignments: Vec<PinAssignment> = reached
        .into_iter()
        .map(|(signal, controller)| {
            let index = match annotations.interrupt_index(NodeRef::Signal(signal)) {
                Some(cached) => cached.index,
                None => {
                    let index = next;
                    next += 1;
                    index
                }
            };
            PinAssignment {
                signal,
                index,
                controller,
            }
        })
        .collect();
    assignments.sort_by_key(|a| a.index);
    debug!(pins = assignments.len(), "interrupt pin walk");
    Ok(assignments)
}

/// Writes the pin indices of a walk.
pub fn record_pins(design: &mut Design, pins: &[PinAssignment]) {
    for pin in pins {
        let annotation = InterruptIndex {
            index: pin.index,
            controller: design.cores[pin.controller].path.clone(),
        };
        let node = NodeRef::Signal(pin.signal);
        if design.annotations.interrupt_index(node) != Some(&annotation) {
            design
                .annotations
                .insert(node, Annotation::InterruptIndex(annotation));
        }
    }
}

/// Materializes the interrupt controllers view.
///
/// A controller whose index has no entry in the processing system's IRQ map
/// is a [`MetadataError::Lookup`].
pub fn interrupt_controllers(
    design: &mut Design,
    conventions: &InterruptConventions,
) -> MetadataResult<ControllerView> {
    let walk = walk_controllers(design, conventions)?;
    let entries = controller_entries(design, &walk)?;
    record_controllers(design, &walk);
    Ok(ViewDict::with_state(CONTROLLERS_VIEW, entries))
}

fn controller_entries(
    design: &Design,
    walk: &ControllerWalk,
) -> MetadataResult<BTreeMap<String, Rc<ControllerEntry>>> {
    let irq_map = design.cores[walk.processing_system]
        .processing_system()
        .map(|meta| &meta.irq_map);
    let mut entries = BTreeMap::new();
    for &(core, index) in &walk.controllers {
        let path = &design.cores[core].path;
        let raw_irq = irq_map
            .and_then(|map| map.get(&index))
            .copied()
            .ok_or_else(|| MetadataError::lookup("raw interrupt for controller", path.as_str()))?;
        entries.insert(
            path.clone(),
            Rc::new(ControllerEntry {
                parent: String::new(),
                index,
                raw_irq,
            }),
        );
    }
    Ok(entries)
}

/// Materializes the interrupt pins view.
pub fn interrupt_pins(
    design: &mut Design,
    conventions: &InterruptConventions,
    sink: &DiagnosticSink,
) -> MetadataResult<PinView> {
    let walk = walk_controllers(design, conventions)?;
    let pins = walk_pins(design, conventions, &walk, sink)?;
    let mut entries = BTreeMap::new();
    for pin in &pins {
        let core = design.signal_core(pin.signal);
        let fullpath = format!(
            "{}/{}",
            design.cores[core].path,
            design.signal_name(pin.signal)
        );
        entries.insert(
            fullpath.clone(),
            Rc::new(PinEntry {
                controller: design.cores[pin.controller].path.clone(),
                index: pin.index,
                fullpath,
            }),
        );
    }
    record_controllers(design, &walk);
    record_pins(design, &pins);
    Ok(ViewDict::with_state(PINS_VIEW, entries))
}
