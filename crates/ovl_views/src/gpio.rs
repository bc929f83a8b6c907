//! The GPIO view: the processing system's GPIO lines.

use crate::view::ViewDict;
use ovl_common::MetadataResult;
use ovl_graph::Design;
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Name of the GPIO view in errors.
pub const GPIO_VIEW: &str = "gpio view";

/// The GPIO view, keyed by line name. Entries carry settable state.
pub type GpioView = ViewDict<GpioEntry>;

/// One GPIO line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GpioEntry {
    /// Index in the processing system's GPIO bank.
    pub index: u32,
    /// Connected pins as `<core path>/<port>`.
    pub pins: Vec<String>,
}

/// Materializes the GPIO view.
pub fn gpio_view(design: &Design) -> MetadataResult<GpioView> {
    let ps = design.processing_system()?;
    let mut entries = BTreeMap::new();
    if let Some(meta) = design.cores[ps].processing_system() {
        for line in &meta.gpio {
            let pins = line
                .pins
                .iter()
                .map(|&pin| {
                    let core = design.port_core(pin);
                    format!("{}/{}", design.cores[core].path, design.port_name(pin))
                })
                .collect();
            entries.insert(
                line.name.clone(),
                Rc::new(GpioEntry {
                    index: line.index,
                    pins,
                }),
            );
        }
    }
    Ok(ViewDict::with_state(GPIO_VIEW, entries))
}
