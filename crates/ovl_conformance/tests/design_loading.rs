//! Loading design descriptions from disk.

use ovl_conformance::BASE_DESIGN;
use ovl_graph::{load_design, load_design_from_str, LoadError};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn loads_base_design_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(BASE_DESIGN.as_bytes()).unwrap();
    let design = load_design(file.path()).unwrap();
    let gpio = design.find_core_by_path("btns_gpio").unwrap();
    assert_eq!(design.cores[gpio].vlnv.as_str(), "xilinx.com:ip:axi_gpio:2.0");
    let ps = design.processing_system().unwrap();
    let meta = design.cores[ps].processing_system().unwrap();
    assert_eq!(meta.irq_map.get(&0), Some(&61));
    assert_eq!(meta.gpio.len(), 1);
}

#[test]
fn dangling_connection_is_reported() {
    let json = r#"{ "cores": [ { "path": "a", "vlnv": "x:y:z:1.0",
        "ports": [ { "name": "o", "kind": "scalar" } ] } ],
        "connections": [ ["a/o", "b/i"] ] }"#;
    match load_design_from_str(json) {
        Err(LoadError::DanglingReference(reference)) => assert_eq!(reference, "b/i"),
        other => panic!("expected dangling reference, got {other:?}"),
    }
}

#[test]
fn gpio_view_of_loaded_design() {
    let design = load_design_from_str(BASE_DESIGN).unwrap();
    let mut view = ovl_views::gpio_view(&design).unwrap();
    let line = view.get("rst_ps7_0_fclk0/aux_reset_in").unwrap();
    assert_eq!(line.pins, vec!["rst_ps7_0_fclk0/aux_reset_in"]);
    view.set("rst_ps7_0_fclk0/aux_reset_in", serde_json::json!(1)).unwrap();
    assert_eq!(view.state("rst_ps7_0_fclk0/aux_reset_in"), Some(&serde_json::json!(1)));
}
