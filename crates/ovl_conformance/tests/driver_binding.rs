//! Driver binding through the resolver and the binding pass.

use ovl_conformance::{base_session, binding_context, single_core};
use ovl_diagnostics::DiagnosticSink;
use ovl_drivers::{bind, bind_drivers, codes};
use ovl_graph::NodeRef;

fn uart_port(design: &ovl_graph::Design) -> NodeRef {
    let core = design.find_core_by_path("uart_0").unwrap();
    NodeRef::Port(design.port_by_name(core, "S_AXI").unwrap())
}

#[test]
fn exact_type_binds_catalog_entry() {
    let mut design = single_core("x:y:uart:1.0");
    let ctx = binding_context(&[("x:y:uart:1.0", "D1")], false);
    let sink = DiagnosticSink::new();
    let node = uart_port(&design);
    let binding = bind(&mut design, node, &ctx, &sink).unwrap();
    assert_eq!(binding.driver.as_str(), "D1");
    assert_eq!(binding.device.as_str(), "device0");
    assert_eq!(sink.warning_count(), 0);
}

#[test]
fn other_version_binds_default_and_warns() {
    let mut design = single_core("x:y:uart:2.0");
    let ctx = binding_context(&[("x:y:uart:1.0", "D1")], false);
    let sink = DiagnosticSink::new();
    let node = uart_port(&design);
    let binding = bind(&mut design, node, &ctx, &sink).unwrap();
    assert_eq!(binding.driver.as_str(), "DefaultIP");

    let diags = sink.take_all();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, codes::W301);
    assert!(diags[0].message.contains("x:y:uart:1.0"));
}

#[test]
fn warning_names_every_other_version() {
    let mut design = single_core("x:y:uart:2.0");
    let catalog = [("x:y:uart", "Generic"), ("x:y:uart:1.0", "D1"), ("x:y:uart:1.1", "D11")];
    let sink = DiagnosticSink::new();
    let node = uart_port(&design);
    let binding = bind(&mut design, node, &binding_context(&catalog, false), &sink).unwrap();
    assert_eq!(binding.driver.as_str(), "DefaultIP");
    let diags = sink.take_all();
    assert_eq!(diags.len(), 1);
    assert!(diags[0]
        .message
        .ends_with(r#"found for ["x:y:uart:1.0", "x:y:uart:1.1"]"#));

    let binding = bind(&mut design, node, &binding_context(&catalog, true), &sink).unwrap();
    assert_eq!(binding.driver.as_str(), "Generic");
}

#[test]
fn other_version_with_ignore_version_binds_candidate() {
    let mut design = single_core("x:y:uart:2.0");
    let ctx = binding_context(&[("x:y:uart:1.0", "D1")], true);
    let sink = DiagnosticSink::new();
    let node = uart_port(&design);
    let binding = bind(&mut design, node, &ctx, &sink).unwrap();
    assert_eq!(binding.driver.as_str(), "D1");
    assert_eq!(sink.warning_count(), 0);
}

#[test]
fn unknown_type_binds_default_silently() {
    let mut design = single_core("x:y:gpio:1.0");
    let ctx = binding_context(&[("x:y:uart:1.0", "D1")], false);
    let sink = DiagnosticSink::new();
    let node = uart_port(&design);
    let binding = bind(&mut design, node, &ctx, &sink).unwrap();
    assert_eq!(binding.driver.as_str(), "DefaultIP");
    assert_eq!(sink.warning_count(), 0);
}

#[test]
fn binding_pass_is_idempotent() {
    let mut design = single_core("x:y:uart:2.0");
    let ctx = binding_context(&[("x:y:uart:1.0", "D1")], false);
    let sink = DiagnosticSink::new();
    assert_eq!(bind_drivers(&mut design, &ctx, &sink).unwrap(), 2);
    let node = uart_port(&design);
    let first = design.annotations.driver_binding(node).cloned();

    // A changed catalog must not affect already bound nodes.
    let other = binding_context(&[("x:y:uart:2.0", "D2")], false);
    assert_eq!(bind_drivers(&mut design, &other, &sink).unwrap(), 0);
    assert_eq!(design.annotations.driver_binding(node).cloned(), first);
    assert_eq!(sink.warning_count(), 1);
}

#[test]
fn base_overlay_bindings() {
    let session = base_session(false);
    let ip = session.ip_view().unwrap();
    let driver = |name: &str| ip.get(name).unwrap().driver.as_ref().unwrap().as_str().to_string();
    assert_eq!(driver("btns_gpio"), "AxiGPIO");
    assert_eq!(driver("axi_intc_0"), "AxiIntc");
    assert_eq!(driver("audio/codec_ctrl"), "DefaultIP");
    assert_eq!(driver("video/axi_dma_0"), "DefaultIP");
    assert_eq!(driver("ps7_0"), "DefaultIP");

    let diags = session.diagnostics().diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].subject.as_deref(), Some("video/axi_dma_0/S_AXI_LITE"));
}

#[test]
fn base_overlay_ignoring_versions() {
    let session = base_session(true);
    let ip = session.ip_view().unwrap();
    assert_eq!(ip.get("video/axi_dma_0").unwrap().driver.as_ref().unwrap().as_str(), "DMA");
    assert_eq!(session.diagnostics().warning_count(), 0);
}
