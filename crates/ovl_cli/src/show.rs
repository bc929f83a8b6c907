//! The view commands: materialize one view and print it.

use ovl_diagnostics::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
use ovl_views::MetadataSession;
use serde_json::Value;

use crate::pipeline::open_session;
use crate::{GlobalArgs, ReportFormat, ViewArgs, ViewKind};

/// Runs a view command. Returns exit code 0 unless materialization failed.
pub fn run(
    kind: ViewKind,
    args: &ViewArgs,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let mut session = open_session(args)?;
    let result = materialize(&mut session, kind);
    report_diagnostics(&session, args.format, global);
    let view = result?;

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        ReportFormat::Text => print!("{}", render_text(&view)),
    }
    Ok(0)
}

/// Materializes the requested view as JSON.
pub fn materialize(session: &mut MetadataSession, kind: ViewKind) -> ovl_common::MetadataResult<Value> {
    match kind {
        ViewKind::Ip => session.ip_view()?.to_json(),
        ViewKind::Memory => session.memory_view()?.to_json(),
        ViewKind::Gpio => session.gpio_view()?.to_json(),
        ViewKind::Hierarchy => session.hierarchy_view()?.to_json(),
        ViewKind::InterruptControllers => session.interrupt_controllers()?.to_json(),
        ViewKind::InterruptPins => session.interrupt_pins()?.to_json(),
    }
}

fn report_diagnostics(session: &MetadataSession, format: ReportFormat, global: &GlobalArgs) {
    if global.quiet {
        return;
    }
    let diagnostics = session.diagnostics().diagnostics();
    match format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new(global.color);
            for diag in &diagnostics {
                eprint!("{}", renderer.render(diag));
            }
        }
        ReportFormat::Json => {
            for diag in &diagnostics {
                eprintln!("{}", JsonRenderer.render(diag));
            }
        }
    }
}

/// Renders a view as one block per entry: the key, then its scalar fields.
/// Nested maps are summarized by their keys.
pub fn render_text(view: &Value) -> String {
    let mut out = String::new();
    let Some(entries) = view.as_object() else {
        return out;
    };
    for (key, entry) in entries {
        out.push_str(key);
        out.push('\n');
        let Some(fields) = entry.as_object() else {
            out.push_str(&format!("    {entry}\n"));
            continue;
        };
        for (name, value) in fields {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Object(map) if map.is_empty() => continue,
                Value::Object(map) => map.keys().cloned().collect::<Vec<_>>().join(", "),
                Value::Array(items) => items
                    .iter()
                    .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
                    .collect::<Vec<_>>()
                    .join(", "),
                other => other.to_string(),
            };
            out.push_str(&format!("    {name}: {text}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_lists_scalars_and_nested_keys() {
        let view = json!({
            "leds/axi_gpio_0": {
                "type": "xilinx.com:ip:axi_gpio:2.0",
                "phys_addr": 1092616192,
                "registers": { "GPIO_DATA": {}, "GPIO_TRI": {} },
                "parameters": {},
                "state": null
            }
        });
        let text = render_text(&view);
        assert!(text.starts_with("leds/axi_gpio_0\n"));
        assert!(text.contains("    type: xilinx.com:ip:axi_gpio:2.0\n"));
        assert!(text.contains("    phys_addr: 1092616192\n"));
        assert!(text.contains("    registers: GPIO_DATA, GPIO_TRI\n"));
        assert!(!text.contains("parameters"));
        assert!(!text.contains("state"));
    }

    #[test]
    fn text_lists_arrays() {
        let view = json!({ "line": { "index": 3, "pins": ["rst/aux", "rst/ext"] } });
        assert!(render_text(&view).contains("    pins: rst/aux, rst/ext\n"));
    }

    #[test]
    fn empty_view_renders_nothing() {
        assert_eq!(render_text(&json!({})), "");
    }
}
