//! Shared setup: configuration, design loading, and the metadata session.

use std::path::Path;

use ovl_config::{load_config, resolve_session, ResolvedSession, SessionConfig, SessionOverrides};
use ovl_graph::load_design;
use ovl_views::{MetadataSession, SequentialImageBuilder};
use tracing::debug;

use crate::ViewArgs;

/// Loads `overlay.toml` when given, falling back to the defaults, and applies
/// the command-line overrides.
pub fn resolve_config(args: &ViewArgs) -> Result<ResolvedSession, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => load_config(Path::new(path))?,
        None => SessionConfig::default(),
    };
    let overrides = SessionOverrides {
        overlay: args.overlay.clone(),
        device: args.device.clone(),
        ignore_version: args.ignore_version,
    };
    Ok(resolve_session(&config, &overrides))
}

/// Loads the design and opens a session, binding drivers.
pub fn open_session(args: &ViewArgs) -> Result<MetadataSession, Box<dyn std::error::Error>> {
    let resolved = resolve_config(args)?;
    let design = load_design(Path::new(&args.design))?;
    debug!(design = %args.design, cores = design.cores.len(), "loaded design");
    let session = MetadataSession::from_resolved(design, &resolved, Box::new(SequentialImageBuilder))?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReportFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(design: &str, config: Option<&str>) -> ViewArgs {
        ViewArgs {
            design: design.to_string(),
            config: config.map(str::to_string),
            format: ReportFormat::Text,
            ignore_version: false,
            overlay: None,
            device: None,
        }
    }

    #[test]
    fn defaults_without_config_file() {
        let resolved = resolve_config(&args("d.json", None)).unwrap();
        assert_eq!(resolved.drivers.default_ip, "DefaultIP");
        assert!(!resolved.ignore_version);
    }

    #[test]
    fn overrides_win_over_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[session]\noverlay = \"base\"\ndevice = \"pynq-z2\"").unwrap();
        let path = file.path().to_string_lossy().to_string();
        let mut a = args("d.json", Some(&path));
        a.device = Some("zcu104".to_string());
        a.ignore_version = true;
        let resolved = resolve_config(&a).unwrap();
        assert_eq!(resolved.overlay, "base");
        assert_eq!(resolved.device, "zcu104");
        assert!(resolved.ignore_version);
    }

    #[test]
    fn missing_design_is_an_error() {
        assert!(open_session(&args("/nonexistent/design.json", None)).is_err());
    }
}
