//! Session resolution: merging file configuration with command-line overrides.

use crate::types::{DriverConfig, InterruptConfig, MemoryConfig, SessionConfig};

/// Values supplied on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct SessionOverrides {
    /// Overrides `session.overlay`.
    pub overlay: Option<String>,
    /// Overrides `session.device`.
    pub device: Option<String>,
    /// Forces `session.ignore_version` on when `true`.
    pub ignore_version: bool,
}

/// A fully resolved session configuration.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    /// Overlay handle.
    pub overlay: String,
    /// Device handle.
    pub device: String,
    /// Effective version policy.
    pub ignore_version: bool,
    /// Driver catalog.
    pub drivers: DriverConfig,
    /// Interrupt topology conventions.
    pub interrupts: InterruptConfig,
    /// Memory view settings.
    pub memory: MemoryConfig,
}

/// Resolves the effective session settings.
///
/// Overrides replace file values when present; `ignore_version` can only be
/// switched on from the command line, never off.
pub fn resolve_session(config: &SessionConfig, overrides: &SessionOverrides) -> ResolvedSession {
    ResolvedSession {
        overlay: overrides
            .overlay
            .clone()
            .unwrap_or_else(|| config.session.overlay.clone()),
        device: overrides
            .device
            .clone()
            .unwrap_or_else(|| config.session.device.clone()),
        ignore_version: config.session.ignore_version || overrides.ignore_version,
        drivers: config.drivers.clone(),
        interrupts: config.interrupts.clone(),
        memory: config.memory.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn no_overrides_keeps_file_values() {
        let config = load_config_from_str(
            r#"
[session]
overlay = "base"
device = "pynq-z2"
"#,
        )
        .unwrap();
        let resolved = resolve_session(&config, &SessionOverrides::default());
        assert_eq!(resolved.overlay, "base");
        assert_eq!(resolved.device, "pynq-z2");
        assert!(!resolved.ignore_version);
    }

    #[test]
    fn overrides_take_precedence() {
        let config = SessionConfig::default();
        let overrides = SessionOverrides {
            overlay: Some("logictools".to_string()),
            device: None,
            ignore_version: true,
        };
        let resolved = resolve_session(&config, &overrides);
        assert_eq!(resolved.overlay, "logictools");
        assert_eq!(resolved.device, "device0");
        assert!(resolved.ignore_version);
    }

    #[test]
    fn file_ignore_version_survives_default_override() {
        let config = load_config_from_str("[session]\nignore_version = true").unwrap();
        let resolved = resolve_session(&config, &SessionOverrides::default());
        assert!(resolved.ignore_version);
    }
}
