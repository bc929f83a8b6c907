//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::SessionConfig;
use std::path::Path;

/// File name looked up inside a project directory.
pub const CONFIG_FILE_NAME: &str = "overlay.toml";

/// Loads and validates a session configuration file.
///
/// `path` may name the file itself or a directory containing `overlay.toml`.
pub fn load_config(path: &Path) -> Result<SessionConfig, ConfigError> {
    let config_path = if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a session configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<SessionConfig, ConfigError> {
    let config: SessionConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks that required values are present and consistent.
fn validate_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.drivers.default_ip.is_empty() {
        return Err(ConfigError::MissingField("drivers.default_ip".to_string()));
    }
    if config.drivers.default_hierarchy.is_empty() {
        return Err(ConfigError::MissingField(
            "drivers.default_hierarchy".to_string(),
        ));
    }
    for (type_id, driver) in &config.drivers.ip {
        if driver.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "driver for `{type_id}` is empty"
            )));
        }
    }
    for spec in &config.drivers.hierarchy {
        if spec.driver.is_empty() {
            return Err(ConfigError::MissingField(
                "drivers.hierarchy.driver".to_string(),
            ));
        }
        if spec.requires.is_empty() || spec.requires.iter().any(String::is_empty) {
            return Err(ConfigError::Invalid(format!(
                "hierarchy driver `{}` needs at least one non-empty requirement",
                spec.driver
            )));
        }
    }
    let irq = &config.interrupts;
    if irq.controller_types.is_empty() {
        return Err(ConfigError::Invalid(
            "interrupts.controller_types must not be empty".to_string(),
        ));
    }
    if irq.concat_types.is_empty() {
        return Err(ConfigError::Invalid(
            "interrupts.concat_types must not be empty".to_string(),
        ));
    }
    if irq.concat_input_prefix.is_empty() {
        return Err(ConfigError::MissingField(
            "interrupts.concat_input_prefix".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.drivers.default_ip, "DefaultIP");
        assert!(config.drivers.ip.is_empty());
        assert!(config.drivers.hierarchy.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[session]
overlay = "base"
device = "pynq-z2"
ignore_version = true

[drivers]
default_ip = "DefaultIP"
default_hierarchy = "DefaultHierarchy"

[drivers.ip]
"xilinx.com:ip:axi_gpio:2.0" = "AxiGPIO"
"xilinx.com:ip:axi_intc" = "AxiIntc"

[[drivers.hierarchy]]
driver = "DmaHierarchy"
requires = ["xilinx.com:ip:axi_dma:*"]

[[drivers.hierarchy]]
driver = "AudioHierarchy"
requires = "xilinx.com:user:audio_codec_ctrl:*"

[interrupts]
controller_types = ["axi_intc"]
concat_types = ["xlconcat", "ilconcat"]

[memory]
cache_exclude = ["PSDDR", "ocm"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.session.overlay, "base");
        assert_eq!(config.session.device, "pynq-z2");
        assert!(config.session.ignore_version);
        assert_eq!(config.drivers.ip.len(), 2);
        assert_eq!(config.drivers.hierarchy[0].driver, "DmaHierarchy");
        assert_eq!(config.drivers.hierarchy[1].requires.len(), 1);
        assert_eq!(config.interrupts.concat_types.len(), 2);
        assert_eq!(config.interrupts.controller_input, "intr");
        assert_eq!(config.memory.cache_exclude, vec!["PSDDR", "ocm"]);
    }

    #[test]
    fn empty_default_ip_errors() {
        let toml = r#"
[drivers]
default_ip = ""
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn hierarchy_without_requirements_errors() {
        let toml = r#"
[[drivers.hierarchy]]
driver = "Nothing"
requires = []
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn empty_controller_types_errors() {
        let toml = r#"
[interrupts]
controller_types = []
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        writeln!(file, "[session]\noverlay = \"from_dir\"").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.session.overlay, "from_dir");
    }

    #[test]
    fn load_from_file_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session]\ndevice = \"zcu104\"").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.session.device, "zcu104");
    }

    #[test]
    fn io_error_from_nonexistent_path() {
        let err = load_config(Path::new("/nonexistent/dir/overlay.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
