//! Configuration types deserialized from `overlay.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// The top-level session configuration parsed from `overlay.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Overlay and device handles plus the version policy.
    #[serde(default)]
    pub session: SessionMeta,
    /// The driver catalog and default drivers.
    #[serde(default)]
    pub drivers: DriverConfig,
    /// Naming conventions of the interrupt topology.
    #[serde(default)]
    pub interrupts: InterruptConfig,
    /// Memory view settings.
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Session-wide handles and policies.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionMeta {
    /// Overlay handle attached to every hierarchy driver binding.
    #[serde(default = "default_overlay")]
    pub overlay: String,
    /// Device handle attached to every driver binding.
    #[serde(default = "default_device")]
    pub device: String,
    /// Bind drivers registered for another version of the same IP.
    #[serde(default)]
    pub ignore_version: bool,
}

impl Default for SessionMeta {
    fn default() -> Self {
        Self {
            overlay: default_overlay(),
            device: default_device(),
            ignore_version: false,
        }
    }
}

fn default_overlay() -> String {
    "overlay".to_string()
}

fn default_device() -> String {
    "device0".to_string()
}

/// The driver catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfig {
    /// Driver bound when no catalog entry matches an IP.
    #[serde(default = "default_ip_driver")]
    pub default_ip: String,
    /// Driver bound when no hierarchy candidate matches.
    #[serde(default = "default_hierarchy_driver")]
    pub default_hierarchy: String,
    /// IP drivers keyed by type identifier (versioned or unversioned).
    #[serde(default)]
    pub ip: BTreeMap<String, String>,
    /// Hierarchy driver candidates in priority order.
    #[serde(default)]
    pub hierarchy: Vec<HierarchyDriverSpec>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            default_ip: default_ip_driver(),
            default_hierarchy: default_hierarchy_driver(),
            ip: BTreeMap::new(),
            hierarchy: Vec::new(),
        }
    }
}

fn default_ip_driver() -> String {
    "DefaultIP".to_string()
}

fn default_hierarchy_driver() -> String {
    "DefaultHierarchy".to_string()
}

/// A hierarchy driver candidate.
///
/// The candidate matches a hierarchy when every entry of `requires` matches
/// the type of at least one IP directly inside it. Entries are type patterns
/// where `*` matches any run of characters (e.g. `xilinx.com:ip:axi_dma:*`).
#[derive(Debug, Clone, Deserialize)]
pub struct HierarchyDriverSpec {
    /// The driver bound when the candidate matches.
    pub driver: String,
    /// Type patterns that must all be present.
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub requires: Vec<String>,
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `requires = "a:b:c:*"` as well as `requires = ["a:b:c:*", "d:e:f:1.0"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Naming conventions for the interrupt topology walk.
#[derive(Debug, Clone, Deserialize)]
pub struct InterruptConfig {
    /// IP names (the `name` component of the type identifier) of interrupt controllers.
    #[serde(default = "default_controller_types")]
    pub controller_types: Vec<String>,
    /// IP names of concatenator (fan-in) blocks.
    #[serde(default = "default_concat_types")]
    pub concat_types: Vec<String>,
    /// Name of a concatenator's single output pin.
    #[serde(default = "default_concat_output")]
    pub concat_output: String,
    /// Name of a controller's interrupt input pin.
    #[serde(default = "default_controller_input")]
    pub controller_input: String,
    /// Prefix of concatenator input pin names, followed by the input number.
    #[serde(default = "default_concat_input_prefix")]
    pub concat_input_prefix: String,
}

impl Default for InterruptConfig {
    fn default() -> Self {
        Self {
            controller_types: default_controller_types(),
            concat_types: default_concat_types(),
            concat_output: default_concat_output(),
            controller_input: default_controller_input(),
            concat_input_prefix: default_concat_input_prefix(),
        }
    }
}

fn default_controller_types() -> Vec<String> {
    vec!["axi_intc".to_string()]
}

fn default_concat_types() -> Vec<String> {
    vec!["xlconcat".to_string()]
}

fn default_concat_output() -> String {
    "dout".to_string()
}

fn default_controller_input() -> String {
    "intr".to_string()
}

fn default_concat_input_prefix() -> String {
    "In".to_string()
}

/// Memory view settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Memories never handed to the image builder nor read from its cache.
    #[serde(default = "default_cache_exclude")]
    pub cache_exclude: Vec<String>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            cache_exclude: default_cache_exclude(),
        }
    }
}

fn default_cache_exclude() -> Vec<String> {
    vec!["PSDDR".to_string()]
}
