//! Versioned IP type identifiers (`vendor:library:name:version`).

use crate::error::MetadataError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The type identifier of an IP core, e.g. `xilinx.com:ip:axi_gpio:2.0`.
///
/// A `Vlnv` is immutable once parsed. The full string is kept so that catalog
/// lookups compare against exactly what the design declared.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Vlnv {
    raw: String,
}

impl Vlnv {
    /// Parses a four-component type identifier.
    ///
    /// Fails with [`MetadataError::Format`] unless the string has exactly four
    /// non-empty colon-separated components.
    pub fn parse(s: &str) -> Result<Self, MetadataError> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
            return Err(MetadataError::Format {
                subject: s.to_string(),
                reason: "expected `vendor:library:name:version`".to_string(),
            });
        }
        Ok(Self { raw: s.to_string() })
    }

    /// The full identifier string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The vendor component.
    pub fn vendor(&self) -> &str {
        self.component(0)
    }

    /// The library component.
    pub fn library(&self) -> &str {
        self.component(1)
    }

    /// The IP name component, e.g. `axi_intc`.
    pub fn name(&self) -> &str {
        self.component(2)
    }

    /// The version component, e.g. `4.1`.
    pub fn version(&self) -> &str {
        self.component(3)
    }

    /// The identifier with the trailing version stripped (`vendor:library:name`).
    pub fn unversioned(&self) -> &str {
        match self.raw.rfind(':') {
            Some(pos) => &self.raw[..pos],
            None => &self.raw,
        }
    }

    fn component(&self, index: usize) -> &str {
        self.raw.split(':').nth(index).unwrap_or("")
    }
}

impl FromStr for Vlnv {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Vlnv {
    type Error = MetadataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Vlnv> for String {
    fn from(value: Vlnv) -> Self {
        value.raw
    }
}

impl fmt::Display for Vlnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components() {
        let v = Vlnv::parse("xilinx.com:ip:axi_gpio:2.0").unwrap();
        assert_eq!(v.vendor(), "xilinx.com");
        assert_eq!(v.library(), "ip");
        assert_eq!(v.name(), "axi_gpio");
        assert_eq!(v.version(), "2.0");
    }

    #[test]
    fn unversioned_strips_last_component() {
        let v = Vlnv::parse("x:y:uart:1.0").unwrap();
        assert_eq!(v.unversioned(), "x:y:uart");
    }

    #[test]
    fn rejects_short_identifier() {
        let err = Vlnv::parse("x:y:uart").unwrap_err();
        assert!(matches!(err, MetadataError::Format { .. }));
    }

    #[test]
    fn rejects_empty_component() {
        assert!(Vlnv::parse("x::uart:1.0").is_err());
    }

    #[test]
    fn display_is_raw_string() {
        let v: Vlnv = "xilinx.com:ip:xlconcat:2.1".parse().unwrap();
        assert_eq!(v.to_string(), "xilinx.com:ip:xlconcat:2.1");
    }

    #[test]
    fn serde_as_plain_string() {
        let v = Vlnv::parse("a:b:c:1.0").unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"a:b:c:1.0\"");
        let back: Vlnv = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
        assert!(serde_json::from_str::<Vlnv>("\"bad\"").is_err());
    }
}
