//! Registers and bitfields of subordinate ports.

use crate::ids::{PortId, RegisterId};
use ovl_common::Ident;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access mode of a register or bitfield, following IP-XACT naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Access {
    /// `read-only`
    #[serde(rename = "read-only")]
    ReadOnly,
    /// `write-only`
    #[serde(rename = "write-only")]
    WriteOnly,
    /// `read-write`
    #[default]
    #[serde(rename = "read-write")]
    ReadWrite,
    /// `writeOnce`
    #[serde(rename = "writeOnce")]
    WriteOnce,
    /// `read-writeOnce`
    #[serde(rename = "read-writeOnce")]
    ReadWriteOnce,
}

impl Access {
    /// The IP-XACT spelling of this access mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Access::ReadOnly => "read-only",
            Access::WriteOnly => "write-only",
            Access::ReadWrite => "read-write",
            Access::WriteOnce => "writeOnce",
            Access::ReadWriteOnce => "read-writeOnce",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bitfield within a register. `low..=high` are inclusive bit bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitfield {
    /// The field name.
    pub name: Ident,
    /// Least significant bit.
    pub low: u32,
    /// Most significant bit.
    pub high: u32,
    /// Access mode.
    pub access: Access,
    /// Free-form description.
    pub description: String,
}

impl Bitfield {
    /// Number of bits covered by the field. The builder only admits
    /// `low <= high < register width`; anything else counts as zero bits.
    pub fn width(&self) -> u32 {
        self.high
            .checked_sub(self.low)
            .map_or(0, |span| span.saturating_add(1))
    }
}

/// A register owned by a subordinate port.
#[derive(Debug, Clone)]
pub struct Register {
    /// This register's ID.
    pub id: RegisterId,
    /// The register name.
    pub name: Ident,
    /// The owning subordinate port.
    pub port: PortId,
    /// Byte offset from the port's base address.
    pub offset: u64,
    /// Register width in bits.
    pub width: u32,
    /// Access mode.
    pub access: Access,
    /// Free-form description.
    pub description: String,
    /// Bitfields in declaration order.
    pub bitfields: Vec<Bitfield>,
}
