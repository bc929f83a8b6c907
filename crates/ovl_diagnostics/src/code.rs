//! Diagnostic codes such as `W301` or `T101`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Code family. The family picks the leading letter of the rendered code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// `E`: errors not tied to a pass.
    Error,
    /// `W`: warnings not tied to a pass.
    Warning,
    /// `B`: driver binding.
    Binding,
    /// `T`: interrupt and hierarchy topology.
    Topology,
}

impl Category {
    /// Leading letter of codes in this family.
    pub fn letter(self) -> char {
        match self {
            Self::Error => 'E',
            Self::Warning => 'W',
            Self::Binding => 'B',
            Self::Topology => 'T',
        }
    }
}

/// Identifies one kind of diagnostic. Renders as the family letter followed
/// by a zero-padded three digit number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// Family.
    pub category: Category,
    /// Number within the family.
    pub number: u16,
}

impl DiagnosticCode {
    /// Builds a code; usable in `const` items.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = self.category.letter();
        write!(f, "{letter}{:03}", self.number)
    }
}
