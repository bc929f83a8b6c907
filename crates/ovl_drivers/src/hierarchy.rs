//! Hierarchy driver candidates.
//!
//! A hierarchy driver claims a whole hierarchy (for example a DMA plus its
//! glue logic) when its [`Matcher`] accepts the hierarchy's
//! [`HierarchySummary`]. Candidates are tried in priority order; the first
//! match wins and the default hierarchy driver applies otherwise.

use ovl_common::DriverName;
use ovl_config::DriverConfig;
use std::fmt;
use std::sync::Arc;

/// What a matcher gets to see of an assembled hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchySummary {
    /// Full hierarchy path.
    pub fullpath: String,
    /// Type identifiers of the IP directly inside, in key order.
    pub ip_types: Vec<String>,
    /// Names of the memories directly inside.
    pub memories: Vec<String>,
    /// Names of the child hierarchies that survived pruning.
    pub children: Vec<String>,
}

/// A type identifier pattern where `*` matches any run of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePattern(String);

impl TypePattern {
    /// Creates a pattern.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// The pattern text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the whole of `text` matches.
    pub fn matches(&self, text: &str) -> bool {
        let mut parts = self.0.split('*');
        let first = parts.next().unwrap_or_default();
        let Some(mut rest) = text.strip_prefix(first) else {
            return false;
        };
        let tail: Vec<&str> = parts.collect();
        let Some((last, middle)) = tail.split_last() else {
            // No `*` at all: exact match.
            return rest.is_empty();
        };
        for part in middle {
            match rest.find(part) {
                Some(pos) => rest = &rest[pos + part.len()..],
                None => return false,
            }
        }
        rest.len() >= last.len() && rest.ends_with(last)
    }
}

/// A predicate deciding whether a candidate claims a hierarchy.
#[derive(Clone)]
pub enum Matcher {
    /// Some IP inside has exactly this type identifier.
    ExactType(String),
    /// Some IP inside has a type matching the pattern.
    Pattern(TypePattern),
    /// Every inner matcher accepts.
    AllOf(Vec<Matcher>),
    /// A host-supplied predicate.
    Custom(Arc<dyn Fn(&HierarchySummary) -> bool + Send + Sync>),
}

impl Matcher {
    /// Evaluates the matcher against a hierarchy.
    pub fn matches(&self, summary: &HierarchySummary) -> bool {
        match self {
            Matcher::ExactType(ty) => summary.ip_types.iter().any(|t| t == ty),
            Matcher::Pattern(pattern) => summary.ip_types.iter().any(|t| pattern.matches(t)),
            Matcher::AllOf(all) => all.iter().all(|m| m.matches(summary)),
            Matcher::Custom(predicate) => predicate(summary),
        }
    }

    /// Parses a requirement from configuration. Entries containing `*` are
    /// patterns, everything else is an exact type.
    pub fn requirement(text: &str) -> Self {
        if text.contains('*') {
            Matcher::Pattern(TypePattern::new(text))
        } else {
            Matcher::ExactType(text.to_string())
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::ExactType(ty) => f.debug_tuple("ExactType").field(ty).finish(),
            Matcher::Pattern(p) => f.debug_tuple("Pattern").field(&p.as_str()).finish(),
            Matcher::AllOf(all) => f.debug_tuple("AllOf").field(all).finish(),
            Matcher::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A hierarchy driver with the matcher that selects it.
#[derive(Debug, Clone)]
pub struct HierarchyCandidate {
    /// The driver bound on a match.
    pub driver: DriverName,
    /// Decides whether the candidate applies.
    pub matcher: Matcher,
}

/// The prioritized hierarchy driver candidates plus the fallback.
#[derive(Debug, Clone)]
pub struct HierarchyDrivers {
    candidates: Vec<HierarchyCandidate>,
    default: DriverName,
}

impl HierarchyDrivers {
    /// Creates an empty candidate list with the given fallback.
    pub fn new(default: impl Into<DriverName>) -> Self {
        Self {
            candidates: Vec::new(),
            default: default.into(),
        }
    }

    /// Builds the candidates from `[drivers]` configuration, preserving
    /// declaration order.
    pub fn from_config(config: &DriverConfig) -> Self {
        let mut drivers = Self::new(config.default_hierarchy.as_str());
        for spec in &config.hierarchy {
            let matcher = Matcher::AllOf(spec.requires.iter().map(|r| Matcher::requirement(r)).collect());
            drivers.push(spec.driver.as_str(), matcher);
        }
        drivers
    }

    /// Appends a candidate with the lowest priority so far.
    pub fn push(&mut self, driver: impl Into<DriverName>, matcher: Matcher) {
        self.candidates.push(HierarchyCandidate {
            driver: driver.into(),
            matcher,
        });
    }

    /// The fallback driver.
    pub fn default_driver(&self) -> &DriverName {
        &self.default
    }

    /// The candidates in priority order.
    pub fn candidates(&self) -> &[HierarchyCandidate] {
        &self.candidates
    }

    /// Picks the driver for a hierarchy: the first matching candidate, else
    /// the default.
    pub fn select(&self, summary: &HierarchySummary) -> &DriverName {
        self.candidates
            .iter()
            .find(|c| c.matcher.matches(summary))
            .map(|c| &c.driver)
            .unwrap_or(&self.default)
    }
}
