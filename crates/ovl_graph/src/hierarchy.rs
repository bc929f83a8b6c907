//! Hierarchy nodes: named grouping levels of the design.

use crate::ids::{CoreId, HierarchyId};
use ovl_common::Ident;

/// A grouping level owning cores and child hierarchies.
///
/// The design root is a hierarchy with an empty name and path.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    /// This hierarchy's ID.
    pub id: HierarchyId,
    /// Local name within the parent.
    pub name: Ident,
    /// The enclosing hierarchy, `None` for the root.
    pub parent: Option<HierarchyId>,
    /// Slash-separated path from the root, e.g. `video/hdmi_in`.
    pub path: String,
    /// Cores directly inside this hierarchy, in creation order.
    pub cores: Vec<CoreId>,
    /// Child hierarchies, in creation order.
    pub children: Vec<HierarchyId>,
}

impl Hierarchy {
    /// Returns `true` for the design root.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Joins a child name onto this hierarchy's path.
    pub fn child_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.path, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hier(path: &str, parent: Option<HierarchyId>) -> Hierarchy {
        Hierarchy {
            id: HierarchyId::from_raw(0),
            name: Ident::from_raw(0),
            parent,
            path: path.to_string(),
            cores: Vec::new(),
            children: Vec::new(),
        }
    }

    #[test]
    fn root_child_path_has_no_separator() {
        let root = hier("", None);
        assert!(root.is_root());
        assert_eq!(root.child_path("video"), "video");
    }

    #[test]
    fn nested_child_path() {
        let h = hier("video", Some(HierarchyId::from_raw(0)));
        assert!(!h.is_root());
        assert_eq!(h.child_path("hdmi_in"), "video/hdmi_in");
    }
}
