//! The dictionary-shaped container every view is materialized into.

use ovl_common::{MetadataError, MetadataResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A materialized view: entries keyed by name, in key order.
///
/// Entries are shared through [`Rc`] so that composite views (the hierarchy
/// view) can refer to the very same record from several places. A view is
/// either read only, or carries a view-local `state` per entry that callers
/// may set. State never flows back into the design.
#[derive(Debug, Clone)]
pub struct ViewDict<E> {
    kind: &'static str,
    entries: BTreeMap<String, Rc<E>>,
    state: Option<BTreeMap<String, Value>>,
}

impl<E> ViewDict<E> {
    /// Creates a view that rejects [`set`](Self::set).
    pub fn read_only(kind: &'static str, entries: BTreeMap<String, Rc<E>>) -> Self {
        Self {
            kind,
            entries,
            state: None,
        }
    }

    /// Creates a view whose entries carry settable state.
    pub fn with_state(kind: &'static str, entries: BTreeMap<String, Rc<E>>) -> Self {
        Self {
            kind,
            entries,
            state: Some(BTreeMap::new()),
        }
    }

    /// The view's name, e.g. `ip view`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the view has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(key, entry)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<E>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Looks up an entry.
    pub fn get(&self, key: &str) -> Option<&Rc<E>> {
        self.entries.get(key)
    }

    /// Looks up an entry, failing with [`MetadataError::Lookup`].
    pub fn entry(&self, key: &str) -> MetadataResult<&Rc<E>> {
        self.entries
            .get(key)
            .ok_or_else(|| MetadataError::lookup(self.kind, key))
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns `true` if [`set`](Self::set) is supported.
    pub fn is_writable(&self) -> bool {
        self.state.is_some()
    }

    /// Sets the view-local state of an entry.
    ///
    /// Read-only views fail with [`MetadataError::UnsupportedOperation`];
    /// unknown keys fail with [`MetadataError::Lookup`].
    pub fn set(&mut self, key: &str, value: Value) -> MetadataResult<()> {
        let kind = self.kind;
        let Some(state) = self.state.as_mut() else {
            return Err(MetadataError::UnsupportedOperation { view: kind });
        };
        if !self.entries.contains_key(key) {
            return Err(MetadataError::lookup(kind, key));
        }
        state.insert(key.to_string(), value);
        Ok(())
    }

    /// The state last set for an entry.
    pub fn state(&self, key: &str) -> Option<&Value> {
        self.state.as_ref()?.get(key)
    }
}

impl<E: Serialize> ViewDict<E> {
    /// Projects the view to JSON: one object per key, with the entry's
    /// view-local `state` filled in on writable views.
    pub fn to_json(&self) -> MetadataResult<Value> {
        let mut out = serde_json::Map::new();
        for (key, entry) in &self.entries {
            let mut value = serde_json::to_value(entry.as_ref()).map_err(|e| MetadataError::Format {
                subject: key.clone(),
                reason: e.to_string(),
            })?;
            if let (Some(state), Value::Object(fields)) = (&self.state, &mut value) {
                fields.insert(
                    "state".to_string(),
                    state.get(key).cloned().unwrap_or(Value::Null),
                );
            }
            out.insert(key.clone(), value);
        }
        Ok(Value::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize)]
    struct Entry {
        index: u32,
    }

    fn entries() -> BTreeMap<String, Rc<Entry>> {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Rc::new(Entry { index: 1 }));
        map.insert("a".to_string(), Rc::new(Entry { index: 0 }));
        map
    }

    #[test]
    fn keys_are_ordered() {
        let view = ViewDict::read_only("test view", entries());
        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(view.len(), 2);
        assert!(view.contains_key("a"));
        assert_eq!(view.get("b").unwrap().index, 1);
    }

    #[test]
    fn read_only_rejects_set() {
        let mut view = ViewDict::read_only("ip view", entries());
        assert_eq!(
            view.set("a", json!("on")),
            Err(MetadataError::UnsupportedOperation { view: "ip view" })
        );
        assert!(!view.is_writable());
    }

    #[test]
    fn state_is_view_local() {
        let mut view = ViewDict::with_state("gpio view", entries());
        view.set("a", json!(1)).unwrap();
        assert_eq!(view.state("a"), Some(&json!(1)));
        assert!(view.state("b").is_none());

        let fresh = ViewDict::with_state("gpio view", entries());
        assert!(fresh.state("a").is_none());
    }

    #[test]
    fn set_unknown_key_is_lookup_error() {
        let mut view = ViewDict::with_state("gpio view", entries());
        assert!(matches!(
            view.set("zz", json!(0)),
            Err(MetadataError::Lookup { .. })
        ));
    }

    #[test]
    fn json_projection_includes_state() {
        let mut view = ViewDict::with_state("gpio view", entries());
        view.set("b", json!("high")).unwrap();
        assert_eq!(
            view.to_json().unwrap(),
            json!({ "a": { "index": 0, "state": null }, "b": { "index": 1, "state": "high" } })
        );
        let ro = ViewDict::read_only("ip view", entries());
        assert_eq!(ro.to_json().unwrap(), json!({ "a": { "index": 0 }, "b": { "index": 1 } }));
    }

    #[test]
    fn entry_lookup_error_names_view() {
        let view = ViewDict::read_only("memory view", entries());
        let err = view.entry("missing").unwrap_err();
        assert_eq!(err.to_string(), "memory view `missing` not found");
    }
}
