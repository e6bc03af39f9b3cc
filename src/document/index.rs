//! Entity handles and the guid index.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::document::{Category, Document, keys};
use crate::errors::{Result, SceneDocError};

/// A lightweight projection of one entity, used for hierarchy computation.
///
/// Handles are derived from the document and never written back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityHandle {
    /// Category the entity was found under.
    pub category: Category,
    /// Document-wide unique identifier.
    pub guid: String,
    /// Guid of the owning entity, `None` for roots.
    pub parent: Option<String>,
    /// Display label.
    pub label: Option<String>,
    /// Sibling index among the parent's children.
    pub child_index: Option<i64>,
}

impl EntityHandle {
    /// Projects a raw entity object. Entities without a string `guid`
    /// cannot be addressed and yield `None`.
    fn from_entity(category: Category, entity: &Map<String, Value>) -> Option<Self> {
        let guid = entity.get(keys::GUID)?.as_str()?.to_owned();
        Some(Self {
            category,
            guid,
            parent: entity
                .get(keys::PARENT)
                .and_then(Value::as_str)
                .map(str::to_owned),
            label: entity
                .get(keys::LABEL)
                .and_then(Value::as_str)
                .map(str::to_owned),
            child_index: entity.get(keys::CHILD_INDEX).and_then(Value::as_i64),
        })
    }
}

/// Guid → [`EntityHandle`] lookup over all four entity categories.
///
/// Iteration order is deterministic: category scan order, then list order.
/// Duplicate guids are not validated — the later entry overwrites the mapped
/// handle while keeping the first occurrence's iteration position.
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    handles: Vec<EntityHandle>,
    by_guid: FxHashMap<String, usize>,
}

impl EntityIndex {
    /// Scans the document and builds the index. The document is not mutated.
    #[must_use]
    pub fn build(document: &Document) -> Self {
        let mut index = Self::default();
        for category in Category::ALL {
            for entity in document.entities(category) {
                let Some(object) = entity.as_object() else {
                    continue;
                };
                let Some(handle) = EntityHandle::from_entity(category, object) else {
                    continue;
                };
                index.insert(handle);
            }
        }
        index
    }

    fn insert(&mut self, handle: EntityHandle) {
        if let Some(&slot) = self.by_guid.get(&handle.guid) {
            self.handles[slot] = handle;
        } else {
            self.by_guid.insert(handle.guid.clone(), self.handles.len());
            self.handles.push(handle);
        }
    }

    /// Looks up a handle by guid.
    #[must_use]
    pub fn get(&self, guid: &str) -> Option<&EntityHandle> {
        self.by_guid.get(guid).map(|&slot| &self.handles[slot])
    }

    /// Iterates handles in category-then-list order.
    pub fn iter(&self) -> std::slice::Iter<'_, EntityHandle> {
        self.handles.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Resolves the first ancestor of `guid` that is not a prop.
    ///
    /// Walks `parent` guids upward, skipping prop relays. Returns `None`
    /// when the chain ends before reaching a non-prop entity (missing
    /// parent, dangling parent guid, or unknown starting guid) — the
    /// starting entity is then a hierarchy root.
    ///
    /// A chain that revisits an entity fails with
    /// [`SceneDocError::CyclicParentChain`] instead of walking forever.
    pub fn first_non_prop_ancestor(&self, guid: &str) -> Result<Option<&EntityHandle>> {
        let Some(mut current) = self.get(guid) else {
            return Ok(None);
        };
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        visited.insert(current.guid.as_str());

        loop {
            let Some(parent_guid) = current.parent.as_deref() else {
                return Ok(None);
            };
            let Some(parent) = self.get(parent_guid) else {
                return Ok(None);
            };
            if !visited.insert(parent.guid.as_str()) {
                return Err(SceneDocError::CyclicParentChain(parent.guid.clone()));
            }
            if parent.category != Category::Prop {
                return Ok(Some(parent));
            }
            current = parent;
        }
    }
}

impl<'a> IntoIterator for &'a EntityIndex {
    type Item = &'a EntityHandle;
    type IntoIter = std::slice::Iter<'a, EntityHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn index_covers_all_categories_in_scan_order() {
        let doc = doc(json!({
            "poses": [{ "guid": "p1" }],
            "characters": [{ "guid": "c1" }],
            "props": [{ "guid": "o1" }],
            "sexScenes": [{ "guid": "s1" }],
        }));

        let index = EntityIndex::build(&doc);
        let order: Vec<&str> = index.iter().map(|h| h.guid.as_str()).collect();
        assert_eq!(order, ["s1", "o1", "c1", "p1"]);
        assert_eq!(index.get("c1").unwrap().category, Category::Character);
    }

    #[test]
    fn duplicate_guid_last_writer_wins_first_position_kept() {
        let doc = doc(json!({
            "props": [{ "guid": "dup", "label": "prop" }, { "guid": "solo" }],
            "characters": [{ "guid": "dup", "label": "char" }],
        }));

        let index = EntityIndex::build(&doc);
        // mapped value comes from the later category...
        let handle = index.get("dup").unwrap();
        assert_eq!(handle.category, Category::Character);
        assert_eq!(handle.label.as_deref(), Some("char"));
        // ...but the iteration slot is the first occurrence's
        let order: Vec<&str> = index.iter().map(|h| h.guid.as_str()).collect();
        assert_eq!(order, ["dup", "solo"]);
    }

    #[test]
    fn skips_entities_without_guid() {
        let doc = doc(json!({
            "characters": [{ "label": "anonymous" }, { "guid": "c1" }, 42],
        }));
        let index = EntityIndex::build(&doc);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn ancestor_walk_skips_props() {
        let doc = doc(json!({
            "props": [
                { "guid": "table", "parent": "alice" },
                { "guid": "cup", "parent": "table" },
            ],
            "characters": [
                { "guid": "alice" },
                { "guid": "bob", "parent": "cup" },
            ],
        }));

        let index = EntityIndex::build(&doc);
        let ancestor = index.first_non_prop_ancestor("bob").unwrap().unwrap();
        assert_eq!(ancestor.guid, "alice");
        assert!(index.first_non_prop_ancestor("alice").unwrap().is_none());
    }

    #[test]
    fn dangling_parent_reads_as_root() {
        let doc = doc(json!({
            "characters": [{ "guid": "c1", "parent": "gone" }],
        }));
        let index = EntityIndex::build(&doc);
        assert!(index.first_non_prop_ancestor("c1").unwrap().is_none());
    }

    #[test]
    fn parent_cycle_is_an_error() {
        let doc = doc(json!({
            "props": [
                { "guid": "a", "parent": "b" },
                { "guid": "b", "parent": "a" },
            ],
            "characters": [{ "guid": "c1", "parent": "a" }],
        }));

        let index = EntityIndex::build(&doc);
        let err = index.first_non_prop_ancestor("c1").unwrap_err();
        assert!(matches!(err, SceneDocError::CyclicParentChain(guid) if guid == "a"));
    }
}
