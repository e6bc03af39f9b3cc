//! Scene document model.
//!
//! A scene document is a JSON object holding per-category entity lists plus
//! resource collections (custom materials). There is no formal schema:
//! relationships between entities are encoded as string-keyed fields that
//! this module interprets by convention. Everything it does not interpret is
//! carried through transforms verbatim.

pub mod index;

pub use index::{EntityHandle, EntityIndex};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, SceneDocError};

/// Wire-format member names of the scene document.
///
/// These are external format constants. They are spelled exactly as the
/// consuming application writes them (including the irregular casing of
/// `characterGUId`).
pub(crate) mod keys {
    pub const GUID: &str = "guid";
    pub const PARENT: &str = "parent";
    pub const LABEL: &str = "label";
    pub const CHILD_INDEX: &str = "childIndex";
    pub const SETTINGS: &str = "settings";
    pub const STRING_SETTINGS: &str = "stringSettings";
    pub const CUSTOM_MATERIALS: &str = "customMaterials";
    pub const MATERIAL_NAME: &str = "name";
    pub const IS_PLAYER: &str = "bIsPlayer";
    pub const CHARACTER_GUID: &str = "characterGUId";
    pub const CHARACTER_GUIDS: &str = "characterGUIds";
    pub const POSITION: &str = "position";
    pub const ROTATION: &str = "rotation";
    pub const SCALE: &str = "scale";
}

/// Entity category.
///
/// Every entity belongs to exactly one category, stored under the matching
/// top-level collection. `Prop` is special: a prop can own other entities as
/// a relay point, but it never appears as a node in the reconstructed
/// hierarchy (see [`crate::ops::hierarchy`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Composite-sequence entities (`sexScenes` collection).
    #[serde(rename = "sexScenes")]
    SexScene,
    /// Prop entities (`props` collection), pass-through in the hierarchy.
    #[serde(rename = "props")]
    Prop,
    /// Character entities (`characters` collection).
    #[serde(rename = "characters")]
    Character,
    /// Pose entities (`poses` collection).
    #[serde(rename = "poses")]
    Pose,
}

impl Category {
    /// All categories, in the fixed scan order used by every lookup.
    pub const ALL: [Category; 4] = [
        Category::SexScene,
        Category::Prop,
        Category::Character,
        Category::Pose,
    ];

    /// Top-level collection key holding this category's entity list.
    #[inline]
    #[must_use]
    pub fn collection_key(self) -> &'static str {
        match self {
            Category::SexScene => "sexScenes",
            Category::Prop => "props",
            Category::Character => "characters",
            Category::Pose => "poses",
        }
    }
}

/// A parsed scene document.
///
/// Wraps the raw JSON object. Unknown top-level members and unknown entity
/// members pass through every transform untouched; a clone of a `Document`
/// is a fully independent deep copy, which is what the transforms operate
/// on — caller-owned input is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    root: Map<String, Value>,
}

impl Document {
    /// Wraps an already-parsed JSON value.
    ///
    /// The only structural requirement is that the root is an object; entity
    /// lists and their contents are not validated.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(SceneDocError::NotAnObject),
        }
    }

    /// Parses a document from JSON text.
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Consumes the document, returning the raw JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Raw access to a top-level member.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Entities of one category. An absent collection reads as empty.
    #[must_use]
    pub fn entities(&self, category: Category) -> &[Value] {
        self.root
            .get(category.collection_key())
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    pub(crate) fn entities_mut(&mut self, category: Category) -> Option<&mut Vec<Value>> {
        self.root
            .get_mut(category.collection_key())
            .and_then(Value::as_array_mut)
    }

    pub(crate) fn root_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.root
    }

    /// Finds an entity by guid, scanning categories in the fixed order.
    ///
    /// When two entities share a guid the first one in scan order wins here
    /// (the [`EntityIndex`] resolves duplicates the other way around — the
    /// source data is expected to keep guids unique).
    #[must_use]
    pub fn find_entity(&self, guid: &str) -> Option<&Map<String, Value>> {
        Category::ALL.iter().find_map(|&category| {
            self.entities(category).iter().find_map(|entity| {
                let object = entity.as_object()?;
                (object.get(keys::GUID).and_then(Value::as_str) == Some(guid)).then_some(object)
            })
        })
    }

    pub(crate) fn locate_entity(&self, guid: &str) -> Option<(Category, usize)> {
        Category::ALL.iter().find_map(|&category| {
            self.entities(category)
                .iter()
                .position(|entity| entity.get(keys::GUID).and_then(Value::as_str) == Some(guid))
                .map(|slot| (category, slot))
        })
    }

    /// Replaces the full body of the entity identified by `guid`, keeping
    /// its slot (category and list position).
    pub(crate) fn replace_entity(&mut self, guid: &str, body: Map<String, Value>) -> Result<()> {
        let (category, slot) = self
            .locate_entity(guid)
            .ok_or_else(|| SceneDocError::EntityNotFound(guid.to_owned()))?;
        // locate_entity found the slot inside an array, so entities_mut is Some
        if let Some(list) = self.entities_mut(category) {
            list[slot] = Value::Object(body);
        }
        Ok(())
    }
}
