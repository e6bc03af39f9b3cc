//! Tracked guid reference fields.
//!
//! Besides the structural `parent` pointer, entities reference each other
//! through named settings fields: a pose names its controlling character,
//! a composite sequence lists its participants. [`REFERENCE_FIELDS`] is the
//! exhaustive table of those fields; anything not listed there is never
//! rewritten.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::document::{Category, Document, keys};

/// Arity of a tracked reference field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceArity {
    /// The settings value is a single guid string.
    Single,
    /// The settings value is an array of guid strings.
    Array,
}

/// One tracked reference field inside an entity's `settings` block.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceField {
    pub category: Category,
    pub key: &'static str,
    pub arity: ReferenceArity,
}

/// Every settings field that carries entity guids, by category.
pub const REFERENCE_FIELDS: &[ReferenceField] = &[
    ReferenceField {
        category: Category::Pose,
        key: keys::CHARACTER_GUID,
        arity: ReferenceArity::Single,
    },
    ReferenceField {
        category: Category::SexScene,
        key: keys::CHARACTER_GUIDS,
        arity: ReferenceArity::Array,
    },
];

/// Rewrites every tracked reference according to `replacements`.
///
/// Values that are not mapping keys are left unchanged, so dangling
/// references pass through untouched. Array fields keep their length and
/// order; only element values change. The input document is deep-copied,
/// never mutated; entities missing a `settings` block (or the field) are
/// skipped.
#[must_use]
pub fn rewrite_character_references(
    document: &Document,
    replacements: &FxHashMap<String, String>,
) -> Document {
    let mut result = document.clone();

    for field in REFERENCE_FIELDS {
        let Some(entities) = result.entities_mut(field.category) else {
            continue;
        };
        for entity in entities.iter_mut() {
            let Some(settings) = entity.get_mut(keys::SETTINGS).and_then(Value::as_object_mut)
            else {
                continue;
            };
            let Some(value) = settings.get_mut(field.key) else {
                continue;
            };
            match field.arity {
                ReferenceArity::Single => rewrite_guid(value, replacements),
                ReferenceArity::Array => {
                    if let Some(items) = value.as_array_mut() {
                        for item in items {
                            rewrite_guid(item, replacements);
                        }
                    }
                }
            }
        }
    }

    result
}

fn rewrite_guid(value: &mut Value, replacements: &FxHashMap<String, String>) {
    if let Some(guid) = value.as_str()
        && let Some(target) = replacements.get(guid)
    {
        *value = Value::String(target.clone());
    }
}
