//! Custom material pruning.
//!
//! Materials are not referenced by guid: an entity's `stringSettings` block
//! names them by convention, through any key whose lowercase form contains
//! `material`. Pruning keeps exactly the `customMaterials` records whose
//! `name` some entity references this way.

use log::debug;
use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::document::{Category, Document, keys};

const MATERIAL_KEY_MARKER: &str = "material";

/// Collects every material name referenced from some entity's string
/// settings, across all categories. Empty values are not references.
#[must_use]
pub fn used_material_names(document: &Document) -> FxHashSet<String> {
    let mut used = FxHashSet::default();

    for category in Category::ALL {
        for entity in document.entities(category) {
            let Some(settings) = entity
                .get(keys::STRING_SETTINGS)
                .and_then(Value::as_object)
            else {
                continue;
            };
            for (key, value) in settings {
                if !key.to_lowercase().contains(MATERIAL_KEY_MARKER) {
                    continue;
                }
                if let Some(name) = value.as_str()
                    && !name.is_empty()
                {
                    used.insert(name.to_owned());
                }
            }
        }
    }

    used
}

/// Drops every custom material record whose name is never referenced.
///
/// Record order is preserved; a document without a `customMaterials`
/// collection passes through unchanged. The input is deep-copied, never
/// mutated.
#[must_use]
pub fn remove_unused_materials(document: &Document) -> Document {
    let used = used_material_names(document);
    let mut result = document.clone();

    if let Some(materials) = result
        .root_mut()
        .get_mut(keys::CUSTOM_MATERIALS)
        .and_then(Value::as_array_mut)
    {
        let before = materials.len();
        materials.retain(|material| {
            material
                .get(keys::MATERIAL_NAME)
                .and_then(Value::as_str)
                .is_some_and(|name| used.contains(name))
        });
        debug!("pruned {} unused custom materials", before - materials.len());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collects_names_from_material_keys_only() {
        let doc = Document::from_value(json!({
            "props": [{
                "guid": "o1",
                "stringSettings": {
                    "DiffuseMaterial": "wood",
                    "trimMaterialName": "",
                    "Note": "metal",
                },
            }],
            "characters": [{
                "guid": "c1",
                "stringSettings": { "skinMaterial": "glass" },
            }],
        }))
        .unwrap();

        let used = used_material_names(&doc);
        assert_eq!(used.len(), 2);
        assert!(used.contains("wood"));
        assert!(used.contains("glass"));
    }

    #[test]
    fn absent_collection_stays_absent() {
        let doc = Document::from_value(json!({
            "props": [{ "guid": "o1" }],
        }))
        .unwrap();

        let out = remove_unused_materials(&doc);
        assert!(out.get("customMaterials").is_none());
    }

    #[test]
    fn nameless_records_are_dropped() {
        let doc = Document::from_value(json!({
            "props": [{ "guid": "o1", "stringSettings": { "material": "wood" } }],
            "customMaterials": [{ "name": "wood" }, { "shader": "pbr" }],
        }))
        .unwrap();

        let out = remove_unused_materials(&doc);
        assert_eq!(out.get("customMaterials"), Some(&json!([{ "name": "wood" }])));
    }
}
