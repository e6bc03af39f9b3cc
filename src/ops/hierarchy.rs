//! 角色层级重建 (Character Hierarchy)
//!
//! 从扁平的实体列表重建显式的父子层级。props 类别是"透传"节点：
//! 它可以在原始图里作为父级中转，但不会出现在重建出的层级中。
//!
//! 层级是派生结构，源文档不会被修改。

use log::debug;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::document::{Category, Document, EntityHandle, EntityIndex};
use crate::errors::Result;

/// A hierarchy node: an entity handle plus its ordered, deduplicated
/// child list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    /// The entity this node stands for.
    #[serde(flatten)]
    pub handle: EntityHandle,
    /// Child nodes, in attachment order. Serialized under `nodes` and
    /// omitted when empty, matching the consuming application.
    #[serde(rename = "nodes", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HierarchyNode>,
}

/// 重建角色层级森林。
///
/// 算法分两步：
/// 1. 对每个 character，解析它的第一个非 prop 祖先并挂接到其下，
///    然后把该祖先继续向上挂接，直到根为止。
/// 2. 收集所有非 prop、且自身没有非 prop 祖先的实体作为森林的根
///    （包括第一步没有触及的实体和没有祖先的 character）。
///
/// 挂接顺序遵循索引的确定性顺序（类别序，再列表序）；子节点列表按
/// 插入序去重。父链出现环时返回
/// [`SceneDocError::CyclicParentChain`](crate::SceneDocError::CyclicParentChain)。
pub fn character_hierarchy(document: &Document) -> Result<Vec<HierarchyNode>> {
    let index = EntityIndex::build(document);

    // guid -> 已挂接的子节点 guid（插入序，去重）
    let mut children: FxHashMap<&str, Vec<&str>> = FxHashMap::default();

    for handle in &index {
        if handle.category != Category::Character {
            continue;
        }
        // 逐级向上挂接：character -> 祖先 -> 祖先的祖先 -> ...
        let mut current = handle;
        while let Some(ancestor) = index.first_non_prop_ancestor(&current.guid)? {
            attach(&mut children, ancestor.guid.as_str(), current.guid.as_str());
            current = ancestor;
        }
    }

    let mut roots = Vec::new();
    for handle in &index {
        if handle.category != Category::Prop
            && index.first_non_prop_ancestor(&handle.guid)?.is_none()
        {
            roots.push(materialize(&index, &children, handle));
        }
    }

    debug!("character hierarchy: {} roots", roots.len());
    Ok(roots)
}

fn attach<'a>(children: &mut FxHashMap<&'a str, Vec<&'a str>>, parent: &'a str, child: &'a str) {
    let list = children.entry(parent).or_default();
    if !list.contains(&child) {
        list.push(child);
    }
}

fn materialize(
    index: &EntityIndex,
    children: &FxHashMap<&str, Vec<&str>>,
    handle: &EntityHandle,
) -> HierarchyNode {
    let child_nodes = children
        .get(handle.guid.as_str())
        .map(|guids| {
            guids
                .iter()
                .filter_map(|&guid| index.get(guid))
                .map(|child| materialize(index, children, child))
                .collect()
        })
        .unwrap_or_default();

    HierarchyNode {
        handle: handle.clone(),
        children: child_nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shared_ancestor_attaches_once() {
        // kid 和 kid2 的向上挂接都会经过 mid -> top；mid 只能在 top
        // 下出现一次
        let doc = Document::from_value(json!({
            "props": [{ "guid": "relay", "parent": "mid" }],
            "characters": [
                { "guid": "top" },
                { "guid": "mid", "parent": "top" },
                { "guid": "kid", "parent": "relay" },
                { "guid": "kid2", "parent": "relay" },
            ],
        }))
        .unwrap();

        let roots = character_hierarchy(&doc).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].handle.guid, "top");

        let mids: Vec<&str> = roots[0]
            .children
            .iter()
            .map(|n| n.handle.guid.as_str())
            .collect();
        assert_eq!(mids, ["mid"]);

        let kids: Vec<&str> = roots[0].children[0]
            .children
            .iter()
            .map(|n| n.handle.guid.as_str())
            .collect();
        assert_eq!(kids, ["kid", "kid2"]);
    }

    #[test]
    fn empty_document_has_no_roots() {
        let doc = Document::from_value(json!({})).unwrap();
        assert!(character_hierarchy(&doc).unwrap().is_empty());
    }
}
