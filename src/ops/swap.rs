//! 实体交换 (Entity Swap)
//!
//! 交换两个实体的空间摆位与归属：变换、父级、玩家标记互换，其余字段
//! （guid、settings、label 等）随实体本体保留。文档里所有指向这两个
//! guid 的引用字段随之互换，使 pose / 序列跟随角色的新位置。

use log::debug;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::document::{Document, keys};
use crate::errors::{Result, SceneDocError};
use crate::ops::references::rewrite_character_references;

/// 交换分类：列出的字段在两个实体之间互换，没列出的随实体保留。
const SWAPPED_FIELDS: [&str; 5] = [
    keys::POSITION,
    keys::ROTATION,
    keys::SCALE,
    keys::PARENT,
    keys::IS_PLAYER,
];

/// 从实体本体取出参与互换的字段（深拷贝，缺失字段记为 None）。
fn swapped_slice(entity: &Map<String, Value>) -> Vec<(&'static str, Option<Value>)> {
    SWAPPED_FIELDS
        .iter()
        .map(|&key| (key, entity.get(key).cloned()))
        .collect()
}

/// 把互换字段写进本体；来源侧缺失的字段在目标侧同样移除。
fn apply_slice(body: &mut Map<String, Value>, slice: Vec<(&'static str, Option<Value>)>) {
    for (key, value) in slice {
        match value {
            Some(value) => {
                body.insert(key.to_owned(), value);
            }
            None => {
                body.remove(key);
            }
        }
    }
}

/// Swaps two entities' spatial placement and ownership.
///
/// Both guids must resolve, otherwise
/// [`SceneDocError::EntityNotFound`] is returned and no document is
/// produced. Swapping a guid with itself returns a plain deep copy.
///
/// 完成本体替换后，引用重写以 {a→b, b→a} 映射运行一次，
/// 让 pose / 序列引用跟随交换后的身份。
pub fn swap_characters(document: &Document, guid_a: &str, guid_b: &str) -> Result<Document> {
    let mut result = document.clone();

    let original_a = result
        .find_entity(guid_a)
        .cloned()
        .ok_or_else(|| SceneDocError::EntityNotFound(guid_a.to_owned()))?;
    let original_b = result
        .find_entity(guid_b)
        .cloned()
        .ok_or_else(|| SceneDocError::EntityNotFound(guid_b.to_owned()))?;

    // 1. 各自保留本体，互换空间与归属字段
    let mut body_a = original_a.clone();
    apply_slice(&mut body_a, swapped_slice(&original_b));
    let mut body_b = original_b;
    apply_slice(&mut body_b, swapped_slice(&original_a));

    // 2. 原位替换（类别和列表位置不变）
    result.replace_entity(guid_a, body_a)?;
    result.replace_entity(guid_b, body_b)?;

    // 3. 引用跟随身份互换
    let mut replacements = FxHashMap::default();
    replacements.insert(guid_a.to_owned(), guid_b.to_owned());
    replacements.insert(guid_b.to_owned(), guid_a.to_owned());
    let result = rewrite_character_references(&result, &replacements);

    debug!("swapped entities {guid_a} <-> {guid_b}");
    Ok(result)
}
