//! Scene document operations.
//!
//! Each operation is a pure function from document to document (or to a
//! derived structure). Inputs are deep-copied before any edit; there is no
//! shared state between invocations.
//!
//! - [`hierarchy`]: reconstruct the character hierarchy forest
//! - [`swap`]: exchange two entities' spatial placement and ownership
//! - [`references`]: rewrite tracked guid reference fields
//! - [`materials`]: prune unreferenced custom materials

pub mod hierarchy;
pub mod materials;
pub mod references;
pub mod swap;

pub use hierarchy::{HierarchyNode, character_hierarchy};
pub use materials::{remove_unused_materials, used_material_names};
pub use references::rewrite_character_references;
pub use swap::swap_characters;
