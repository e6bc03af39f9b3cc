//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`SceneDocError`] covers all failure modes including:
//! - Structurally unusable documents
//! - Entity lookups that fail to resolve
//! - Cyclic parent chains detected during hierarchy reconstruction
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, SceneDocError>`.
//!
//! Note that dangling references (a reference field naming a guid that does
//! not exist) are *not* errors: rewrites and lookups treat them as silent
//! no-ops, matching how consuming applications tolerate them.

use thiserror::Error;

/// The main error type for scene document transformations.
///
/// Each variant provides specific context about what went wrong. No
/// transform performs a partial write: an operation either returns a
/// complete new document or fails before producing one.
#[derive(Error, Debug)]
pub enum SceneDocError {
    // ========================================================================
    // Document Errors
    // ========================================================================
    /// The value handed to [`Document::from_value`](crate::Document::from_value)
    /// was not a JSON object.
    #[error("Scene document root must be a JSON object")]
    NotAnObject,

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ========================================================================
    // Entity Graph Errors
    // ========================================================================
    /// A guid required by an operation does not resolve to any entity.
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// A `parent` chain revisited an entity while walking ancestors.
    /// The payload is the guid of the first entity seen twice.
    #[error("Cyclic parent chain detected at entity: {0}")]
    CyclicParentChain(String),
}

/// Alias for `Result<T, SceneDocError>`.
pub type Result<T> = std::result::Result<T, SceneDocError>;
