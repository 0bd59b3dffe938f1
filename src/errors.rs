//! Error Types
//!
//! This module defines the error types used throughout the runtime.
//!
//! # Overview
//!
//! The main error type [`InkError`] covers all failure modes including:
//! - Malformed or structurally wrong entity documents
//! - Lookups of skins, animations or entities that do not exist
//! - Document I/O and texture preloading failures
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, InkError>`.
//!
//! ```rust,ignore
//! use ink_animator::errors::{InkError, Result};
//!
//! fn run_idle(entity: &mut Entity) -> Result<()> {
//!     entity.run_forever("Idle")
//! }
//! ```

use std::fmt;

use thiserror::Error;

/// The kind of named resource a lookup was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Entity,
    Skin,
    Animation,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Entity => f.write_str("entity"),
            ResourceKind::Skin => f.write_str("skin"),
            ResourceKind::Animation => f.write_str("animation"),
        }
    }
}

/// The main error type for the animation runtime.
///
/// Parsing errors are never recovered locally: they abort construction of
/// the entity, animation or skin being built and reach the caller as-is.
#[derive(Error, Debug)]
pub enum InkError {
    // ========================================================================
    // Document Errors
    // ========================================================================
    /// A required element or attribute is missing or cannot be parsed.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// An element is present but carries the wrong tag.
    #[error("Structural mismatch: expected <{expected}> element, found <{found}>")]
    StructuralMismatch {
        /// The tag that was required at this position
        expected: String,
        /// The tag that was actually found
        found: String,
    },

    /// The document text is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// The requested skin, animation or entity does not exist.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What kind of resource was requested
        kind: ResourceKind,
        /// The requested name
        name: String,
    },

    // ========================================================================
    // I/O & Preload Errors
    // ========================================================================
    /// Document I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The host texture system failed to preload a texture.
    #[error("Texture preload error: {0}")]
    TexturePreload(String),

    /// A pending preload was cancelled before it completed.
    #[error("Preload cancelled: {0}")]
    PreloadCancelled(String),
}

impl InkError {
    /// Shorthand for a [`InkError::NotFound`] error.
    pub fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        InkError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Shorthand for a [`InkError::MalformedDocument`] error.
    pub fn malformed(message: impl Into<String>) -> Self {
        InkError::MalformedDocument(message.into())
    }
}

/// Alias for `Result<T, InkError>`.
pub type Result<T> = std::result::Result<T, InkError>;
