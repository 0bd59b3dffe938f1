//! Loader Settings
//!
//! Configuration consumed when an [`Entity`](crate::entity::Entity) is built
//! from a document.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ink_animator::settings::LoaderSettings;
//!
//! // Default: `{name}.xml`, first authored skin
//! let settings = LoaderSettings::default();
//!
//! // Start every entity in a specific skin
//! let settings = LoaderSettings {
//!     default_skin: Some("Skin_rabbit".to_string()),
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

/// How entity documents are located and which skin an entity starts in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Extension appended to the entity name to form the document uri.
    pub document_extension: String,

    /// Skin applied at construction when none is requested explicitly.
    /// `None` picks the first skin authored in the document.
    pub default_skin: Option<String>,

    /// Whether [`Entity::set_skin_preloaded`](crate::entity::Entity::set_skin_preloaded)
    /// should hand the skin's textures to the preloader before switching.
    pub preload_textures_on_set_skin: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            document_extension: "xml".to_string(),
            default_skin: None,
            preload_textures_on_set_skin: false,
        }
    }
}

impl LoaderSettings {
    /// The uri of an entity's document: `"{name}.{extension}"`.
    #[must_use]
    pub fn document_uri(&self, entity_name: &str) -> String {
        if self.document_extension.is_empty() {
            entity_name.to_string()
        } else {
            format!("{entity_name}.{}", self.document_extension)
        }
    }
}
