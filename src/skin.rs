use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::animation::values::Color;
use crate::rig::Appearance;

/// Host texture lookup key: `"{skin}_{BONE-UUID}_{base}"`.
///
/// The uuid is rendered upper-case and hyphenated, as authored textures are
/// named.
#[must_use]
pub fn texture_key(skin_name: &str, bone: &Uuid, texture_base_name: &str) -> String {
    let mut buffer = Uuid::encode_buffer();
    let uuid = bone.hyphenated().encode_upper(&mut buffer);
    format!("{skin_name}_{uuid}_{texture_base_name}")
}

/// A named texture set: per-bone visibility, optional tint, and the texture
/// keys of the bones it shows.
#[derive(Debug, Clone, Default)]
pub struct Skin {
    pub name: String,
    visibility: FxHashMap<Uuid, bool>,
    tints: FxHashMap<Uuid, Color>,
    textures: FxHashMap<Uuid, String>,
}

impl Skin {
    /// Builds a skin from per-bone visibility and the entity's texture base
    /// names. Only visible bones with a base name get a texture.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        visibility: FxHashMap<Uuid, bool>,
        tints: FxHashMap<Uuid, Color>,
        entity_info: &FxHashMap<Uuid, String>,
    ) -> Self {
        let name = name.into();
        let textures = entity_info
            .iter()
            .filter(|(uuid, _)| visibility.get(*uuid).copied().unwrap_or(false))
            .map(|(uuid, base)| (*uuid, texture_key(&name, uuid, base)))
            .collect();

        Self {
            name,
            visibility,
            tints,
            textures,
        }
    }

    /// Bones the skin does not mention are hidden.
    #[must_use]
    pub fn is_visible(&self, bone: &Uuid) -> bool {
        self.visibility.get(bone).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn texture(&self, bone: &Uuid) -> Option<&str> {
        self.textures.get(bone).map(String::as_str)
    }

    #[must_use]
    pub fn tint(&self, bone: &Uuid) -> Option<Color> {
        self.tints.get(bone).copied()
    }

    /// Every texture key this skin needs, for preloading.
    pub fn texture_keys(&self) -> impl Iterator<Item = &str> {
        self.textures.values().map(String::as_str)
    }

    #[must_use]
    pub fn appearance_for(&self, bone: &Uuid) -> Appearance {
        Appearance {
            visible: self.is_visible(bone),
            texture: self.texture(bone).map(str::to_owned),
            tint: self.tint(bone),
        }
    }
}
