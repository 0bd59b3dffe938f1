//! Entity
//!
//! An [`Entity`] owns a bone tree plus everything that can be applied to it:
//! skins (appearance) and animations (pose over time).
//!
//! # Lifecycle
//!
//! 1. Build from a document ([`Entity::load`] / [`Entity::from_xml`]); the
//!    initial skin is applied immediately.
//! 2. Optionally warm caches off the per-frame tick with
//!    [`Entity::preload_skins`] and [`Entity::preload_animations`].
//! 3. Start playback with [`Entity::run`] and drive it with
//!    [`Entity::update`] once per frame.
//! 4. [`Entity::stop`] cancels playback and restores the authored pose.
//!
//! Skins and animations are parsed lazily from the retained document and
//! cached by name until released. Releasing a cache entry never affects a
//! sequence that is already playing: players share the compiled data, not
//! the cache slot.

use std::sync::Arc;

use glam::Vec2;
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::animation::clip::Animation;
use crate::animation::player::{RepeatPolicy, SequencePlayer};
use crate::assets::{DocumentReader, TexturePreloader};
use crate::document::Element;
use crate::document::parse::{
    default_skin_name, find_animation, find_skin, parse_animation, parse_bone_tree,
    parse_entity_info, parse_skin,
};
use crate::errors::{InkError, ResourceKind, Result};
use crate::rig::{Appearance, BoneKey, BoneTree, Pose};
use crate::settings::LoaderSettings;
use crate::skin::Skin;

/// Playback state of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing {
        animation: String,
        repeat: RepeatPolicy,
    },
}

pub struct Entity {
    name: String,
    size: Vec2,
    settings: LoaderSettings,

    document: Arc<Element>,
    entity_info: FxHashMap<Uuid, String>,
    bones: BoneTree,

    skins: FxHashMap<String, Arc<Skin>>,
    animations: FxHashMap<String, Arc<Animation>>,
    current_skin: Option<String>,

    players: FxHashMap<BoneKey, SequencePlayer>,
    state: PlaybackState,
}

impl Entity {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Builds an entity from an already parsed document.
    ///
    /// `skin` overrides `settings.default_skin`; with neither, the first
    /// authored skin is used.
    pub fn from_document(
        name: impl Into<String>,
        document: Element,
        skin: Option<&str>,
        settings: LoaderSettings,
    ) -> Result<Self> {
        let name = name.into();
        let (size, bones) = parse_bone_tree(&document)?;
        let entity_info = parse_entity_info(&document)?;

        let skin_name = match skin.or(settings.default_skin.as_deref()) {
            Some(skin) => skin.to_string(),
            None => default_skin_name(&document)?,
        };

        let mut entity = Self {
            name,
            size,
            settings,
            document: Arc::new(document),
            entity_info,
            bones,
            skins: FxHashMap::default(),
            animations: FxHashMap::default(),
            current_skin: None,
            players: FxHashMap::default(),
            state: PlaybackState::Idle,
        };
        entity.set_skin(&skin_name)?;

        log::info!(
            "Loaded entity \"{}\" ({} bones, skin \"{}\")",
            entity.name,
            entity.bones.len(),
            skin_name
        );
        Ok(entity)
    }

    /// Builds an entity from XML text with default settings.
    pub fn from_xml(name: impl Into<String>, xml: &str, skin: Option<&str>) -> Result<Self> {
        let document = Element::parse_str(xml)?;
        Self::from_document(name, document, skin, LoaderSettings::default())
    }

    /// Reads `{name}.{extension}` through `reader` and builds the entity in
    /// its default skin.
    pub async fn load<R: DocumentReader>(
        reader: &R,
        name: &str,
        settings: LoaderSettings,
    ) -> Result<Self> {
        Self::load_with_skin(reader, name, None, settings).await
    }

    pub async fn load_with_skin<R: DocumentReader>(
        reader: &R,
        name: &str,
        skin: Option<&str>,
        settings: LoaderSettings,
    ) -> Result<Self> {
        let uri = settings.document_uri(name);
        let text = reader.read_to_string(&uri).await.map_err(|err| match err {
            InkError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                InkError::not_found(ResourceKind::Entity, name)
            }
            other => other,
        })?;
        let document = Element::parse_str(&text)?;
        Self::from_document(name, document, skin, settings)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[must_use]
    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    #[must_use]
    pub fn document(&self) -> &Element {
        &self.document
    }

    #[must_use]
    pub fn bones(&self) -> &BoneTree {
        &self.bones
    }

    #[must_use]
    pub fn pose(&self, bone: &Uuid) -> Option<&Pose> {
        self.bones.pose(bone)
    }

    #[must_use]
    pub fn appearance(&self, bone: &Uuid) -> Option<&Appearance> {
        self.bones.get(bone).map(|node| &node.appearance)
    }

    // ========================================================================
    // Skins
    // ========================================================================

    /// Resolves a skin by name, parsing and caching it on first use.
    pub fn skin(&mut self, name: &str) -> Result<Arc<Skin>> {
        let skin = self.resolve_skin(name)?;
        self.cache_skin(name, &skin);
        Ok(skin)
    }

    fn resolve_skin(&self, name: &str) -> Result<Arc<Skin>> {
        if let Some(skin) = self.skins.get(name) {
            return Ok(Arc::clone(skin));
        }
        Ok(Arc::new(parse_skin(
            find_skin(&self.document, name)?,
            &self.entity_info,
        )?))
    }

    fn cache_skin(&mut self, name: &str, skin: &Arc<Skin>) {
        if !self.skins.contains_key(name) {
            log::debug!("Cached skin \"{}\" on entity \"{}\"", name, self.name);
            self.skins.insert(name.to_string(), Arc::clone(skin));
        }
    }

    fn apply_skin(&mut self, name: &str, skin: &Skin) {
        for (_, node) in self.bones.iter_mut() {
            node.appearance = skin.appearance_for(&node.bone.uuid);
        }
        self.current_skin = Some(name.to_string());
        log::info!("Entity \"{}\" switched to skin \"{}\"", self.name, name);
    }

    /// Applies a skin's visibility, textures and tints to every bone.
    /// Poses are untouched, so this is safe mid-animation.
    pub fn set_skin(&mut self, name: &str) -> Result<()> {
        let skin = self.skin(name)?;
        self.apply_skin(name, &skin);
        Ok(())
    }

    /// Like [`Entity::set_skin`], first preloading the skin's textures when
    /// `preload_textures_on_set_skin` is enabled.
    ///
    /// A failed or cancelled preload leaves the cache and the current skin
    /// untouched.
    pub async fn set_skin_preloaded<P: TexturePreloader>(
        &mut self,
        preloader: &P,
        name: &str,
    ) -> Result<()> {
        let skin = self.resolve_skin(name)?;
        if self.settings.preload_textures_on_set_skin {
            let keys: Vec<String> = skin.texture_keys().map(str::to_owned).collect();
            preloader.preload(&keys).await?;
        }
        self.cache_skin(name, &skin);
        self.apply_skin(name, &skin);
        Ok(())
    }

    #[must_use]
    pub fn current_skin(&self) -> Option<&str> {
        self.current_skin.as_deref()
    }

    #[must_use]
    pub fn is_skin_cached(&self, name: &str) -> bool {
        self.skins.contains_key(name)
    }

    /// Evicts a skin from the cache. Bone appearances keep their values.
    pub fn release_skin(&mut self, name: &str) -> bool {
        self.skins.remove(name).is_some()
    }

    /// Parses every named skin and preloads its textures concurrently.
    ///
    /// Fails fast: the first failing skin fails the whole batch and nothing
    /// is cached. The caches are only touched once every load has completed.
    pub async fn preload_skins<P: TexturePreloader>(
        &mut self,
        preloader: &P,
        names: &[&str],
    ) -> Result<()> {
        let document = &self.document;
        let entity_info = &self.entity_info;
        let cached = &self.skins;

        let loads = names.iter().map(|&name| async move {
            let skin = match cached.get(name) {
                Some(skin) => Arc::clone(skin),
                None => Arc::new(parse_skin(find_skin(document, name)?, entity_info)?),
            };
            let keys: Vec<String> = skin.texture_keys().map(str::to_owned).collect();
            preloader.preload(&keys).await?;
            Ok::<_, InkError>((name.to_string(), skin))
        });
        let loaded = futures::future::try_join_all(loads).await?;

        for (name, skin) in loaded {
            self.skins.entry(name).or_insert(skin);
        }
        log::debug!("Preloaded {} skin(s) on entity \"{}\"", names.len(), self.name);
        Ok(())
    }

    // ========================================================================
    // Animations
    // ========================================================================

    /// Resolves an animation by name, parsing and compiling it on first use.
    pub fn animation(&mut self, name: &str) -> Result<Arc<Animation>> {
        if let Some(animation) = self.animations.get(name) {
            return Ok(Arc::clone(animation));
        }
        let animation = Arc::new(parse_animation(find_animation(&self.document, name)?)?);
        log::debug!("Cached animation \"{}\" on entity \"{}\"", name, self.name);
        self.animations
            .insert(name.to_string(), Arc::clone(&animation));
        Ok(animation)
    }

    #[must_use]
    pub fn is_animation_cached(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    /// Evicts an animation from the cache. Running players are unaffected.
    pub fn release_animation(&mut self, name: &str) -> bool {
        self.animations.remove(name).is_some()
    }

    /// Parses and compiles every named animation, joined fail-fast.
    pub async fn preload_animations(&mut self, names: &[&str]) -> Result<()> {
        let document = &self.document;
        let cached = &self.animations;

        let loads = names.iter().map(|&name| async move {
            let animation = match cached.get(name) {
                Some(animation) => Arc::clone(animation),
                None => Arc::new(parse_animation(find_animation(document, name)?)?),
            };
            Ok::<_, InkError>((name.to_string(), animation))
        });
        let loaded = futures::future::try_join_all(loads).await?;

        for (name, animation) in loaded {
            self.animations.entry(name).or_insert(animation);
        }
        log::debug!(
            "Preloaded {} animation(s) on entity \"{}\"",
            names.len(),
            self.name
        );
        Ok(())
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Starts an animation on every bone it animates.
    ///
    /// All in-flight players are cancelled first, then each animated bone is
    /// snapped to the animation's starting pose and handed a fresh player.
    /// Cancel, prime and schedule happen within this call, so no tween of
    /// the previous animation can land after it returns.
    pub fn run(&mut self, name: &str, repeat: RepeatPolicy) -> Result<()> {
        let animation = self.animation(name)?;

        self.players.clear();

        for bone in animation.bones() {
            let Some(key) = self.bones.key_of(bone) else {
                log::trace!("Animation \"{name}\" skips bone {bone}: not in the tree");
                continue;
            };
            let (Some(sequence), Some(starting_pose)) =
                (animation.sequence(bone), animation.starting_pose(bone))
            else {
                continue;
            };
            let player = SequencePlayer::new(Arc::clone(sequence), repeat);
            if player.is_finished() {
                continue;
            }
            if let Some(node) = self.bones.node_mut(key) {
                node.pose.apply_keyframe(starting_pose);
            }
            self.players.insert(key, player);
        }

        if self.players.is_empty() {
            log::warn!(
                "Animation \"{}\" has nothing to play on entity \"{}\"",
                name,
                self.name
            );
            self.state = PlaybackState::Idle;
        } else {
            log::info!(
                "Entity \"{}\" running \"{}\" ({:?}) on {} bone(s)",
                self.name,
                name,
                repeat,
                self.players.len()
            );
            self.state = PlaybackState::Playing {
                animation: name.to_string(),
                repeat,
            };
        }
        Ok(())
    }

    pub fn run_once(&mut self, name: &str) -> Result<()> {
        self.run(name, RepeatPolicy::Once)
    }

    pub fn run_times(&mut self, name: &str, times: u32) -> Result<()> {
        self.run(name, RepeatPolicy::Times(times))
    }

    pub fn run_forever(&mut self, name: &str) -> Result<()> {
        self.run(name, RepeatPolicy::Forever)
    }

    /// Cancels all playback and restores every bone's authored pose.
    /// Calling it again is a no-op.
    pub fn stop(&mut self) {
        if self.state != PlaybackState::Idle {
            log::info!("Entity \"{}\" stopped", self.name);
        }
        self.players.clear();
        self.bones.reset_poses();
        self.state = PlaybackState::Idle;
    }

    /// Advances every running player by `dt` seconds (one per-frame tick).
    pub fn update(&mut self, dt: f32) {
        if self.players.is_empty() {
            return;
        }

        let bones = &mut self.bones;
        self.players.retain(|&key, player| match bones.node_mut(key) {
            Some(node) => player.advance(dt, &mut node.pose),
            None => false,
        });

        if self.players.is_empty() {
            log::debug!("Entity \"{}\" finished playing", self.name);
            self.state = PlaybackState::Idle;
        }
    }

    #[must_use]
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }
}
