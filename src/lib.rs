#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod assets;
pub mod document;
pub mod entity;
pub mod errors;
pub mod rig;
pub mod settings;
pub mod skin;

pub use animation::{
    ActionBuilder, Animation, Color, CompiledSequence, Keyframe, KeyframeTrack, RepeatPolicy,
    SequencePlayer, TimingMode,
};
pub use assets::{DocumentReader, MemoryDocumentReader, NullTexturePreloader, TexturePreloader};
#[cfg(not(target_arch = "wasm32"))]
pub use assets::FileDocumentReader;
pub use document::Element;
pub use entity::{Entity, PlaybackState};
pub use errors::{InkError, ResourceKind, Result};
pub use rig::{Appearance, BlendMode, Bone, BoneKey, BoneTree, Pose};
pub use settings::LoaderSettings;
pub use skin::Skin;
