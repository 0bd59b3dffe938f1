pub mod action;
pub mod clip;
pub mod keyframe;
pub mod player;
pub mod tracks;
pub mod values;

pub use action::{ActionBuilder, ChannelTween, Easing, Segment, SegmentKind, TweenTarget};
pub use clip::{Animation, CompiledSequence};
pub use keyframe::{Keyframe, TimingMode};
pub use player::{RepeatPolicy, SequencePlayer};
pub use tracks::KeyframeTrack;
pub use values::{Color, Interpolatable};
