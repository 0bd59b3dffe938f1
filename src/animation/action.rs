use glam::Vec2;
use smallvec::SmallVec;

use crate::animation::keyframe::{Keyframe, TimingMode};
use crate::animation::values::Color;

/// Easing curve of a single tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Maps normalized time `t` in `[0, 1]` to normalized progress.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv
            }
            Easing::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

impl From<TimingMode> for Easing {
    fn from(mode: TimingMode) -> Self {
        match mode {
            TimingMode::Linear => Easing::Linear,
            TimingMode::EaseIn => Easing::EaseIn,
            TimingMode::EaseOut => Easing::EaseOut,
            TimingMode::EaseInEaseOut => Easing::EaseInOut,
        }
    }
}

/// The channel a tween drives and the value it ends at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenTarget {
    Position(Vec2),
    Rotation(f32),
    Size(Vec2),
    Scale(Vec2),
    Color { color: Color, blend_factor: f32 },
    Alpha(f32),
}

/// One channel tween: animate a channel from wherever it is to `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelTween {
    pub target: TweenTarget,
    pub duration: f32,
    pub easing: Easing,
}

pub type TweenGroup = SmallVec<[ChannelTween; 4]>;

#[derive(Debug, Clone, PartialEq)]
pub enum SegmentKind {
    /// Tweens that run concurrently for the whole segment.
    Group(TweenGroup),
    /// Nothing changes; the segment only holds time.
    Wait,
}

/// A timed step of a compiled sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub duration: f32,
    pub kind: SegmentKind,
}

impl Segment {
    #[must_use]
    pub fn wait(duration: f32) -> Self {
        Self {
            duration,
            kind: SegmentKind::Wait,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_wait(&self) -> bool {
        matches!(self.kind, SegmentKind::Wait)
    }

    /// The concurrent tweens of this segment (empty for a wait).
    #[must_use]
    pub fn tweens(&self) -> &[ChannelTween] {
        match &self.kind {
            SegmentKind::Group(group) => group,
            SegmentKind::Wait => &[],
        }
    }
}

/// Turns a pair of keyframes into the minimal set of channel tweens.
pub struct ActionBuilder;

impl ActionBuilder {
    /// Builds the segment that moves a bone from `previous` to `current`.
    ///
    /// A channel is tweened only when there is no previous keyframe or its
    /// value differs from the previous one. Scale tweens are always linear;
    /// every other channel follows `current.timing_mode`. With no changed
    /// channel the result is a [`SegmentKind::Wait`] of the same duration.
    #[must_use]
    pub fn build(current: &Keyframe, previous: Option<&Keyframe>, duration: f32) -> Segment {
        Self::build_against(current, previous.as_slice(), duration)
    }

    /// Builds the segment that opens a pass. The bone either holds the primed
    /// `starting` pose or wherever the previous pass left it (`pass_end`), so a
    /// channel is tweened when it differs from either.
    #[must_use]
    pub fn build_entry(
        current: &Keyframe,
        starting: &Keyframe,
        pass_end: &Keyframe,
        duration: f32,
    ) -> Segment {
        Self::build_against(current, &[starting, pass_end], duration)
    }

    fn build_against(current: &Keyframe, previous: &[&Keyframe], duration: f32) -> Segment {
        let easing = Easing::from(current.timing_mode);
        let changed = |same: fn(&Keyframe, &Keyframe) -> bool| {
            previous.is_empty() || previous.iter().any(|previous| !same(current, previous))
        };

        let mut group = TweenGroup::new();
        let mut push = |target, easing| {
            group.push(ChannelTween {
                target,
                duration,
                easing,
            });
        };

        if changed(|a, b| a.position == b.position) {
            push(TweenTarget::Position(current.position), easing);
        }
        if changed(|a, b| a.rotation == b.rotation) {
            push(TweenTarget::Rotation(current.rotation), easing);
        }
        if changed(|a, b| a.size == b.size) {
            push(TweenTarget::Size(current.size), easing);
        }
        if changed(|a, b| a.scale == b.scale) {
            push(TweenTarget::Scale(current.scale), Easing::Linear);
        }
        if changed(|a, b| a.color == b.color && a.color_blend_factor == b.color_blend_factor) {
            push(
                TweenTarget::Color {
                    color: current.color,
                    blend_factor: current.color_blend_factor,
                },
                easing,
            );
        }
        if changed(|a, b| a.alpha == b.alpha) {
            push(TweenTarget::Alpha(current.alpha), easing);
        }

        if group.is_empty() {
            Segment::wait(duration)
        } else {
            Segment {
                duration,
                kind: SegmentKind::Group(group),
            }
        }
    }
}
