use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::animation::action::{ChannelTween, Segment, TweenTarget};
use crate::animation::clip::CompiledSequence;
use crate::animation::keyframe::Keyframe;
use crate::animation::values::{Color, Interpolatable};
use crate::rig::Pose;

/// How many times a compiled sequence is played back to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RepeatPolicy {
    #[default]
    Once,
    Times(u32),
    Forever,
}

impl RepeatPolicy {
    /// Maps a signed run count: negative means forever.
    #[must_use]
    pub fn from_count(count: i32) -> Self {
        match count {
            c if c < 0 => RepeatPolicy::Forever,
            1 => RepeatPolicy::Once,
            c => RepeatPolicy::Times(c as u32),
        }
    }

    /// Whether another pass may start after `completed` full passes.
    #[must_use]
    pub fn allows_pass(self, completed: u32) -> bool {
        match self {
            RepeatPolicy::Once => completed < 1,
            RepeatPolicy::Times(n) => completed < n,
            RepeatPolicy::Forever => true,
        }
    }
}

/// Single-threaded reference scheduler for a [`CompiledSequence`].
///
/// Each segment's tweens start from whatever the pose holds when the segment
/// begins, exactly like the host's "tween to" actions do.
#[derive(Debug, Clone)]
pub struct SequencePlayer {
    sequence: Arc<CompiledSequence>,
    repeat: RepeatPolicy,

    segment_index: usize,
    elapsed: f32,
    segment_start: Option<Keyframe>,
    completed_passes: u32,
    finished: bool,
}

impl SequencePlayer {
    #[must_use]
    pub fn new(sequence: Arc<CompiledSequence>, repeat: RepeatPolicy) -> Self {
        Self {
            sequence,
            repeat,
            segment_index: 0,
            elapsed: 0.0,
            segment_start: None,
            completed_passes: 0,
            finished: !repeat.allows_pass(0),
        }
    }

    #[must_use]
    pub fn sequence(&self) -> &Arc<CompiledSequence> {
        &self.sequence
    }

    #[must_use]
    pub fn repeat(&self) -> RepeatPolicy {
        self.repeat
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn completed_passes(&self) -> u32 {
        self.completed_passes
    }

    /// Advances playback by `dt` seconds, writing the tweened channels into
    /// `pose`. Returns `false` once the player has finished.
    pub fn advance(&mut self, dt: f32, pose: &mut Pose) -> bool {
        if self.finished {
            return false;
        }

        let mut remaining = dt.max(0.0);
        let segments = Arc::clone(&self.sequence);
        let zero_length = segments.duration() <= 0.0;
        let mut wrapped = false;

        loop {
            if self.segment_index >= segments.len() {
                self.completed_passes += 1;
                if !self.repeat.allows_pass(self.completed_passes) {
                    self.finished = true;
                    return false;
                }
                self.segment_index = 0;
                self.elapsed = 0.0;
                self.segment_start = None;

                // A sequence without length would otherwise wrap forever.
                if zero_length {
                    if wrapped {
                        return true;
                    }
                    wrapped = true;
                }
                if segments.is_empty() {
                    continue;
                }
            }

            let segment = &segments.segments()[self.segment_index];
            let start = *self
                .segment_start
                .get_or_insert_with(|| Keyframe::from_pose(pose));
            let available = segment.duration - self.elapsed;

            if remaining < available {
                self.elapsed += remaining;
                apply_segment(segment, &start, self.elapsed / segment.duration, pose);
                return true;
            }

            remaining -= available.max(0.0);
            apply_segment(segment, &start, 1.0, pose);
            self.segment_index += 1;
            self.elapsed = 0.0;
            self.segment_start = None;
        }
    }
}

fn apply_segment(segment: &Segment, start: &Keyframe, progress: f32, pose: &mut Pose) {
    for tween in segment.tweens() {
        apply_tween(tween, start, progress, pose);
    }
}

fn apply_tween(tween: &ChannelTween, start: &Keyframe, progress: f32, pose: &mut Pose) {
    let t = tween.easing.apply(progress);
    match tween.target {
        TweenTarget::Position(target) => pose.position = start.position.lerp(target, t),
        TweenTarget::Rotation(target) => {
            pose.rotation = f32::interpolate_linear(start.rotation, target, t);
        }
        TweenTarget::Size(target) => pose.size = start.size.lerp(target, t),
        TweenTarget::Scale(target) => pose.scale = start.scale.lerp(target, t),
        TweenTarget::Color {
            color,
            blend_factor,
        } => {
            pose.color = Color::interpolate_linear(start.color, color, t);
            pose.color_blend_factor =
                f32::interpolate_linear(start.color_blend_factor, blend_factor, t);
        }
        TweenTarget::Alpha(target) => pose.alpha = f32::interpolate_linear(start.alpha, target, t),
    }
}
