use std::sync::Arc;

use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::animation::action::{ActionBuilder, Segment};
use crate::animation::keyframe::Keyframe;
use crate::animation::tracks::KeyframeTrack;
use crate::errors::{InkError, Result};

/// The replayable, time-ordered segments compiled from one bone's track.
///
/// Purely derived data: it holds no playback state and can be shared by
/// any number of players at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledSequence {
    segments: Vec<Segment>,
}

impl CompiledSequence {
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of all segment durations, in seconds.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.segments.iter().map(|s| s.duration).sum()
    }
}

/// A named animation: one keyframe track per bone, compiled once at
/// construction into per-bone sequences and starting poses.
#[derive(Debug, Clone)]
pub struct Animation {
    pub name: String,
    pub start_frame: i32,
    /// Inclusive.
    pub end_frame: i32,
    /// Seconds per frame.
    pub frame_duration: f32,

    tracks: FxHashMap<Uuid, KeyframeTrack>,
    sequences: FxHashMap<Uuid, Arc<CompiledSequence>>,
    starting_poses: FxHashMap<Uuid, Keyframe>,
}

impl Animation {
    pub fn new(
        name: impl Into<String>,
        start_frame: i32,
        end_frame: i32,
        frame_duration: f32,
        tracks: FxHashMap<Uuid, KeyframeTrack>,
    ) -> Result<Self> {
        let name = name.into();

        if start_frame < 0 {
            return Err(InkError::malformed(format!(
                "animation \"{name}\": startFrame must be non-negative, got {start_frame}"
            )));
        }
        if start_frame > end_frame {
            return Err(InkError::malformed(format!(
                "animation \"{name}\": startFrame {start_frame} is after endFrame {end_frame}"
            )));
        }
        if !frame_duration.is_finite() || frame_duration < 0.0 {
            return Err(InkError::malformed(format!(
                "animation \"{name}\": invalid frameDuration {frame_duration}"
            )));
        }

        let mut sequences = FxHashMap::default();
        let mut starting_poses = FxHashMap::default();
        for (&bone, track) in &tracks {
            let starting_pose = track.relative_keyframe(0, end_frame);
            let sequence =
                compile_track(track, &starting_pose, start_frame, end_frame, frame_duration);
            sequences.insert(bone, Arc::new(sequence));
            starting_poses.insert(bone, starting_pose);
        }

        log::debug!(
            "Compiled animation \"{}\": {} bone(s), frames {}..={}, {:.3}s",
            name,
            tracks.len(),
            start_frame,
            end_frame,
            (end_frame - start_frame) as f32 * frame_duration,
        );

        Ok(Self {
            name,
            start_frame,
            end_frame,
            frame_duration,
            tracks,
            sequences,
            starting_poses,
        })
    }

    /// Length of one pass, in seconds.
    #[must_use]
    pub fn duration(&self) -> f32 {
        (self.end_frame - self.start_frame) as f32 * self.frame_duration
    }

    #[must_use]
    pub fn track(&self, bone: &Uuid) -> Option<&KeyframeTrack> {
        self.tracks.get(bone)
    }

    #[must_use]
    pub fn sequence(&self, bone: &Uuid) -> Option<&Arc<CompiledSequence>> {
        self.sequences.get(bone)
    }

    #[must_use]
    pub fn starting_pose(&self, bone: &Uuid) -> Option<&Keyframe> {
        self.starting_poses.get(bone)
    }

    /// Ids of every animated bone.
    pub fn bones(&self) -> impl Iterator<Item = &Uuid> {
        self.tracks.keys()
    }

    /// Resolves the pose of `bone` at `frame` through its track.
    #[must_use]
    pub fn keyframe_at(&self, bone: &Uuid, frame: i32) -> Option<Keyframe> {
        self.tracks
            .get(bone)
            .map(|track| track.relative_keyframe(frame, self.end_frame))
    }
}

/// Sparse-to-dense compaction of a track into timed segments.
///
/// Every authored frame in `start..=end` closes a segment spanning back to the
/// previously emitted frame; an unauthored tail is closed with the synthetic
/// sample at `end`. The "previous" side of each segment is resolved through
/// the track, so gaps with no authored data compile to waits.
///
/// The first segment of a pass is the exception: the bone then holds either
/// `starting_pose` (primed by `run`) or the pose at `end` (left by the
/// previous pass), which need not match the track at `start`.
fn compile_track(
    track: &KeyframeTrack,
    starting_pose: &Keyframe,
    start_frame: i32,
    end_frame: i32,
    frame_duration: f32,
) -> CompiledSequence {
    let mut segments: Vec<Segment> = Vec::new();
    let mut last_frame = start_frame;
    let pass_end = track.relative_keyframe(end_frame, end_frame);

    let mut emit = |keyframe: &Keyframe, from: i32, to: i32| {
        let duration = (to - from) as f32 * frame_duration;
        let segment = if segments.is_empty() {
            ActionBuilder::build_entry(keyframe, starting_pose, &pass_end, duration)
        } else {
            let previous = track.relative_keyframe(from, end_frame);
            ActionBuilder::build(keyframe, Some(&previous), duration)
        };
        segments.push(segment);
    };

    for (frame, keyframe) in track.iter() {
        if frame < start_frame || frame > end_frame {
            continue;
        }
        // No time passes before a sample sitting on `start_frame`.
        if frame > last_frame {
            emit(keyframe, last_frame, frame);
        }
        last_frame = frame;
    }

    if last_frame < end_frame {
        let keyframe = track.relative_keyframe(end_frame, end_frame);
        emit(&keyframe, last_frame, end_frame);
    }

    CompiledSequence::new(segments)
}
