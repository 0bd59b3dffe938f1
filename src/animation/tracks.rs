use crate::animation::keyframe::Keyframe;
use crate::errors::{InkError, Result};

/// Sparse, frame-indexed keyframes of one bone within one animation.
///
/// `frames` is kept ascending and parallel to `keyframes`; every insertion
/// goes through a binary search so the two never drift apart.
#[derive(Debug, Clone, Default)]
pub struct KeyframeTrack {
    frames: Vec<i32>,
    keyframes: Vec<Keyframe>,
}

impl KeyframeTrack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a track from raw `(frame, keyframe)` entries in any order.
    pub fn from_entries(entries: impl IntoIterator<Item = (i32, Keyframe)>) -> Result<Self> {
        let mut track = Self::new();
        for (frame, keyframe) in entries {
            track.insert(frame, keyframe)?;
        }
        Ok(track)
    }

    /// Adds an authored sample, replacing any sample already at `frame`.
    ///
    /// Negative frames are rejected: frame 0 must always resolve to an
    /// authored sample once the track is non-empty.
    pub fn insert(&mut self, frame: i32, keyframe: Keyframe) -> Result<()> {
        if frame < 0 {
            return Err(InkError::malformed(format!(
                "keyframe frame must be non-negative, got {frame}"
            )));
        }

        match self.frames.binary_search(&frame) {
            Ok(index) => self.keyframes[index] = keyframe,
            Err(index) => {
                self.frames.insert(index, frame);
                self.keyframes.insert(index, keyframe);
            }
        }
        Ok(())
    }

    /// The authored sample at exactly `frame`, if any.
    #[must_use]
    pub fn get(&self, frame: i32) -> Option<&Keyframe> {
        self.frames
            .binary_search(&frame)
            .ok()
            .map(|index| &self.keyframes[index])
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Authored frame indices, ascending.
    #[inline]
    #[must_use]
    pub fn frames(&self) -> &[i32] {
        &self.frames
    }

    #[must_use]
    pub fn first_frame(&self) -> Option<i32> {
        self.frames.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &Keyframe)> {
        self.frames.iter().copied().zip(self.keyframes.iter())
    }

    /// Resolves the pose at any frame, authored or not.
    ///
    /// - Authored frames return their sample unmodified.
    /// - An empty track yields [`Keyframe::default`].
    /// - Frame 0 falls back to the earliest authored sample.
    /// - `end_frame` mirrors frame 0, so the timeline loops seamlessly.
    /// - Anything else is interpolated linearly between the bracketing
    ///   samples; a missing side of the bracket is synthesized from the
    ///   frame 0 / `end_frame` boundary samples.
    #[must_use]
    pub fn relative_keyframe(&self, frame: i32, end_frame: i32) -> Keyframe {
        if let Some(keyframe) = self.get(frame) {
            return *keyframe;
        }
        let Some(first) = self.keyframes.first() else {
            return Keyframe::default();
        };
        if frame == 0 {
            return *first;
        }
        if frame == end_frame {
            return self.relative_keyframe(0, end_frame);
        }

        // First authored index strictly after `frame`.
        let next_index = self.frames.partition_point(|&f| f <= frame);

        let (previous_frame, previous) = if next_index == 0 {
            if frame < end_frame {
                (0, self.relative_keyframe(0, end_frame))
            } else {
                (end_frame, self.relative_keyframe(end_frame, end_frame))
            }
        } else {
            let authored = self.frames[next_index - 1];
            if frame < end_frame || authored >= end_frame {
                (authored, self.keyframes[next_index - 1])
            } else {
                (end_frame, self.relative_keyframe(end_frame, end_frame))
            }
        };

        let (next_frame, next) = if next_index == self.frames.len() {
            if frame < end_frame {
                (end_frame, self.relative_keyframe(end_frame, end_frame))
            } else {
                (previous_frame, previous)
            }
        } else {
            let authored = self.frames[next_index];
            if frame > end_frame || authored <= end_frame {
                (authored, self.keyframes[next_index])
            } else {
                (end_frame, self.relative_keyframe(end_frame, end_frame))
            }
        };

        let span = next_frame - previous_frame;
        let weight = if span == 0 {
            1.0
        } else {
            (frame - previous_frame) as f32 / span as f32
        };

        Keyframe::lerp(&previous, &next, weight)
    }
}
