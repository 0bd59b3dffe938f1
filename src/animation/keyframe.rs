//! Keyframe
//!
//! A [`Keyframe`] is one authored pose sample for one bone: every animatable
//! channel of a sprite bone plus the timing curve used when tweening *into*
//! this sample.

use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::animation::values::{Color, Interpolatable};
use crate::errors::{InkError, Result};
use crate::rig::Pose;

/// Timing curve applied to the tweens that arrive at a keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimingMode {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInEaseOut,
}

impl TimingMode {
    /// The name used for this mode in entity documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TimingMode::Linear => "linear",
            TimingMode::EaseIn => "easeIn",
            TimingMode::EaseOut => "easeOut",
            TimingMode::EaseInEaseOut => "easeInEaseOut",
        }
    }
}

impl FromStr for TimingMode {
    type Err = InkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(TimingMode::Linear),
            "easeIn" => Ok(TimingMode::EaseIn),
            "easeOut" => Ok(TimingMode::EaseOut),
            "easeInEaseOut" => Ok(TimingMode::EaseInEaseOut),
            other => Err(InkError::malformed(format!("unknown timingMode \"{other}\""))),
        }
    }
}

/// An authored pose sample. Compared and copied by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub position: Vec2,
    /// Radians.
    pub rotation: f32,
    pub size: Vec2,
    pub scale: Vec2,
    pub timing_mode: TimingMode,
    pub color_blend_factor: f32,
    pub alpha: f32,
    pub color: Color,
}

impl Default for Keyframe {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            size: Vec2::ZERO,
            scale: Vec2::ONE,
            timing_mode: TimingMode::Linear,
            color_blend_factor: 0.0,
            alpha: 1.0,
            color: Color::TRANSPARENT,
        }
    }
}

impl Keyframe {
    /// Captures the animatable channels of a live pose.
    #[must_use]
    pub fn from_pose(pose: &Pose) -> Self {
        Self {
            position: pose.position,
            rotation: pose.rotation,
            size: pose.size,
            scale: pose.scale,
            timing_mode: TimingMode::Linear,
            color_blend_factor: pose.color_blend_factor,
            alpha: pose.alpha,
            color: pose.color,
        }
    }

    /// Interpolates every channel independently with the same weight.
    ///
    /// The result is a synthesized sample and always carries
    /// [`TimingMode::Linear`].
    #[must_use]
    pub fn lerp(start: &Keyframe, end: &Keyframe, t: f32) -> Keyframe {
        Keyframe {
            position: Vec2::interpolate_linear(start.position, end.position, t),
            rotation: f32::interpolate_linear(start.rotation, end.rotation, t),
            size: Vec2::interpolate_linear(start.size, end.size, t),
            scale: Vec2::interpolate_linear(start.scale, end.scale, t),
            timing_mode: TimingMode::Linear,
            color_blend_factor: f32::interpolate_linear(
                start.color_blend_factor,
                end.color_blend_factor,
                t,
            ),
            alpha: f32::interpolate_linear(start.alpha, end.alpha, t),
            color: Color::interpolate_linear(start.color, end.color, t),
        }
    }
}
