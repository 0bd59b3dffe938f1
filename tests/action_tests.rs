//! ActionBuilder Tests
//!
//! Tests for:
//! - Changed-channel detection and the pure-wait fallback
//! - Easing selection (scale is always linear)
//! - Easing curves

use glam::Vec2;

use ink_animator::animation::action::{ActionBuilder, Easing, SegmentKind, TweenTarget};
use ink_animator::animation::keyframe::{Keyframe, TimingMode};
use ink_animator::animation::values::Color;

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn targets(current: &Keyframe, previous: Option<&Keyframe>) -> Vec<TweenTarget> {
    ActionBuilder::build(current, previous, 1.0)
        .tweens()
        .iter()
        .map(|t| t.target)
        .collect()
}

// ============================================================================
// Channel selection
// ============================================================================

#[test]
fn no_previous_tweens_every_channel() {
    let kf = Keyframe::default();
    let segment = ActionBuilder::build(&kf, None, 0.5);

    assert!(!segment.is_wait());
    assert_eq!(segment.tweens().len(), 6);
    assert!(segment.tweens().iter().all(|t| approx(t.duration, 0.5)));
}

#[test]
fn identical_keyframes_yield_wait() {
    let kf = Keyframe {
        position: Vec2::new(3.0, 4.0),
        rotation: 0.2,
        ..Keyframe::default()
    };
    let segment = ActionBuilder::build(&kf, Some(&kf), 0.75);

    assert_eq!(segment.kind, SegmentKind::Wait);
    assert!(segment.tweens().is_empty());
    assert!(approx(segment.duration, 0.75));
}

#[test]
fn timing_mode_alone_is_not_a_change() {
    let previous = Keyframe::default();
    let current = Keyframe {
        timing_mode: TimingMode::EaseOut,
        ..Keyframe::default()
    };
    assert!(ActionBuilder::build(&current, Some(&previous), 1.0).is_wait());
}

#[test]
fn only_changed_channels_are_tweened() {
    let previous = Keyframe::default();
    let current = Keyframe {
        position: Vec2::new(100.0, 0.0),
        rotation: 1.5,
        ..Keyframe::default()
    };

    assert_eq!(
        targets(&current, Some(&previous)),
        vec![
            TweenTarget::Position(Vec2::new(100.0, 0.0)),
            TweenTarget::Rotation(1.5),
        ]
    );
}

#[test]
fn unchanged_channel_is_never_included() {
    let previous = Keyframe {
        size: Vec2::new(10.0, 10.0),
        alpha: 0.5,
        ..Keyframe::default()
    };
    let current = Keyframe {
        size: Vec2::new(10.0, 10.0),
        alpha: 0.25,
        scale: Vec2::new(2.0, 2.0),
        ..Keyframe::default()
    };

    let targets = targets(&current, Some(&previous));
    assert!(!targets.iter().any(|t| matches!(t, TweenTarget::Size(_))));
    assert!(targets.contains(&TweenTarget::Alpha(0.25)));
    assert!(targets.contains(&TweenTarget::Scale(Vec2::new(2.0, 2.0))));
}

#[test]
fn blend_factor_change_tweens_color() {
    let color = Color::new(1.0, 0.0, 0.0, 1.0);
    let previous = Keyframe {
        color,
        ..Keyframe::default()
    };
    let current = Keyframe {
        color,
        color_blend_factor: 0.8,
        ..Keyframe::default()
    };

    assert_eq!(
        targets(&current, Some(&previous)),
        vec![TweenTarget::Color {
            color,
            blend_factor: 0.8
        }]
    );
}

#[test]
fn entry_segment_tweens_channels_differing_from_either_pose() {
    let starting = Keyframe::default();
    let pass_end = Keyframe {
        rotation: 1.0,
        ..Keyframe::default()
    };
    let current = Keyframe {
        position: Vec2::new(5.0, 0.0),
        ..Keyframe::default()
    };

    let segment = ActionBuilder::build_entry(&current, &starting, &pass_end, 1.0);
    let targets: Vec<TweenTarget> = segment.tweens().iter().map(|t| t.target).collect();
    assert_eq!(
        targets,
        vec![
            TweenTarget::Position(Vec2::new(5.0, 0.0)),
            TweenTarget::Rotation(0.0),
        ]
    );
}

#[test]
fn entry_segment_matching_both_poses_is_a_wait() {
    let kf = Keyframe::default();
    assert!(ActionBuilder::build_entry(&kf, &kf, &kf, 0.5).is_wait());
}

// ============================================================================
// Easing
// ============================================================================

#[test]
fn tweens_follow_current_timing_mode() {
    let current = Keyframe {
        position: Vec2::ONE,
        timing_mode: TimingMode::EaseInEaseOut,
        ..Keyframe::default()
    };
    let segment = ActionBuilder::build(&current, Some(&Keyframe::default()), 1.0);
    assert_eq!(segment.tweens()[0].easing, Easing::EaseInOut);
}

#[test]
fn scale_is_always_linear() {
    let current = Keyframe {
        position: Vec2::ONE,
        scale: Vec2::splat(3.0),
        timing_mode: TimingMode::EaseIn,
        ..Keyframe::default()
    };
    let segment = ActionBuilder::build(&current, Some(&Keyframe::default()), 1.0);

    for tween in segment.tweens() {
        match tween.target {
            TweenTarget::Scale(_) => assert_eq!(tween.easing, Easing::Linear),
            _ => assert_eq!(tween.easing, Easing::EaseIn),
        }
    }
}

#[test]
fn easing_curves_hit_endpoints() {
    for easing in [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
    ] {
        assert!(approx(easing.apply(0.0), 0.0), "{easing:?} at 0");
        assert!(approx(easing.apply(1.0), 1.0), "{easing:?} at 1");
    }
}

#[test]
fn easing_curve_shapes() {
    assert!(approx(Easing::Linear.apply(0.25), 0.25));
    assert!(approx(Easing::EaseIn.apply(0.5), 0.25));
    assert!(approx(Easing::EaseOut.apply(0.5), 0.75));
    assert!(approx(Easing::EaseInOut.apply(0.5), 0.5));
    assert!(Easing::EaseInOut.apply(0.25) < 0.25);
}

#[test]
fn easing_clamps_out_of_range_time() {
    assert!(approx(Easing::EaseIn.apply(-1.0), 0.0));
    assert!(approx(Easing::EaseOut.apply(2.0), 1.0));
}
