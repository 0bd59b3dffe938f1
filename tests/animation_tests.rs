//! Animation Tests
//!
//! Tests for:
//! - Track compilation into per-bone sequences
//! - Starting poses and animation validation
//! - SequencePlayer playback over compiled sequences

use std::sync::Arc;

use glam::Vec2;
use rustc_hash::FxHashMap;
use uuid::Uuid;

use ink_animator::animation::action::{SegmentKind, TweenTarget};
use ink_animator::animation::clip::{Animation, CompiledSequence};
use ink_animator::animation::keyframe::{Keyframe, TimingMode};
use ink_animator::animation::player::{RepeatPolicy, SequencePlayer};
use ink_animator::animation::tracks::KeyframeTrack;
use ink_animator::errors::InkError;
use ink_animator::rig::Pose;

const EPSILON: f32 = 1e-4;
const FRAME: f32 = 1.0 / 30.0;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn at(x: f32, y: f32) -> Keyframe {
    Keyframe {
        position: Vec2::new(x, y),
        ..Keyframe::default()
    }
}

fn rotated(rotation: f32) -> Keyframe {
    Keyframe {
        rotation,
        ..Keyframe::default()
    }
}

fn single_track(
    entries: Vec<(i32, Keyframe)>,
    start_frame: i32,
    end_frame: i32,
) -> (Uuid, Animation) {
    let bone = Uuid::new_v4();
    let mut tracks = FxHashMap::default();
    tracks.insert(bone, KeyframeTrack::from_entries(entries).unwrap());
    let animation = Animation::new("Test", start_frame, end_frame, FRAME, tracks).unwrap();
    (bone, animation)
}

// ============================================================================
// Compilation
// ============================================================================

#[test]
fn two_samples_compile_to_one_move() {
    let (bone, animation) = single_track(vec![(0, at(0.0, 0.0)), (10, at(100.0, 0.0))], 0, 10);

    let track = animation.track(&bone).unwrap();
    assert_eq!(track.relative_keyframe(5, 10).position, Vec2::new(50.0, 0.0));

    let sequence = animation.sequence(&bone).unwrap();
    assert_eq!(sequence.len(), 1);
    let segment = &sequence.segments()[0];
    assert!(approx(segment.duration, 10.0 / 30.0));
    assert_eq!(
        segment.tweens().iter().map(|t| t.target).collect::<Vec<_>>(),
        vec![TweenTarget::Position(Vec2::new(100.0, 0.0))]
    );
}

#[test]
fn empty_track_compiles_to_single_wait() {
    let (bone, animation) = single_track(Vec::new(), 0, 20);

    for frame in 0..20 {
        assert_eq!(animation.keyframe_at(&bone, frame), Some(Keyframe::default()));
    }

    let sequence = animation.sequence(&bone).unwrap();
    assert_eq!(sequence.len(), 1);
    assert_eq!(sequence.segments()[0].kind, SegmentKind::Wait);
    assert!(approx(sequence.duration(), 20.0 * FRAME));
}

#[test]
fn sparse_track_covers_whole_timeline() {
    let (bone, animation) = single_track(vec![(3, at(3.0, 0.0)), (7, at(7.0, 0.0))], 0, 10);
    let sequence = animation.sequence(&bone).unwrap();

    // 0..3, 3..7, and the tail 7..10
    assert_eq!(sequence.len(), 3);
    let durations: Vec<f32> = sequence.segments().iter().map(|s| s.duration).collect();
    assert!(approx(durations[0], 3.0 * FRAME));
    assert!(approx(durations[1], 4.0 * FRAME));
    assert!(approx(durations[2], 3.0 * FRAME));
    assert!(approx(sequence.duration(), animation.duration()));
}

#[test]
fn gap_before_first_sample_is_a_wait() {
    // Frame 0 resolves to the sample at 3, so nothing moves before it.
    let (bone, animation) = single_track(vec![(3, at(3.0, 0.0)), (7, at(7.0, 0.0))], 0, 10);
    let sequence = animation.sequence(&bone).unwrap();
    assert!(sequence.segments()[0].is_wait());
}

#[test]
fn tail_returns_to_starting_pose() {
    let (bone, animation) = single_track(vec![(0, at(0.0, 0.0)), (4, at(40.0, 0.0))], 0, 8);
    let sequence = animation.sequence(&bone).unwrap();

    let tail = sequence.segments().last().unwrap();
    assert!(approx(tail.duration, 4.0 * FRAME));
    assert_eq!(
        tail.tweens()[0].target,
        TweenTarget::Position(Vec2::ZERO)
    );
}

#[test]
fn samples_outside_range_are_ignored() {
    let (bone, animation) = single_track(
        vec![(0, at(0.0, 0.0)), (4, at(4.0, 0.0)), (12, at(12.0, 0.0))],
        2,
        6,
    );
    let sequence = animation.sequence(&bone).unwrap();
    assert!(approx(sequence.duration(), 4.0 * FRAME));
}

#[test]
fn starting_pose_is_frame_zero() {
    let first = Keyframe {
        position: Vec2::new(5.0, 5.0),
        timing_mode: TimingMode::EaseOut,
        ..Keyframe::default()
    };
    let (bone, animation) = single_track(vec![(0, first), (6, at(0.0, 0.0))], 0, 10);
    assert_eq!(animation.starting_pose(&bone), Some(&first));
}

#[test]
fn bones_lists_every_track() {
    let (bone, animation) = single_track(vec![(0, at(0.0, 0.0))], 0, 4);
    assert_eq!(animation.bones().copied().collect::<Vec<_>>(), vec![bone]);
    assert!(animation.sequence(&Uuid::new_v4()).is_none());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn start_after_end_is_malformed() {
    let result = Animation::new("Bad", 10, 5, FRAME, FxHashMap::default());
    assert!(matches!(result, Err(InkError::MalformedDocument(_))));
}

#[test]
fn negative_frame_duration_is_malformed() {
    let result = Animation::new("Bad", 0, 5, -FRAME, FxHashMap::default());
    assert!(matches!(result, Err(InkError::MalformedDocument(_))));
}

#[test]
fn duration_counts_frames() {
    let animation = Animation::new("Walk", 2, 12, 0.1, FxHashMap::default()).unwrap();
    assert!(approx(animation.duration(), 1.0));
}

// ============================================================================
// Playback
// ============================================================================

#[test]
fn player_follows_compiled_move() {
    let (bone, animation) = single_track(vec![(0, at(0.0, 0.0)), (10, at(100.0, 0.0))], 0, 10);
    let mut pose = Pose::default();
    pose.apply_keyframe(animation.starting_pose(&bone).unwrap());

    let mut player = SequencePlayer::new(
        Arc::clone(animation.sequence(&bone).unwrap()),
        RepeatPolicy::Once,
    );
    assert!(player.advance(5.0 * FRAME, &mut pose));
    assert!(approx(pose.position.x, 50.0));

    assert!(!player.advance(5.0 * FRAME + EPSILON, &mut pose));
    assert_eq!(pose.position, Vec2::new(100.0, 0.0));
}

#[test]
fn player_applies_easing() {
    let target = Keyframe {
        position: Vec2::new(10.0, 0.0),
        timing_mode: TimingMode::EaseIn,
        ..Keyframe::default()
    };
    let (bone, animation) = single_track(vec![(0, at(0.0, 0.0)), (10, target)], 0, 10);

    let mut pose = Pose::default();
    let mut player = SequencePlayer::new(
        Arc::clone(animation.sequence(&bone).unwrap()),
        RepeatPolicy::Once,
    );
    player.advance(5.0 * FRAME, &mut pose);
    assert!(approx(pose.position.x, 2.5));
}

#[test]
fn player_repeats_given_times() {
    let (bone, animation) = single_track(vec![(0, at(0.0, 0.0)), (5, at(50.0, 0.0))], 0, 10);
    let sequence = Arc::clone(animation.sequence(&bone).unwrap());
    let mut player = SequencePlayer::new(sequence, RepeatPolicy::Times(3));
    let mut pose = Pose::default();

    let mut ticks = 0;
    while player.advance(FRAME, &mut pose) {
        ticks += 1;
        assert!(ticks < 100, "player never finished");
    }
    assert_eq!(player.completed_passes(), 3);
    assert!(approx(pose.position.x, 0.0));
}

#[test]
fn late_start_reaches_authored_pose() {
    // Primed at frame 0 (rotation 0); frames 5..=10 hold rotation 1.
    let bone = Uuid::new_v4();
    let mut tracks = FxHashMap::default();
    tracks.insert(
        bone,
        KeyframeTrack::from_entries([(0, rotated(0.0)), (5, rotated(1.0)), (10, rotated(1.0))])
            .unwrap(),
    );
    let animation = Animation::new("Late", 5, 10, 0.1, tracks).unwrap();

    let sequence = animation.sequence(&bone).unwrap();
    assert_eq!(sequence.len(), 1);
    assert_eq!(
        sequence.segments()[0].tweens()[0].target,
        TweenTarget::Rotation(1.0)
    );

    let mut pose = Pose::default();
    pose.apply_keyframe(animation.starting_pose(&bone).unwrap());
    assert_eq!(pose.rotation, 0.0);

    let mut player = SequencePlayer::new(Arc::clone(sequence), RepeatPolicy::Once);
    assert!(!player.advance(1.0, &mut pose));
    assert_eq!(pose.rotation, 1.0);
}

#[test]
fn later_passes_start_from_previous_pass_end() {
    // The pass ends on the authored rotation 1 at frame 8; the next pass must
    // bring rotation back to 0 even though frame 0 already had it there.
    let bone = Uuid::new_v4();
    let middle = Keyframe {
        position: Vec2::new(10.0, 0.0),
        ..Keyframe::default()
    };
    let mut tracks = FxHashMap::default();
    tracks.insert(
        bone,
        KeyframeTrack::from_entries([(0, rotated(0.0)), (4, middle), (8, rotated(1.0))]).unwrap(),
    );
    let animation = Animation::new("Sway", 0, 8, 0.1, tracks).unwrap();

    let first = &animation.sequence(&bone).unwrap().segments()[0];
    assert!(first.tweens().iter().any(|t| t.target == TweenTarget::Rotation(0.0)));

    let mut pose = Pose::default();
    pose.apply_keyframe(animation.starting_pose(&bone).unwrap());
    let sequence = Arc::clone(animation.sequence(&bone).unwrap());
    let mut player = SequencePlayer::new(sequence, RepeatPolicy::Times(2));

    // One full pass plus half of the first segment of the second.
    assert!(player.advance(1.0, &mut pose));
    assert!(approx(pose.rotation, 0.5));
    player.advance(0.2, &mut pose);
    assert!(approx(pose.rotation, 0.0));
}

#[test]
fn players_share_a_sequence() {
    let sequence = Arc::new(CompiledSequence::default());
    let a = SequencePlayer::new(Arc::clone(&sequence), RepeatPolicy::Once);
    let b = SequencePlayer::new(Arc::clone(&sequence), RepeatPolicy::Forever);
    assert!(Arc::ptr_eq(a.sequence(), b.sequence()));
}
