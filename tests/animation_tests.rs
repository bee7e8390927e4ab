//! Animation Data Tests
//!
//! Tests for:
//! - KeyframeTrack keyframe access for linear and cubic layouts
//! - Keyframe validation (ordering, value counts)
//! - Keyframe mapping that leaves cubic tangents alone
//! - AnimationClip duration and track validation

use glam::{Quat, Vec3};

use vrma::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
    TrackViolation,
};
use vrma::errors::RetargetError;

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// KeyframeTrack: Keyframe access
// ============================================================================

#[test]
fn empty_track_has_zero_end_time() {
    let track: KeyframeTrack<Vec3> = KeyframeTrack::new(Vec::new(), Vec::new(), InterpolationMode::Linear);
    assert!(track.is_empty());
    assert!(approx(track.end_time(), 0.0));
    assert!(track.keyframe_value(0).is_none());
}

#[test]
fn keyframe_value_reads_linear_keys_directly() {
    let track = KeyframeTrack::new(
        vec![0.0, 0.5, 1.25],
        vec![Vec3::X, Vec3::Y, Vec3::Z],
        InterpolationMode::Linear,
    );
    assert_eq!(track.len(), 3);
    assert!(approx(track.end_time(), 1.25));
    assert_eq!(track.keyframe_value(1), Some(Vec3::Y));
    assert!(track.keyframe_value(3).is_none());
}

#[test]
fn keyframe_value_skips_cubic_tangents() {
    // in-tangent, value, out-tangent per key
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Vec3::ZERO, Vec3::ZERO, Vec3::X, Vec3::X, Vec3::ONE, Vec3::ZERO],
        InterpolationMode::CubicSpline,
    );
    assert_eq!(track.len(), 2);
    assert_eq!(track.keyframe_value(0), Some(Vec3::ZERO));
    assert_eq!(track.keyframe_value(1), Some(Vec3::ONE));
}

// ============================================================================
// KeyframeTrack: Validation & mapping
// ============================================================================

#[test]
fn validate_rejects_non_increasing_times() {
    let track = KeyframeTrack::new(
        vec![0.0, 0.5, 0.5],
        vec![Vec3::ZERO; 3],
        InterpolationMode::Linear,
    );
    assert_eq!(track.validate(), Err(TrackViolation::TimesNotIncreasing { index: 2 }));
}

#[test]
fn validate_checks_cubic_value_count() {
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![Vec3::ZERO; 2], InterpolationMode::CubicSpline);
    assert_eq!(
        track.validate(),
        Err(TrackViolation::ValueCount { expected: 6, found: 2 })
    );

    let empty: KeyframeTrack<Quat> = KeyframeTrack::new(Vec::new(), Vec::new(), InterpolationMode::Step);
    assert_eq!(empty.validate(), Err(TrackViolation::Empty));
}

#[test]
fn map_keyframes_skips_tangents() {
    let mut track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Vec3::X, Vec3::ONE, Vec3::X, Vec3::X, Vec3::ONE, Vec3::X],
        InterpolationMode::CubicSpline,
    );
    track.map_keyframes(|v| v + Vec3::Y);

    let lifted = Vec3::new(1.0, 2.0, 1.0);
    assert_eq!(track.values, [Vec3::X, lifted, Vec3::X, Vec3::X, lifted, Vec3::X]);

    let mut linear = KeyframeTrack::new(vec![0.0], vec![Vec3::ONE], InterpolationMode::Linear);
    linear.map_keyframes(|v| v * 3.0);
    assert_eq!(linear.values, [Vec3::splat(3.0)]);
}

// ============================================================================
// AnimationClip
// ============================================================================

#[test]
fn clip_duration_is_latest_key() {
    let clip = AnimationClip::new(
        "walk".to_string(),
        vec![
            Track::translation(
                "Hips",
                KeyframeTrack::new(vec![0.0, 2.5], vec![Vec3::ZERO; 2], InterpolationMode::Linear),
            ),
            Track::rotation(
                "Spine",
                KeyframeTrack::new(vec![0.0, 1.0], vec![Quat::IDENTITY; 2], InterpolationMode::Linear),
            ),
        ],
    );
    assert!(approx(clip.duration, 2.5));
    assert_eq!(clip.count_tracks(TargetPath::Rotation), 1);
    assert!(clip.find_track("Spine", TargetPath::Translation).is_none());
    clip.validate().unwrap();
}

#[test]
fn clip_validation_names_the_track() {
    let clip = AnimationClip::new(
        "bad".to_string(),
        vec![Track::rotation(
            "LeftArm",
            KeyframeTrack::new(vec![1.0, 0.0], vec![Quat::IDENTITY; 2], InterpolationMode::Linear),
        )],
    );
    match clip.validate() {
        Err(RetargetError::InvalidTrack { name, .. }) => assert_eq!(name, "LeftArm.rotation"),
        other => panic!("expected InvalidTrack, got {other:?}"),
    }
}

#[test]
fn mismatched_value_kind_is_invalid() {
    let track = Track {
        meta: TrackMeta {
            node_name: "Hips".to_string(),
            target: TargetPath::Rotation,
        },
        data: TrackData::Vector3(KeyframeTrack::new(vec![0.0], vec![Vec3::ZERO], InterpolationMode::Linear)),
    };
    assert!(matches!(track.validate(), Err(RetargetError::InvalidTrack { .. })));
}
