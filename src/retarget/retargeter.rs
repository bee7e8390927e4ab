use glam::Vec3;

use crate::animation::{AnimationClip, TargetPath, Track, TrackData, track_bone_name};
use crate::errors::{ClassifierError, Result};
use crate::humanoid::{HumanBoneName, HumanoidRoleMap};
use crate::retarget::RetargetOptions;
use crate::scene::{Bone, BoneKey, Skeleton};

/// Name of the synthetic node inserted above the skeleton root.
pub const SCALING_ROOT_NAME: &str = "Root";

/// Spine displacements at or below this magnitude are treated as degenerate.
const RATIO_EPSILON: f32 = 1e-6;

/// What the retargeter changed, for logging and inspection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetargetReport {
    /// Factor applied to the hips translation track, if any.
    pub hips_ratio: Option<f32>,
    /// World-space lift applied to the scaling root to put the rig on y = 0.
    pub ground_offset: f32,
    /// Hips rest offset subtracted from the hips translation track.
    pub removed_root_offset: Option<Vec3>,
    pub kept_tracks: usize,
    pub dropped_translation_tracks: usize,
    pub dropped_scale_tracks: usize,
}

/// Retargeted working copies, ready for export.
#[derive(Debug, Clone)]
pub struct RetargetOutput {
    /// Copy of the input skeleton with the scaling root inserted.
    pub skeleton: Skeleton,
    pub scene_root: BoneKey,
    pub clip: AnimationClip,
    pub report: RetargetReport,
}

/// Adapts a motion-capture clip to the humanoid convention.
///
/// Works on copies: neither `skeleton` nor `clip` is modified, and the keys
/// in `roles` stay valid for the returned skeleton.
///
/// Stages, in order:
/// 1. insert a scaling root (uniform `options.scale`) above the skeleton root
/// 2. lift the rig so that no bone sits below y = 0
/// 3. keep rotation tracks and the hips translation track, under bare bone names
/// 4. rescale hips motion by the spine rest/animated displacement ratio
/// 5. optionally subtract the hips rest offset from hips motion
pub fn retarget(
    skeleton: &Skeleton,
    clip: &AnimationClip,
    roles: &HumanoidRoleMap,
    options: &RetargetOptions,
) -> Result<RetargetOutput> {
    let mut skeleton = skeleton.clone();
    let mut report = RetargetReport::default();

    let hips = roles
        .get(HumanBoneName::Hips)
        .ok_or(ClassifierError::MissingRole(HumanBoneName::Hips))?;
    let spine = roles
        .get(HumanBoneName::Spine)
        .ok_or(ClassifierError::MissingRole(HumanBoneName::Spine))?;

    // 1. Scene scaling
    let root = skeleton.find_root()?;
    let scene_root = insert_scaling_root(&mut skeleton, root, options.scale);
    log::debug!("Inserted scaling root (scale {})", options.scale);

    // 2. Grounding
    report.ground_offset = ground(&mut skeleton, scene_root);

    // 3. Filter & rename
    let hips_name = skeleton.name_of(hips).unwrap_or_default().to_string();
    let spine_name = skeleton.name_of(spine).unwrap_or_default();
    let spine_rest = skeleton.bone(spine).map_or(Vec3::ZERO, Bone::offset);
    let hips_rest = skeleton.bone(hips).map_or(Vec3::ZERO, Bone::offset);

    let hips_ratio = displacement_ratio(clip, spine_name, spine_rest);

    let mut tracks = Vec::with_capacity(clip.tracks.len());
    for track in &clip.tracks {
        let name = track_bone_name(&track.meta.node_name);
        match track.meta.target {
            TargetPath::Rotation => tracks.push(renamed(track, name)),
            TargetPath::Translation if name == hips_name => {
                let mut hips_track = renamed(track, name);
                if let TrackData::Vector3(values) = &mut hips_track.data {
                    // 4. Ratio correction
                    if let Some(ratio) = hips_ratio {
                        values.map_values(|v| v * ratio);
                        report.hips_ratio = Some(ratio);
                    }
                    // 5. Root offset removal
                    if options.remove_root_offset {
                        values.map_keyframes(|v| v - hips_rest);
                        report.removed_root_offset = Some(hips_rest);
                    }
                }
                tracks.push(hips_track);
            }
            TargetPath::Translation => report.dropped_translation_tracks += 1,
            TargetPath::Scale => report.dropped_scale_tracks += 1,
        }
    }
    report.kept_tracks = tracks.len();

    log::debug!(
        "Kept {} tracks, dropped {} translation and {} scale tracks",
        report.kept_tracks,
        report.dropped_translation_tracks,
        report.dropped_scale_tracks
    );

    let clip = AnimationClip::new(clip.name.clone(), tracks);

    Ok(RetargetOutput {
        skeleton,
        scene_root,
        clip,
        report,
    })
}

fn insert_scaling_root(skeleton: &mut Skeleton, root: BoneKey, scale: f32) -> BoneKey {
    let mut node = Bone::new(SCALING_ROOT_NAME, Vec3::ZERO);
    node.transform.scale = Vec3::splat(scale);
    let key = skeleton.insert_scene_root(node, root);
    skeleton.update_world_matrices();
    key
}

/// Translates the scaling root so the lowest bone origin rests on y = 0.
/// Returns the applied offset, zero when the rig is already above ground.
fn ground(skeleton: &mut Skeleton, scene_root: BoneKey) -> f32 {
    let Some(bounds) = skeleton.compute_world_bounds() else {
        return 0.0;
    };
    if bounds.min.y >= 0.0 {
        return 0.0;
    }

    let offset = -bounds.min.y;
    if let Some(node) = skeleton.bone_mut(scene_root) {
        node.transform.position.y += offset;
    }
    skeleton.update_world_matrices();
    log::debug!("Grounded skeleton by {offset}");
    offset
}

/// `|spine rest offset| / |first spine translation key|`, or `None` when the
/// spine carries no usable translation track.
fn displacement_ratio(clip: &AnimationClip, spine_name: &str, spine_rest: Vec3) -> Option<f32> {
    let first_key = clip.tracks.iter().find_map(|track| {
        match (&track.data, track.meta.target) {
            (TrackData::Vector3(values), TargetPath::Translation)
                if track_bone_name(&track.meta.node_name) == spine_name =>
            {
                values.keyframe_value(0)
            }
            _ => None,
        }
    })?;

    let displacement = first_key.length();
    if displacement <= RATIO_EPSILON {
        log::warn!("Spine translation track starts at the origin; skipping hips ratio correction");
        return None;
    }
    Some(spine_rest.length() / displacement)
}

fn renamed(track: &Track, name: &str) -> Track {
    let mut track = track.clone();
    track.meta.node_name = name.to_string();
    track
}
