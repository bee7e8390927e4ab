//! Shared fixtures: a 23-bone humanoid rig facing +Z (left = +X), a clip
//! animating it, and a BVH rendition of both.

#![allow(dead_code)]

use std::fmt::Write as _;

use glam::{Quat, Vec3};

use vrma::animation::{AnimationClip, InterpolationMode, KeyframeTrack, Track};
use vrma::scene::{Bone, BoneKey, Skeleton};

pub const EPSILON: f32 = 1e-5;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// `(name, parent, offset)` of the reference rig, parents before children.
pub const RIG: [(&str, Option<&str>, [f32; 3]); 23] = [
    ("Hips", None, [0.0, 110.0, 0.0]),
    ("Spine", Some("Hips"), [0.0, 10.0, 0.0]),
    ("LeftUpLeg", Some("Hips"), [10.0, -5.0, 0.0]),
    ("LeftLeg", Some("LeftUpLeg"), [0.0, -45.0, 0.0]),
    ("LeftFoot", Some("LeftLeg"), [0.0, -45.0, 0.0]),
    ("LeftToeBase", Some("LeftFoot"), [0.0, -8.0, 12.0]),
    ("RightUpLeg", Some("Hips"), [-10.0, -5.0, 0.0]),
    ("RightLeg", Some("RightUpLeg"), [0.0, -45.0, 0.0]),
    ("RightFoot", Some("RightLeg"), [0.0, -45.0, 0.0]),
    ("RightToeBase", Some("RightFoot"), [0.0, -8.0, 12.0]),
    ("Chest", Some("Spine"), [0.0, 15.0, 0.0]),
    ("LeftShoulder", Some("Chest"), [5.0, 10.0, 0.0]),
    ("LeftArm", Some("LeftShoulder"), [10.0, 0.0, 0.0]),
    ("LeftForeArm", Some("LeftArm"), [25.0, 0.0, 0.0]),
    ("LeftHand", Some("LeftForeArm"), [25.0, 0.0, 0.0]),
    ("Neck", Some("Chest"), [0.0, 12.0, 0.0]),
    ("Head", Some("Neck"), [0.0, 10.0, 0.0]),
    ("LeftEye", Some("Head"), [3.0, 5.0, 5.0]),
    ("RightEye", Some("Head"), [-3.0, 5.0, 5.0]),
    ("RightShoulder", Some("Chest"), [-5.0, 10.0, 0.0]),
    ("RightArm", Some("RightShoulder"), [-10.0, 0.0, 0.0]),
    ("RightForeArm", Some("RightArm"), [-25.0, 0.0, 0.0]),
    ("RightHand", Some("RightForeArm"), [-25.0, 0.0, 0.0]),
];

/// Lowest bone origin of [`RIG`] relative to the hips: the toes.
pub const TOE_DROP: f32 = 5.0 + 45.0 + 45.0 + 8.0;

/// Builds a skeleton from `(name, parent, offset)` rows, parents first.
pub fn build(rows: &[(&str, Option<&str>, [f32; 3])]) -> Skeleton {
    let mut skeleton = build_without_update(rows);
    skeleton.update_world_matrices();
    skeleton
}

/// Like [`build`], but world matrices are never computed.
pub fn build_without_update(rows: &[(&str, Option<&str>, [f32; 3])]) -> Skeleton {
    let mut skeleton = Skeleton::new("fixture");
    for &(name, parent, offset) in rows {
        let parent = parent.map(|p| key(&skeleton, p));
        skeleton.add_bone(Bone::new(name, Vec3::from_array(offset)), parent);
    }
    skeleton
}

pub fn humanoid() -> Skeleton {
    build(&RIG)
}

/// The reference rig with the hips moved to `hips_height`.
pub fn humanoid_at(hips_height: f32) -> Skeleton {
    let mut rows = RIG;
    rows[0].2 = [0.0, hips_height, 0.0];
    build(&rows)
}

/// The reference rig mirrored in X: every "Left" bone sits at negative X.
pub fn mirrored_humanoid() -> Skeleton {
    let mut rows = RIG;
    for row in &mut rows {
        row.2[0] = -row.2[0];
    }
    build(&rows)
}

/// The reference rig with its root joint called `root_name`.
pub fn humanoid_with_root_named(root_name: &str) -> Skeleton {
    let rows: Vec<(&str, Option<&str>, [f32; 3])> = RIG
        .iter()
        .map(|&(name, parent, offset)| {
            let rename = |n: &'static str| if n == "Hips" { root_name } else { n };
            (rename(name), parent.map(rename), offset)
        })
        .collect();
    build(&rows)
}

pub fn key(skeleton: &Skeleton, name: &str) -> BoneKey {
    skeleton
        .find_by_name(name)
        .unwrap_or_else(|| panic!("fixture bone '{name}' missing"))
}

pub fn rotation_track(name: &str, frames: usize) -> Track {
    let times: Vec<f32> = (0..frames).map(|i| i as f32 / 30.0).collect();
    let values: Vec<Quat> = (0..frames)
        .map(|i| Quat::from_rotation_y(i as f32 * 0.1))
        .collect();
    Track::rotation(name, KeyframeTrack::new(times, values, InterpolationMode::Linear))
}

pub fn translation_track(name: &str, values: Vec<Vec3>) -> Track {
    let times: Vec<f32> = (0..values.len()).map(|i| i as f32 / 30.0).collect();
    Track::translation(name, KeyframeTrack::new(times, values, InterpolationMode::Linear))
}

/// One rotation track per bone plus a hips translation track carrying
/// rest offset + motion, the way motion-capture parsers bake it.
pub fn humanoid_clip(skeleton: &Skeleton, frames: usize) -> AnimationClip {
    let mut tracks: Vec<Track> = skeleton
        .bones()
        .iter()
        .map(|&bone| rotation_track(skeleton.name_of(bone).unwrap(), frames))
        .collect();

    let hips = skeleton.find_root().unwrap();
    let hips_rest = skeleton.bone(hips).unwrap().offset();
    let hips_values = (0..frames)
        .map(|i| hips_rest + Vec3::new(0.0, 0.0, i as f32))
        .collect();
    tracks.push(translation_track(skeleton.name_of(hips).unwrap(), hips_values));

    AnimationClip::new("fixture".to_string(), tracks)
}

/// BVH text for `skeleton`: six channels on the root, three rotation
/// channels elsewhere, End Sites on leaves. Frame `i` moves the hips by
/// `i` units along Z and turns every joint by `i` degrees about Y.
pub fn to_bvh(skeleton: &Skeleton, frames: usize) -> String {
    let mut out = String::from("HIERARCHY\n");
    let root = skeleton.find_root().unwrap();
    write_joint(skeleton, root, 0, &mut out);

    let channels = 6 + 3 * (skeleton.len() - 1);
    writeln!(out, "MOTION\nFrames: {frames}\nFrame Time: 0.0333333").unwrap();
    for frame in 0..frames {
        let mut values = vec![0.0_f32; channels];
        values[2] = frame as f32;
        for joint in 0..skeleton.len() {
            let first_rotation = if joint == 0 { 3 } else { 6 + 3 * (joint - 1) };
            // Zrotation Xrotation Yrotation
            values[first_rotation + 2] = frame as f32;
        }
        let line: Vec<String> = values.iter().map(ToString::to_string).collect();
        writeln!(out, "{}", line.join(" ")).unwrap();
    }
    out
}

fn write_joint(skeleton: &Skeleton, bone: BoneKey, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let keyword = if depth == 0 { "ROOT" } else { "JOINT" };
    let node = skeleton.bone(bone).unwrap();
    let offset = node.offset();

    writeln!(out, "{indent}{keyword} {}", node.name).unwrap();
    writeln!(out, "{indent}{{").unwrap();
    writeln!(out, "{indent}  OFFSET {} {} {}", offset.x, offset.y, offset.z).unwrap();
    if depth == 0 {
        writeln!(out, "{indent}  CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation").unwrap();
    } else {
        writeln!(out, "{indent}  CHANNELS 3 Zrotation Xrotation Yrotation").unwrap();
    }

    let children = skeleton.children_of(bone);
    if children.is_empty() {
        writeln!(out, "{indent}  End Site\n{indent}  {{\n{indent}    OFFSET 0 1 0\n{indent}  }}").unwrap();
    }
    for &child in children {
        write_joint(skeleton, child, depth + 1, out);
    }
    writeln!(out, "{indent}}}").unwrap();
}
