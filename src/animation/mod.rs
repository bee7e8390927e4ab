pub mod binding;
pub mod clip;
pub mod tracks;

pub use binding::{TargetPath, bare_bone_name, parse_binding_path, track_bone_name};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use tracks::{InterpolationMode, KeyframeTrack, TrackViolation};
