use glam::{Quat, Vec3};

use crate::animation::binding::TargetPath;
use crate::animation::tracks::{KeyframeTrack, TrackViolation};
use crate::errors::{Result, RetargetError};

#[derive(Debug, Clone)]
pub struct TrackMeta {
    pub node_name: String,
    pub target: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

impl TrackData {
    #[must_use]
    pub fn times(&self) -> &[f32] {
        match self {
            TrackData::Vector3(track) => &track.times,
            TrackData::Quaternion(track) => &track.times,
        }
    }

    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            TrackData::Vector3(track) => track.end_time(),
            TrackData::Quaternion(track) => track.end_time(),
        }
    }

    fn validate(&self) -> std::result::Result<(), TrackViolation> {
        match self {
            TrackData::Vector3(track) => track.validate(),
            TrackData::Quaternion(track) => track.validate(),
        }
    }
}

/// Complete track definition: metadata plus keyframe data.
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

impl Track {
    #[must_use]
    pub fn translation(node_name: impl Into<String>, track: KeyframeTrack<Vec3>) -> Self {
        Self {
            meta: TrackMeta {
                node_name: node_name.into(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(track),
        }
    }

    #[must_use]
    pub fn rotation(node_name: impl Into<String>, track: KeyframeTrack<Quat>) -> Self {
        Self {
            meta: TrackMeta {
                node_name: node_name.into(),
                target: TargetPath::Rotation,
            },
            data: TrackData::Quaternion(track),
        }
    }

    /// Checks keyframe invariants and that the data kind matches the target.
    pub fn validate(&self) -> Result<()> {
        let kind_matches = matches!(
            (&self.data, self.meta.target),
            (TrackData::Quaternion(_), TargetPath::Rotation)
                | (TrackData::Vector3(_), TargetPath::Translation | TargetPath::Scale)
        );
        if !kind_matches {
            return Err(self.invalid(format!(
                "value type does not match target {:?}",
                self.meta.target
            )));
        }
        self.data
            .validate()
            .map_err(|violation| self.invalid(violation.to_string()))
    }

    fn invalid(&self, reason: String) -> RetargetError {
        RetargetError::InvalidTrack {
            name: format!("{}.{}", self.meta.node_name, self.meta.target.as_gltf_str()),
            reason,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: String, tracks: Vec<Track>) -> Self {
        let mut clip = Self {
            name,
            duration: 0.0,
            tracks,
        };
        clip.recompute_duration();
        clip
    }

    /// Duration is the latest key time across all tracks.
    pub fn recompute_duration(&mut self) {
        self.duration = self
            .tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);
    }

    pub fn validate(&self) -> Result<()> {
        self.tracks.iter().try_for_each(Track::validate)
    }

    /// First track bound to `node_name` with the given target.
    #[must_use]
    pub fn find_track(&self, node_name: &str, target: TargetPath) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|t| t.meta.node_name == node_name && t.meta.target == target)
    }

    #[must_use]
    pub fn count_tracks(&self, target: TargetPath) -> usize {
        self.tracks.iter().filter(|t| t.meta.target == target).count()
    }
}
