//! BVH (Biovision Hierarchy) motion capture loader.
//!
//! Produces a [`Skeleton`] in rest pose plus an [`AnimationClip`] with one
//! rotation track per joint carrying rotation channels and one translation
//! track per joint carrying position channels. `End Site` blocks only mark
//! the tip of a chain and are not turned into bones.

use std::fs;
use std::path::Path;

use glam::{Quat, Vec3};

use crate::animation::{AnimationClip, InterpolationMode, KeyframeTrack, Track};
use crate::errors::{Result, RetargetError};
use crate::scene::{Bone, BoneKey, Skeleton};

/// Parsed BVH file.
#[derive(Debug, Clone)]
pub struct BvhData {
    pub skeleton: Skeleton,
    pub clip: AnimationClip,
    pub frame_count: usize,
    pub frame_time: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    XPosition,
    YPosition,
    ZPosition,
    XRotation,
    YRotation,
    ZRotation,
}

impl Channel {
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "xposition" => Some(Channel::XPosition),
            "yposition" => Some(Channel::YPosition),
            "zposition" => Some(Channel::ZPosition),
            "xrotation" => Some(Channel::XRotation),
            "yrotation" => Some(Channel::YRotation),
            "zrotation" => Some(Channel::ZRotation),
            _ => None,
        }
    }

    fn is_rotation(self) -> bool {
        matches!(self, Channel::XRotation | Channel::YRotation | Channel::ZRotation)
    }
}

struct Joint {
    name: String,
    offset: Vec3,
    channels: Vec<Channel>,
}

// ============================================================================
// Tokenizer
// ============================================================================

struct Tokens<'a> {
    tokens: Vec<(usize, &'a str)>,
    pos: usize,
    last_line: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let tokens: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .flat_map(|(i, line)| line.split_whitespace().map(move |token| (i + 1, token)))
            .collect();
        let last_line = text.lines().count().max(1);
        Self {
            tokens,
            pos: 0,
            last_line,
        }
    }

    /// Line of the next token, or the last line at end of input.
    fn line(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.last_line, |&(line, _)| line)
    }

    fn error(&self, message: impl Into<String>) -> RetargetError {
        RetargetError::BvhParse {
            line: self.line(),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(|&(_, token)| token)
    }

    fn next(&mut self) -> Result<&'a str> {
        let token = self.peek().ok_or_else(|| self.error("unexpected end of file"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, keyword: &str) -> Result<()> {
        let line = self.line();
        let token = self.next()?;
        if token.eq_ignore_ascii_case(keyword) {
            Ok(())
        } else {
            Err(RetargetError::BvhParse {
                line,
                message: format!("expected '{keyword}', found '{token}'"),
            })
        }
    }

    /// The remaining tokens on the line of the previously consumed token,
    /// joined by single spaces.
    fn rest_of_line(&mut self) -> Result<String> {
        let line = match self.pos.checked_sub(1) {
            Some(prev) => self.tokens[prev].0,
            None => self.line(),
        };
        let mut parts = Vec::new();
        while let Some(&(token_line, token)) = self.tokens.get(self.pos) {
            if token_line != line || token == "{" {
                break;
            }
            parts.push(token);
            self.pos += 1;
        }
        if parts.is_empty() {
            return Err(self.error("missing joint name"));
        }
        Ok(parts.join(" "))
    }

    fn next_f32(&mut self) -> Result<f32> {
        let line = self.line();
        let token = self.next()?;
        token.parse().map_err(|_| RetargetError::BvhParse {
            line,
            message: format!("expected a number, found '{token}'"),
        })
    }

    fn next_usize(&mut self) -> Result<usize> {
        let line = self.line();
        let token = self.next()?;
        token.parse().map_err(|_| RetargetError::BvhParse {
            line,
            message: format!("expected a count, found '{token}'"),
        })
    }

    fn next_vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(self.next_f32()?, self.next_f32()?, self.next_f32()?))
    }
}

// ============================================================================
// Loader
// ============================================================================

pub struct BvhLoader;

impl BvhLoader {
    /// Reads and parses a BVH file from disk.
    pub fn load(path: &Path) -> Result<BvhData> {
        let text = fs::read_to_string(path)?;
        let mut data = Self::parse(&text)?;
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            data.skeleton.name = stem.to_string();
            data.clip.name = stem.to_string();
        }
        Ok(data)
    }

    /// Parses BVH text.
    pub fn parse(text: &str) -> Result<BvhData> {
        let mut loader = BvhParser {
            tokens: Tokens::new(text),
            skeleton: Skeleton::new("bvh"),
            joints: Vec::new(),
        };

        loader.tokens.expect("HIERARCHY")?;
        loader.tokens.expect("ROOT")?;
        loader.parse_joint(None)?;

        loader.tokens.expect("MOTION")?;
        loader.tokens.expect("Frames:")?;
        let frame_count = loader.tokens.next_usize()?;
        loader.tokens.expect("Frame")?;
        loader.tokens.expect("Time:")?;
        let frame_time = loader.tokens.next_f32()?;
        if frame_count > 1 && frame_time <= 0.0 {
            return Err(loader.tokens.error("frame time must be positive"));
        }

        let clip = loader.parse_motion(frame_count, frame_time)?;
        loader.skeleton.update_world_matrices();

        log::debug!(
            "Parsed BVH: {} joints, {} frames at {frame_time}s",
            loader.joints.len(),
            frame_count
        );

        Ok(BvhData {
            skeleton: loader.skeleton,
            clip,
            frame_count,
            frame_time,
        })
    }
}

struct BvhParser<'a> {
    tokens: Tokens<'a>,
    skeleton: Skeleton,
    joints: Vec<Joint>,
}

impl BvhParser<'_> {
    /// Parses the body of a `ROOT`/`JOINT` block, the keyword already consumed.
    fn parse_joint(&mut self, parent: Option<BoneKey>) -> Result<()> {
        let name = self.tokens.rest_of_line()?;
        self.tokens.expect("{")?;
        self.tokens.expect("OFFSET")?;
        let offset = self.tokens.next_vec3()?;

        let mut channels = Vec::new();
        if self.tokens.peek().is_some_and(|t| t.eq_ignore_ascii_case("CHANNELS")) {
            self.tokens.next()?;
            let count = self.tokens.next_usize()?;
            for _ in 0..count {
                let line = self.tokens.line();
                let token = self.tokens.next()?;
                let channel = Channel::parse(token).ok_or_else(|| RetargetError::BvhParse {
                    line,
                    message: format!("unknown channel '{token}'"),
                })?;
                channels.push(channel);
            }
        }

        let key = self.skeleton.add_bone(Bone::new(name.clone(), offset), parent);
        self.joints.push(Joint {
            name,
            offset,
            channels,
        });

        loop {
            let token = self.tokens.next()?;
            match token.to_ascii_uppercase().as_str() {
                "JOINT" => self.parse_joint(Some(key))?,
                "END" => self.skip_end_site()?,
                "}" => return Ok(()),
                _ => {
                    self.tokens.pos -= 1;
                    return Err(self.tokens.error(format!("unexpected token '{token}'")));
                }
            }
        }
    }

    fn skip_end_site(&mut self) -> Result<()> {
        self.tokens.expect("Site")?;
        self.tokens.expect("{")?;
        self.tokens.expect("OFFSET")?;
        self.tokens.next_vec3()?;
        self.tokens.expect("}")
    }

    fn parse_motion(&mut self, frame_count: usize, frame_time: f32) -> Result<AnimationClip> {
        let times: Vec<f32> = (0..frame_count).map(|i| i as f32 * frame_time).collect();

        let mut positions: Vec<Vec<Vec3>> = self
            .joints
            .iter()
            .map(|_| Vec::with_capacity(frame_count))
            .collect();
        let mut rotations: Vec<Vec<Quat>> = self
            .joints
            .iter()
            .map(|_| Vec::with_capacity(frame_count))
            .collect();

        for _ in 0..frame_count {
            for (index, joint) in self.joints.iter().enumerate() {
                let mut position = joint.offset;
                let mut rotation = Quat::IDENTITY;

                for &channel in &joint.channels {
                    let value = self.tokens.next_f32()?;
                    match channel {
                        Channel::XPosition => position.x += value,
                        Channel::YPosition => position.y += value,
                        Channel::ZPosition => position.z += value,
                        Channel::XRotation => rotation *= Quat::from_rotation_x(value.to_radians()),
                        Channel::YRotation => rotation *= Quat::from_rotation_y(value.to_radians()),
                        Channel::ZRotation => rotation *= Quat::from_rotation_z(value.to_radians()),
                    }
                }

                positions[index].push(position);
                rotations[index].push(rotation.normalize());
            }
        }

        if let Some(token) = self.tokens.peek() {
            log::warn!(
                "Ignoring trailing data after {frame_count} frames (line {}: '{token}')",
                self.tokens.line()
            );
        }

        let mut tracks = Vec::new();
        if frame_count > 0 {
            for ((joint, joint_positions), joint_rotations) in
                self.joints.iter().zip(positions).zip(rotations)
            {
                if joint.channels.iter().any(|c| !c.is_rotation()) {
                    tracks.push(Track::translation(
                        joint.name.clone(),
                        KeyframeTrack::new(times.clone(), joint_positions, InterpolationMode::Linear),
                    ));
                }
                if joint.channels.iter().any(|c| c.is_rotation()) {
                    tracks.push(Track::rotation(
                        joint.name.clone(),
                        KeyframeTrack::new(times.clone(), joint_rotations, InterpolationMode::Linear),
                    ));
                }
            }
        }

        Ok(AnimationClip::new("bvh".to_string(), tracks))
    }
}
