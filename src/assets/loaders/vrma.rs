use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use glam::{Quat, Vec3};
use serde_json::Value;

use crate::animation::{AnimationClip, InterpolationMode, KeyframeTrack, Track};
use crate::assets::exporters::VRMC_VRM_ANIMATION;
use crate::errors::{Result, RetargetError};
use crate::humanoid::{HumanBoneName, HumanoidRoleMap};
use crate::scene::{Bone, BoneKey, Skeleton};

/// Contents of a VRM Animation file.
#[derive(Debug, Clone)]
pub struct VrmaDocument {
    /// Every node of the file in file order. A single top-level node that is
    /// not a humanoid bone becomes the skeleton's scene root instead of a bone.
    pub skeleton: Skeleton,
    /// The first animation, or an empty clip when the file has none.
    pub clip: AnimationClip,
    pub spec_version: Option<String>,
    /// Humanoid role → node name.
    pub human_bones: BTreeMap<HumanBoneName, String>,
    /// Humanoid role → loaded node.
    pub human_bone_keys: BTreeMap<HumanBoneName, BoneKey>,
}

impl VrmaDocument {
    /// Resolves the humanoid table against the loaded skeleton.
    pub fn role_map(&self) -> Result<HumanoidRoleMap> {
        let mut roles = HumanoidRoleMap::new();
        for (&role, &key) in &self.human_bone_keys {
            roles.insert(role, key)?;
        }
        Ok(roles)
    }
}

/// Reads a binary glTF file carrying `VRMC_vrm_animation`.
pub fn load_vrma(bytes: &[u8]) -> Result<VrmaDocument> {
    VrmaLoader::parse(bytes)
}

pub struct VrmaLoader;

impl VrmaLoader {
    pub fn load(path: &Path) -> Result<VrmaDocument> {
        let bytes = fs::read(path)?;
        Self::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> Result<VrmaDocument> {
        let glb = gltf::binary::Glb::from_slice(bytes)?;
        let gltf = gltf::Gltf::from_slice_without_validation(bytes)?;

        let used_not_supported: Vec<_> = gltf
            .extensions_used()
            .filter(|ext| *ext != VRMC_VRM_ANIMATION)
            .collect();
        if !used_not_supported.is_empty() {
            log::warn!("File uses unsupported extensions: {used_not_supported:?}");
        }

        let buffers = Self::load_buffers(&gltf)?;

        // 1. Humanoid extension
        let root: Value = serde_json::from_slice(&glb.json)?;
        let extension = root
            .get("extensions")
            .and_then(|exts| exts.get(VRMC_VRM_ANIMATION));
        let spec_version = extension
            .and_then(|ext| ext.get("specVersion"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let human_nodes = match extension {
            Some(ext) => Self::read_human_bones(ext, gltf.nodes().count())?,
            None => {
                log::warn!("File has no {VRMC_VRM_ANIMATION} extension");
                BTreeMap::new()
            }
        };

        // 2. Nodes and hierarchy
        let scene_root = Self::find_scene_root(&gltf, &human_nodes);
        let mut skeleton = Skeleton::new("vrma");
        let node_mapping = Self::load_nodes(&gltf, scene_root, &mut skeleton);
        skeleton.update_world_matrices();

        // 3. Animation
        let clip = match gltf.animations().next() {
            Some(anim) => Self::load_animation(&anim, &buffers, &skeleton, &node_mapping)?,
            None => AnimationClip::new("animation".to_string(), Vec::new()),
        };

        let human_bone_keys: BTreeMap<HumanBoneName, BoneKey> = human_nodes
            .iter()
            .map(|(&role, &index)| (role, node_mapping[index]))
            .collect();
        let human_bones = human_bone_keys
            .iter()
            .map(|(&role, &key)| (role, skeleton.name_of(key).unwrap_or_default().to_string()))
            .collect();

        Ok(VrmaDocument {
            skeleton,
            clip,
            spec_version,
            human_bones,
            human_bone_keys,
        })
    }

    /// The wrapper node above the humanoid hierarchy: the only top-level
    /// node of the scene, with children, and not itself a humanoid bone.
    fn find_scene_root(gltf: &gltf::Gltf, human_nodes: &BTreeMap<HumanBoneName, usize>) -> Option<usize> {
        let scene = gltf.default_scene().or_else(|| gltf.scenes().next())?;
        let mut tops = scene.nodes();
        let top = match (tops.next(), tops.next()) {
            (Some(top), None) => top,
            _ => return None,
        };
        let is_human = human_nodes.values().any(|&index| index == top.index());
        (!is_human && top.children().next().is_some()).then_some(top.index())
    }

    /// Adds every node to `skeleton` and links the hierarchy. Returns the
    /// key of each node by glTF index.
    fn load_nodes(gltf: &gltf::Gltf, scene_root: Option<usize>, skeleton: &mut Skeleton) -> Vec<BoneKey> {
        let mut node_mapping: Vec<Option<BoneKey>> = vec![None; gltf.nodes().count()];
        for node in gltf.nodes() {
            if Some(node.index()) != scene_root {
                node_mapping[node.index()] = Some(skeleton.add_bone(Self::create_bone(&node), None));
            }
        }

        if let Some(node) = scene_root.and_then(|index| gltf.nodes().nth(index)) {
            let mut children = node.children().filter_map(|child| node_mapping[child.index()]);
            if let Some(first) = children.next() {
                let key = skeleton.insert_scene_root(Self::create_bone(&node), first);
                for child in children {
                    skeleton.attach(child, key);
                }
                node_mapping[node.index()] = Some(key);
            }
        }

        let node_mapping: Vec<BoneKey> = node_mapping
            .into_iter()
            .map(|key| key.unwrap_or_default())
            .collect();
        for node in gltf.nodes() {
            if Some(node.index()) == scene_root {
                continue;
            }
            let parent = node_mapping[node.index()];
            for child in node.children() {
                skeleton.attach(node_mapping[child.index()], parent);
            }
        }
        node_mapping
    }

    fn load_buffers(gltf: &gltf::Gltf) -> Result<Vec<Vec<u8>>> {
        gltf.buffers()
            .map(|buffer| match buffer.source() {
                gltf::buffer::Source::Bin => gltf
                    .blob
                    .clone()
                    .ok_or_else(|| RetargetError::Gltf("missing binary chunk".to_string())),
                gltf::buffer::Source::Uri(uri) => {
                    Err(RetargetError::Gltf(format!("external buffer '{uri}' is not supported")))
                }
            })
            .collect()
    }

    fn create_bone(node: &gltf::Node) -> Bone {
        let name = node
            .name()
            .map_or_else(|| format!("Node_{}", node.index()), str::to_string);
        let (translation, rotation, scale) = node.transform().decomposed();

        let mut bone = Bone::new(name, Vec3::from_array(translation));
        bone.transform.rotation = Quat::from_array(rotation);
        bone.transform.scale = Vec3::from_array(scale);
        bone
    }

    fn load_animation(
        anim: &gltf::Animation,
        buffers: &[Vec<u8>],
        skeleton: &Skeleton,
        node_mapping: &[BoneKey],
    ) -> Result<AnimationClip> {
        let mut tracks = Vec::new();

        for channel in anim.channels() {
            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let target = channel.target();
            let Some(&key) = node_mapping.get(target.node().index()) else {
                continue;
            };
            if skeleton.scene_root() == Some(key) {
                log::warn!("Ignoring channel on the scene root node");
                continue;
            }
            let node_name = skeleton.name_of(key).unwrap_or_default().to_string();

            let times: Vec<f32> = reader
                .read_inputs()
                .ok_or_else(|| RetargetError::Gltf(format!("channel of '{node_name}' has no inputs")))?
                .collect();
            let outputs = reader
                .read_outputs()
                .ok_or_else(|| RetargetError::Gltf(format!("channel of '{node_name}' has no outputs")))?;

            let interpolation = match channel.sampler().interpolation() {
                gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                gltf::animation::Interpolation::Step => InterpolationMode::Step,
                gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
            };

            let track = match outputs {
                gltf::animation::util::ReadOutputs::Translations(iter) => Track::translation(
                    node_name,
                    KeyframeTrack::new(times, iter.map(Vec3::from_array).collect(), interpolation),
                ),
                gltf::animation::util::ReadOutputs::Rotations(iter) => Track::rotation(
                    node_name,
                    KeyframeTrack::new(times, iter.into_f32().map(Quat::from_array).collect(), interpolation),
                ),
                gltf::animation::util::ReadOutputs::Scales(_)
                | gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => {
                    log::debug!("Ignoring non-skeletal channel of '{node_name}'");
                    continue;
                }
            };
            tracks.push(track);
        }

        Ok(AnimationClip::new(
            anim.name().unwrap_or("animation").to_string(),
            tracks,
        ))
    }

    /// Humanoid role → glTF node index.
    fn read_human_bones(extension: &Value, node_count: usize) -> Result<BTreeMap<HumanBoneName, usize>> {
        let Some(bones) = extension
            .get("humanoid")
            .and_then(|h| h.get("humanBones"))
            .and_then(Value::as_object)
        else {
            return Ok(BTreeMap::new());
        };

        let mut human_nodes = BTreeMap::new();
        for (role_name, entry) in bones {
            let Ok(role) = HumanBoneName::from_str(role_name) else {
                log::debug!("Ignoring humanoid bone '{role_name}'");
                continue;
            };
            let index = entry
                .get("node")
                .and_then(Value::as_u64)
                .and_then(|index| usize::try_from(index).ok())
                .filter(|&index| index < node_count)
                .ok_or_else(|| {
                    RetargetError::Gltf(format!("humanoid bone '{role_name}' has an invalid node index"))
                })?;
            human_nodes.insert(role, index);
        }
        Ok(human_nodes)
    }
}
