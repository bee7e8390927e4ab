use std::borrow::Cow;

use glam::{Quat, Vec3};
use gltf::json::{self, Index, validation::Checked::Valid, validation::USize64};
use rustc_hash::FxHashMap;
use serde_json::json;

use crate::animation::{AnimationClip, InterpolationMode, TargetPath, Track, TrackData};
use crate::errors::{Result, RetargetError};
use crate::humanoid::HumanoidRoleMap;
use crate::scene::{BoneKey, Skeleton};

/// Root-level extension carrying the humanoid bone table.
pub const VRMC_VRM_ANIMATION: &str = "VRMC_vrm_animation";

// ============================================================================
// Plugin Architecture
// ============================================================================

/// State handed to [`ExporterPlugin`]s once nodes, accessors and animation
/// have been assembled.
pub struct ExportContext<'a> {
    pub skeleton: &'a Skeleton,
    node_indices: &'a FxHashMap<BoneKey, usize>,
    root: &'a mut json::Root,
}

impl ExportContext<'_> {
    /// glTF node index of a skeleton node, if it was emitted.
    #[must_use]
    pub fn node_index(&self, key: BoneKey) -> Option<usize> {
        self.node_indices.get(&key).copied()
    }

    /// Attaches a root-level extension object and declares it as used.
    pub fn add_extension(&mut self, name: &str, value: serde_json::Value) {
        if !self.root.extensions_used.iter().any(|used| used == name) {
            self.root.extensions_used.push(name.to_string());
        }
        self.root
            .extensions
            .get_or_insert_with(Default::default)
            .others
            .insert(name.to_string(), value);
    }
}

/// Export extension hook.
pub trait ExporterPlugin {
    fn name(&self) -> &str;

    /// Called after the document is assembled, before it is serialised.
    fn on_export_document(&mut self, _ctx: &mut ExportContext) -> Result<()> {
        Ok(())
    }
}

/// Writes the `VRMC_vrm_animation` humanoid table.
pub struct VrmAnimationPlugin {
    roles: HumanoidRoleMap,
}

impl VrmAnimationPlugin {
    #[must_use]
    pub fn new(roles: HumanoidRoleMap) -> Self {
        Self { roles }
    }
}

impl ExporterPlugin for VrmAnimationPlugin {
    fn name(&self) -> &str {
        VRMC_VRM_ANIMATION
    }

    fn on_export_document(&mut self, ctx: &mut ExportContext) -> Result<()> {
        let indices = self.roles.resolve(|key| ctx.node_index(key)).map_err(|(role, key)| {
            RetargetError::Export(format!(
                "bone '{}' mapped to '{role}' is not part of the exported hierarchy",
                ctx.skeleton.name_of(key).unwrap_or("<unknown>")
            ))
        })?;

        let human_bones: serde_json::Map<String, serde_json::Value> = indices
            .into_iter()
            .map(|(role, node)| (role.as_str().to_string(), json!({ "node": node })))
            .collect();

        ctx.add_extension(
            VRMC_VRM_ANIMATION,
            json!({
                "specVersion": "1.0",
                "humanoid": { "humanBones": human_bones },
            }),
        );
        Ok(())
    }
}

// ============================================================================
// Exporter
// ============================================================================

/// Serialises a hierarchy and clip into a binary glTF (GLB) container.
pub struct VrmaExporter {
    plugins: Vec<Box<dyn ExporterPlugin>>,
}

impl Default for VrmaExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl VrmaExporter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    pub fn register_plugin(&mut self, plugin: Box<dyn ExporterPlugin>) {
        log::debug!("Registered exporter plugin '{}'", plugin.name());
        self.plugins.push(plugin);
    }

    /// Writes a VRM Animation file: the hierarchy under `scene_root`, the
    /// clip, and the humanoid table of `roles`.
    pub fn export(
        skeleton: &Skeleton,
        scene_root: BoneKey,
        clip: &AnimationClip,
        roles: &HumanoidRoleMap,
    ) -> Result<Vec<u8>> {
        let mut exporter = Self::new();
        exporter.register_plugin(Box::new(VrmAnimationPlugin::new(roles.clone())));
        exporter.write(skeleton, scene_root, clip)
    }

    /// Writes the hierarchy and clip, running every registered plugin.
    pub fn write(
        &mut self,
        skeleton: &Skeleton,
        scene_root: BoneKey,
        clip: &AnimationClip,
    ) -> Result<Vec<u8>> {
        if !skeleton.contains(scene_root) {
            return Err(RetargetError::Export("scene root is not a node of the skeleton".to_string()));
        }

        let mut builder = DocumentBuilder::default();

        // 1. Nodes, depth-first pre-order
        let order = skeleton.depth_first(scene_root);
        let node_indices: FxHashMap<BoneKey, usize> =
            order.iter().enumerate().map(|(index, &key)| (key, index)).collect();

        for &key in &order {
            let Some(bone) = skeleton.bone(key) else {
                continue;
            };
            let transform = &bone.transform;
            let children: Vec<Index<json::Node>> = bone
                .children()
                .iter()
                .filter_map(|c| node_indices.get(c))
                .map(|&index| Index::new(index as u32))
                .collect();
            builder.root.push(json::Node {
                name: Some(bone.name.clone()),
                translation: Some(transform.position.to_array()),
                rotation: (transform.rotation != Quat::IDENTITY)
                    .then(|| json::scene::UnitQuaternion(transform.rotation.to_array())),
                scale: (transform.scale != Vec3::ONE).then(|| transform.scale.to_array()),
                children: (!children.is_empty()).then_some(children),
                ..Default::default()
            });
        }

        // 2. Animation; tracks bind to bone-set members only, never the scene root
        let mut name_to_node: FxHashMap<&str, usize> = FxHashMap::default();
        for &key in skeleton.bones() {
            if let (Some(name), Some(&index)) = (skeleton.name_of(key), node_indices.get(&key)) {
                name_to_node.entry(name).or_insert(index);
            }
        }
        builder.add_animation(clip, &name_to_node);

        let (mut root, bin) = builder.finish();

        // 3. Extensions
        let mut ctx = ExportContext {
            skeleton,
            node_indices: &node_indices,
            root: &mut root,
        };
        for plugin in &mut self.plugins {
            plugin.on_export_document(&mut ctx)?;
        }

        encode_glb(&root, bin)
    }
}

// ============================================================================
// Document assembly
// ============================================================================

#[derive(Default)]
struct DocumentBuilder {
    root: json::Root,
    bin: Vec<u8>,
    /// Time accessors keyed by the bit patterns of their key times.
    time_accessors: FxHashMap<Vec<u32>, Index<json::Accessor>>,
}

impl DocumentBuilder {
    fn add_animation(&mut self, clip: &AnimationClip, name_to_node: &FxHashMap<&str, usize>) {
        let mut channels = Vec::new();
        let mut samplers = Vec::new();

        for track in &clip.tracks {
            let Some(&node) = name_to_node.get(track.meta.node_name.as_str()) else {
                log::warn!(
                    "Skipping {} track of '{}': no such node in the hierarchy",
                    track.meta.target.as_gltf_str(),
                    track.meta.node_name
                );
                continue;
            };
            if track.data.times().is_empty() {
                log::warn!("Skipping empty track of '{}'", track.meta.node_name);
                continue;
            }

            let (output, interpolation) = self.add_track_values(track);
            let input = self.add_times(track.data.times());

            let sampler = Index::push(
                &mut samplers,
                json::animation::Sampler {
                    input,
                    output,
                    interpolation: Valid(interpolation),
                    extensions: None,
                    extras: Default::default(),
                },
            );
            channels.push(json::animation::Channel {
                sampler,
                target: json::animation::Target {
                    node: Index::new(node as u32),
                    path: Valid(property(track.meta.target)),
                    extensions: None,
                    extras: Default::default(),
                },
                extensions: None,
                extras: Default::default(),
            });
        }

        if channels.is_empty() {
            log::warn!("Clip '{}' has no exportable tracks", clip.name);
            return;
        }
        self.root.push(json::Animation {
            name: Some(clip.name.clone()),
            channels,
            samplers,
            extensions: None,
            extras: Default::default(),
        });
    }

    fn add_times(&mut self, times: &[f32]) -> Index<json::Accessor> {
        let key: Vec<u32> = times.iter().map(|t| t.to_bits()).collect();
        if let Some(&accessor) = self.time_accessors.get(&key) {
            return accessor;
        }

        let min = times.iter().copied().fold(f32::INFINITY, f32::min);
        let max = times.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let accessor = self.push_accessor(
            times,
            times.len(),
            json::accessor::Type::Scalar,
            Some((json!([min]), json!([max]))),
        );
        self.time_accessors.insert(key, accessor);
        accessor
    }

    fn add_track_values(&mut self, track: &Track) -> (Index<json::Accessor>, json::animation::Interpolation) {
        match &track.data {
            TrackData::Vector3(values) => {
                let floats: Vec<f32> = values.values.iter().flat_map(|v| v.to_array()).collect();
                let accessor = self.push_accessor(&floats, values.values.len(), json::accessor::Type::Vec3, None);
                (accessor, interpolation(values.interpolation))
            }
            TrackData::Quaternion(values) => {
                let floats: Vec<f32> = values.values.iter().flat_map(|q| q.to_array()).collect();
                let accessor = self.push_accessor(&floats, values.values.len(), json::accessor::Type::Vec4, None);
                (accessor, interpolation(values.interpolation))
            }
        }
    }

    fn push_accessor(
        &mut self,
        floats: &[f32],
        count: usize,
        kind: json::accessor::Type,
        bounds: Option<(serde_json::Value, serde_json::Value)>,
    ) -> Index<json::Accessor> {
        let byte_offset = self.bin.len();
        self.bin.extend(floats.iter().flat_map(|f| f.to_le_bytes()));

        let view = self.root.push(json::buffer::View {
            buffer: Index::new(0),
            byte_length: USize64::from(self.bin.len() - byte_offset),
            byte_offset: Some(USize64::from(byte_offset)),
            byte_stride: None,
            name: None,
            target: None,
            extensions: None,
            extras: Default::default(),
        });

        let (min, max) = bounds.unzip();
        self.root.push(json::Accessor {
            buffer_view: Some(view),
            byte_offset: None,
            count: USize64::from(count),
            component_type: Valid(json::accessor::GenericComponentType(json::accessor::ComponentType::F32)),
            type_: Valid(kind),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
            extensions: None,
            extras: Default::default(),
        })
    }

    fn finish(mut self) -> (json::Root, Vec<u8>) {
        if !self.bin.is_empty() {
            self.root.push(json::Buffer {
                byte_length: USize64::from(self.bin.len()),
                name: None,
                uri: None,
                extensions: None,
                extras: Default::default(),
            });
        }

        let nodes = if self.root.nodes.is_empty() {
            Vec::new()
        } else {
            vec![Index::new(0)]
        };
        let scene = self.root.push(json::Scene {
            name: None,
            nodes,
            extensions: None,
            extras: Default::default(),
        });
        self.root.scene = Some(scene);
        self.root.asset.generator = Some(concat!("vrma-forge ", env!("CARGO_PKG_VERSION")).to_string());

        (self.root, self.bin)
    }
}

fn interpolation(mode: InterpolationMode) -> json::animation::Interpolation {
    match mode {
        InterpolationMode::Linear => json::animation::Interpolation::Linear,
        InterpolationMode::Step => json::animation::Interpolation::Step,
        InterpolationMode::CubicSpline => json::animation::Interpolation::CubicSpline,
    }
}

fn property(target: TargetPath) -> json::animation::Property {
    match target {
        TargetPath::Translation => json::animation::Property::Translation,
        TargetPath::Rotation => json::animation::Property::Rotation,
        TargetPath::Scale => json::animation::Property::Scale,
    }
}

// ============================================================================
// GLB container
// ============================================================================

fn encode_glb(root: &json::Root, bin: Vec<u8>) -> Result<Vec<u8>> {
    let json = json::serialize::to_vec(root)?;

    // `to_vec` pads both chunks and writes the final length
    let glb = gltf::binary::Glb {
        header: gltf::binary::Header {
            magic: *b"glTF",
            version: 2,
            length: 0,
        },
        json: Cow::Owned(json),
        bin: (!bin.is_empty()).then_some(Cow::Owned(bin)),
    };
    Ok(glb.to_vec()?)
}
