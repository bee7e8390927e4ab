//! Conversion entry points
//!
//! [`convert`] runs root discovery, humanoid classification and track
//! retargeting on an in-memory skeleton and clip; [`Conversion::to_vrma`]
//! serialises the result. [`convert_bvh`] chains everything from BVH text to
//! VRMA bytes.
//!
//! ```rust,ignore
//! let bytes = vrma::convert_bvh(&text, &ConvertOptions::default())?;
//! std::fs::write("motion.vrma", bytes)?;
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::AnimationClip;
use crate::assets::exporters::VrmaExporter;
use crate::assets::loaders::BvhLoader;
use crate::errors::Result;
use crate::humanoid::{HumanoidRoleMap, StructuralWarning, classify};
use crate::retarget::{RetargetOptions, RetargetOutput, retarget};
use crate::scene::Skeleton;

/// Options for a whole conversion. Loadable from JSON; missing fields take
/// their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    #[serde(flatten)]
    pub retarget: RetargetOptions,
}

impl ConvertOptions {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// A classified and retargeted motion, ready for export.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub roles: HumanoidRoleMap,
    pub warnings: Vec<StructuralWarning>,
    pub output: RetargetOutput,
}

impl Conversion {
    /// Encodes the conversion as a VRM Animation (GLB) file.
    pub fn to_vrma(&self) -> Result<Vec<u8>> {
        VrmaExporter::export(
            &self.output.skeleton,
            self.output.scene_root,
            &self.output.clip,
            &self.roles,
        )
    }
}

/// Classifies `skeleton` and retargets `clip` onto the humanoid convention.
///
/// The inputs are left untouched; all work happens on copies.
pub fn convert(skeleton: &Skeleton, clip: &AnimationClip, options: &ConvertOptions) -> Result<Conversion> {
    clip.validate()?;

    let mut working = skeleton.clone();
    working.update_world_matrices();

    let root = working.find_root()?;
    let classification = classify(&working, root)?;
    log::debug!(
        "Classified {} humanoid bones ({} warnings)",
        classification.roles.len(),
        classification.warnings.len()
    );

    let output = retarget(&working, clip, &classification.roles, &options.retarget)?;

    Ok(Conversion {
        roles: classification.roles,
        warnings: classification.warnings,
        output,
    })
}

/// BVH text in, VRMA bytes out.
pub fn convert_bvh(text: &str, options: &ConvertOptions) -> Result<Vec<u8>> {
    let data = BvhLoader::parse(text)?;
    convert(&data.skeleton, &data.clip, options)?.to_vrma()
}
