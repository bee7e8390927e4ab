#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod assets;
pub mod convert;
pub mod errors;
pub mod humanoid;
pub mod retarget;
pub mod scene;

pub use animation::{AnimationClip, KeyframeTrack, Track};
pub use assets::{BvhLoader, VrmaExporter, load_vrma};
pub use convert::{Conversion, ConvertOptions, convert, convert_bvh};
pub use errors::{ClassifierError, Result, RetargetError};
pub use humanoid::{HumanBoneName, HumanoidRoleMap, StructuralWarning};
pub use retarget::RetargetOptions;
pub use scene::{Bone, BoneKey, Skeleton};
