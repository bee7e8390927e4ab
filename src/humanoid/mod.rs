//! Humanoid role classification
//!
//! - [`HumanBoneName`]: canonical VRM humanoid roles
//! - [`HumanoidRoleMap`]: role → bone table with uniqueness checks
//! - [`classifier`]: topology and rest-pose driven role assignment
//! - [`StructuralWarning`]: non-fatal classification surprises

pub mod bone_name;
pub mod classifier;
pub mod role_map;
pub mod warnings;

pub use bone_name::HumanBoneName;
pub use classifier::{Classification, classify};
pub use role_map::HumanoidRoleMap;
pub use warnings::StructuralWarning;
