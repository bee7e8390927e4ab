//! Skeletal hierarchy module
//!
//! - [`Bone`]: a node with a parent-relative transform
//! - [`Transform`]: TRS component with cached local/world matrices
//! - [`Skeleton`]: bone arena, ordered bone set and root discovery
//! - [`transform_system`]: world matrix propagation
//! - [`search`]: early-exit breadth-first / ancestor searches

pub mod bounds;
pub mod node;
pub mod search;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use bounds::BoundingBox;
pub use node::Bone;
pub use search::{Traversal, find_first};
pub use skeleton::Skeleton;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    /// Stable handle of a node inside a [`Skeleton`] arena.
    pub struct BoneKey;
}
