pub mod bvh;
pub mod vrma;

pub use bvh::{BvhData, BvhLoader};
pub use vrma::{VrmaDocument, VrmaLoader, load_vrma};
