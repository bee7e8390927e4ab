//! Track retargeting
//!
//! Turns a classified motion-capture skeleton and clip into the form the
//! VRMA exporter expects: a scaled and grounded hierarchy under a synthetic
//! scaling root, plus a clip reduced to bone rotations and hips motion.

pub mod options;
pub mod retargeter;

pub use options::RetargetOptions;
pub use retargeter::{RetargetOutput, RetargetReport, SCALING_ROOT_NAME, retarget};
