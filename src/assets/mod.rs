//! File formats: BVH and VRMA loaders, VRMA exporter.

pub mod exporters;
pub mod loaders;

pub use exporters::{ExporterPlugin, VrmAnimationPlugin, VrmaExporter};
pub use loaders::{BvhData, BvhLoader, VrmaDocument, VrmaLoader, load_vrma};
