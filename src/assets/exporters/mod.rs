pub mod vrma;

pub use vrma::{ExportContext, ExporterPlugin, VRMC_VRM_ANIMATION, VrmAnimationPlugin, VrmaExporter};
