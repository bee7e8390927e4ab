use serde::{Deserialize, Serialize};

/// Tuning knobs of the track retargeter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetOptions {
    /// Uniform scale carried by the scaling root node. Motion-capture data is
    /// usually authored in centimetres; the default converts to metres.
    pub scale: f32,

    /// Subtract the hips rest offset from the hips translation track.
    pub remove_root_offset: bool,
}

impl RetargetOptions {
    pub const DEFAULT_SCALE: f32 = 0.01;
}

impl Default for RetargetOptions {
    fn default() -> Self {
        Self {
            scale: Self::DEFAULT_SCALE,
            remove_root_offset: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let options: RetargetOptions = serde_json::from_str(r#"{ "scale": 0.5 }"#).unwrap();
        assert!((options.scale - 0.5).abs() < f32::EPSILON);
        assert!(options.remove_root_offset);

        let options: RetargetOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RetargetOptions::default());
    }
}
