/// Defines the target property for animation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation, // Maps to transform.position
    Rotation,    // Maps to transform.rotation
    Scale,       // Maps to transform.scale
}

impl TargetPath {
    /// glTF `animation.channel.target.path` keyword.
    #[must_use]
    pub fn as_gltf_str(self) -> &'static str {
        match self {
            TargetPath::Translation => "translation",
            TargetPath::Rotation => "rotation",
            TargetPath::Scale => "scale",
        }
    }

    /// Parses a property suffix, accepting both glTF and scene-graph spellings.
    #[must_use]
    pub fn from_property(property: &str) -> Option<Self> {
        match property {
            "translation" | "position" => Some(TargetPath::Translation),
            "rotation" | "quaternion" => Some(TargetPath::Rotation),
            "scale" => Some(TargetPath::Scale),
            _ => None,
        }
    }
}

/// Strips container decoration from a track's bone identifier.
///
/// Binding paths produced by scene-graph animation systems address bones as
/// `.bones[Name]` or `bones[Name]`; the bare bone name is what remains
/// between the brackets. Undecorated names are returned unchanged.
///
/// ```
/// use vrma::animation::binding::bare_bone_name;
///
/// assert_eq!(bare_bone_name(".bones[Hips]"), "Hips");
/// assert_eq!(bare_bone_name("bones[LeftArm]"), "LeftArm");
/// assert_eq!(bare_bone_name("Spine"), "Spine");
/// ```
#[must_use]
pub fn bare_bone_name(name: &str) -> &str {
    let trimmed = name.strip_prefix('.').unwrap_or(name);
    trimmed
        .strip_prefix("bones[")
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(name)
}

/// Splits a full binding path such as `.bones[Hips].position` into the bare
/// bone name and its target property.
#[must_use]
pub fn parse_binding_path(path: &str) -> Option<(&str, TargetPath)> {
    let (node, property) = path.rsplit_once('.')?;
    let target = TargetPath::from_property(property)?;
    let node = bare_bone_name(node);
    (!node.is_empty()).then_some((node, target))
}

/// Bone name a track addresses, whether written bare, bracketed, or as a
/// full binding path with a property suffix.
#[must_use]
pub fn track_bone_name(name: &str) -> &str {
    parse_binding_path(name).map_or_else(|| bare_bone_name(name), |(bone, _)| bone)
}
