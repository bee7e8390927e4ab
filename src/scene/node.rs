use crate::scene::BoneKey;
use crate::scene::transform::Transform;
use glam::{Affine3A, Vec3};

/// A single bone of a skeletal hierarchy.
///
/// # Hierarchy
///
/// Bones form a tree through parent-child relationships held in the owning
/// [`Skeleton`](crate::scene::Skeleton) arena:
/// - `children`: ordered child keys (the ownership edges of the tree)
/// - `parent`: back-reference used only for upward searches (None for roots)
///
/// # Naming
///
/// `name` comes straight from the source file. It is used to bind animation
/// tracks to bones and nothing else; classification never looks at it.
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,

    // === Core Hierarchy ===
    pub(crate) parent: Option<BoneKey>,
    pub(crate) children: Vec<BoneKey>,

    // === Core Spatial Data ===
    pub transform: Transform,
}

impl Bone {
    /// Creates a bone at the given parent-relative offset.
    #[must_use]
    pub fn new(name: impl Into<String>, offset: Vec3) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::from_offset(offset),
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<BoneKey> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[BoneKey] {
        &self.children
    }

    /// Parent-relative rest offset.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> Vec3 {
        self.transform.position
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}
