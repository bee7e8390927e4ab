use glam::Vec3;
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::errors::{Result, RetargetError};
use crate::scene::BoneKey;
use crate::scene::bounds::BoundingBox;
use crate::scene::node::Bone;
use crate::scene::transform_system;

/// A bone hierarchy together with its derived world transforms.
///
/// # Storage
///
/// All nodes live in one arena. `bones` is the ordered *bone set* (the
/// bones that came from the source file); `scene_root` is an optional
/// synthetic node inserted above the skeleton root which is part of the
/// arena but not of the bone set.
///
/// # World transforms
///
/// World matrices are a cache derived from local transforms. Any mutable
/// access through [`Skeleton::bone_mut`] marks the cache stale; call
/// [`Skeleton::update_world_matrices`] before issuing world-space queries.
/// Debug builds assert on stale queries.
///
/// Cloning a skeleton yields an independent working copy whose [`BoneKey`]s
/// stay valid.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    pub name: String,

    nodes: SlotMap<BoneKey, Bone>,
    bones: Vec<BoneKey>,
    scene_root: Option<BoneKey>,

    stale: bool,
}

impl Skeleton {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: SlotMap::with_key(),
            bones: Vec::new(),
            scene_root: None,
            stale: false,
        }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Adds a bone to the bone set, attached under `parent` if given.
    pub fn add_bone(&mut self, bone: Bone, parent: Option<BoneKey>) -> BoneKey {
        let key = self.nodes.insert(bone);
        if let Some(parent_key) = parent {
            self.attach(key, parent_key);
        }
        self.bones.push(key);
        self.stale = true;
        key
    }

    /// Establishes a parent-child link. The child is appended to the
    /// parent's ordered children list.
    pub fn attach(&mut self, child: BoneKey, parent: BoneKey) {
        if let Some(old_parent) = self.nodes.get(child).and_then(|c| c.parent)
            && let Some(p) = self.nodes.get_mut(old_parent)
        {
            p.children.retain(|&k| k != child);
        }

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
        self.stale = true;
    }

    /// Inserts a synthetic node above `child` and records it as the scene
    /// root. The node is not a member of the bone set.
    pub fn insert_scene_root(&mut self, node: Bone, child: BoneKey) -> BoneKey {
        let key = self.nodes.insert(node);
        self.attach(child, key);
        self.scene_root = Some(key);
        self.stale = true;
        key
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn bone(&self, key: BoneKey) -> Option<&Bone> {
        self.nodes.get(key)
    }

    /// Mutable access to a node; marks world matrices stale.
    #[inline]
    pub fn bone_mut(&mut self, key: BoneKey) -> Option<&mut Bone> {
        self.stale = true;
        self.nodes.get_mut(key)
    }

    /// Ordered bone set (excludes the scene root).
    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[BoneKey] {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn scene_root(&self) -> Option<BoneKey> {
        self.scene_root
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, key: BoneKey) -> bool {
        self.nodes.contains_key(key)
    }

    #[must_use]
    pub fn name_of(&self, key: BoneKey) -> Option<&str> {
        self.nodes.get(key).map(|b| b.name.as_str())
    }

    #[must_use]
    pub fn children_of(&self, key: BoneKey) -> &[BoneKey] {
        self.nodes.get(key).map_or(&[], |b| b.children.as_slice())
    }

    #[must_use]
    pub fn parent_of(&self, key: BoneKey) -> Option<BoneKey> {
        self.nodes.get(key).and_then(|b| b.parent)
    }

    /// First bone of the bone set carrying `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<BoneKey> {
        self.bones
            .iter()
            .copied()
            .find(|&key| self.nodes[key].name == name)
    }

    // ========================================================================
    // Root discovery
    // ========================================================================

    /// Finds the unique bone whose parent is missing or outside the bone set.
    pub fn find_root(&self) -> Result<BoneKey> {
        let set: FxHashSet<BoneKey> = self.bones.iter().copied().collect();

        let mut roots = self.bones.iter().copied().filter(|&key| {
            self.nodes[key]
                .parent
                .is_none_or(|parent| !set.contains(&parent))
        });

        match (roots.next(), roots.next()) {
            (Some(root), None) => Ok(root),
            (None, _) => Err(RetargetError::InvalidSkeleton { roots: 0 }),
            (Some(_), Some(_)) => Err(RetargetError::InvalidSkeleton {
                roots: 2 + roots.count(),
            }),
        }
    }

    /// Topmost node of the whole arena: the scene root if present, otherwise
    /// the skeleton root.
    pub fn top(&self) -> Result<BoneKey> {
        match self.scene_root {
            Some(root) => Ok(root),
            None => self.find_root(),
        }
    }

    // ========================================================================
    // World transforms
    // ========================================================================

    /// Recomputes every stale world matrix.
    pub fn update_world_matrices(&mut self) {
        let roots: Vec<BoneKey> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(key, _)| key)
            .collect();
        transform_system::update_hierarchy_iterative(&mut self.nodes, &roots);
        self.stale = false;
    }

    #[inline]
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// World-space position of a node's origin.
    #[must_use]
    pub fn world_position(&self, key: BoneKey) -> Vec3 {
        debug_assert!(!self.stale, "world query on a stale skeleton");
        self.nodes
            .get(key)
            .map_or(Vec3::ZERO, |bone| bone.transform.world_position())
    }

    /// Tight world bounds of the bone set's origins (scene root excluded).
    #[must_use]
    pub fn compute_world_bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.bones.iter().map(|&key| self.world_position(key)))
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Depth-first pre-order listing of the subtree rooted at `start`.
    #[must_use]
    pub fn depth_first(&self, start: BoneKey) -> Vec<BoneKey> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![start];
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            order.push(key);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }
}
