//! Transform System
//!
//! Propagates local transforms down a bone hierarchy into world matrices.
//! Kept apart from [`Skeleton`](crate::scene::Skeleton) so that it only
//! borrows the bone arena, never the whole skeleton.
//!
//! A bone's world matrix is rebuilt when its own local transform changed or
//! when any ancestor's world matrix was rebuilt in the same pass.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::BoneKey;
use crate::scene::node::Bone;

/// Updates world matrices for every tree hanging from `roots`.
///
/// Uses an explicit stack instead of recursion so deep rigs cannot overflow.
pub fn update_hierarchy_iterative(bones: &mut SlotMap<BoneKey, Bone>, roots: &[BoneKey]) {
    // Work stack: (bone, parent world matrix, parent changed)
    let mut stack: Vec<(BoneKey, Affine3A, bool)> = Vec::with_capacity(64);

    for &root in roots.iter().rev() {
        let parent_world = parent_world_matrix(bones, root);
        stack.push((root, parent_world, false));
    }

    while let Some((key, parent_world, parent_changed)) = stack.pop() {
        let Some(bone) = bones.get_mut(key) else {
            continue;
        };

        let local_changed = bone.transform.update_local_matrix();
        let world_needs_update = local_changed || parent_changed;

        if world_needs_update {
            let new_world = parent_world * *bone.transform.local_matrix();
            bone.transform.set_world_matrix(new_world);
        }

        let current_world = bone.transform.world_matrix;

        // Reverse push keeps children in declaration order.
        for &child in bone.children.iter().rev() {
            stack.push((child, current_world, world_needs_update));
        }
    }
}

fn parent_world_matrix(bones: &SlotMap<BoneKey, Bone>, key: BoneKey) -> Affine3A {
    bones
        .get(key)
        .and_then(|bone| bone.parent)
        .and_then(|parent| bones.get(parent))
        .map_or(Affine3A::IDENTITY, |parent| parent.transform.world_matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_hierarchy_update() {
        let mut bones: SlotMap<BoneKey, Bone> = SlotMap::with_key();

        let parent_key = bones.insert(Bone::new("parent", Vec3::new(1.0, 0.0, 0.0)));

        let mut child = Bone::new("child", Vec3::new(0.0, 1.0, 0.0));
        child.parent = Some(parent_key);
        let child_key = bones.insert(child);

        bones[parent_key].children.push(child_key);

        update_hierarchy_iterative(&mut bones, &[parent_key]);

        let child_world_pos = bones[child_key].transform.world_matrix.translation;
        assert!((child_world_pos.x - 1.0).abs() < 1e-5);
        assert!((child_world_pos.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_parent_change_propagates() {
        let mut bones: SlotMap<BoneKey, Bone> = SlotMap::with_key();
        let parent_key = bones.insert(Bone::new("parent", Vec3::ZERO));
        let mut child = Bone::new("child", Vec3::new(0.0, 2.0, 0.0));
        child.parent = Some(parent_key);
        let child_key = bones.insert(child);
        bones[parent_key].children.push(child_key);

        update_hierarchy_iterative(&mut bones, &[parent_key]);

        bones[parent_key].transform.scale = Vec3::splat(0.5);
        update_hierarchy_iterative(&mut bones, &[parent_key]);

        let y = bones[child_key].transform.world_matrix.translation.y;
        assert!((y - 1.0).abs() < 1e-5, "got {y}");
    }
}
