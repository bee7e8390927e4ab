use std::collections::BTreeMap;

use crate::errors::ClassifierError;
use crate::humanoid::HumanBoneName;
use crate::scene::{BoneKey, Skeleton};

/// Mapping from canonical humanoid roles to bones of one skeleton.
///
/// A bone is mapped to at most one role; [`HumanoidRoleMap::insert`]
/// rejects a second role for an already-mapped bone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HumanoidRoleMap {
    roles: BTreeMap<HumanBoneName, BoneKey>,
}

impl HumanoidRoleMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `bone` to `role`, replacing any bone previously held by `role`.
    pub fn insert(&mut self, role: HumanBoneName, bone: BoneKey) -> Result<(), ClassifierError> {
        if let Some((&existing, _)) = self
            .roles
            .iter()
            .find(|&(&other, &key)| other != role && key == bone)
        {
            return Err(ClassifierError::DuplicateBone { role, existing });
        }
        self.roles.insert(role, bone);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, role: HumanBoneName) -> Option<BoneKey> {
        self.roles.get(&role).copied()
    }

    #[must_use]
    pub fn role_of(&self, bone: BoneKey) -> Option<HumanBoneName> {
        self.roles
            .iter()
            .find_map(|(&role, &key)| (key == bone).then_some(role))
    }

    #[must_use]
    pub fn contains(&self, role: HumanBoneName) -> bool {
        self.roles.contains_key(&role)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Roles in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (HumanBoneName, BoneKey)> + '_ {
        self.roles.iter().map(|(&role, &key)| (role, key))
    }

    /// Fails on the first required role that is absent.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        match HumanBoneName::REQUIRED
            .iter()
            .find(|role| !self.roles.contains_key(role))
        {
            Some(&missing) => Err(ClassifierError::MissingRole(missing)),
            None => Ok(()),
        }
    }

    /// Role → bone name table, for display and cross-skeleton comparison.
    #[must_use]
    pub fn bone_names(&self, skeleton: &Skeleton) -> BTreeMap<HumanBoneName, String> {
        self.roles
            .iter()
            .filter_map(|(&role, &key)| skeleton.name_of(key).map(|name| (role, name.to_string())))
            .collect()
    }

    /// Resolves every role against an index scheme. Returns the first bone
    /// that `index_of` cannot place.
    pub fn resolve<F>(&self, mut index_of: F) -> Result<BTreeMap<HumanBoneName, usize>, (HumanBoneName, BoneKey)>
    where
        F: FnMut(BoneKey) -> Option<usize>,
    {
        self.roles
            .iter()
            .map(|(&role, &key)| index_of(key).map(|index| (role, index)).ok_or((role, key)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::scene::Bone;

    fn two_bones() -> (Skeleton, BoneKey, BoneKey) {
        let mut skeleton = Skeleton::new("pair");
        let a = skeleton.add_bone(Bone::new("A", Vec3::ZERO), None);
        let b = skeleton.add_bone(Bone::new("B", Vec3::Y), Some(a));
        (skeleton, a, b)
    }

    #[test]
    fn bone_cannot_hold_two_roles() {
        let (_, a, b) = two_bones();
        let mut roles = HumanoidRoleMap::new();
        roles.insert(HumanBoneName::Hips, a).unwrap();

        assert_eq!(
            roles.insert(HumanBoneName::Spine, a),
            Err(ClassifierError::DuplicateBone {
                role: HumanBoneName::Spine,
                existing: HumanBoneName::Hips,
            })
        );

        // Reassigning the same role is allowed
        roles.insert(HumanBoneName::Hips, b).unwrap();
        assert_eq!(roles.get(HumanBoneName::Hips), Some(b));
        assert_eq!(roles.role_of(a), None);
    }

    #[test]
    fn validate_reports_first_missing_required_role() {
        let (_, a, _) = two_bones();
        let mut roles = HumanoidRoleMap::new();
        roles.insert(HumanBoneName::Hips, a).unwrap();
        assert_eq!(roles.validate(), Err(ClassifierError::MissingRole(HumanBoneName::Spine)));
    }

    #[test]
    fn resolve_names_the_unplaceable_bone() {
        let (skeleton, a, b) = two_bones();
        let mut roles = HumanoidRoleMap::new();
        roles.insert(HumanBoneName::Hips, a).unwrap();
        roles.insert(HumanBoneName::Spine, b).unwrap();

        let all = roles.resolve(|key| Some(if key == a { 0 } else { 1 })).unwrap();
        assert_eq!(all[&HumanBoneName::Spine], 1);

        let missing = roles.resolve(|key| (key == a).then_some(0)).unwrap_err();
        assert_eq!(missing, (HumanBoneName::Spine, b));

        assert_eq!(roles.bone_names(&skeleton)[&HumanBoneName::Hips], "A");
    }
}
