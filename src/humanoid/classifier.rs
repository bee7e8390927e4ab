//! Humanoid Classifier
//!
//! Assigns VRM humanoid roles to the bones of an arbitrary motion-capture
//! skeleton. Bone names in such files follow no convention, so every
//! decision here is made from topology and rest-pose geometry alone:
//!
//! | Decision             | Evidence                                          |
//! |----------------------|---------------------------------------------------|
//! | hips, chest          | first bone (breadth-first) with three children    |
//! | spine / upperChest   | length of the hips → chest ancestor chain         |
//! | left / right         | rest-pose world X (the character faces +Z)        |
//! | upper / lower limb   | the two longest links of a limb, in depth order   |
//! | neck / head          | first branching point below the head root         |
//!
//! Missing required roles are fatal ([`ClassifierError`]). Unexpected
//! structure degrades to a deterministic best-effort mapping and is reported
//! as a [`StructuralWarning`].
//!
//! ```rust,ignore
//! let root = skeleton.find_root()?;
//! let classification = classify(&skeleton, root)?;
//! let hips = classification.roles.get(HumanBoneName::Hips);
//! ```

use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::errors::ClassifierError;
use crate::humanoid::{HumanBoneName, HumanoidRoleMap, StructuralWarning};
use crate::scene::search::{ancestor_chain, find_first};
use crate::scene::{BoneKey, Skeleton, Traversal};

/// Result of a successful classification.
#[derive(Debug, Clone)]
pub struct Classification {
    pub roles: HumanoidRoleMap,
    pub warnings: Vec<StructuralWarning>,
}

/// Classifies the hierarchy below `root`.
///
/// A skeleton with stale world matrices is classified on an updated copy.
pub fn classify(skeleton: &Skeleton, root: BoneKey) -> Result<Classification, ClassifierError> {
    let updated;
    let skeleton = if skeleton.is_stale() {
        log::debug!("Updating world matrices of '{}' before classification", skeleton.name);
        let mut copy = skeleton.clone();
        copy.update_world_matrices();
        updated = copy;
        &updated
    } else {
        skeleton
    };

    let mut classifier = HumanoidClassifier {
        skeleton,
        roles: HumanoidRoleMap::new(),
        warnings: Vec::new(),
    };
    classifier.run(root)?;

    classifier.roles.validate()?;
    Ok(Classification {
        roles: classifier.roles,
        warnings: classifier.warnings,
    })
}

/// One link of a limb chain: the bone, its depth below the limb root and
/// the length of the segment to its first child.
#[derive(Debug, Clone, Copy)]
struct LimbLink {
    bone: BoneKey,
    depth: usize,
    length: f32,
}

#[derive(Debug, Clone, Copy)]
enum Limb {
    Leg,
    Arm,
}

impl Limb {
    fn label(self) -> &'static str {
        match self {
            Limb::Leg => "leg",
            Limb::Arm => "arm",
        }
    }
}

/// Proximal/distal segmentation of one limb.
struct LimbBones {
    base: Option<BoneKey>,
    upper: BoneKey,
    lower: BoneKey,
    end: BoneKey,
    tip: Option<BoneKey>,
}

struct HumanoidClassifier<'a> {
    skeleton: &'a Skeleton,
    roles: HumanoidRoleMap,
    warnings: Vec<StructuralWarning>,
}

impl HumanoidClassifier<'_> {
    fn run(&mut self, root: BoneKey) -> Result<(), ClassifierError> {
        let skeleton = self.skeleton;

        // 1. Hips: the first bone with three or more children
        let hips = find_first(skeleton, root, Traversal::BreadthFirst, |key| {
            skeleton.children_of(key).len() >= 3
        })
        .ok_or(ClassifierError::HipsNotFound)?;
        self.assign(HumanBoneName::Hips, hips)?;

        // 2. Chest candidate: the next such bone strictly below hips
        let chest_candidate = find_first(skeleton, hips, Traversal::BreadthFirst, |key| {
            key != hips && skeleton.children_of(key).len() >= 3
        })
        .ok_or(ClassifierError::ChestNotFound)?;

        // 3. Spine chain
        self.classify_spine(hips, chest_candidate)?;

        // 4. Legs
        let hips_children = skeleton.children_of(hips);
        if hips_children.len() > 3 {
            self.warn(StructuralWarning::ExtraHipsChildren {
                count: hips_children.len(),
            });
        }
        let leg_roots = self.sorted_by_world_x(hips_children);
        let (right_leg, left_leg) = outermost(&leg_roots).ok_or(ClassifierError::HipsNotFound)?;

        let left = self.classify_limb(left_leg, Limb::Leg)?;
        self.assign(HumanBoneName::LeftUpperLeg, left.upper)?;
        self.assign(HumanBoneName::LeftLowerLeg, left.lower)?;
        self.assign(HumanBoneName::LeftFoot, left.end)?;
        self.assign_optional(HumanBoneName::LeftToes, left.tip)?;

        let right = self.classify_limb(right_leg, Limb::Leg)?;
        self.assign(HumanBoneName::RightUpperLeg, right.upper)?;
        self.assign(HumanBoneName::RightLowerLeg, right.lower)?;
        self.assign(HumanBoneName::RightFoot, right.end)?;
        self.assign_optional(HumanBoneName::RightToes, right.tip)?;

        // 5. Arms and head root
        let chest_children = skeleton.children_of(chest_candidate);
        if chest_children.len() > 3 {
            self.warn(StructuralWarning::ExtraChestChildren {
                count: chest_children.len(),
            });
        }
        let upper_roots = self.sorted_by_world_x(chest_children);
        let (right_arm, left_arm) = outermost(&upper_roots).ok_or(ClassifierError::ChestNotFound)?;
        // The candidate just inside the left arm; with exactly three
        // children this is the middle one.
        let head_root = upper_roots[upper_roots.len() - 2];

        let left = self.classify_limb(left_arm, Limb::Arm)?;
        self.assign_optional(HumanBoneName::LeftShoulder, left.base)?;
        self.assign(HumanBoneName::LeftUpperArm, left.upper)?;
        self.assign(HumanBoneName::LeftLowerArm, left.lower)?;
        self.assign(HumanBoneName::LeftHand, left.end)?;

        let right = self.classify_limb(right_arm, Limb::Arm)?;
        self.assign_optional(HumanBoneName::RightShoulder, right.base)?;
        self.assign(HumanBoneName::RightUpperArm, right.upper)?;
        self.assign(HumanBoneName::RightLowerArm, right.lower)?;
        self.assign(HumanBoneName::RightHand, right.end)?;

        // 6. Neck, head and eyes
        self.classify_head(head_root)
    }

    fn classify_spine(&mut self, hips: BoneKey, chest_candidate: BoneKey) -> Result<(), ClassifierError> {
        // hips ..= chest candidate, root to leaf
        let chain = ancestor_chain(self.skeleton, chest_candidate, hips)
            .ok_or(ClassifierError::ChestNotFound)?;
        let n = chain.len();

        let (spine, chest, upper_chest) = match n {
            0..=2 => return Err(ClassifierError::InsufficientSpineBones { found: n }),
            3 => (chain[1], chain[2], None),
            4 => (chain[1], chain[2], Some(chain[3])),
            _ => {
                self.warn(StructuralWarning::LongSpineChain { length: n });
                (chain[(n - 1) / 3], chain[2 * (n - 1) / 3], Some(chain[n - 1]))
            }
        };

        self.assign(HumanBoneName::Spine, spine)?;
        self.assign(HumanBoneName::Chest, chest)?;
        self.assign_optional(HumanBoneName::UpperChest, upper_chest)
    }

    /// Segments a limb: the two longest links are the upper and lower
    /// segment, the link after the lower one is the hand/foot.
    fn classify_limb(&self, limb_root: BoneKey, limb: Limb) -> Result<LimbBones, ClassifierError> {
        let links = self.walk_limb(limb_root);
        if links.len() < 3 {
            return Err(ClassifierError::InsufficientLimbBones {
                limb: limb.label(),
                found: links.len(),
            });
        }

        // Longest first; the stable sort keeps depth order between equal lengths.
        let mut by_length: SmallVec<[LimbLink; 8]> = links.clone();
        by_length.sort_by(|a, b| b.length.total_cmp(&a.length));
        let mut segments = [by_length[0], by_length[1]];
        segments.sort_by_key(|link| link.depth);
        let [upper, lower] = segments;

        let end = links.get(lower.depth + 1).ok_or(match limb {
            Limb::Leg => ClassifierError::FootNotFound,
            Limb::Arm => ClassifierError::HandNotFound,
        })?;

        let (base, tip) = match limb {
            Limb::Leg => (None, links.get(end.depth + 1).map(|link| link.bone)),
            Limb::Arm => (
                upper.depth.checked_sub(1).map(|depth| links[depth].bone),
                None,
            ),
        };

        Ok(LimbBones {
            base,
            upper: upper.bone,
            lower: lower.bone,
            end: end.bone,
            tip,
        })
    }

    /// Follows first children from `limb_root` to a leaf.
    fn walk_limb(&self, limb_root: BoneKey) -> SmallVec<[LimbLink; 8]> {
        let mut links = SmallVec::new();
        let mut current = Some(limb_root);
        let mut depth = 0;

        while let Some(bone) = current {
            let first_child = self.skeleton.children_of(bone).first().copied();
            let length = first_child
                .and_then(|child| self.skeleton.bone(child))
                .map_or(0.0, |child| child.offset().length());

            links.push(LimbLink { bone, depth, length });
            current = first_child;
            depth += 1;
        }
        links
    }

    fn classify_head(&mut self, head_root: BoneKey) -> Result<(), ClassifierError> {
        let skeleton = self.skeleton;

        // The neck may span several single-child bones
        let mut head = head_root;
        while let [only_child] = skeleton.children_of(head) {
            head = *only_child;
        }

        if head != head_root {
            self.assign(HumanBoneName::Neck, head_root)?;
        }
        self.assign(HumanBoneName::Head, head)?;

        let head_children = skeleton.children_of(head);
        if head_children.len() > 2 {
            self.warn(StructuralWarning::ExtraHeadChildren {
                count: head_children.len(),
            });
        }
        if let Some((right_eye, left_eye)) = outermost(&self.sorted_by_world_x(head_children)) {
            self.assign(HumanBoneName::LeftEye, left_eye)?;
            self.assign(HumanBoneName::RightEye, right_eye)?;
        }
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Stable sort by rest-pose world X, smallest first.
    fn sorted_by_world_x(&self, bones: &[BoneKey]) -> SmallVec<[BoneKey; 4]> {
        let mut keyed: SmallVec<[(f32, BoneKey); 4]> = bones
            .iter()
            .map(|&key| (self.skeleton.world_position(key).x, key))
            .collect();
        keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        keyed.into_iter().map(|(_, key)| key).collect()
    }

    fn assign(&mut self, role: HumanBoneName, bone: BoneKey) -> Result<(), ClassifierError> {
        log::debug!(
            "{role}: {}",
            self.skeleton.name_of(bone).unwrap_or("<unnamed>")
        );
        self.roles.insert(role, bone)
    }

    fn assign_optional(&mut self, role: HumanBoneName, bone: Option<BoneKey>) -> Result<(), ClassifierError> {
        match bone {
            Some(bone) => self.assign(role, bone),
            None => Ok(()),
        }
    }

    fn warn(&mut self, warning: StructuralWarning) {
        log::warn!("{warning}. You might get an unexpected result.");
        self.warnings.push(warning);
    }
}

/// `(smallest, largest)` of an X-sorted list with at least two entries.
/// By the +Z facing convention these are (right, left).
fn outermost(sorted: &[BoneKey]) -> Option<(BoneKey, BoneKey)> {
    match sorted {
        [first, .., last] => Some((*first, *last)),
        _ => None,
    }
}
