//! Early-exit hierarchy searches.
//!
//! Every "find the first bone that ..." question the classifier asks goes
//! through [`find_first`], parameterised by a [`Traversal`] order.

use std::collections::VecDeque;

use crate::scene::{BoneKey, Skeleton};

/// Visiting order for [`find_first`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// `start` first, then its descendants level by level, children in
    /// declaration order.
    BreadthFirst,
    /// `start`, then its parent, grandparent and so on up to the topmost node.
    Ancestors,
}

/// Returns the first node, in `traversal` order starting at `start`
/// (inclusive), for which `predicate` holds.
pub fn find_first<F>(
    skeleton: &Skeleton,
    start: BoneKey,
    traversal: Traversal,
    mut predicate: F,
) -> Option<BoneKey>
where
    F: FnMut(BoneKey) -> bool,
{
    match traversal {
        Traversal::BreadthFirst => {
            let mut queue = VecDeque::from([start]);
            while let Some(key) = queue.pop_front() {
                if !skeleton.contains(key) {
                    continue;
                }
                if predicate(key) {
                    return Some(key);
                }
                queue.extend(skeleton.children_of(key).iter().copied());
            }
            None
        }
        Traversal::Ancestors => {
            let mut current = Some(start);
            while let Some(key) = current {
                if predicate(key) {
                    return Some(key);
                }
                current = skeleton.parent_of(key);
            }
            None
        }
    }
}

/// Collects the chain from `from` up to and including `to`, ordered from
/// `to` down to `from`. Returns `None` when `to` is not an ancestor of `from`.
#[must_use]
pub fn ancestor_chain(skeleton: &Skeleton, from: BoneKey, to: BoneKey) -> Option<Vec<BoneKey>> {
    let mut chain = Vec::new();
    find_first(skeleton, from, Traversal::Ancestors, |key| {
        chain.push(key);
        key == to
    })?;
    chain.reverse();
    Some(chain)
}
