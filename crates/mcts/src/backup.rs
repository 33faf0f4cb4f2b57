use zero_core::StateKey;

use crate::tree::SearchTree;

/// Record one simulation's result on the edge it took out of `key`.
///
/// `value` must already be from the perspective of the player who chose
/// `action` at `key`, i.e. the child's return value after its own negation.
/// The caller hands `-value` further up the path.
pub fn backup(tree: &mut SearchTree, key: &StateKey, action: usize, value: f32) {
    tree.record_edge(key, action, value);
    tree.record_visit(key);
}
