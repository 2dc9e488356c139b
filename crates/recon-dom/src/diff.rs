//! Tree Differ
//!
//! Pre-order comparison of two node trees. Children are matched strictly by
//! position; an attribute change replaces the whole attribute set; a type
//! change replaces the whole subtree.

use std::rc::Rc;

use crate::node::Node;
use crate::patch::Patch;

/// Append the patches turning `previous` into `current` to `patches`.
///
/// `parent_previous` is the parent of `previous` in the old tree, `None` at
/// the root.
pub fn diff(
    previous: Option<&Rc<Node>>,
    current: Option<&Rc<Node>>,
    patches: &mut Vec<Patch>,
    parent_previous: Option<&Rc<Node>>,
) {
    match (previous, current) {
        (None, None) => {}
        (None, Some(current)) => patches.push(Patch::Create {
            parent: parent_previous.cloned(),
            node: Rc::clone(current),
        }),
        (Some(previous), None) => patches.push(Patch::Remove {
            node: Rc::clone(previous),
        }),
        (Some(previous), Some(current)) => {
            if previous.tag() != current.tag() {
                patches.push(Patch::Replace {
                    replacing: Rc::clone(previous),
                    node: Rc::clone(current),
                });
                return;
            }

            // Memoized subtrees are unchanged by construction
            if current.is_memoized() {
                return;
            }

            if !previous.attributes().shallow_eq(current.attributes()) {
                patches.push(Patch::ReplaceAttributes {
                    parent: parent_previous.cloned(),
                    replacing: Rc::clone(previous),
                    node: Rc::clone(current),
                });
            }

            let len = previous.children().len().max(current.children().len());
            for index in 0..len {
                diff(
                    previous.children().get(index),
                    current.children().get(index),
                    patches,
                    Some(previous),
                );
            }
        }
    }
}

/// Patches turning `previous` into `current`
pub fn diff_trees(previous: Option<&Rc<Node>>, current: &Rc<Node>) -> Vec<Patch> {
    let mut patches = Vec::new();
    diff(previous, Some(current), &mut patches, None);
    patches
}
