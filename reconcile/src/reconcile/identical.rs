use crate::tree::Container;

/// A fresh child matched with the original child it preserves.
#[derive(Debug, Clone)]
pub struct IdenticalPair<N> {
    /// The child of the incoming tree.
    pub fresh: N,
    /// The child of the original tree that will be kept in place of it.
    pub preserved: N,
}

/// Match the children of `fresh` against the children of `original`.
///
/// `can_be_identical` is a cheap pre-filter over `fresh`'s children; only
/// survivors are compared at all, which keeps the quadratic scan away from
/// trees where most children can never match. Each survivor claims the
/// *first* original child, in document order, for which `is_identical`
/// holds and that no earlier survivor has claimed. Survivors without a
/// match produce no pair and are treated as brand-new by the caller.
///
/// The returned pairs follow `fresh`'s child order, and each original
/// child appears in at most one of them.
pub fn find_identical_pairs<C, D, F, G>(
    original: &C,
    fresh: &D,
    can_be_identical: F,
    is_identical: G,
) -> Vec<IdenticalPair<C::Child>>
where
    C: Container,
    D: Container<Child = C::Child>,
    F: Fn(&C::Child) -> bool,
    G: Fn(&C::Child, &C::Child) -> bool,
{
    let original_children = original.children();
    let mut claimed = vec![false; original_children.len()];
    let mut pairs = Vec::new();

    for fresh_child in fresh.children() {
        if !can_be_identical(&fresh_child) {
            continue;
        }

        let matched = original_children
            .iter()
            .enumerate()
            .find(|(index, original_child)| {
                !claimed[*index] && is_identical(&fresh_child, original_child)
            });

        if let Some((index, original_child)) = matched {
            claimed[index] = true;
            pairs.push(IdenticalPair {
                fresh: fresh_child,
                preserved: original_child.clone(),
            });
        }
    }

    pairs
}
