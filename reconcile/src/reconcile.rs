mod identical;

pub use identical::{IdenticalPair, find_identical_pairs};

use crate::tree::{Container, Node};

/// Patch `original`'s children to mirror `fresh`'s children, keeping every
/// original child that matches a fresh one.
///
/// Unmatched fresh children are inserted as-is and unmatched original
/// children are removed; see [`reconcile_with`] for transforming inserted
/// nodes or copying attributes onto preserved ones.
///
/// ```
/// use reconcile::{Element, has_attribute, reconcile, same_attribute};
///
/// let mut original = Element::new("main");
/// let kept = Element::new("article");
/// kept.set_attribute("slug", "intro");
/// original.append_child(kept.clone());
/// original.append_child(Element::new("aside"));
///
/// let fresh = Element::new("main");
/// let incoming = Element::new("article");
/// incoming.set_attribute("slug", "intro");
/// fresh.append_child(Element::new("nav"));
/// fresh.append_child(incoming);
///
/// reconcile(
///     &mut original,
///     &fresh,
///     has_attribute("slug"),
///     same_attribute("slug"),
/// );
///
/// let children = original.children();
/// assert_eq!(children.len(), 2);
/// assert_eq!(children[0].tag(), "nav");
/// assert!(children[1].same_node(&kept)); // the matched article survived
/// ```
pub fn reconcile<C, D, F, G>(original: &mut C, fresh: &D, can_be_identical: F, is_identical: G)
where
    C: Container,
    D: Container<Child = C::Child>,
    F: Fn(&C::Child) -> bool,
    G: Fn(&C::Child, &C::Child) -> bool,
{
    reconcile_with(
        original,
        fresh,
        can_be_identical,
        is_identical,
        Clone::clone,
        |_, _| {},
    );
}

/// [`reconcile`] with the two optional hooks exposed.
///
/// `update_node` transforms an unmatched fresh child before it is inserted.
/// Use it where a node can't be adopted directly (script-like elements that
/// only run when freshly constructed) or to substitute a placeholder; the
/// default in [`reconcile`] inserts the fresh child's own handle.
///
/// `update_attributes` runs once per preserved pair and lets the caller
/// copy state from the fresh child onto the preserved original without
/// replacing it, so listeners and internal state attached to the original
/// survive.
///
/// The reconciliation is single-level: descendants of matched or inserted
/// children are never diffed, a subtree is either preserved or replaced
/// wholesale. Matching is greedy (first original wins) and preserved
/// children are only moved when their relative order actually changed.
/// Panics from the caller-supplied predicates propagate; the tree is left
/// in whatever intermediate state the walk reached.
pub fn reconcile_with<C, D, F, G, U, A>(
    original: &mut C,
    fresh: &D,
    can_be_identical: F,
    is_identical: G,
    update_node: U,
    mut update_attributes: A,
) where
    C: Container,
    D: Container<Child = C::Child>,
    F: Fn(&C::Child) -> bool,
    G: Fn(&C::Child, &C::Child) -> bool,
    U: Fn(&C::Child) -> C::Child,
    A: FnMut(&C::Child, &C::Child),
{
    let pairs = find_identical_pairs(original, fresh, can_be_identical, is_identical);

    remove_stale_children(original, &pairs);
    reorder_preserved_children(original, &pairs);

    // After removal and reordering the container holds exactly the
    // preserved children, in pair order. Walk the fresh list with a cursor
    // over the pairs and fill in everything new around them.
    let mut next_preserved = 0;
    for fresh_child in fresh.children() {
        match pairs.get(next_preserved) {
            Some(pair) if pair.fresh.same_node(&fresh_child) => {
                update_attributes(&fresh_child, &pair.preserved);
                next_preserved += 1;
            }
            cursor => {
                let node = update_node(&fresh_child);
                original.insert_before(node, cursor.map(|pair| &pair.preserved));
            }
        }
    }
}

fn remove_stale_children<C>(original: &mut C, pairs: &[IdenticalPair<C::Child>])
where
    C: Container,
{
    for child in original.children() {
        let preserved = pairs.iter().any(|pair| pair.preserved.same_node(&child));

        if !preserved {
            original.remove_child(&child);
        }
    }
}

/// Move preserved children into pair order, touching only the ones that
/// are out of place. Reordering a live tree can flicker or re-trigger
/// loading in the adopting system, so children already in position must
/// not be moved.
fn reorder_preserved_children<C>(original: &mut C, pairs: &[IdenticalPair<C::Child>])
where
    C: Container,
{
    for (index, pair) in pairs.iter().enumerate() {
        let children = original.children();

        match children.get(index) {
            Some(occupant) if occupant.same_node(&pair.preserved) => {}
            occupant => {
                let reference = occupant.cloned();
                original.insert_before(pair.preserved.clone(), reference.as_ref());
            }
        }
    }
}
