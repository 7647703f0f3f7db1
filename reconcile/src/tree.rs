use std::fmt::Debug;

/// An element handle in a DOM-like tree.
///
/// Handles are cheap to clone; cloning never copies the underlying element.
/// Two handles may therefore point at the same element, which is what
/// `same_node` detects.
pub trait Node: Clone + Debug {
    /// Whether the two handles refer to the same element.
    ///
    /// This is reference identity, not structural equality: two elements
    /// with equal tags and attributes are still distinct nodes.
    fn same_node(&self, other: &Self) -> bool;
}

/// An ordered collection of element children, supporting the three
/// mutations reconciliation needs.
///
/// The reconciler only ever looks at direct children through this trait;
/// it never inspects descendants or non-element content. Callers are
/// responsible for providing containers whose child list holds only
/// elements where reconciliation matters.
pub trait Container {
    type Child: Node;

    /// A snapshot of the current children, in order.
    fn children(&self) -> Vec<Self::Child>;

    /// Insert `child` before `reference`, or append it when `reference` is
    /// `None`. Inserting a node that is already a child moves it to the
    /// new position instead of duplicating it.
    fn insert_before(&mut self, child: Self::Child, reference: Option<&Self::Child>);

    /// Remove `child` from the child list. Removing a node that is not a
    /// child is a no-op.
    fn remove_child(&mut self, child: &Self::Child);
}
