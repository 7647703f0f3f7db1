use crate::element::Element;

/// A `can_be_identical` pre-filter: the child carries `name`.
///
/// The usual setup marks reconcilable elements with a stable identity
/// attribute, so everything else can be skipped before any comparison.
#[must_use]
pub fn has_attribute(name: &str) -> impl Fn(&Element) -> bool {
    let name = name.to_owned();

    move |element| element.has_attribute(&name)
}

/// An `is_identical` predicate: both children carry the same value for
/// `name` (including both lacking it).
#[must_use]
pub fn same_attribute(name: &str) -> impl Fn(&Element, &Element) -> bool {
    let name = name.to_owned();

    move |fresh, original| fresh.attribute(&name) == original.attribute(&name)
}

/// An `update_attributes` hook copying the whole attribute map of the
/// fresh child onto the preserved one. Attributes missing from the fresh
/// child are removed; the preserved element's identity and children are
/// untouched.
pub fn copy_attributes(fresh: &Element, preserved: &Element) {
    for name in preserved.attribute_names() {
        if !fresh.has_attribute(&name) {
            preserved.remove_attribute(&name);
        }
    }

    for name in fresh.attribute_names() {
        if let Some(value) = fresh.attribute(&name) {
            preserved.set_attribute(name, value);
        }
    }
}

/// An `update_attributes` hook copying a single attribute, removing it
/// from the preserved child when the fresh one lacks it.
#[must_use]
pub fn copy_attribute(name: &str) -> impl FnMut(&Element, &Element) {
    let name = name.to_owned();

    move |fresh, preserved| match fresh.attribute(&name) {
        Some(value) => preserved.set_attribute(name.clone(), value),
        None => {
            preserved.remove_attribute(&name);
        }
    }
}
