use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize, ser::SerializeStruct};

use crate::tree::{Container, Node};

/// A shared handle to an in-memory element: a tag name, an attribute map
/// and an ordered list of child elements.
///
/// `Element` is the tree implementation used by the test-suites and by
/// embedders that don't bring their own DOM. Cloning a handle is cheap and
/// yields another handle to the *same* element; use [`Element::deep_clone`]
/// to copy the element itself.
#[derive(Clone)]
pub struct Element {
    data: Rc<RefCell<ElementData>>,
}

struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Element>,
}

impl Element {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            data: Rc::new(RefCell::new(ElementData {
                tag: tag.into(),
                attributes: BTreeMap::new(),
                children: Vec::new(),
            })),
        }
    }

    #[must_use]
    pub fn tag(&self) -> String {
        self.data.borrow().tag.clone()
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.data.borrow().attributes.get(name).cloned()
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.data.borrow().attributes.contains_key(name)
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.data
            .borrow_mut()
            .attributes
            .insert(name.into(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        self.data.borrow_mut().attributes.remove(name)
    }

    #[must_use]
    pub fn attribute_names(&self) -> Vec<String> {
        self.data.borrow().attributes.keys().cloned().collect()
    }

    /// Whether the two handles refer to the same element.
    #[must_use]
    pub fn same_node(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// A snapshot of the current children, in order.
    #[must_use]
    pub fn children(&self) -> Vec<Element> {
        self.data.borrow().children.clone()
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.data.borrow().children.len()
    }

    pub fn append_child(&self, child: Element) {
        self.insert_child_before(child, None);
    }

    /// Insert `child` before `reference`, appending when `reference` is
    /// `None` or not currently a child. A `child` that is already in the
    /// list is moved rather than duplicated.
    pub fn insert_child_before(&self, child: Element, reference: Option<&Element>) {
        let mut data = self.data.borrow_mut();

        if let Some(position) = data
            .children
            .iter()
            .position(|existing| existing.same_node(&child))
        {
            data.children.remove(position);
        }

        let index = reference
            .and_then(|reference| {
                data.children
                    .iter()
                    .position(|existing| existing.same_node(reference))
            })
            .unwrap_or(data.children.len());

        data.children.insert(index, child);
    }

    pub fn remove(&self, child: &Element) {
        let mut data = self.data.borrow_mut();

        if let Some(position) = data
            .children
            .iter()
            .position(|existing| existing.same_node(child))
        {
            data.children.remove(position);
        }
    }

    /// Copy this element and its whole subtree into fresh identities.
    /// The copy is structurally equal but shares nothing with the source.
    #[must_use]
    pub fn deep_clone(&self) -> Element {
        let data = self.data.borrow();
        let copy = Element::new(data.tag.clone());

        for (name, value) in &data.attributes {
            copy.set_attribute(name.clone(), value.clone());
        }

        for child in &data.children {
            copy.append_child(child.deep_clone());
        }

        copy
    }
}

impl Node for Element {
    fn same_node(&self, other: &Self) -> bool {
        Element::same_node(self, other)
    }
}

impl Container for Element {
    type Child = Element;

    fn children(&self) -> Vec<Element> {
        Element::children(self)
    }

    fn insert_before(&mut self, child: Element, reference: Option<&Element>) {
        self.insert_child_before(child, reference);
    }

    fn remove_child(&mut self, child: &Element) {
        self.remove(child);
    }
}

/// Serializes the element structurally (tag, attributes, children);
/// handle sharing is not representable, so a deserialized tree always has
/// fresh identities, like [`Element::deep_clone`].
#[cfg(feature = "serde")]
impl Serialize for Element {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let data = self.data.borrow();

        let mut state = serializer.serialize_struct("Element", 3)?;
        state.serialize_field("tag", &data.tag)?;
        state.serialize_field("attributes", &data.attributes)?;
        state.serialize_field("children", &data.children)?;
        state.end()
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct ElementSeed {
    tag: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    children: Vec<ElementSeed>,
}

#[cfg(feature = "serde")]
impl From<ElementSeed> for Element {
    fn from(seed: ElementSeed) -> Self {
        let element = Element::new(seed.tag);

        for (name, value) in seed.attributes {
            element.set_attribute(name, value);
        }

        for child in seed.children {
            element.append_child(child.into());
        }

        element
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Element {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        ElementSeed::deserialize(deserializer).map(Element::from)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.borrow();

        write!(f, "<{}", data.tag)?;
        for (name, value) in &data.attributes {
            write!(f, " {name}={value:?}")?;
        }
        write!(f, ">")?;

        if !data.children.is_empty() {
            f.debug_list().entries(data.children.iter()).finish()?;
        }

        Ok(())
    }
}
