mod attributes;
mod element;
mod reconcile;
mod tree;

pub use attributes::{copy_attribute, copy_attributes, has_attribute, same_attribute};
pub use element::Element;
pub use reconcile::{IdenticalPair, find_identical_pairs, reconcile, reconcile_with};
pub use tree::{Container, Node};
