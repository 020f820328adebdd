// srtext-core/src/document/path.rs
//! Addresses of elements inside the report tree.

use std::fmt;

use crate::tags::Tag;

/// A chain of `(sequence tag, item index)` hops ending at a leaf tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    hops: Vec<(Tag, usize)>,
    leaf: Tag,
}

impl FieldPath {
    /// A path to a top-level element.
    pub fn root(tag: Tag) -> Self {
        Self {
            hops: Vec::new(),
            leaf: tag,
        }
    }

    pub fn new(hops: Vec<(Tag, usize)>, leaf: Tag) -> Self {
        Self { hops, leaf }
    }

    /// Descends into item `index` of the current leaf, which must be a sequence.
    /// The returned builder needs [`PendingItem::then`] to name the next element.
    pub fn item(self, index: usize) -> PendingItem {
        PendingItem { parent: self, index }
    }

    pub fn hops(&self) -> &[(Tag, usize)] {
        &self.hops
    }

    pub fn leaf(&self) -> Tag {
        self.leaf
    }

    pub fn depth(&self) -> usize {
        self.hops.len()
    }
}

/// Half-built path: a sequence item whose child element is not chosen yet.
#[derive(Debug, Clone)]
pub struct PendingItem {
    parent: FieldPath,
    index: usize,
}

impl PendingItem {
    pub fn then(self, tag: Tag) -> FieldPath {
        let mut hops = self.parent.hops;
        hops.push((self.parent.leaf, self.index));
        FieldPath { hops, leaf: tag }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |tag: Tag| match tag.keyword() {
            Some(k) => k.name().to_string(),
            None => tag.to_string(),
        };
        for (tag, index) in &self.hops {
            write!(f, "{}[{}].", name(*tag), index)?;
        }
        f.write_str(&name(self.leaf))
    }
}
