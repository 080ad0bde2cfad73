use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of an element inside a sectioned collection.
///
/// Ordered by section first, then element. Flat diffs put every path in one
/// caller-chosen section (0 unless stated otherwise).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementPath {
    /// Index of the section.
    pub section: usize,
    /// Index of the element within its section.
    pub element: usize,
}

impl ElementPath {
    /// Create a path from an element index and a section index.
    pub const fn new(element: usize, section: usize) -> Self {
        Self { section, element }
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.element)
    }
}

/// A move of one item from `source` to `target`.
///
/// `source` indexes the data before the stage that reports the move, `target`
/// indexes the data after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Moved<I> {
    pub source: I,
    pub target: I,
}

impl<I> Moved<I> {
    pub fn new(source: I, target: I) -> Self {
        Self { source, target }
    }
}

impl<I: fmt::Display> fmt::Display for Moved<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}
