//! Changesets: the output of a diff.
//!
//! A [`StagedChangeset`] is an ordered list of [`Changeset`]s. Each stage
//! carries the full collection state after its edits, and its edit lists are
//! indexed against the previous stage's state. Stages must be applied one at
//! a time, in order; coalescing them changes what the indices mean.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::path::{ElementPath, Moved};

/// One stage of a staged changeset.
///
/// Index conventions, relative to the previous stage's `data`:
/// deletes, element updates and move sources index the pre-stage data;
/// inserts, section updates and move targets index `data`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changeset<T> {
    /// The collection after this stage's edits.
    pub data: Vec<T>,
    pub section_deleted: Vec<usize>,
    pub section_inserted: Vec<usize>,
    pub section_updated: Vec<usize>,
    pub section_moved: Vec<Moved<usize>>,
    pub element_deleted: Vec<ElementPath>,
    pub element_inserted: Vec<ElementPath>,
    pub element_updated: Vec<ElementPath>,
    pub element_moved: Vec<Moved<ElementPath>>,
}

impl<T> Changeset<T> {
    /// A changeset with no edits and the given resulting data.
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data,
            section_deleted: Vec::new(),
            section_inserted: Vec::new(),
            section_updated: Vec::new(),
            section_moved: Vec::new(),
            element_deleted: Vec::new(),
            element_inserted: Vec::new(),
            element_updated: Vec::new(),
            element_moved: Vec::new(),
        }
    }

    /// Returns `true` if this stage carries no edits.
    pub fn is_empty(&self) -> bool {
        !self.has_section_changes() && !self.has_element_changes()
    }

    /// Total number of edits across all eight lists.
    pub fn change_count(&self) -> usize {
        self.section_change_count() + self.element_change_count()
    }

    pub fn section_change_count(&self) -> usize {
        self.section_deleted.len()
            + self.section_inserted.len()
            + self.section_updated.len()
            + self.section_moved.len()
    }

    pub fn element_change_count(&self) -> usize {
        self.element_deleted.len()
            + self.element_inserted.len()
            + self.element_updated.len()
            + self.element_moved.len()
    }

    pub fn has_section_changes(&self) -> bool {
        self.section_change_count() > 0
    }

    pub fn has_element_changes(&self) -> bool {
        self.element_change_count() > 0
    }
}

/// An ordered sequence of changesets that transforms a source into a target.
///
/// Empty when source and target need no edits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StagedChangeset<T> {
    stages: Vec<Changeset<T>>,
}

impl<T> StagedChangeset<T> {
    /// A staged changeset with no stages.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// The resulting data of the last stage, i.e. the diff target.
    pub fn last_data(&self) -> Option<&[T]> {
        self.stages.last().map(|stage| stage.data.as_slice())
    }

    /// Total number of edits across all stages.
    pub fn change_count(&self) -> usize {
        self.stages.iter().map(Changeset::change_count).sum()
    }

    pub fn into_inner(self) -> Vec<Changeset<T>> {
        self.stages
    }
}

impl<T> Default for StagedChangeset<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<Changeset<T>>> for StagedChangeset<T> {
    fn from(stages: Vec<Changeset<T>>) -> Self {
        Self { stages }
    }
}

impl<T> Deref for StagedChangeset<T> {
    type Target = [Changeset<T>];

    fn deref(&self) -> &Self::Target {
        &self.stages
    }
}

impl<T> IntoIterator for StagedChangeset<T> {
    type Item = Changeset<T>;
    type IntoIter = std::vec::IntoIter<Changeset<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a StagedChangeset<T> {
    type Item = &'a Changeset<T>;
    type IntoIter = std::slice::Iter<'a, Changeset<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}
