//! Staged changesets for flat sequences.
//!
//! Produces up to three stages, each omitted when it has nothing to do:
//!
//! 1. element updates (source layout, matched elements replaced in place)
//! 2. element deletes
//! 3. element inserts and moves
//!
//! The last stage's data is always the target.

use stagekit_types::{Changeset, Differentiable, ElementPath, StagedChangeset};
use tracing::debug;

use crate::config::{DiffConfig, UpdateIndex};
use crate::linear::{differentiate, LinearSnapshots};

/// Staged changeset between two flat sequences, in section 0.
pub fn staged_changeset<E>(source: &[E], target: &[E]) -> StagedChangeset<E>
where
    E: Differentiable + Clone,
{
    staged_changeset_in_section(source, target, 0)
}

/// Staged changeset between two flat sequences whose element paths all carry
/// `section`.
pub fn staged_changeset_in_section<E>(
    source: &[E],
    target: &[E],
    section: usize,
) -> StagedChangeset<E>
where
    E: Differentiable + Clone,
{
    let map_index = |element| ElementPath::new(element, section);

    if source.is_empty() && target.is_empty() {
        return StagedChangeset::new();
    }

    if target.is_empty() {
        let mut changeset = Changeset::new(Vec::new());
        changeset.element_deleted = (0..source.len()).map(map_index).collect();
        debug!(section, deleted = source.len(), "staged changeset: delete all");
        return StagedChangeset::from(vec![changeset]);
    }

    if source.is_empty() {
        let mut changeset = Changeset::new(target.to_vec());
        changeset.element_inserted = (0..target.len()).map(map_index).collect();
        debug!(section, inserted = target.len(), "staged changeset: insert all");
        return StagedChangeset::from(vec![changeset]);
    }

    let mut snapshots = LinearSnapshots::with_capacity(source.len());
    let result = differentiate(
        source,
        target,
        UpdateIndex::Source,
        map_index,
        Some(&mut snapshots),
    );

    let mut changesets = Vec::new();

    if !result.updated.is_empty() {
        let mut changeset = Changeset::new(snapshots.updated);
        changeset.element_updated = result.updated;
        changesets.push(changeset);
    }

    if !result.deleted.is_empty() {
        let mut changeset = Changeset::new(snapshots.not_deleted);
        changeset.element_deleted = result.deleted;
        changesets.push(changeset);
    }

    if !result.inserted.is_empty() || !result.moved.is_empty() {
        let mut changeset = Changeset::new(Vec::new());
        changeset.element_inserted = result.inserted;
        changeset.element_moved = result.moved;
        changesets.push(changeset);
    }

    if let Some(last) = changesets.last_mut() {
        last.data = target.to_vec();
    }

    debug!(section, stages = changesets.len(), "staged changeset computed");

    StagedChangeset::from(changesets)
}

/// Staged changeset between two flat sequences, using `config.section`.
pub fn staged_changeset_with<E>(
    source: &[E],
    target: &[E],
    config: &DiffConfig,
) -> StagedChangeset<E>
where
    E: Differentiable + Clone,
{
    staged_changeset_in_section(source, target, config.section)
}
