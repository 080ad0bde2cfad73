//! Linear diff: the shared matching algorithm over two flat sequences.
//!
//! Runs in three passes:
//!
//! 1. Index the source by identifier and bind each target position to at most
//!    one source position (first-come-first-served on repeated identifiers).
//! 2. Scan the source for deletes, recording how many deletes precede each
//!    position.
//! 3. Scan the target for inserts, updates and moves. A matched pair is a move
//!    only when its source is not the leftmost source position still waiting
//!    to be consumed; that pointer only ever advances.

use serde::{Deserialize, Serialize};
use stagekit_types::{Differentiable, Moved};

use crate::config::{DiffConfig, UpdateIndex};
use crate::occurrence::OccurrenceTable;

/// Per-source-position bookkeeping.
#[derive(Clone, Debug)]
pub(crate) struct Trace<I> {
    /// The matched target position, if any.
    pub(crate) reference: Option<I>,
    /// Number of deletes among earlier positions of the same sequence.
    pub(crate) delete_offset: usize,
    /// Deleted, or already consumed by the target scan.
    pub(crate) is_tracked: bool,
}

impl<I> Trace<I> {
    pub(crate) fn new() -> Self {
        Self {
            reference: None,
            delete_offset: 0,
            is_tracked: false,
        }
    }
}

/// Intermediate element sequences collected during the delete pass.
#[derive(Debug)]
pub(crate) struct LinearSnapshots<E> {
    /// The source layout with every matched element replaced by its target.
    pub(crate) updated: Vec<E>,
    /// The matched target elements in source order.
    pub(crate) not_deleted: Vec<E>,
}

impl<E> LinearSnapshots<E> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            updated: Vec::with_capacity(capacity),
            not_deleted: Vec::with_capacity(capacity),
        }
    }
}

#[derive(Debug)]
pub(crate) struct DifferentiateResult<I> {
    pub(crate) deleted: Vec<I>,
    pub(crate) inserted: Vec<I>,
    pub(crate) updated: Vec<I>,
    pub(crate) moved: Vec<Moved<I>>,
    pub(crate) source_traces: Vec<Trace<usize>>,
    pub(crate) target_references: Vec<Option<usize>>,
}

/// Leftmost position at or after `start` that is not yet tracked.
pub(crate) fn next_untracked<I>(traces: &[Trace<I>], start: usize) -> Option<usize> {
    traces
        .get(start..)?
        .iter()
        .position(|trace| !trace.is_tracked)
        .map(|offset| start + offset)
}

/// Compute deletes, inserts, updates and moves between `source` and `target`.
///
/// Every reported index is passed through `map_index`. Move sources are
/// corrected by their delete offset so they index the post-delete sequence.
pub(crate) fn differentiate<E, I, F>(
    source: &[E],
    target: &[E],
    update_index: UpdateIndex,
    map_index: F,
    mut snapshots: Option<&mut LinearSnapshots<E>>,
) -> DifferentiateResult<I>
where
    E: Differentiable + Clone,
    F: Fn(usize) -> I,
{
    let mut deleted = Vec::new();
    let mut inserted = Vec::new();
    let mut updated = Vec::new();
    let mut moved = Vec::new();

    let mut source_traces: Vec<Trace<usize>> = source.iter().map(|_| Trace::new()).collect();
    let mut target_references: Vec<Option<usize>> = vec![None; target.len()];

    let source_identifiers: Vec<E::Id> = source
        .iter()
        .map(Differentiable::difference_identifier)
        .collect();

    let mut occurrences = OccurrenceTable::new(&source_identifiers);

    for (target_index, target_element) in target.iter().enumerate() {
        let identifier = target_element.difference_identifier();
        let claimed = occurrences.claim(&identifier, |source_index| {
            source_traces[source_index].reference.is_some()
        });

        if let Some(source_index) = claimed {
            target_references[target_index] = Some(source_index);
            source_traces[source_index].reference = Some(target_index);
        }
    }

    // Deletes.
    let mut offset_by_delete = 0;

    for (source_index, source_element) in source.iter().enumerate() {
        let trace = &mut source_traces[source_index];
        trace.delete_offset = offset_by_delete;

        match trace.reference {
            Some(target_index) => {
                if let Some(snapshots) = snapshots.as_deref_mut() {
                    let target_element = &target[target_index];
                    snapshots.updated.push(target_element.clone());
                    snapshots.not_deleted.push(target_element.clone());
                }
            }
            None => {
                deleted.push(map_index(source_index));
                trace.is_tracked = true;
                offset_by_delete += 1;

                if let Some(snapshots) = snapshots.as_deref_mut() {
                    snapshots.updated.push(source_element.clone());
                }
            }
        }
    }

    // Updates, moves and inserts.
    let mut untracked_source_index = Some(0);

    for (target_index, target_element) in target.iter().enumerate() {
        untracked_source_index =
            untracked_source_index.and_then(|start| next_untracked(&source_traces, start));

        let Some(source_index) = target_references[target_index] else {
            inserted.push(map_index(target_index));
            continue;
        };

        source_traces[source_index].is_tracked = true;

        if !target_element.is_content_equal(&source[source_index]) {
            let index = match update_index {
                UpdateIndex::Source => source_index,
                UpdateIndex::Target => target_index,
            };
            updated.push(map_index(index));
        }

        if untracked_source_index != Some(source_index) {
            let delete_offset = source_traces[source_index].delete_offset;
            moved.push(Moved::new(
                map_index(source_index - delete_offset),
                map_index(target_index),
            ));
        }
    }

    tracing::trace!(
        source = source.len(),
        target = target.len(),
        deleted = deleted.len(),
        inserted = inserted.len(),
        updated = updated.len(),
        moved = moved.len(),
        "linear differentiate"
    );

    DifferentiateResult {
        deleted,
        inserted,
        updated,
        moved,
        source_traces,
        target_references,
    }
}

/// The raw edit sets between two flat sequences.
///
/// Deletes index the source, inserts and move targets index the target, move
/// sources index the source with deletes already removed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearDiff {
    pub deleted: Vec<usize>,
    pub inserted: Vec<usize>,
    pub updated: Vec<usize>,
    pub moved: Vec<Moved<usize>>,
}

impl LinearDiff {
    /// Returns `true` if source and target need no edits.
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty()
            && self.inserted.is_empty()
            && self.updated.is_empty()
            && self.moved.is_empty()
    }

    /// Total number of edits.
    pub fn len(&self) -> usize {
        self.deleted.len() + self.inserted.len() + self.updated.len() + self.moved.len()
    }
}

/// Diff two flat sequences, reporting updates against source positions.
pub fn diff_linear<E>(source: &[E], target: &[E]) -> LinearDiff
where
    E: Differentiable + Clone,
{
    diff_linear_with(source, target, &DiffConfig::default())
}

/// Diff two flat sequences, reporting updates against the side named by
/// `config.update_index`. Raw indices carry no section, so `config.section`
/// does not apply.
pub fn diff_linear_with<E>(source: &[E], target: &[E], config: &DiffConfig) -> LinearDiff
where
    E: Differentiable + Clone,
{
    let result = differentiate(source, target, config.update_index, |index| index, None);

    LinearDiff {
        deleted: result.deleted,
        inserted: result.inserted,
        updated: result.updated,
        moved: result.moved,
    }
}
