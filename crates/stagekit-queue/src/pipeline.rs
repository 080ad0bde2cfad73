//! Serial diff pipeline.
//!
//! Any number of producers submit target snapshots. The apply stage pulls
//! them out one at a time (or all at once, coalesced) and diffs each against
//! the state it produced last, so the changesets it hands out always chain.

use std::sync::Mutex;

use stagekit_diff::{sectioned_staged_changeset, staged_changeset};
use stagekit_types::{Differentiable, DifferentiableSection, StagedChangeset};
use tracing::debug;

use crate::config::QueueConfig;
use crate::error::QueueResult;
use crate::queue::WorkQueue;

type Differ<T> = fn(&[T], &[T]) -> StagedChangeset<T>;

/// Diffs queued target snapshots against the last applied state.
pub struct DiffPipeline<T> {
    pending: WorkQueue<Vec<T>>,
    current: Mutex<Vec<T>>,
    differ: Differ<T>,
}

impl<T: Differentiable + Clone> DiffPipeline<T> {
    /// A pipeline over flat sequences, starting from `initial`.
    pub fn linear(initial: Vec<T>) -> Self {
        Self::with_differ(initial, &QueueConfig::default(), staged_changeset::<T>)
    }

    /// A flat pipeline whose pending queue follows `config`.
    pub fn linear_with_config(initial: Vec<T>, config: &QueueConfig) -> Self {
        Self::with_differ(initial, config, staged_changeset::<T>)
    }
}

impl<T: DifferentiableSection> DiffPipeline<T> {
    /// A pipeline over sectioned collections, starting from `initial`.
    pub fn sectioned(initial: Vec<T>) -> Self {
        Self::with_differ(initial, &QueueConfig::default(), sectioned_staged_changeset::<T>)
    }

    /// A sectioned pipeline whose pending queue follows `config`.
    pub fn sectioned_with_config(initial: Vec<T>, config: &QueueConfig) -> Self {
        Self::with_differ(initial, config, sectioned_staged_changeset::<T>)
    }
}

impl<T> DiffPipeline<T> {
    fn with_differ(initial: Vec<T>, config: &QueueConfig, differ: Differ<T>) -> Self {
        Self {
            pending: WorkQueue::with_config(config),
            current: Mutex::new(initial),
            differ,
        }
    }

    /// Queue `target` behind every earlier submission.
    pub fn submit(&self, target: Vec<T>) -> QueueResult<()> {
        self.pending.enqueue(target)
    }

    /// Number of targets waiting to be diffed.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Diff the oldest pending target against the current state and make it
    /// the new current state. `None` when nothing is pending.
    pub fn process_next(&self) -> Option<StagedChangeset<T>> {
        let mut current = self.current.lock().expect("lock poisoned");
        let target = self.pending.dequeue()?;
        let staged = (self.differ)(&current, &target);
        *current = target;
        Some(staged)
    }

    /// Drain every pending target and diff only against the newest one.
    /// `None` when nothing is pending.
    pub fn process_coalesced(&self) -> Option<StagedChangeset<T>> {
        let mut current = self.current.lock().expect("lock poisoned");
        let mut drained = self.pending.dequeue_all();
        let target = drained.pop()?;
        if !drained.is_empty() {
            debug!(skipped = drained.len(), "coalesced pending targets");
        }
        let staged = (self.differ)(&current, &target);
        *current = target;
        Some(staged)
    }
}

impl<T: Clone> DiffPipeline<T> {
    /// A copy of the state the last processed changeset ends in.
    pub fn current(&self) -> Vec<T> {
        self.current.lock().expect("lock poisoned").clone()
    }
}

impl<T> std::fmt::Debug for DiffPipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffPipeline")
            .field("pending", &self.pending)
            .finish()
    }
}
