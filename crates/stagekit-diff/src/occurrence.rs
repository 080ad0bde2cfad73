//! Identity index over a source sequence.
//!
//! Maps each identifier to the source positions carrying it. Identifiers seen
//! once resolve to a single position; repeated identifiers resolve to a queue
//! of positions consumed front to back, so the k-th target occurrence of an
//! identifier binds to the k-th source occurrence.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Clone, Copy, Debug)]
enum Occurrence {
    Unique(usize),
    /// Index into `OccurrenceTable::pending`.
    Duplicate(usize),
}

#[derive(Debug)]
struct PendingIndices {
    indices: Vec<usize>,
    position: usize,
}

impl PendingIndices {
    fn next(&mut self) -> Option<usize> {
        let index = *self.indices.get(self.position)?;
        self.position += 1;
        Some(index)
    }
}

/// Per-call identity table. Borrows the source identifiers it was built from.
#[derive(Debug)]
pub(crate) struct OccurrenceTable<'a, K> {
    occurrences: HashMap<&'a K, Occurrence>,
    pending: Vec<PendingIndices>,
}

impl<'a, K: Eq + Hash> OccurrenceTable<'a, K> {
    /// Index `identifiers` by position, left to right.
    pub(crate) fn new(identifiers: &'a [K]) -> Self {
        let mut occurrences = HashMap::with_capacity(identifiers.len());
        let mut pending: Vec<PendingIndices> = Vec::new();

        for (index, identifier) in identifiers.iter().enumerate() {
            match occurrences.entry(identifier) {
                Entry::Vacant(slot) => {
                    slot.insert(Occurrence::Unique(index));
                }
                Entry::Occupied(mut slot) => {
                    let occurrence = *slot.get();
                    match occurrence {
                        Occurrence::Unique(first) => {
                            pending.push(PendingIndices {
                                indices: vec![first, index],
                                position: 0,
                            });
                            slot.insert(Occurrence::Duplicate(pending.len() - 1));
                        }
                        Occurrence::Duplicate(queue) => pending[queue].indices.push(index),
                    }
                }
            }
        }

        Self {
            occurrences,
            pending,
        }
    }

    /// Claim the source position a target with `identifier` binds to.
    ///
    /// A unique identifier binds only while `is_bound` reports its position
    /// free. A repeated identifier hands out its next queued position, and
    /// nothing once the queue is exhausted.
    pub(crate) fn claim(
        &mut self,
        identifier: &K,
        is_bound: impl FnOnce(usize) -> bool,
    ) -> Option<usize> {
        match *self.occurrences.get(identifier)? {
            Occurrence::Unique(index) => (!is_bound(index)).then_some(index),
            Occurrence::Duplicate(queue) => self.pending[queue].next(),
        }
    }
}
