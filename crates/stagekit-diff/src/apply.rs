//! Reference apply-layer.
//!
//! Applies one stage to the previous stage's data with batch-update
//! semantics, the way a list view consumes a stage:
//!
//! - deletes, element updates and move sources index the pre-stage data;
//! - inserts, section updates and move targets index the post-stage data;
//! - all edits of one stage take effect together, never re-indexed in between;
//! - inserted and updated values are read from the stage's `data`, every other
//!   value is carried over from the previous state.
//!
//! Carried-over values are compared to `data` only through `PartialEq`, so a
//! round trip reproduces `data` exactly when content equality agrees with
//! `PartialEq` for matched values.

use std::collections::HashSet;

use stagekit_types::{Changeset, DifferentiableSection, ElementPath, StagedChangeset};
use tracing::trace;

use crate::error::{ApplyError, ApplyResult};

/// Where a post-stage slot takes its value from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Origin<I> {
    Previous(I),
    Inserted,
}

/// Lay out one level of a stage.
///
/// `removed` are pre-stage indices leaving their position, `fixed` are
/// post-stage slots with an explicit origin. The remaining pre-stage items
/// fill the remaining slots in order.
fn place<I: Copy>(
    previous_len: usize,
    removed: &[usize],
    fixed: &[(usize, Origin<I>)],
    post_len: usize,
    kept: impl Fn(usize) -> I,
) -> ApplyResult<Vec<Origin<I>>> {
    let mut is_removed = vec![false; previous_len];
    for &index in removed {
        let slot = is_removed.get_mut(index).ok_or(ApplyError::IndexOutOfBounds {
            index,
            len: previous_len,
        })?;
        if *slot {
            return Err(ApplyError::DuplicateIndex { index });
        }
        *slot = true;
    }

    let mut slots: Vec<Option<Origin<I>>> = vec![None; post_len];
    for &(index, origin) in fixed {
        let slot = slots.get_mut(index).ok_or(ApplyError::IndexOutOfBounds {
            index,
            len: post_len,
        })?;
        if slot.is_some() {
            return Err(ApplyError::DuplicateIndex { index });
        }
        *slot = Some(origin);
    }

    let survivors = previous_len - removed.len();
    let free = slots.iter().filter(|slot| slot.is_none()).count();
    if survivors != free {
        return Err(ApplyError::LengthMismatch {
            expected: post_len,
            actual: survivors + fixed.len(),
        });
    }

    let mut kept_indices = (0..previous_len).filter(|&index| !is_removed[index]);
    Ok(slots
        .into_iter()
        .map(|slot| {
            slot.or_else(|| kept_indices.next().map(|index| Origin::Previous(kept(index))))
                .unwrap_or(Origin::Inserted)
        })
        .collect())
}

/// Apply one flat stage to `previous`.
///
/// Only the element paths' element indices are used; the section they carry
/// is whatever the diff was asked to stamp on them.
pub fn apply_changeset<T: Clone>(previous: &[T], changeset: &Changeset<T>) -> ApplyResult<Vec<T>> {
    if changeset.has_section_changes() {
        return Err(ApplyError::UnexpectedSectionChanges {
            count: changeset.section_change_count(),
        });
    }

    let removed: Vec<usize> = changeset
        .element_deleted
        .iter()
        .chain(changeset.element_moved.iter().map(|moved| &moved.source))
        .map(|path| path.element)
        .collect();

    let fixed: Vec<(usize, Origin<usize>)> = changeset
        .element_moved
        .iter()
        .map(|moved| (moved.target.element, Origin::Previous(moved.source.element)))
        .chain(
            changeset
                .element_inserted
                .iter()
                .map(|path| (path.element, Origin::Inserted)),
        )
        .collect();

    let updated = changeset
        .element_updated
        .iter()
        .map(|path| checked(path.element, previous.len()))
        .collect::<ApplyResult<HashSet<usize>>>()?;

    let origins = place(previous.len(), &removed, &fixed, changeset.data.len(), |index| index)?;

    let result = origins
        .into_iter()
        .zip(&changeset.data)
        .map(|(origin, incoming)| match origin {
            Origin::Previous(index) if !updated.contains(&index) => previous[index].clone(),
            _ => incoming.clone(),
        })
        .collect();

    trace!(
        previous = previous.len(),
        next = changeset.data.len(),
        "applied flat changeset"
    );

    Ok(result)
}

/// Apply one sectioned stage to `previous`.
pub fn apply_sectioned_changeset<S>(previous: &[S], changeset: &Changeset<S>) -> ApplyResult<Vec<S>>
where
    S: DifferentiableSection,
{
    let data = &changeset.data;

    // Section level.
    let removed_sections: Vec<usize> = changeset
        .section_deleted
        .iter()
        .copied()
        .chain(changeset.section_moved.iter().map(|moved| moved.source))
        .collect();

    let fixed_sections: Vec<(usize, Origin<usize>)> = changeset
        .section_moved
        .iter()
        .map(|moved| (moved.target, Origin::Previous(moved.source)))
        .chain(
            changeset
                .section_inserted
                .iter()
                .map(|&index| (index, Origin::Inserted)),
        )
        .collect();

    let section_origins = place(
        previous.len(),
        &removed_sections,
        &fixed_sections,
        data.len(),
        |index| index,
    )?;

    let updated_sections: HashSet<usize> = changeset.section_updated.iter().copied().collect();
    for &index in &updated_sections {
        checked(index, data.len())?;
    }

    // Element level: validate every pre-stage path up front.
    for path in changeset
        .element_deleted
        .iter()
        .chain(changeset.element_updated.iter())
        .chain(changeset.element_moved.iter().map(|moved| &moved.source))
    {
        check_path(previous, *path)?;
    }
    for path in changeset
        .element_inserted
        .iter()
        .chain(changeset.element_moved.iter().map(|moved| &moved.target))
    {
        checked_section(path.section, data.len())?;
    }

    let updated_elements: HashSet<ElementPath> =
        changeset.element_updated.iter().copied().collect();

    let mut result = Vec::with_capacity(data.len());

    for (post_index, origin) in section_origins.into_iter().enumerate() {
        let incoming = &data[post_index];

        let Origin::Previous(pre_index) = origin else {
            result.push(incoming.clone());
            continue;
        };

        let removed: Vec<usize> = changeset
            .element_deleted
            .iter()
            .chain(changeset.element_moved.iter().map(|moved| &moved.source))
            .filter(|path| path.section == pre_index)
            .map(|path| path.element)
            .collect();

        let fixed: Vec<(usize, Origin<ElementPath>)> = changeset
            .element_moved
            .iter()
            .filter(|moved| moved.target.section == post_index)
            .map(|moved| (moved.target.element, Origin::Previous(moved.source)))
            .chain(
                changeset
                    .element_inserted
                    .iter()
                    .filter(|path| path.section == post_index)
                    .map(|path| (path.element, Origin::Inserted)),
            )
            .collect();

        let element_origins = place(
            previous[pre_index].elements().len(),
            &removed,
            &fixed,
            incoming.elements().len(),
            |element| ElementPath::new(element, pre_index),
        )?;

        let elements = element_origins
            .into_iter()
            .zip(incoming.elements())
            .map(|(origin, incoming_element)| match origin {
                Origin::Previous(path) if !updated_elements.contains(&path) => {
                    previous[path.section].elements()[path.element].clone()
                }
                _ => incoming_element.clone(),
            })
            .collect();

        let base = if updated_sections.contains(&post_index) {
            incoming
        } else {
            &previous[pre_index]
        };
        result.push(S::with_elements(base, elements));
    }

    trace!(
        previous = previous.len(),
        next = data.len(),
        "applied sectioned changeset"
    );

    Ok(result)
}

/// Apply every stage in order, starting from `source`.
pub fn apply_staged<T: Clone>(source: &[T], staged: &StagedChangeset<T>) -> ApplyResult<Vec<T>> {
    staged
        .iter()
        .try_fold(source.to_vec(), |current, stage| apply_changeset(&current, stage))
}

/// Apply every sectioned stage in order, starting from `source`.
pub fn apply_sectioned_staged<S>(source: &[S], staged: &StagedChangeset<S>) -> ApplyResult<Vec<S>>
where
    S: DifferentiableSection,
{
    staged
        .iter()
        .try_fold(source.to_vec(), |current, stage| apply_sectioned_changeset(&current, stage))
}

fn checked(index: usize, len: usize) -> ApplyResult<usize> {
    if index < len {
        Ok(index)
    } else {
        Err(ApplyError::IndexOutOfBounds { index, len })
    }
}

fn checked_section(section: usize, len: usize) -> ApplyResult<usize> {
    if section < len {
        Ok(section)
    } else {
        Err(ApplyError::SectionOutOfBounds { section, len })
    }
}

fn check_path<S: DifferentiableSection>(sections: &[S], path: ElementPath) -> ApplyResult<()> {
    let section = sections
        .get(path.section)
        .ok_or(ApplyError::SectionOutOfBounds {
            section: path.section,
            len: sections.len(),
        })?;
    if path.element < section.elements().len() {
        Ok(())
    } else {
        Err(ApplyError::PathOutOfBounds { path })
    }
}
