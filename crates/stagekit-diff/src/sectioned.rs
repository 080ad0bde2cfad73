//! Staged changesets for sectioned collections.
//!
//! Sections are diffed with the linear algorithm. Elements are matched once
//! across every section at the same time, so an element can move between
//! sections. The result has up to five stages, each omitted when empty:
//!
//! 1. element updates
//! 2. section deletes and element deletes
//! 3. section inserts and section moves
//! 4. element inserts and element moves
//! 5. section updates
//!
//! Deletes precede inserts and moves at each level, and section structure is
//! settled before element structure is indexed against it. The last stage's
//! data is always the target.

use stagekit_types::{
    Changeset, Differentiable, DifferentiableSection, ElementPath, Moved, StagedChangeset,
};
use tracing::debug;

use crate::config::UpdateIndex;
use crate::linear::{differentiate, next_untracked, Trace};
use crate::occurrence::OccurrenceTable;

/// Staged changeset between two sectioned collections.
pub fn sectioned_staged_changeset<S>(source: &[S], target: &[S]) -> StagedChangeset<S>
where
    S: DifferentiableSection,
{
    let source_elements: Vec<&[S::Element]> =
        source.iter().map(|section| section.elements()).collect();
    let target_elements: Vec<&[S::Element]> =
        target.iter().map(|section| section.elements()).collect();

    let mut first_stage_sections: Vec<S> = source.to_vec();
    let mut second_stage_sections: Vec<S> = Vec::with_capacity(source.len());
    let mut third_stage_sections: Vec<S> = Vec::with_capacity(target.len());
    let mut fourth_stage_sections: Vec<S> = Vec::with_capacity(target.len());

    let mut source_element_traces: Vec<Vec<Trace<ElementPath>>> = source_elements
        .iter()
        .map(|elements| elements.iter().map(|_| Trace::new()).collect())
        .collect();
    let mut target_element_references: Vec<Vec<Option<ElementPath>>> = target_elements
        .iter()
        .map(|elements| vec![None; elements.len()])
        .collect();

    let section_result = differentiate(source, target, UpdateIndex::Target, |index| index, None);

    let mut element_deleted = Vec::new();
    let mut element_inserted = Vec::new();
    let mut element_updated = Vec::new();
    let mut element_moved = Vec::new();

    // Match elements across all sections at once.
    let flattened_count: usize = source_elements.iter().map(|elements| elements.len()).sum();
    let mut flattened_identifiers = Vec::with_capacity(flattened_count);
    let mut flattened_paths = Vec::with_capacity(flattened_count);

    for (section_index, elements) in source_elements.iter().enumerate() {
        for (element_index, element) in elements.iter().enumerate() {
            flattened_identifiers.push(element.difference_identifier());
            flattened_paths.push(ElementPath::new(element_index, section_index));
        }
    }

    let mut occurrences = OccurrenceTable::new(&flattened_identifiers);

    for (target_section_index, elements) in target_elements.iter().enumerate() {
        for (target_element_index, element) in elements.iter().enumerate() {
            let identifier = element.difference_identifier();
            let claimed = occurrences.claim(&identifier, |flattened_index| {
                let path = flattened_paths[flattened_index];
                source_element_traces[path.section][path.element]
                    .reference
                    .is_some()
            });

            if let Some(flattened_index) = claimed {
                let source_path = flattened_paths[flattened_index];
                let target_path = ElementPath::new(target_element_index, target_section_index);
                target_element_references[target_section_index][target_element_index] =
                    Some(source_path);
                source_element_traces[source_path.section][source_path.element].reference =
                    Some(target_path);
            }
        }
    }

    // Element deletes. Elements of deleted sections go with their section.
    for (source_section_index, source_section) in source.iter().enumerate() {
        let elements = source_elements[source_section_index];
        let mut first_stage_elements = elements.to_vec();

        if section_result.source_traces[source_section_index].reference.is_some() {
            let mut offset_by_delete = 0;
            let mut second_stage_elements = Vec::with_capacity(elements.len());

            for element_index in 0..elements.len() {
                let trace = &mut source_element_traces[source_section_index][element_index];
                trace.delete_offset = offset_by_delete;

                // Kept only if its target lands in a section that survives;
                // targets inside inserted sections arrive with their section.
                let kept = trace
                    .reference
                    .filter(|path| section_result.target_references[path.section].is_some());

                if let Some(target_path) = kept {
                    let target_element = &target_elements[target_path.section][target_path.element];
                    first_stage_elements[element_index] = target_element.clone();
                    second_stage_elements.push(target_element.clone());
                    continue;
                }

                element_deleted.push(ElementPath::new(element_index, source_section_index));
                trace.is_tracked = true;
                offset_by_delete += 1;
            }

            second_stage_sections.push(S::with_elements(source_section, second_stage_elements));
        }

        first_stage_sections[source_section_index] =
            S::with_elements(source_section, first_stage_elements);
    }

    // Element updates, moves and inserts.
    for (target_section_index, target_section) in target.iter().enumerate() {
        let Some(source_section_index) = section_result.target_references[target_section_index]
        else {
            third_stage_sections.push(target_section.clone());
            fourth_stage_sections.push(target_section.clone());
            continue;
        };

        let mut untracked_source_index = Some(0);
        let elements = target_elements[target_section_index];

        let section_delete_offset =
            section_result.source_traces[source_section_index].delete_offset;
        let third_stage_section =
            second_stage_sections[source_section_index - section_delete_offset].clone();

        let mut fourth_stage_elements = Vec::with_capacity(elements.len());

        for (target_element_index, target_element) in elements.iter().enumerate() {
            untracked_source_index = untracked_source_index.and_then(|start| {
                next_untracked(&source_element_traces[source_section_index], start)
            });

            let target_path = ElementPath::new(target_element_index, target_section_index);
            fourth_stage_elements.push(target_element.clone());

            // Sources inside deleted sections are gone by now, so those
            // targets are inserts.
            let matched = target_element_references[target_section_index][target_element_index]
                .and_then(|source_path| {
                    section_result.source_traces[source_path.section]
                        .reference
                        .map(|moved_section_index| (source_path, moved_section_index))
                });

            let Some((source_path, moved_section_index)) = matched else {
                element_inserted.push(target_path);
                continue;
            };

            let trace = &mut source_element_traces[source_path.section][source_path.element];
            trace.is_tracked = true;

            let source_element = &source_elements[source_path.section][source_path.element];
            if !target_element.is_content_equal(source_element) {
                element_updated.push(source_path);
            }

            if source_path.section != source_section_index
                || untracked_source_index != Some(source_path.element)
            {
                let move_source = ElementPath::new(
                    source_path.element - trace.delete_offset,
                    moved_section_index,
                );
                element_moved.push(Moved::new(move_source, target_path));
            }
        }

        fourth_stage_sections.push(S::with_elements(&third_stage_section, fourth_stage_elements));
        third_stage_sections.push(third_stage_section);
    }

    let mut changesets = Vec::new();

    if !element_updated.is_empty() {
        let mut changeset = Changeset::new(first_stage_sections);
        changeset.element_updated = element_updated;
        changesets.push(changeset);
    }

    if !section_result.deleted.is_empty() || !element_deleted.is_empty() {
        let mut changeset = Changeset::new(second_stage_sections);
        changeset.section_deleted = section_result.deleted;
        changeset.element_deleted = element_deleted;
        changesets.push(changeset);
    }

    if !section_result.inserted.is_empty() || !section_result.moved.is_empty() {
        let mut changeset = Changeset::new(third_stage_sections);
        changeset.section_inserted = section_result.inserted;
        changeset.section_moved = section_result.moved;
        changesets.push(changeset);
    }

    if !element_inserted.is_empty() || !element_moved.is_empty() {
        let mut changeset = Changeset::new(fourth_stage_sections);
        changeset.element_inserted = element_inserted;
        changeset.element_moved = element_moved;
        changesets.push(changeset);
    }

    if !section_result.updated.is_empty() {
        let mut changeset = Changeset::new(Vec::new());
        changeset.section_updated = section_result.updated;
        changesets.push(changeset);
    }

    if let Some(last) = changesets.last_mut() {
        last.data = target.to_vec();
    }

    debug!(
        source_sections = source.len(),
        target_sections = target.len(),
        stages = changesets.len(),
        "sectioned staged changeset computed"
    );

    StagedChangeset::from(changesets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::{apply_sectioned_changeset, apply_sectioned_staged};
    use crate::testing::{all_distinct, pair_positions};
    use proptest::prelude::*;
    use stagekit_types::ArraySection;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Header {
        id: u8,
        title: u8,
    }

    impl Differentiable for Header {
        type Id = u8;

        fn difference_identifier(&self) -> u8 {
            self.id
        }

        fn is_content_equal(&self, other: &Self) -> bool {
            self.title == other.title
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Item {
        id: u8,
        rev: u8,
    }

    impl Differentiable for Item {
        type Id = u8;

        fn difference_identifier(&self) -> u8 {
            self.id
        }

        fn is_content_equal(&self, other: &Self) -> bool {
            self.rev == other.rev
        }
    }

    type Section = ArraySection<Header, Item>;

    fn section(id: u8, title: u8, items: &[(u8, u8)]) -> Section {
        ArraySection::new(
            Header { id, title },
            items.iter().map(|&(id, rev)| Item { id, rev }),
        )
    }

    fn path(section: usize, element: usize) -> ElementPath {
        ElementPath::new(element, section)
    }

    #[test]
    fn identical_collections_produce_no_stages() {
        let data = vec![section(0, 0, &[(1, 0), (2, 0)]), section(1, 0, &[(3, 0)])];
        assert!(sectioned_staged_changeset(&data, &data).is_empty());
    }

    #[test]
    fn empty_collections_produce_no_stages() {
        assert!(sectioned_staged_changeset::<Section>(&[], &[]).is_empty());
    }

    #[test]
    fn element_moves_across_sections() {
        let source = vec![section(0, 0, &[(1, 0), (2, 0)]), section(1, 0, &[(3, 0)])];
        let target = vec![section(0, 0, &[(2, 0)]), section(1, 0, &[(3, 0), (1, 0)])];

        let staged = sectioned_staged_changeset(&source, &target);
        assert_eq!(staged.len(), 1);

        let stage = &staged[0];
        assert!(stage.element_inserted.is_empty());
        assert!(stage.element_deleted.is_empty());
        assert!(stage
            .element_moved
            .contains(&Moved::new(path(0, 0), path(1, 1))));
        assert_eq!(stage.data, target);
    }

    #[test]
    fn section_delete_subsumes_its_elements() {
        let source = vec![section(0, 0, &[(1, 0), (2, 0)]), section(1, 0, &[(3, 0), (4, 0)])];
        let target = vec![section(1, 0, &[(3, 0)])];

        let staged = sectioned_staged_changeset(&source, &target);
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].section_deleted, vec![0]);
        assert_eq!(staged[0].element_deleted, vec![path(1, 1)]);
        assert_eq!(staged[0].data, target);
    }

    #[test]
    fn inserted_section_brings_its_elements() {
        let source = vec![section(0, 0, &[(1, 0)])];
        let target = vec![section(0, 0, &[(1, 0)]), section(5, 0, &[(2, 0), (3, 0)])];

        let staged = sectioned_staged_changeset(&source, &target);
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].section_inserted, vec![1]);
        assert!(staged[0].element_inserted.is_empty());
    }

    #[test]
    fn element_into_inserted_section_is_delete_then_section_insert() {
        let source = vec![section(0, 0, &[(1, 0), (2, 0)])];
        let target = vec![section(0, 0, &[(1, 0)]), section(5, 0, &[(2, 0)])];

        let staged = sectioned_staged_changeset(&source, &target);
        assert_eq!(staged.len(), 2);
        assert_eq!(staged[0].element_deleted, vec![path(0, 1)]);
        assert_eq!(staged[0].data, vec![section(0, 0, &[(1, 0)])]);
        assert_eq!(staged[1].section_inserted, vec![1]);
        assert!(staged[1].element_moved.is_empty());
    }

    #[test]
    fn element_out_of_deleted_section_is_an_insert() {
        let source = vec![section(0, 0, &[(1, 0)]), section(1, 0, &[(2, 0)])];
        let target = vec![section(1, 0, &[(2, 0), (1, 0)])];

        let staged = sectioned_staged_changeset(&source, &target);
        assert_eq!(staged.len(), 2);
        assert_eq!(staged[0].section_deleted, vec![0]);
        assert!(staged[0].element_deleted.is_empty());
        assert_eq!(staged[1].element_inserted, vec![path(0, 1)]);
        assert!(staged[1].element_moved.is_empty());
    }

    #[test]
    fn five_stages_in_order() {
        let source = vec![
            section(0, 0, &[(1, 0), (2, 0)]),
            section(1, 0, &[(3, 0)]),
            section(2, 0, &[(4, 0)]),
        ];
        let target = vec![
            section(2, 1, &[(4, 0), (6, 0)]),
            section(0, 0, &[(1, 1)]),
            section(7, 0, &[(8, 0)]),
        ];

        let staged = sectioned_staged_changeset(&source, &target);
        assert_eq!(staged.len(), 5);

        assert_eq!(staged[0].element_updated, vec![path(0, 0)]);
        assert_eq!(
            staged[0].data[0],
            section(0, 0, &[(1, 1), (2, 0)]),
            "updated content lands in place"
        );

        assert_eq!(staged[1].section_deleted, vec![1]);
        assert_eq!(staged[1].element_deleted, vec![path(0, 1)]);
        assert_eq!(
            staged[1].data,
            vec![section(0, 0, &[(1, 1)]), section(2, 0, &[(4, 0)])]
        );

        assert_eq!(staged[2].section_inserted, vec![2]);
        assert_eq!(staged[2].section_moved, vec![Moved::new(1, 0)]);
        assert_eq!(
            staged[2].data,
            vec![
                section(2, 0, &[(4, 0)]),
                section(0, 0, &[(1, 1)]),
                section(7, 0, &[(8, 0)]),
            ]
        );

        assert_eq!(staged[3].element_inserted, vec![path(0, 1)]);
        assert!(staged[3].element_moved.is_empty());

        assert_eq!(staged[4].section_updated, vec![0]);
        assert_eq!(staged[4].data, target);
    }

    #[test]
    fn stages_apply_one_after_another() {
        let source = vec![
            section(0, 0, &[(1, 0), (2, 0), (3, 0)]),
            section(1, 0, &[(4, 0), (5, 0)]),
        ];
        let target = vec![
            section(1, 1, &[(5, 0), (1, 1), (4, 0)]),
            section(0, 0, &[(3, 0), (9, 0)]),
        ];

        let staged = sectioned_staged_changeset(&source, &target);
        let mut current = source.clone();
        for stage in &staged {
            current = apply_sectioned_changeset(&current, stage).unwrap();
            assert_eq!(current, stage.data);
        }
        assert_eq!(current, target);
    }

    fn sections() -> impl Strategy<Value = Vec<Section>> {
        let items = prop::collection::vec((0u8..8, 0u8..2), 0..5);
        prop::collection::vec((0u8..4, 0u8..2, items), 0..4).prop_map(|raw| {
            raw.into_iter()
                .map(|(id, title, items)| section(id, title, &items))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn applying_every_stage_reaches_target(source in sections(), target in sections()) {
            let staged = sectioned_staged_changeset(&source, &target);

            let mut current = source.clone();
            for stage in &staged {
                prop_assert!(!stage.is_empty());
                current = apply_sectioned_changeset(&current, stage).unwrap();
                prop_assert_eq!(&current, &stage.data);
            }
            prop_assert_eq!(&current, &target);
            prop_assert_eq!(apply_sectioned_staged(&source, &staged).unwrap(), target);
        }

        #[test]
        fn every_position_is_accounted_for_once(source in sections(), target in sections()) {
            let staged = sectioned_staged_changeset(&source, &target);

            let mut merged: Changeset<Section> = Changeset::new(Vec::new());
            for stage in &staged {
                prop_assert!(!stage.is_empty());
                merged.section_deleted.extend(&stage.section_deleted);
                merged.section_inserted.extend(&stage.section_inserted);
                merged.section_updated.extend(&stage.section_updated);
                merged.section_moved.extend(&stage.section_moved);
                merged.element_deleted.extend(&stage.element_deleted);
                merged.element_inserted.extend(&stage.element_inserted);
                merged.element_updated.extend(&stage.element_updated);
                merged.element_moved.extend(&stage.element_moved);
            }

            let section_moves: Vec<(usize, usize)> = merged
                .section_moved
                .iter()
                .map(|moved| (moved.source, moved.target))
                .collect();
            let section_pairs = pair_positions(
                source.len(),
                target.len(),
                &merged.section_deleted,
                &merged.section_inserted,
                &section_moves,
            )?;

            prop_assert!(all_distinct(&merged.section_updated));
            for &(from, to) in &section_pairs {
                let (before, after) = (&source[from].model, &target[to].model);
                prop_assert_eq!(before.id, after.id);
                prop_assert_eq!(
                    before.title != after.title,
                    merged.section_updated.contains(&to)
                );
            }
            prop_assert!(merged
                .section_updated
                .iter()
                .all(|updated| section_pairs.iter().any(|&(_, to)| to == *updated)));

            // Deletes and updates index the source. Elements of deleted
            // sections are never listed.
            for path in merged.element_deleted.iter().chain(&merged.element_updated) {
                prop_assert!(path.section < source.len());
                prop_assert!(path.element < source[path.section].elements.len());
                prop_assert!(!merged.section_deleted.contains(&path.section));
            }

            let survivors = |section: usize| -> Vec<usize> {
                (0..source[section].elements.len())
                    .filter(|&element| {
                        !merged
                            .element_deleted
                            .contains(&ElementPath::new(element, section))
                    })
                    .collect()
            };

            // Move sources index the stage-three sections, which are in target
            // order, with deleted elements removed.
            let mut element_pairs: Vec<(ElementPath, ElementPath)> = Vec::new();
            for moved in &merged.element_moved {
                let origin = section_pairs
                    .iter()
                    .find(|&&(_, to)| to == moved.source.section)
                    .map(|&(from, _)| from);
                prop_assert!(origin.is_some(), "move from unmatched section: {}", moved);
                let from_section = origin.unwrap();
                let kept = survivors(from_section);
                prop_assert!(
                    moved.source.element < kept.len(),
                    "move source out of range: {}",
                    moved
                );
                element_pairs.push((
                    ElementPath::new(kept[moved.source.element], from_section),
                    moved.target,
                ));
            }

            let moved_sources: Vec<ElementPath> =
                element_pairs.iter().map(|&(from, _)| from).collect();
            let moved_targets: Vec<ElementPath> =
                element_pairs.iter().map(|&(_, to)| to).collect();
            let listed_sources: Vec<ElementPath> =
                merged.element_deleted.iter().chain(&moved_sources).copied().collect();
            let listed_targets: Vec<ElementPath> =
                merged.element_inserted.iter().chain(&moved_targets).copied().collect();
            prop_assert!(all_distinct(&listed_sources), "source listed twice");
            prop_assert!(all_distinct(&listed_targets), "target listed twice");
            prop_assert!(all_distinct(&merged.element_updated));

            // Inserts and move targets index the target. Elements of inserted
            // sections arrive with their section.
            for path in &listed_targets {
                prop_assert!(path.section < target.len());
                prop_assert!(path.element < target[path.section].elements.len());
                prop_assert!(!merged.section_inserted.contains(&path.section));
            }

            // Within a matched section pair, unmoved survivors fill the
            // unlisted target positions in order.
            for &(from_section, to_section) in &section_pairs {
                let unmoved: Vec<ElementPath> = survivors(from_section)
                    .into_iter()
                    .map(|element| ElementPath::new(element, from_section))
                    .filter(|path| !moved_sources.contains(path))
                    .collect();
                let unlisted: Vec<ElementPath> = (0..target[to_section].elements.len())
                    .map(|element| ElementPath::new(element, to_section))
                    .filter(|path| !listed_targets.contains(path))
                    .collect();
                prop_assert_eq!(unmoved.len(), unlisted.len());
                element_pairs.extend(unmoved.into_iter().zip(unlisted));
            }

            let paired_sources: Vec<ElementPath> =
                element_pairs.iter().map(|&(from, _)| from).collect();
            prop_assert!(merged
                .element_updated
                .iter()
                .all(|updated| paired_sources.contains(updated)));

            for (from, to) in element_pairs {
                let before = &source[from.section].elements[from.element];
                let after = &target[to.section].elements[to.element];
                prop_assert_eq!(before.id, after.id);
                prop_assert_eq!(
                    before.rev != after.rev,
                    merged.element_updated.contains(&from),
                    "update flag for {}", from
                );
            }
        }

        #[test]
        fn identical_input_is_a_no_op(data in sections()) {
            prop_assert!(sectioned_staged_changeset(&data, &data).is_empty());
        }
    }
}
