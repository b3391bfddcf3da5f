use pretty_assertions::assert_eq;

use lanes_diagnostic::ErrorCode;

use super::*;

fn space(global: &[usize], local: &[usize]) -> IterationSpace {
    match IterationSpace::build(global.len(), Some(global), Some(local)) {
        Ok(space) => space,
        Err(err) => panic!("invalid test space: {err}"),
    }
}

#[test]
fn one_dimensional_groups() {
    let s = space(&[16], &[4]);
    assert_eq!(s.group_count(), [4, 1, 1]);
    assert_eq!(s.total_items(), 16);

    let idx = s.index_of(5);
    assert_eq!(idx.global_id[0], 5);
    assert_eq!(idx.local_id[0], 1);
    assert_eq!(idx.group_id[0], 1);
}

#[test]
fn last_dimension_varies_fastest() {
    let s = space(&[2, 3], &[1, 3]);
    let ids: Vec<[usize; 2]> = s
        .iter()
        .map(|idx| [idx.global_id[0], idx.global_id[1]])
        .collect();
    assert_eq!(
        ids,
        vec![[0, 0], [0, 1], [0, 2], [1, 0], [1, 1], [1, 2]]
    );
}

#[test]
fn three_dimensional_index() {
    let s = space(&[4, 6, 8], &[2, 3, 4]);
    assert_eq!(s.group_count(), [2, 2, 2]);

    // linear = ((x * 6) + y) * 8 + z with (x, y, z) = (3, 4, 5)
    let idx = s.index_of((3 * 6 + 4) * 8 + 5);
    assert_eq!(idx.global_id, [3, 4, 5]);
    assert_eq!(idx.local_id, [1, 1, 1]);
    assert_eq!(idx.group_id, [1, 1, 1]);
}

#[test]
fn padding_dimensions_have_unit_extent() {
    let s = space(&[8], &[2]);
    assert_eq!(s.dims(), 1);
    assert_eq!(s.global(), &[8]);
    assert_eq!(s.local(), &[2]);
    assert_eq!(s.global_size(2), 1);
    assert_eq!(s.local_size(7), 1);
    assert_eq!(s.num_groups(1), 1);
    assert_eq!(s.index_of(7).global_id[1], 0);
}

#[test]
fn rejects_bad_dimensionality() {
    for dims in [0, 4] {
        let err = IterationSpace::build(dims, Some(&[1; 4]), Some(&[1; 4]));
        assert_eq!(
            err,
            Err(ValidationError::InvalidWorkDimension {
                dim: dims,
                max: MAX_DIMS
            })
        );
    }
}

#[test]
fn dimensionality_is_checked_before_sizes() {
    let err = IterationSpace::build(5, None, None);
    assert_eq!(err.map_err(|e| e.code()), Err(ErrorCode::L1001));
}

#[test]
fn rejects_missing_or_short_size_arrays() {
    assert_eq!(
        IterationSpace::build(2, None, Some(&[1, 1])),
        Err(ValidationError::MissingSizeArray {
            which: SizeArray::Global,
            expected: 2,
            found: None,
        })
    );
    assert_eq!(
        IterationSpace::build(2, Some(&[4, 4]), Some(&[2])),
        Err(ValidationError::MissingSizeArray {
            which: SizeArray::Local,
            expected: 2,
            found: Some(1),
        })
    );
}

#[test]
fn rejects_indivisible_group_size() {
    let err = IterationSpace::build(2, Some(&[8, 10]), Some(&[4, 4]));
    assert_eq!(
        err,
        Err(ValidationError::InvalidWorkGroupSize {
            dim: 1,
            global: 10,
            local: 4,
        })
    );
    assert_eq!(err.map_err(|e| e.code()), Err(ErrorCode::L1002));
}

#[test]
fn rejects_zero_extents() {
    assert!(IterationSpace::build(1, Some(&[8]), Some(&[0])).is_err());
    assert!(IterationSpace::build(1, Some(&[0]), Some(&[1])).is_err());
}

#[test]
fn groups_partition_the_space() {
    let s = space(&[4, 6], &[2, 3]);
    assert_eq!(s.total_groups(), 4);
    assert_eq!(s.group_items(), 6);
    assert_eq!(s.group_of(3), [1, 1, 0]);

    let mut by_group: Vec<WorkItemIndex> =
        (0..s.total_groups()).flat_map(|g| s.items_in_group(g)).collect();
    let mut linear: Vec<WorkItemIndex> = s.iter().collect();
    by_group.sort_by_key(|idx| idx.global_id);
    linear.sort_by_key(|idx| idx.global_id);
    assert_eq!(by_group, linear);
}

#[test]
fn items_in_group_share_group_id() {
    let s = space(&[8], &[4]);
    let ids: Vec<usize> = s.items_in_group(1).map(|idx| idx.global_id[0]).collect();
    assert_eq!(ids, vec![4, 5, 6, 7]);
    assert!(s.items_in_group(1).all(|idx| idx.group_id[0] == 1));
}

#[test]
fn rejects_overflowing_work_item_count() {
    let global = [usize::MAX / 2 + 1, 4];
    let err = IterationSpace::build(2, Some(&global), Some(&[1, 1]));
    assert_eq!(
        err,
        Err(ValidationError::TooManyWorkItems {
            global: global.to_vec(),
        })
    );
    assert_eq!(err.map_err(|e| e.code()), Err(ErrorCode::L1004));
}

#[test]
fn largest_representable_space_is_accepted() {
    let s = space(&[usize::MAX], &[usize::MAX]);
    assert_eq!(s.total_items(), usize::MAX);
    assert_eq!(s.total_groups(), 1);
    assert_eq!(s.group_items(), usize::MAX);
}
