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
fn indivisible_simd_extent_is_an_alignment_error() {
    let s = space(&[10], &[2]);
    let err = s.lane_groups::<4>(0);
    assert_eq!(
        err,
        Err(LaneGroupError::Alignment(
            AlignmentError::SimdDimensionNotDivisible {
                dim: 0,
                global: 10,
                local: 2,
                width: 4,
            }
        ))
    );
    assert_eq!(err.map_err(|e| e.code()), Err(ErrorCode::L3001));
}

#[test]
fn local_extent_must_also_divide() {
    let s = space(&[16], &[2]);
    assert!(matches!(
        s.lane_groups::<4>(0),
        Err(LaneGroupError::Alignment(_))
    ));
}

#[test]
fn simd_dimension_must_be_declared() {
    let s = space(&[16], &[4]);
    let err = s.lane_groups::<4>(1);
    assert_eq!(err.map_err(|e| e.code()), Err(ErrorCode::L1001));
}

#[test]
fn lanes_are_packed_along_simd_dimension() {
    let s = space(&[16], &[8]);
    let lanes = match s.lane_groups::<4>(0) {
        Ok(lanes) => lanes,
        Err(err) => panic!("{err}"),
    };
    assert_eq!(lanes.total_groups(), 4);
    assert_eq!(lanes.total_work_groups(), 2);

    let idx = lanes.index_of(3);
    assert_eq!(idx.lane_global_id, [12, 13, 14, 15]);
    assert_eq!(idx.lane_local_id, [4, 5, 6, 7]);
    assert_eq!(idx.scalar.group_id[0], 1);
    assert_eq!(idx.scalar.global_id[0], 12);
}

#[test]
fn other_dimensions_stay_scalar() {
    let s = space(&[3, 8], &[1, 4]);
    let lanes = match s.lane_groups::<4>(1) {
        Ok(lanes) => lanes,
        Err(err) => panic!("{err}"),
    };
    let all: Vec<(usize, [usize; 4])> = lanes
        .iter()
        .map(|idx| (idx.scalar.global_id[0], idx.lane_global_id))
        .collect();
    assert_eq!(
        all,
        vec![
            (0, [0, 1, 2, 3]),
            (0, [4, 5, 6, 7]),
            (1, [0, 1, 2, 3]),
            (1, [4, 5, 6, 7]),
            (2, [0, 1, 2, 3]),
            (2, [4, 5, 6, 7]),
        ]
    );
}

#[test]
fn lane_expands_to_full_index() {
    let s = space(&[2, 8], &[2, 8]);
    let lanes = match s.lane_groups::<4>(1) {
        Ok(lanes) => lanes,
        Err(err) => panic!("{err}"),
    };
    let idx = lanes.index_of(3);
    let lane = idx.lane(2);
    assert_eq!(lane.map(|l| l.global_id), Some([1, 6, 0]));
    assert_eq!(lane.map(|l| l.local_id), Some([1, 6, 0]));
    assert_eq!(idx.lane(4), None);
}

#[test]
fn lanes_cover_every_work_item_once() {
    let s = space(&[4, 8], &[2, 4]);
    let lanes = match s.lane_groups::<2>(1) {
        Ok(lanes) => lanes,
        Err(err) => panic!("{err}"),
    };
    let mut from_lanes: Vec<WorkItemIndex> = (0..lanes.total_work_groups())
        .flat_map(|g| lanes.groups_in_work_group(g))
        .flat_map(|idx| (0..2).filter_map(move |k| idx.lane(k)))
        .collect();
    let mut scalar: Vec<WorkItemIndex> = s.iter().collect();
    from_lanes.sort_by_key(|idx| idx.global_id);
    scalar.sort_by_key(|idx| idx.global_id);
    assert_eq!(from_lanes, scalar);
}
