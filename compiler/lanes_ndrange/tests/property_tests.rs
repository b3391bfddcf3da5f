//! Property-based tests for iteration-space decomposition.
//!
//! Generates random valid 1-3 dimensional spaces and checks the
//! work-item and lane-group invariants over every point.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use std::collections::BTreeSet;

use lanes_ndrange::{IterationSpace, MAX_DIMS};
use proptest::prelude::*;

/// `(global, local)` extents with `local` dividing `global`.
fn space_strategy() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    prop::collection::vec((1usize..5, 1usize..5), 1..=MAX_DIMS).prop_map(|dims| {
        let local: Vec<usize> = dims.iter().map(|&(l, _)| l).collect();
        let global: Vec<usize> = dims.iter().map(|&(l, groups)| l * groups).collect();
        (global, local)
    })
}

fn build(global: &[usize], local: &[usize]) -> IterationSpace {
    IterationSpace::build(global.len(), Some(global), Some(local)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    /// `group * local + local_id == global_id` in every dimension.
    #[test]
    fn prop_index_invariant_holds(sizes in space_strategy()) {
        let (global, local) = sizes;
        let space = build(&global, &local);
        for idx in space.iter() {
            for dim in 0..MAX_DIMS {
                prop_assert_eq!(
                    idx.group_id[dim] * space.local_size(dim) + idx.local_id[dim],
                    idx.global_id[dim]
                );
                prop_assert!(idx.local_id[dim] < space.local_size(dim));
                prop_assert!(idx.group_id[dim] < space.num_groups(dim));
            }
        }
    }

    /// Linear decomposition is a bijection onto the global id box.
    #[test]
    fn prop_every_global_id_visited_once(sizes in space_strategy()) {
        let (global, local) = sizes;
        let space = build(&global, &local);
        let ids: BTreeSet<[usize; MAX_DIMS]> = space.iter().map(|idx| idx.global_id).collect();
        prop_assert_eq!(ids.len(), space.total_items());
        prop_assert_eq!(space.total_items(), global.iter().product::<usize>());
    }

    /// Linear order is row-major: consecutive items step the last dimension.
    #[test]
    fn prop_linear_order_is_row_major(sizes in space_strategy()) {
        let (global, local) = sizes;
        let space = build(&global, &local);
        let items: Vec<[usize; MAX_DIMS]> = space.iter().map(|idx| idx.global_id).collect();
        for pair in items.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    /// Lane groups of width 2 cover exactly the scalar work items.
    #[test]
    fn prop_lane_groups_cover_space(
        sizes in space_strategy(),
        simd_dim in 0usize..MAX_DIMS,
    ) {
        let (mut global, mut local) = sizes;
        let simd_dim = simd_dim % global.len();
        global[simd_dim] *= 2;
        local[simd_dim] *= 2;
        let space = build(&global, &local);
        let lanes = space.lane_groups::<2>(simd_dim).unwrap();

        prop_assert_eq!(lanes.total_groups() * 2, space.total_items());
        let mut from_lanes: Vec<[usize; MAX_DIMS]> = lanes
            .iter()
            .flat_map(|idx| [idx.lane(0).unwrap(), idx.lane(1).unwrap()])
            .map(|idx| idx.global_id)
            .collect();
        from_lanes.sort_unstable();
        let scalar: Vec<[usize; MAX_DIMS]> = space.iter().map(|idx| idx.global_id).collect();
        prop_assert_eq!(from_lanes, scalar);
    }
}
