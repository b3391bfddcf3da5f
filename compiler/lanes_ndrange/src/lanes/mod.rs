//! Lane-group decomposition for vectorized dispatch.
//!
//! A vectorized kernel handles `W` adjacent work items of one dimension
//! (the SIMD dimension) per invocation. The lane-group space is the
//! iteration space with that dimension's global and local extents divided
//! by `W`; each of its points expands to `W` packed lane ids.

use crate::error::{AlignmentError, LaneGroupError, ValidationError};
use crate::space::{IterationSpace, WorkItemIndex, MAX_DIMS};

/// Ids of one lane group of width `W`.
///
/// `scalar` holds the ids of lane 0 in every dimension. The `lane_*`
/// arrays hold the SIMD dimension's ids of all lanes: lane `k` has global
/// id `scalar.global_id[simd_dim] + k`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LaneGroupIndex<const W: usize> {
    pub simd_dim: usize,
    pub scalar: WorkItemIndex,
    pub lane_global_id: [usize; W],
    pub lane_local_id: [usize; W],
}

impl<const W: usize> LaneGroupIndex<W> {
    /// Full work-item index of lane `lane`, or `None` if `lane >= W`.
    pub fn lane(&self, lane: usize) -> Option<WorkItemIndex> {
        let global = *self.lane_global_id.get(lane)?;
        let local = *self.lane_local_id.get(lane)?;
        let mut index = self.scalar;
        index.global_id[self.simd_dim] = global;
        index.local_id[self.simd_dim] = local;
        Some(index)
    }
}

/// An iteration space split into lane groups of width `W`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneGroupSpace<const W: usize> {
    space: IterationSpace,
    reduced: IterationSpace,
    simd_dim: usize,
}

impl IterationSpace {
    /// Split `simd_dim` into lane groups of width `W`.
    ///
    /// Fails with `InvalidWorkDimension` if `simd_dim` is not a declared
    /// dimension, and with `SimdDimensionNotDivisible` unless both its
    /// global and local extents are multiples of `W`.
    pub fn lane_groups<const W: usize>(
        &self,
        simd_dim: usize,
    ) -> Result<LaneGroupSpace<W>, LaneGroupError> {
        if simd_dim >= self.dims() {
            return Err(ValidationError::InvalidWorkDimension {
                dim: simd_dim,
                max: self.dims() - 1,
            }
            .into());
        }
        let global = self.global_size(simd_dim);
        let local = self.local_size(simd_dim);
        if W == 0 || global % W != 0 || local % W != 0 {
            return Err(AlignmentError::SimdDimensionNotDivisible {
                dim: simd_dim,
                global,
                local,
                width: W,
            }
            .into());
        }

        let mut reduced_global = [0; MAX_DIMS];
        let mut reduced_local = [0; MAX_DIMS];
        for dim in 0..self.dims() {
            reduced_global[dim] = self.global_size(dim);
            reduced_local[dim] = self.local_size(dim);
        }
        reduced_global[simd_dim] /= W;
        reduced_local[simd_dim] /= W;
        let reduced = IterationSpace::build(
            self.dims(),
            Some(&reduced_global[..self.dims()]),
            Some(&reduced_local[..self.dims()]),
        )?;

        Ok(LaneGroupSpace {
            space: *self,
            reduced,
            simd_dim,
        })
    }
}

impl<const W: usize> LaneGroupSpace<W> {
    /// The undivided iteration space.
    pub fn space(&self) -> &IterationSpace {
        &self.space
    }

    pub fn simd_dim(&self) -> usize {
        self.simd_dim
    }

    /// Number of lane groups (vectorized invocations).
    pub fn total_groups(&self) -> usize {
        self.reduced.total_items()
    }

    /// Decompose a linear lane-group number, row-major with the highest
    /// dimension fastest.
    pub fn index_of(&self, linear: usize) -> LaneGroupIndex<W> {
        self.expand(self.reduced.index_of(linear))
    }

    /// All lane groups in linear order.
    pub fn iter(&self) -> impl Iterator<Item = LaneGroupIndex<W>> + '_ {
        self.reduced.iter().map(|reduced| self.expand(reduced))
    }

    /// Number of work groups; identical to the undivided space's.
    pub fn total_work_groups(&self) -> usize {
        self.reduced.total_groups()
    }

    /// The lane groups of one work group.
    pub fn groups_in_work_group(
        &self,
        group: usize,
    ) -> impl Iterator<Item = LaneGroupIndex<W>> + '_ {
        self.reduced
            .items_in_group(group)
            .map(|reduced| self.expand(reduced))
    }

    fn expand(&self, reduced: WorkItemIndex) -> LaneGroupIndex<W> {
        let dim = self.simd_dim;
        let base_global = reduced.global_id[dim] * W;
        let base_local = reduced.local_id[dim] * W;
        let mut scalar = reduced;
        scalar.global_id[dim] = base_global;
        scalar.local_id[dim] = base_local;
        LaneGroupIndex {
            simd_dim: dim,
            scalar,
            lane_global_id: std::array::from_fn(|k| base_global + k),
            lane_local_id: std::array::from_fn(|k| base_local + k),
        }
    }
}

#[cfg(test)]
mod tests;
