//! Per-launch index registers read by running kernels.
//!
//! The dispatcher owns one register set per worker and updates it right
//! before each invocation. Kernels query it the way OpenCL C kernels call
//! `get_global_id` and friends. Queries for a dimension the launch does not
//! declare return 1 for sizes and 0 for ids.

use lanes_ndrange::{IterationSpace, LaneGroupIndex, LaneGroupSpace, WorkItemIndex};

/// Current work item and launch geometry, for scalar invocations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexRegisters {
    space: IterationSpace,
    current: WorkItemIndex,
}

impl IndexRegisters {
    pub fn new(space: IterationSpace) -> Self {
        Self {
            space,
            current: WorkItemIndex::default(),
        }
    }

    pub(crate) fn set(&mut self, index: WorkItemIndex) {
        self.current = index;
    }

    /// The full index of the current work item.
    pub fn current(&self) -> &WorkItemIndex {
        &self.current
    }

    pub fn work_dim(&self) -> usize {
        self.space.dims()
    }

    pub fn global_size(&self, dim: usize) -> usize {
        if dim < self.space.dims() {
            self.space.global_size(dim)
        } else {
            1
        }
    }

    pub fn local_size(&self, dim: usize) -> usize {
        if dim < self.space.dims() {
            self.space.local_size(dim)
        } else {
            1
        }
    }

    pub fn num_groups(&self, dim: usize) -> usize {
        if dim < self.space.dims() {
            self.space.num_groups(dim)
        } else {
            1
        }
    }

    pub fn global_id(&self, dim: usize) -> usize {
        self.id(&self.current.global_id, dim)
    }

    pub fn local_id(&self, dim: usize) -> usize {
        self.id(&self.current.local_id, dim)
    }

    pub fn group_id(&self, dim: usize) -> usize {
        self.id(&self.current.group_id, dim)
    }

    fn id(&self, ids: &[usize], dim: usize) -> usize {
        if dim < self.space.dims() {
            ids.get(dim).copied().unwrap_or(0)
        } else {
            0
        }
    }
}

/// Registers for a vectorized invocation covering `W` lanes.
///
/// The scalar view holds lane 0's ids; the SIMD dimension's ids of every
/// lane come packed in arrays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaneRegisters<const W: usize> {
    scalar: IndexRegisters,
    lanes: LaneGroupIndex<W>,
}

impl<const W: usize> LaneRegisters<W> {
    pub fn new(lanes: &LaneGroupSpace<W>) -> Self {
        let first = lanes.index_of(0);
        let mut scalar = IndexRegisters::new(*lanes.space());
        scalar.set(first.scalar);
        Self {
            scalar,
            lanes: first,
        }
    }

    pub(crate) fn set(&mut self, index: LaneGroupIndex<W>) {
        self.scalar.set(index.scalar);
        self.lanes = index;
    }

    /// Geometry and lane-0 ids.
    pub fn scalar(&self) -> &IndexRegisters {
        &self.scalar
    }

    pub fn simd_dim(&self) -> usize {
        self.lanes.simd_dim
    }

    /// Global ids of all lanes in the SIMD dimension.
    pub fn global_ids(&self) -> &[usize; W] {
        &self.lanes.lane_global_id
    }

    /// Local ids of all lanes in the SIMD dimension.
    pub fn local_ids(&self) -> &[usize; W] {
        &self.lanes.lane_local_id
    }

    /// Full index of lane `lane`.
    pub fn lane(&self, lane: usize) -> Option<WorkItemIndex> {
        self.lanes.lane(lane)
    }

    pub fn current(&self) -> &LaneGroupIndex<W> {
        &self.lanes
    }
}
