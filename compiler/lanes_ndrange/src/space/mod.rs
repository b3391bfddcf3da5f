//! The iteration space of a launch and its work-item decomposition.
//!
//! Linear work-item numbers map to per-dimension ids in row-major order:
//! the highest-numbered dimension varies fastest. For a 2-D space of
//! `[2, 3]`, linear 0..6 visit `(0,0) (0,1) (0,2) (1,0) (1,1) (1,2)`.

use crate::error::{SizeArray, ValidationError};

/// Maximum number of dimensions of an iteration space.
pub const MAX_DIMS: usize = 3;

/// A validated iteration space.
///
/// Dimensions beyond `dims` are padded with extent 1, so per-dimension
/// arrays can always be indexed `0..MAX_DIMS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IterationSpace {
    dims: usize,
    global: [usize; MAX_DIMS],
    local: [usize; MAX_DIMS],
    total_items: usize,
}

/// Ids of one work item.
///
/// For every dimension `d`, `group_id[d] * local_size[d] + local_id[d] ==
/// global_id[d]`. Padding dimensions hold 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WorkItemIndex {
    pub global_id: [usize; MAX_DIMS],
    pub local_id: [usize; MAX_DIMS],
    pub group_id: [usize; MAX_DIMS],
}

impl IterationSpace {
    /// Validate a launch request.
    ///
    /// Checks, in order: `1 <= dims <= 3`, both size arrays present with
    /// exactly `dims` entries, then per dimension a positive local extent
    /// and a positive global extent divisible by it, and finally that the
    /// work-item count fits in `usize`. Nothing is built on failure.
    pub fn build(
        dims: usize,
        global: Option<&[usize]>,
        local: Option<&[usize]>,
    ) -> Result<Self, ValidationError> {
        if dims == 0 || dims > MAX_DIMS {
            return Err(ValidationError::InvalidWorkDimension {
                dim: dims,
                max: MAX_DIMS,
            });
        }
        let global = require_sizes(SizeArray::Global, global, dims)?;
        let local = require_sizes(SizeArray::Local, local, dims)?;

        let mut space = Self {
            dims,
            global: [1; MAX_DIMS],
            local: [1; MAX_DIMS],
            total_items: 1,
        };
        for dim in 0..dims {
            let (g, l) = (global[dim], local[dim]);
            if l == 0 || g == 0 || g % l != 0 {
                return Err(ValidationError::InvalidWorkGroupSize {
                    dim,
                    global: g,
                    local: l,
                });
            }
            space.global[dim] = g;
            space.local[dim] = l;
        }

        // Group count and group size never exceed the item count, so one
        // check covers all three totals.
        space.total_items = global
            .iter()
            .try_fold(1usize, |acc, &g| acc.checked_mul(g))
            .ok_or_else(|| ValidationError::TooManyWorkItems {
                global: global.to_vec(),
            })?;
        Ok(space)
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Global extents of the declared dimensions.
    pub fn global(&self) -> &[usize] {
        &self.global[..self.dims]
    }

    /// Local (work-group) extents of the declared dimensions.
    pub fn local(&self) -> &[usize] {
        &self.local[..self.dims]
    }

    /// Global extent of `dim`, 1 beyond the declared dimensions.
    pub fn global_size(&self, dim: usize) -> usize {
        self.global.get(dim).copied().unwrap_or(1)
    }

    /// Local extent of `dim`, 1 beyond the declared dimensions.
    pub fn local_size(&self, dim: usize) -> usize {
        self.local.get(dim).copied().unwrap_or(1)
    }

    /// Number of work groups along `dim`, 1 beyond the declared dimensions.
    pub fn num_groups(&self, dim: usize) -> usize {
        self.global_size(dim) / self.local_size(dim)
    }

    /// Work-group counts, padded to [`MAX_DIMS`].
    pub fn group_count(&self) -> [usize; MAX_DIMS] {
        std::array::from_fn(|dim| self.num_groups(dim))
    }

    /// Total number of work items.
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Total number of work groups.
    pub fn total_groups(&self) -> usize {
        self.group_count().iter().product()
    }

    /// Number of work items per group.
    pub fn group_items(&self) -> usize {
        self.local.iter().product()
    }

    /// Decompose a linear work-item number.
    ///
    /// `linear` must be below [`total_items`](Self::total_items).
    pub fn index_of(&self, linear: usize) -> WorkItemIndex {
        debug_assert!(linear < self.total_items(), "work item {linear} out of range");
        let global_id = decompose(linear, &self.global);
        let mut index = WorkItemIndex {
            global_id,
            ..WorkItemIndex::default()
        };
        for dim in 0..MAX_DIMS {
            index.local_id[dim] = global_id[dim] % self.local[dim];
            index.group_id[dim] = global_id[dim] / self.local[dim];
        }
        index
    }

    /// All work items in linear order.
    pub fn iter(&self) -> impl Iterator<Item = WorkItemIndex> + '_ {
        (0..self.total_items()).map(|linear| self.index_of(linear))
    }

    /// Group ids of a linear work-group number, row-major like work items.
    pub fn group_of(&self, group: usize) -> [usize; MAX_DIMS] {
        decompose(group, &self.group_count())
    }

    /// The work items of one group, local ids in row-major order.
    ///
    /// Iterating every group in turn visits each work item exactly once.
    pub fn items_in_group(&self, group: usize) -> impl Iterator<Item = WorkItemIndex> + '_ {
        let group_id = self.group_of(group);
        (0..self.group_items()).map(move |linear| {
            let local_id = decompose(linear, &self.local);
            WorkItemIndex {
                global_id: std::array::from_fn(|d| group_id[d] * self.local[d] + local_id[d]),
                local_id,
                group_id,
            }
        })
    }
}

fn require_sizes(
    which: SizeArray,
    sizes: Option<&[usize]>,
    dims: usize,
) -> Result<&[usize], ValidationError> {
    match sizes {
        Some(sizes) if sizes.len() == dims => Ok(sizes),
        other => Err(ValidationError::MissingSizeArray {
            which,
            expected: dims,
            found: other.map(<[usize]>::len),
        }),
    }
}

/// Row-major decomposition of `linear` over `extents`, last dimension
/// fastest.
fn decompose(mut linear: usize, extents: &[usize; MAX_DIMS]) -> [usize; MAX_DIMS] {
    let mut ids = [0; MAX_DIMS];
    for dim in (0..MAX_DIMS).rev() {
        ids[dim] = linear % extents[dim];
        linear /= extents[dim];
    }
    ids
}

#[cfg(test)]
mod tests;
