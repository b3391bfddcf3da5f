//! Per-block liveness results and their queries.

use std::collections::BTreeSet;

use lanes_ir::{BlockId, Function, ValueId};

use crate::error::QueryError;

/// Set of live values at a block boundary.
///
/// Ordered, so two analyses of the same function print identically.
pub type LiveSet = BTreeSet<ValueId>;

/// Live-in and live-out sets of one block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockLiveness {
    /// Values live on entry to the block.
    pub live_in: LiveSet,
    /// Values live on exit from the block.
    pub live_out: LiveSet,
}

/// Answer to a live-in/live-out query for a block of the analyzed function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LivenessQuery<'a> {
    Live(&'a LiveSet),
    /// The block is unreachable from the entry and has no computed sets.
    /// This is not the same as an empty set.
    Unreachable,
}

impl<'a> LivenessQuery<'a> {
    /// The computed set, or `None` for unreachable blocks.
    pub fn live(self) -> Option<&'a LiveSet> {
        match self {
            LivenessQuery::Live(set) => Some(set),
            LivenessQuery::Unreachable => None,
        }
    }

    pub fn is_unreachable(self) -> bool {
        matches!(self, LivenessQuery::Unreachable)
    }
}

/// Liveness of every block of one function.
///
/// Immutable once computed. Reanalyzing a function produces a new result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LivenessResult {
    function: String,
    /// Indexed by `BlockId::index()`; `None` for unreachable blocks.
    blocks: Vec<Option<BlockLiveness>>,
}

impl LivenessResult {
    pub(crate) fn new(func: &Function, blocks: Vec<Option<BlockLiveness>>) -> Self {
        debug_assert_eq!(blocks.len(), func.blocks.len());
        Self {
            function: func.name.clone(),
            blocks,
        }
    }

    /// Name of the analyzed function.
    pub fn function_name(&self) -> &str {
        &self.function
    }

    /// Both sets of `block`, `Ok(None)` if it is unreachable.
    pub fn block(&self, block: BlockId) -> Result<Option<&BlockLiveness>, QueryError> {
        match self.blocks.get(block.index()) {
            Some(sets) => Ok(sets.as_ref()),
            None => Err(QueryError::UnknownBlock {
                block,
                function: self.function.clone(),
            }),
        }
    }

    /// Values live on entry to `block`.
    pub fn live_in(&self, block: BlockId) -> Result<LivenessQuery<'_>, QueryError> {
        Ok(self
            .block(block)?
            .map_or(LivenessQuery::Unreachable, |sets| {
                LivenessQuery::Live(&sets.live_in)
            }))
    }

    /// Values live on exit from `block`.
    pub fn live_out(&self, block: BlockId) -> Result<LivenessQuery<'_>, QueryError> {
        Ok(self
            .block(block)?
            .map_or(LivenessQuery::Unreachable, |sets| {
                LivenessQuery::Live(&sets.live_out)
            }))
    }

    /// Reachable blocks and their sets, in block order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "block indices never exceed u32"
    )]
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &BlockLiveness)> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(idx, sets)| sets.as_ref().map(|s| (BlockId::new(idx as u32), s)))
    }

    /// Render every block's sets, one block per line.
    ///
    /// ```text
    /// liveness of `copy`
    ///   bb0 (entry): in {} out {%v}
    ///   bb1 (exit): in {%v} out {}
    /// ```
    pub fn dump(&self, func: &Function) -> String {
        let render = |set: &LiveSet| -> String {
            let names: Vec<String> = set.iter().map(|&v| func.value_name(v)).collect();
            format!("{{{}}}", names.join(", "))
        };

        let mut lines = vec![format!("liveness of `{}`", self.function)];
        for (idx, sets) in self.blocks.iter().enumerate() {
            let label = func
                .blocks
                .get(idx)
                .map_or_else(|| format!("bb{idx}"), |bb| format!("{} ({})", bb.id, bb.name));
            match sets {
                Some(sets) => lines.push(format!(
                    "  {label}: in {} out {}",
                    render(&sets.live_in),
                    render(&sets.live_out)
                )),
                None => lines.push(format!("  {label}: unreachable")),
            }
        }
        lines.join("\n")
    }
}
