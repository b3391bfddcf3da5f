//! Loop forest: natural loops, their headers, membership and nesting.
//!
//! Consumers (the liveness analyzer in particular) take the forest as
//! precomputed input. It can be supplied directly with
//! [`LoopForest::from_loops`] or derived from the CFG's dominator tree with
//! [`LoopForest::discover`].

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::function::{BlockId, Function};
use crate::graph::DominatorTree;

/// Loop ID within a [`LoopForest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct LoopId(u32);

impl LoopId {
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A natural loop.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Loop {
    pub header: BlockId,
    /// All blocks of the loop, header included.
    pub blocks: BTreeSet<BlockId>,
    /// Innermost strictly enclosing loop.
    pub parent: Option<LoopId>,
    /// Nesting depth; outermost loops have depth 1.
    pub depth: u32,
}

impl Loop {
    #[inline]
    pub fn contains(&self, block: BlockId) -> bool {
        self.blocks.contains(&block)
    }

    /// Loop blocks with an edge back to the header.
    pub fn latches(&self, func: &Function) -> Vec<BlockId> {
        func.block(self.header)
            .map(|header| {
                header
                    .preds
                    .iter()
                    .copied()
                    .filter(|pred| self.contains(*pred))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// All loops of one function plus a block → innermost-loop index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct LoopForest {
    loops: Vec<Loop>,
    innermost: FxHashMap<BlockId, LoopId>,
}

impl LoopForest {
    /// A forest with no loops (acyclic CFGs).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a forest from `(header, members)` pairs.
    ///
    /// Nesting is derived from membership: a loop's parent is the smallest
    /// other loop whose block set strictly contains it. The header is added
    /// to its own member set if missing.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "loop counts never exceed u32"
    )]
    pub fn from_loops<I, B>(loops: I) -> Self
    where
        I: IntoIterator<Item = (BlockId, B)>,
        B: IntoIterator<Item = BlockId>,
    {
        let mut raw: Vec<(BlockId, BTreeSet<BlockId>)> = loops
            .into_iter()
            .map(|(header, members)| {
                let mut blocks: BTreeSet<BlockId> = members.into_iter().collect();
                blocks.insert(header);
                (header, blocks)
            })
            .collect();

        // Outer loops first so parents always precede children.
        raw.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(&b.0)));

        let mut forest = Self::default();
        for (header, blocks) in raw {
            let parent = forest
                .loops
                .iter()
                .enumerate()
                .filter(|(_, outer)| outer.blocks.len() > blocks.len())
                .filter(|(_, outer)| blocks.is_subset(&outer.blocks))
                .min_by_key(|(_, outer)| outer.blocks.len())
                .map(|(idx, _)| LoopId(idx as u32));
            let depth = parent.map_or(1, |p| forest.loops[p.index()].depth + 1);
            forest.loops.push(Loop {
                header,
                blocks,
                parent,
                depth,
            });
        }

        for (idx, lp) in forest.loops.iter().enumerate() {
            for &block in &lp.blocks {
                let candidate = LoopId(idx as u32);
                forest
                    .innermost
                    .entry(block)
                    .and_modify(|current| {
                        if forest_depth(&forest.loops, candidate) > forest_depth(&forest.loops, *current) {
                            *current = candidate;
                        }
                    })
                    .or_insert(candidate);
            }
        }

        forest
    }

    /// Discover the natural loops of `func`.
    ///
    /// Every edge `latch → header` where the header dominates the latch is a
    /// back edge; the loop body is everything that reaches the latch without
    /// passing through the header. Back edges sharing a header form one loop.
    pub fn discover(func: &Function) -> Self {
        let dom = DominatorTree::build(func);
        let mut bodies: Vec<(BlockId, BTreeSet<BlockId>)> = Vec::new();

        for block in &func.blocks {
            for &succ in &block.succs {
                if !dom.dominates(succ, block.id) {
                    continue;
                }
                let body = natural_loop_body(func, succ, block.id);
                match bodies.iter_mut().find(|(header, _)| *header == succ) {
                    Some((_, existing)) => existing.extend(body),
                    None => bodies.push((succ, body)),
                }
            }
        }

        tracing::trace!(function = %func.name, loops = bodies.len(), "discovered loops");
        Self::from_loops(bodies)
    }

    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    pub fn get(&self, id: LoopId) -> Option<&Loop> {
        self.loops.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Loop> {
        self.loops.iter()
    }

    /// Innermost loop containing `block`.
    pub fn loop_for(&self, block: BlockId) -> Option<&Loop> {
        self.innermost.get(&block).and_then(|&id| self.get(id))
    }

    pub fn is_header(&self, block: BlockId) -> bool {
        self.loops.iter().any(|lp| lp.header == block)
    }

    /// Is `from → to` a back edge, i.e. is `to` the header of a loop that
    /// contains `from`?
    ///
    /// Checks the innermost loop of `from` and every enclosing loop, so an
    /// edge from an inner loop straight to an outer header counts.
    pub fn is_back_edge(&self, from: BlockId, to: BlockId) -> bool {
        let mut current = self.innermost.get(&from).copied();
        while let Some(id) = current {
            let Some(lp) = self.get(id) else {
                return false;
            };
            if lp.header == to {
                return true;
            }
            current = lp.parent;
        }
        false
    }
}

fn forest_depth(loops: &[Loop], id: LoopId) -> u32 {
    loops.get(id.index()).map_or(0, |lp| lp.depth)
}

/// Blocks reaching `latch` backwards without crossing `header`.
fn natural_loop_body(func: &Function, header: BlockId, latch: BlockId) -> BTreeSet<BlockId> {
    let mut body = BTreeSet::new();
    body.insert(header);
    let mut worklist = vec![latch];
    while let Some(block) = worklist.pop() {
        if !body.insert(block) {
            continue;
        }
        if let Some(bb) = func.block(block) {
            worklist.extend(bb.preds.iter().copied());
        }
    }
    body
}
