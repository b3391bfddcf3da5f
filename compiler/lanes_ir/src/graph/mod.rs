//! Shared CFG traversal utilities.
//!
//! Generic graph operations on [`Function`] needed by more than one
//! consumer: the liveness solvers (postorder), loop discovery (dominators)
//! and the CLI (reachability reports).

use crate::function::{BlockId, Function};

/// Compute a postorder traversal of the CFG starting from the entry block.
///
/// Uses an iterative DFS with an explicit stack to avoid recursion depth
/// issues on deeply nested CFGs. Only visits reachable blocks. Successors
/// are explored in terminator order.
pub fn compute_postorder(func: &Function) -> Vec<BlockId> {
    let num_blocks = func.blocks.len();
    let mut visited = vec![false; num_blocks];
    let mut postorder = Vec::with_capacity(num_blocks);

    if !func.contains_block(func.entry) {
        return postorder;
    }

    // Stack entries: (block, index of next successor to explore).
    visited[func.entry.index()] = true;
    let mut stack: Vec<(BlockId, usize)> = vec![(func.entry, 0)];

    while let Some(&mut (block, ref mut next)) = stack.last_mut() {
        let succs = &func.blocks[block.index()].succs;
        if let Some(&succ) = succs.get(*next) {
            *next += 1;
            if succ.index() < num_blocks && !visited[succ.index()] {
                visited[succ.index()] = true;
                stack.push((succ, 0));
            }
            continue;
        }
        postorder.push(block);
        stack.pop();
    }

    postorder
}

/// Reverse postorder: every block precedes its non-back-edge successors.
pub fn reverse_postorder(func: &Function) -> Vec<BlockId> {
    let mut rpo = compute_postorder(func);
    rpo.reverse();
    rpo
}

/// Blocks reachable from the entry, as a dense membership vector.
pub fn reachable_blocks(func: &Function) -> Vec<bool> {
    let mut reachable = vec![false; func.blocks.len()];
    for block in compute_postorder(func) {
        reachable[block.index()] = true;
    }
    reachable
}

/// Dominator tree for kernel functions.
///
/// Uses the Cooper-Harvey-Kennedy iterative algorithm on reverse postorder.
/// Used by loop discovery to recognize back edges (`latch → header` where
/// the header dominates the latch).
///
/// Reference: Cooper, Harvey, Kennedy, "A Simple, Fast Dominance Algorithm" (2001)
pub struct DominatorTree {
    /// Immediate dominator for each block, indexed by block index.
    /// `idom[entry] == Some(entry)`; unreachable blocks are `None`.
    idom: Vec<Option<usize>>,
}

impl DominatorTree {
    /// Build the dominator tree for a function.
    pub fn build(func: &Function) -> Self {
        let n = func.blocks.len();
        if n == 0 || !func.contains_block(func.entry) {
            return Self { idom: vec![None; n] };
        }

        let rpo: Vec<usize> = reverse_postorder(func)
            .into_iter()
            .map(BlockId::index)
            .collect();

        // Map block index → RPO position for O(1) lookup
        let mut rpo_pos = vec![usize::MAX; n];
        for (pos, &block_idx) in rpo.iter().enumerate() {
            rpo_pos[block_idx] = pos;
        }

        let entry = func.entry.index();
        let mut idom: Vec<Option<usize>> = vec![None; n];
        idom[entry] = Some(entry);

        let mut changed = true;
        while changed {
            changed = false;
            for &block_idx in &rpo[1..] {
                let preds = &func.blocks[block_idx].preds;

                // First processed predecessor
                let Some(mut new_idom) = preds
                    .iter()
                    .map(|p| p.index())
                    .find(|&p| idom[p].is_some())
                else {
                    continue;
                };

                for pred in preds.iter().map(|p| p.index()) {
                    if pred != new_idom && idom[pred].is_some() {
                        new_idom = Self::intersect(pred, new_idom, &idom, &rpo_pos);
                    }
                }

                if idom[block_idx] != Some(new_idom) {
                    idom[block_idx] = Some(new_idom);
                    changed = true;
                }
            }
        }

        Self { idom }
    }

    /// Does block `a` dominate block `b`?
    ///
    /// A block dominates itself. Unreachable blocks are dominated by nothing
    /// but themselves.
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        let a_idx = a.index();
        let mut current = b.index();
        loop {
            if current == a_idx {
                return true;
            }
            match self.idom.get(current).copied().flatten() {
                Some(dom) if dom != current => current = dom,
                _ => return false,
            }
        }
    }

    /// Immediate dominator of `block` (the entry is its own).
    #[expect(
        clippy::cast_possible_truncation,
        reason = "block indices never exceed u32"
    )]
    pub fn idom(&self, block: BlockId) -> Option<BlockId> {
        self.idom
            .get(block.index())
            .copied()
            .flatten()
            .map(|idx| BlockId::new(idx as u32))
    }

    /// CHK intersect: walk two fingers upward until they meet.
    fn intersect(mut a: usize, mut b: usize, idom: &[Option<usize>], rpo_pos: &[usize]) -> usize {
        while a != b {
            while rpo_pos[a] > rpo_pos[b] {
                let Some(next) = idom[a] else {
                    debug_assert!(false, "intersect: broken idom chain at {a}");
                    return a;
                };
                a = next;
            }
            while rpo_pos[b] > rpo_pos[a] {
                let Some(next) = idom[b] else {
                    debug_assert!(false, "intersect: broken idom chain at {b}");
                    return b;
                };
                b = next;
            }
        }
        a
    }
}
