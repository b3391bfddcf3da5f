//! Functions, blocks, instructions and values.
//!
//! A [`Function`] owns its blocks in an arena indexed by [`BlockId`] and its
//! values in an arena indexed by [`ValueId`]. Edges are stored as index
//! lists on each [`Block`], so cycles in the CFG never become ownership
//! cycles.

use std::fmt;

use smallvec::SmallVec;

// ── ID newtypes ─────────────────────────────────────────────────────

/// Value ID within a function.
///
/// Identifies a function parameter, an instruction result, or a constant.
/// IDs are allocated sequentially starting from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ValueId(u32);

impl ValueId {
    /// Create a new value ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Basic block ID within a function.
///
/// Stable for the lifetime of the function; IDs are allocated
/// sequentially starting from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    /// Create a new block ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

// ── Values ──────────────────────────────────────────────────────────

/// Where a value comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    /// The `index`-th function parameter.
    Param { index: u32 },
    /// Result of an instruction in `block`.
    Instr { block: BlockId },
    /// Integer constant. Never tracked by liveness.
    Const(i64),
}

/// A value definition in the function's value arena.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueDef {
    pub kind: ValueKind,
    /// Optional source-level name, used only for printing.
    pub name: Option<String>,
}

// ── Instructions ────────────────────────────────────────────────────

/// Operation performed by a non-phi instruction.
///
/// The engine never evaluates these; they exist so CFGs read like the
/// kernels they were lowered from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    CmpLt,
    CmpEq,
    Select,
    Load,
    Store,
    Call,
    /// `get_global_id(dim)` and friends.
    WorkItemQuery,
    Jump,
    Branch,
    Return,
}

impl Opcode {
    pub fn as_str(self) -> &'static str {
        match self {
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::CmpLt => "cmp.lt",
            Opcode::CmpEq => "cmp.eq",
            Opcode::Select => "select",
            Opcode::Load => "load",
            Opcode::Store => "store",
            Opcode::Call => "call",
            Opcode::WorkItemQuery => "workitem",
            Opcode::Jump => "jump",
            Opcode::Branch => "br",
            Opcode::Return => "ret",
        }
    }

    /// Returns `true` for the block-ending control transfer opcodes.
    pub fn is_terminator(self) -> bool {
        matches!(self, Opcode::Jump | Opcode::Branch | Opcode::Return)
    }
}

/// One incoming edge of a phi.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct PhiIncoming {
    pub block: BlockId,
    pub value: ValueId,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum InstrKind {
    /// Merge selecting a value by the predecessor control arrived from.
    Phi { incoming: Vec<PhiIncoming> },
    /// Ordinary operation over operand values.
    Op {
        opcode: Opcode,
        args: SmallVec<[ValueId; 4]>,
    },
}

/// A single instruction. Defines zero or one value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Instr {
    pub dst: Option<ValueId>,
    pub kind: InstrKind,
}

impl Instr {
    #[inline]
    pub fn is_phi(&self) -> bool {
        matches!(self.kind, InstrKind::Phi { .. })
    }

    /// All operand values, in order.
    ///
    /// For a phi these are the incoming values, one per incoming edge.
    pub fn operands(&self) -> SmallVec<[ValueId; 4]> {
        match &self.kind {
            InstrKind::Phi { incoming } => incoming.iter().map(|inc| inc.value).collect(),
            InstrKind::Op { args, .. } => args.clone(),
        }
    }

    /// The value this phi receives along the edge from `pred`.
    ///
    /// Returns `None` for non-phi instructions or when `pred` is not an
    /// incoming block.
    pub fn incoming_for(&self, pred: BlockId) -> Option<ValueId> {
        match &self.kind {
            InstrKind::Phi { incoming } => incoming
                .iter()
                .find(|inc| inc.block == pred)
                .map(|inc| inc.value),
            InstrKind::Op { .. } => None,
        }
    }

    /// Incoming edges of a phi; empty for other instructions.
    pub fn incoming(&self) -> &[PhiIncoming] {
        match &self.kind {
            InstrKind::Phi { incoming } => incoming,
            InstrKind::Op { .. } => &[],
        }
    }
}

// ── Blocks ──────────────────────────────────────────────────────────

/// A basic block: phis first, then ordinary instructions, ending in a
/// terminator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    pub id: BlockId,
    pub name: String,
    pub instrs: Vec<Instr>,
    /// Successors in terminator order (a branch lists then, else).
    pub succs: SmallVec<[BlockId; 2]>,
    /// Distinct predecessors, in first-seen order.
    pub preds: SmallVec<[BlockId; 4]>,
}

impl Block {
    /// The phi prefix of this block.
    pub fn phis(&self) -> impl Iterator<Item = &Instr> {
        self.instrs.iter().take_while(|instr| instr.is_phi())
    }

    /// Index of the first non-phi instruction.
    pub fn first_non_phi(&self) -> usize {
        self.instrs.iter().take_while(|instr| instr.is_phi()).count()
    }
}

// ── Functions ───────────────────────────────────────────────────────

/// A kernel function body.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Function {
    pub name: String,
    pub params: Vec<ValueId>,
    pub blocks: Vec<Block>,
    pub entry: BlockId,
    pub values: Vec<ValueDef>,
}

impl Function {
    /// Look up a block, or `None` if `id` does not belong to this function.
    #[inline]
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    #[inline]
    pub fn contains_block(&self, id: BlockId) -> bool {
        id.index() < self.blocks.len()
    }

    pub fn entry_block(&self) -> Option<&Block> {
        self.block(self.entry)
    }

    pub fn value(&self, id: ValueId) -> Option<&ValueDef> {
        self.values.get(id.index())
    }

    /// Block that defines `value`, for instruction results.
    pub fn defining_block(&self, value: ValueId) -> Option<BlockId> {
        match self.value(value)?.kind {
            ValueKind::Instr { block } => Some(block),
            ValueKind::Param { .. } | ValueKind::Const(_) => None,
        }
    }

    pub fn is_param(&self, value: ValueId) -> bool {
        matches!(
            self.value(value).map(|def| def.kind),
            Some(ValueKind::Param { .. })
        )
    }

    /// Instruction results and parameters are trackable; constants are not.
    pub fn is_trackable(&self, value: ValueId) -> bool {
        matches!(
            self.value(value).map(|def| def.kind),
            Some(ValueKind::Param { .. } | ValueKind::Instr { .. })
        )
    }

    /// Human-readable name for printing: the source name if any, else `%N`.
    pub fn value_name(&self, value: ValueId) -> String {
        match self.value(value) {
            Some(ValueDef {
                name: Some(name), ..
            }) => format!("%{name}"),
            Some(ValueDef {
                kind: ValueKind::Const(c),
                ..
            }) => c.to_string(),
            _ => value.to_string(),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|&p| self.value_name(p)).collect();
        writeln!(f, "fn {}({}) {{", self.name, params.join(", "))?;
        for block in &self.blocks {
            writeln!(f, "{}:  ; {}", block.id, block.name)?;
            for instr in &block.instrs {
                write!(f, "    ")?;
                if let Some(dst) = instr.dst {
                    write!(f, "{} = ", self.value_name(dst))?;
                }
                match &instr.kind {
                    InstrKind::Phi { incoming } => {
                        let edges: Vec<String> = incoming
                            .iter()
                            .map(|inc| format!("[{}, {}]", self.value_name(inc.value), inc.block))
                            .collect();
                        writeln!(f, "phi {}", edges.join(", "))?;
                    }
                    InstrKind::Op { opcode, args } => {
                        let mut parts: Vec<String> =
                            args.iter().map(|&a| self.value_name(a)).collect();
                        if matches!(opcode, Opcode::Jump | Opcode::Branch) {
                            parts.extend(block.succs.iter().map(ToString::to_string));
                        }
                        if parts.is_empty() {
                            writeln!(f, "{}", opcode.as_str())?;
                        } else {
                            writeln!(f, "{} {}", opcode.as_str(), parts.join(", "))?;
                        }
                    }
                }
            }
        }
        write!(f, "}}")
    }
}
