//! Control-flow graph model for Lanes kernels.
//!
//! This crate provides:
//!
//! - **Function IR** ([`Function`], [`Block`], [`Instr`], [`ValueDef`]):
//!   blocks and values live in per-function arenas indexed by [`BlockId`]
//!   and [`ValueId`]; edges are index lists, so cyclic CFGs need no
//!   shared ownership.
//! - **Builder** ([`FunctionBuilder`]): position/emit/terminate
//!   construction with late-bound phi incoming edges.
//! - **Graph utilities** ([`graph`]): postorder, reachability, dominators.
//! - **Loop forest** ([`LoopForest`], [`Loop`]): headers, membership and
//!   nesting, supplied precomputed to analyses.
//!
//! The IR is pure data. Nothing here evaluates instructions.

mod builder;
mod function;
pub mod graph;
mod loops;

pub use builder::FunctionBuilder;
pub use function::{
    Block, BlockId, Function, Instr, InstrKind, Opcode, PhiIncoming, ValueDef, ValueId, ValueKind,
};
pub use loops::{Loop, LoopForest, LoopId};
