//! Kernel execution for the Lanes engine.
//!
//! - **Memory** ([`BufferHandle`]): fixed-size byte regions with stable
//!   addresses, what Global arguments point at.
//! - **Arguments** ([`KernelSignature`], [`ArgumentTable`],
//!   [`ArgumentBuffer`]): binding tagged host values and packing them into
//!   the kernel's calling convention.
//! - **Registers** ([`IndexRegisters`], [`LaneRegisters`]): the per-launch
//!   work-item context kernels query.
//! - **Kernels** ([`Kernel`], [`ScalarEntry`], [`VectorEntry`]): compiled
//!   entry points plus bound arguments.
//! - **Dispatch** ([`launch`], [`launch_nd`]): scalar, vectorized and
//!   parallel execution over an [`IterationSpace`](lanes_ndrange::IterationSpace).

mod args;
mod config;
mod dispatch;
mod error;
mod kernel;
mod memory;
mod registers;
mod scalar;

pub use args::{
    AddressSpace, ArgValue, ArgumentBuffer, ArgumentTable, BoundArg, KernelSignature, ParamDesc,
};
pub use config::{DispatchConfig, DispatchMode, DispatchPath, THREADS_ENV};
pub use dispatch::{dispatch_scalar, dispatch_vectorized, launch, launch_nd, LaunchSummary};
pub use error::{ArgumentError, BuildError, DispatchError, EntryKind, MemoryError};
pub use kernel::{Kernel, ScalarEntry, VectorEntry};
pub use memory::BufferHandle;
pub use registers::{IndexRegisters, LaneRegisters};
pub use scalar::Scalar;
