//! The compiled-kernel contract.
//!
//! Code generation hands the engine a [`KernelSignature`] plus callable
//! entry points. The scalar entry runs one work item; the vectorized entry
//! runs `W` adjacent work items of the SIMD dimension at once. Both get the
//! launch's [`ArgumentBuffer`] and the caller's register set. The
//! dispatcher never looks inside them.

use crate::args::{ArgValue, ArgumentTable, KernelSignature};
use crate::config::DispatchConfig;
use crate::error::ArgumentError;
use crate::registers::{IndexRegisters, LaneRegisters};
use crate::ArgumentBuffer;

/// Entry point invoked once per work item.
pub trait ScalarEntry: Send + Sync {
    fn run(&self, args: &ArgumentBuffer, regs: &IndexRegisters);
}

impl<F> ScalarEntry for F
where
    F: Fn(&ArgumentBuffer, &IndexRegisters) + Send + Sync,
{
    fn run(&self, args: &ArgumentBuffer, regs: &IndexRegisters) {
        self(args, regs);
    }
}

/// Entry point invoked once per lane group of width `W`.
pub trait VectorEntry<const W: usize>: Send + Sync {
    fn run(&self, args: &ArgumentBuffer, regs: &LaneRegisters<W>);
}

impl<F, const W: usize> VectorEntry<W> for F
where
    F: Fn(&ArgumentBuffer, &LaneRegisters<W>) + Send + Sync,
{
    fn run(&self, args: &ArgumentBuffer, regs: &LaneRegisters<W>) {
        self(args, regs);
    }
}

/// A compiled kernel with its bound arguments.
///
/// `W` is the lane width of the vectorized entry point.
pub struct Kernel<const W: usize = 4> {
    signature: KernelSignature,
    scalar: Option<Box<dyn ScalarEntry>>,
    vector: Option<Box<dyn VectorEntry<W>>>,
    args: ArgumentTable,
}

impl<const W: usize> Kernel<W> {
    /// A kernel with no entry points yet and nothing bound.
    pub fn new(signature: KernelSignature) -> Self {
        let args = ArgumentTable::new(signature.params.len());
        Self {
            signature,
            scalar: None,
            vector: None,
            args,
        }
    }

    pub fn with_scalar<F>(self, entry: F) -> Self
    where
        F: Fn(&ArgumentBuffer, &IndexRegisters) + Send + Sync + 'static,
    {
        self.with_scalar_entry(entry)
    }

    pub fn with_scalar_entry(mut self, entry: impl ScalarEntry + 'static) -> Self {
        self.scalar = Some(Box::new(entry));
        self
    }

    pub fn with_vector<F>(self, entry: F) -> Self
    where
        F: Fn(&ArgumentBuffer, &LaneRegisters<W>) + Send + Sync + 'static,
    {
        self.with_vector_entry(entry)
    }

    pub fn with_vector_entry(mut self, entry: impl VectorEntry<W> + 'static) -> Self {
        self.vector = Some(Box::new(entry));
        self
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn signature(&self) -> &KernelSignature {
        &self.signature
    }

    pub fn args(&self) -> &ArgumentTable {
        &self.args
    }

    pub fn num_args(&self) -> usize {
        self.signature.params.len()
    }

    /// Bind parameter `index`. See [`ArgumentTable::bind`].
    pub fn set_arg(
        &mut self,
        index: usize,
        size_hint: usize,
        value: Option<ArgValue>,
    ) -> Result<(), ArgumentError> {
        self.args.bind(&self.signature, index, size_hint, value)
    }

    /// Pack the bound arguments for a launch.
    pub fn marshal(&self) -> Result<ArgumentBuffer, ArgumentError> {
        ArgumentBuffer::marshal(&self.signature, &self.args)
    }

    pub fn lane_width(&self) -> usize {
        W
    }

    /// Preferred work-group size: lane width times worker count.
    pub fn work_group_size(&self, config: &DispatchConfig) -> usize {
        W * config.workers()
    }

    pub(crate) fn scalar_entry(&self) -> Option<&dyn ScalarEntry> {
        self.scalar.as_deref()
    }

    pub(crate) fn vector_entry(&self) -> Option<&dyn VectorEntry<W>> {
        self.vector.as_deref()
    }
}

impl<const W: usize> std::fmt::Debug for Kernel<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("signature", &self.signature)
            .field("scalar", &self.scalar.is_some())
            .field("vector", &self.vector.is_some())
            .field("lane_width", &W)
            .finish_non_exhaustive()
    }
}
