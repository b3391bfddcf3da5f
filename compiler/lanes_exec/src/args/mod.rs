//! Kernel signatures, argument binding and marshaling.
//!
//! A compiled kernel declares an ordered list of parameters, each with a
//! byte width and an address space ([`KernelSignature`]). The host binds a
//! tagged [`ArgValue`] to each slot of an [`ArgumentTable`]; at launch the
//! table is packed into one [`ArgumentBuffer`] in declared order:
//!
//! - **Private**: the literal bytes, truncated or zero-extended to the
//!   declared width.
//! - **Global**: the bound region's base address as a native-endian
//!   integer, sized the same way.
//! - **Local**, **Constant**: rejected.
//!
//! Parameters are packed back to back without padding.

use std::fmt;
use std::mem::size_of;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::ArgumentError;
use crate::memory::BufferHandle;
use crate::scalar::Scalar;

/// Where a kernel parameter's storage lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressSpace {
    Private,
    Global,
    Local,
    Constant,
}

impl AddressSpace {
    pub fn as_str(self) -> &'static str {
        match self {
            AddressSpace::Private => "private",
            AddressSpace::Global => "global",
            AddressSpace::Local => "local",
            AddressSpace::Constant => "constant",
        }
    }
}

impl fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared kernel parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParamDesc {
    /// Byte width of the parameter's slot in the argument buffer.
    pub width: usize,
    pub space: AddressSpace,
}

impl ParamDesc {
    pub fn private(width: usize) -> Self {
        Self {
            width,
            space: AddressSpace::Private,
        }
    }

    /// A pointer-sized Global parameter.
    pub fn global() -> Self {
        Self {
            width: size_of::<usize>(),
            space: AddressSpace::Global,
        }
    }

    pub fn local(width: usize) -> Self {
        Self {
            width,
            space: AddressSpace::Local,
        }
    }

    pub fn constant(width: usize) -> Self {
        Self {
            width,
            space: AddressSpace::Constant,
        }
    }
}

/// The parameter list a compiled kernel declares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelSignature {
    pub name: String,
    pub params: Vec<ParamDesc>,
}

impl KernelSignature {
    pub fn new(name: impl Into<String>, params: impl IntoIterator<Item = ParamDesc>) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
        }
    }

    pub fn param(&self, index: usize) -> Option<&ParamDesc> {
        self.params.get(index)
    }

    /// Size of the packed argument buffer.
    pub fn buffer_size(&self) -> usize {
        self.params.iter().map(|p| p.width).sum()
    }
}

/// A host value bound to a kernel parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgValue {
    /// Literal bytes, passed by value.
    Private(SmallVec<[u8; 16]>),
    /// A memory region, passed by address.
    Global(BufferHandle),
    /// A read-only memory region. Not supported by the dispatcher.
    Constant(BufferHandle),
}

impl ArgValue {
    /// A private value from a scalar's native-endian bytes.
    pub fn scalar<T: Scalar>(value: T) -> Self {
        ArgValue::Private(SmallVec::from_slice(value.to_ne_bytes().as_ref()))
    }

    pub fn bytes(bytes: &[u8]) -> Self {
        ArgValue::Private(SmallVec::from_slice(bytes))
    }

    pub fn space(&self) -> AddressSpace {
        match self {
            ArgValue::Private(_) => AddressSpace::Private,
            ArgValue::Global(_) => AddressSpace::Global,
            ArgValue::Constant(_) => AddressSpace::Constant,
        }
    }
}

/// What a table slot holds once bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoundArg {
    Value(ArgValue),
    /// A Local parameter: only the size of the local allocation is known.
    Local { size: usize },
}

/// Bound arguments of one kernel, one slot per declared parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArgumentTable {
    slots: Vec<Option<BoundArg>>,
}

impl ArgumentTable {
    pub fn new(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BoundArg> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Lowest index with nothing bound.
    pub fn first_unbound(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Bind `value` to parameter `index` of `signature`.
    ///
    /// Local parameters take no value, only a size (`size_hint`). Every
    /// other parameter needs a value tagged with its declared address
    /// space. For those, `size_hint` is advisory: the declared width wins,
    /// and a hint matching neither the width nor the size of a buffer
    /// handle is only logged.
    pub fn bind(
        &mut self,
        signature: &KernelSignature,
        index: usize,
        size_hint: usize,
        value: Option<ArgValue>,
    ) -> Result<(), ArgumentError> {
        let Some(param) = signature.param(index) else {
            return Err(ArgumentError::ArgIndexOutOfRange {
                index,
                count: signature.params.len(),
            });
        };
        if self.slots.len() < signature.params.len() {
            self.slots.resize(signature.params.len(), None);
        }

        let bound = match (param.space, value) {
            (AddressSpace::Local, None) => BoundArg::Local { size: size_hint },
            (AddressSpace::Local, Some(_)) => {
                return Err(ArgumentError::UnexpectedArgValue { index });
            }
            (_, None) => return Err(ArgumentError::MissingArgValue { index }),
            (expected, Some(value)) => {
                if value.space() != expected {
                    return Err(ArgumentError::AddressSpaceMismatch {
                        index,
                        expected,
                        found: value.space(),
                    });
                }
                if size_hint != param.width && size_hint != size_of::<BufferHandle>() {
                    tracing::warn!(
                        kernel = %signature.name,
                        index,
                        size_hint,
                        width = param.width,
                        "argument size differs from the declared width, using the declared width"
                    );
                }
                BoundArg::Value(value)
            }
        };

        tracing::trace!(kernel = %signature.name, index, space = %param.space, "bound argument");
        self.slots[index] = Some(bound);
        Ok(())
    }
}

/// Offset and width of one parameter in an [`ArgumentBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slot {
    offset: usize,
    width: usize,
}

/// The packed argument block passed to every invocation of a launch.
///
/// Read-only once built. Besides the raw bytes it remembers the regions
/// its Global parameters point to, so kernels can turn an address read
/// from the buffer back into a [`BufferHandle`].
#[derive(Clone, Debug)]
pub struct ArgumentBuffer {
    bytes: Vec<u8>,
    slots: Vec<Slot>,
    regions: FxHashMap<usize, BufferHandle>,
}

impl ArgumentBuffer {
    /// Pack the bound arguments of `table` in the order `signature`
    /// declares them.
    pub fn marshal(
        signature: &KernelSignature,
        table: &ArgumentTable,
    ) -> Result<Self, ArgumentError> {
        let mut buffer = Self {
            bytes: Vec::with_capacity(signature.buffer_size()),
            slots: Vec::with_capacity(signature.params.len()),
            regions: FxHashMap::default(),
        };

        for (index, param) in signature.params.iter().enumerate() {
            let encoded: SmallVec<[u8; 16]> = match table.get(index) {
                None => return Err(ArgumentError::UnboundArgument { index }),
                Some(BoundArg::Value(ArgValue::Private(bytes))) => fit_to_width(bytes, param.width),
                Some(BoundArg::Value(ArgValue::Global(region))) => {
                    buffer.regions.insert(region.address(), region.clone());
                    fit_to_width(&region.address().to_ne_bytes(), param.width)
                }
                Some(BoundArg::Value(ArgValue::Constant(_))) => {
                    return Err(ArgumentError::AddressSpaceUnsupported {
                        index,
                        space: AddressSpace::Constant,
                    });
                }
                Some(BoundArg::Local { .. }) => {
                    return Err(ArgumentError::AddressSpaceUnsupported {
                        index,
                        space: AddressSpace::Local,
                    });
                }
            };
            buffer.slots.push(Slot {
                offset: buffer.bytes.len(),
                width: param.width,
            });
            buffer.bytes.extend_from_slice(&encoded);
        }

        tracing::debug!(
            kernel = %signature.name,
            args = buffer.slots.len(),
            size = buffer.bytes.len(),
            "marshaled arguments"
        );
        Ok(buffer)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of packed parameters.
    pub fn arg_count(&self) -> usize {
        self.slots.len()
    }

    /// Byte offset of parameter `index`.
    pub fn offset_of(&self, index: usize) -> Option<usize> {
        self.slots.get(index).map(|slot| slot.offset)
    }

    /// Decode a `T` from the bytes at `offset`.
    pub fn read_scalar<T: Scalar>(&self, offset: usize) -> Option<T> {
        let end = offset.checked_add(T::SIZE)?;
        T::from_ne_slice(self.bytes.get(offset..end)?)
    }

    /// Decode parameter `index` as a `T`. `None` if `T` is wider than the
    /// parameter's slot.
    pub fn arg<T: Scalar>(&self, index: usize) -> Option<T> {
        let slot = self.slots.get(index)?;
        if T::SIZE > slot.width {
            return None;
        }
        self.read_scalar(slot.offset)
    }

    /// The region whose address is stored in the parameter at `offset`.
    pub fn region_at(&self, offset: usize) -> Option<&BufferHandle> {
        let slot = self.slots.iter().find(|slot| slot.offset == offset)?;
        let raw = self.bytes.get(slot.offset..slot.offset + slot.width)?;
        let address = usize::from_ne_bytes(fit_to_width(raw, size_of::<usize>()).into_inner().ok()?);
        self.regions.get(&address)
    }

    /// The region bound to Global parameter `index`.
    pub fn buffer(&self, index: usize) -> Option<&BufferHandle> {
        self.region_at(self.offset_of(index)?)
    }
}

/// Truncate or zero-extend a native-endian integer encoding to `width`
/// bytes, keeping its low-order bytes.
fn fit_to_width<const N: usize>(bytes: &[u8], width: usize) -> SmallVec<[u8; N]> {
    let keep = bytes.len().min(width);
    let mut out = SmallVec::with_capacity(width);
    if cfg!(target_endian = "big") {
        out.resize(width - keep, 0);
        out.extend_from_slice(&bytes[bytes.len() - keep..]);
    } else {
        out.extend_from_slice(&bytes[..keep]);
        out.resize(width, 0);
    }
    out
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
