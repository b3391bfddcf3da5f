//! In-process memory regions for Global kernel arguments.
//!
//! A region is a fixed-size heap allocation that never moves, so its base
//! address is a stable identity. Kernels receive that address in the
//! argument buffer and resolve it back to the region through
//! [`ArgumentBuffer::region_at`](crate::ArgumentBuffer::region_at); they
//! never dereference it.
//!
//! Access goes through a `parking_lot::RwLock`, so stores from work items
//! running on different workers are data-race free.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::MemoryError;
use crate::scalar::Scalar;

struct Region {
    address: usize,
    len: usize,
    data: RwLock<Box<[u8]>>,
}

/// Shared handle to a memory region. Cloning is cheap.
#[derive(Clone)]
pub struct BufferHandle {
    region: Arc<Region>,
}

impl BufferHandle {
    /// Allocate a region of `size` bytes.
    ///
    /// `init` is copied to the start of the region; the rest is zeroed.
    /// Fails for `size == 0` and for `init` longer than `size`.
    pub fn create(size: usize, init: Option<&[u8]>) -> Result<Self, MemoryError> {
        if size == 0 {
            return Err(MemoryError::InvalidBufferSize { size });
        }
        let mut data = vec![0u8; size].into_boxed_slice();
        if let Some(init) = init {
            let Some(prefix) = data.get_mut(..init.len()) else {
                return Err(MemoryError::OutOfRange {
                    offset: 0,
                    len: init.len(),
                    size,
                });
            };
            prefix.copy_from_slice(init);
        }
        let address = data.as_ptr() as usize;
        tracing::debug!(size, address, "created buffer");
        Ok(Self {
            region: Arc::new(Region {
                address,
                len: size,
                data: RwLock::new(data),
            }),
        })
    }

    /// A region holding `values` back to back.
    pub fn from_scalars<T: Scalar>(values: &[T]) -> Result<Self, MemoryError> {
        let mut bytes = Vec::with_capacity(byte_size::<T>(values.len())?);
        for &value in values {
            bytes.extend_from_slice(value.to_ne_bytes().as_ref());
        }
        Self::create(bytes.len(), Some(&bytes))
    }

    /// A zero-filled region of `count` elements of `T`.
    pub fn zeroed<T: Scalar>(count: usize) -> Result<Self, MemoryError> {
        Self::create(byte_size::<T>(count)?, None)
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.region.len
    }

    /// Always `false`: empty regions cannot be created.
    pub fn is_empty(&self) -> bool {
        self.region.len == 0
    }

    /// Base address, the value a Global argument carries.
    pub fn address(&self) -> usize {
        self.region.address
    }

    /// Do both handles refer to the same region?
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.region, &other.region)
    }

    /// Copy `out.len()` bytes starting at `offset` into `out`.
    pub fn read(&self, offset: usize, out: &mut [u8]) -> Result<(), MemoryError> {
        let data = self.region.data.read();
        let src = self.range(&data, offset, out.len())?;
        out.copy_from_slice(src);
        Ok(())
    }

    /// Copy `bytes` into the region starting at `offset`.
    pub fn write(&self, offset: usize, bytes: &[u8]) -> Result<(), MemoryError> {
        let mut data = self.region.data.write();
        let end = offset.checked_add(bytes.len());
        let Some(dst) = end.and_then(|end| data.get_mut(offset..end)) else {
            return Err(MemoryError::OutOfRange {
                offset,
                len: bytes.len(),
                size: self.region.len,
            });
        };
        dst.copy_from_slice(bytes);
        Ok(())
    }

    /// Element `index` of the region viewed as an array of `T`.
    pub fn load<T: Scalar>(&self, index: usize) -> Result<T, MemoryError> {
        let data = self.region.data.read();
        let offset = index.saturating_mul(T::SIZE);
        let bytes = self.range(&data, offset, T::SIZE)?;
        T::from_ne_slice(bytes).ok_or(MemoryError::OutOfRange {
            offset,
            len: T::SIZE,
            size: data.len(),
        })
    }

    /// Store `value` as element `index` of the region viewed as `[T]`.
    pub fn store<T: Scalar>(&self, index: usize, value: T) -> Result<(), MemoryError> {
        self.write(index.saturating_mul(T::SIZE), value.to_ne_bytes().as_ref())
    }

    /// Every whole element of the region viewed as `[T]`.
    pub fn to_scalars<T: Scalar>(&self) -> Vec<T> {
        let data = self.region.data.read();
        data.chunks_exact(T::SIZE)
            .filter_map(T::from_ne_slice)
            .collect()
    }

    /// A copy of the region's bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.region.data.read().to_vec()
    }

    fn range<'a>(&self, data: &'a [u8], offset: usize, len: usize) -> Result<&'a [u8], MemoryError> {
        offset
            .checked_add(len)
            .and_then(|end| data.get(offset..end))
            .ok_or(MemoryError::OutOfRange {
                offset,
                len,
                size: self.region.len,
            })
    }
}

/// Bytes needed for `count` elements of `T`.
fn byte_size<T: Scalar>(count: usize) -> Result<usize, MemoryError> {
    count
        .checked_mul(T::SIZE)
        .ok_or(MemoryError::InvalidBufferSize { size: usize::MAX })
}

impl fmt::Debug for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferHandle")
            .field("address", &format_args!("{:#x}", self.region.address))
            .field("len", &self.region.len)
            .finish()
    }
}

impl PartialEq for BufferHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for BufferHandle {}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
