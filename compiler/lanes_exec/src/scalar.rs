//! Fixed-width values that cross the host/kernel boundary as raw bytes.

/// A plain value with a native-endian byte encoding.
///
/// Implemented for the primitive integer and float types. Kernel arguments
/// and buffer elements are read and written through this trait.
pub trait Scalar: Copy + Send + Sync + 'static {
    /// Encoded size in bytes.
    const SIZE: usize;
    type Bytes: AsRef<[u8]>;

    fn to_ne_bytes(self) -> Self::Bytes;

    /// Decode from exactly [`SIZE`](Self::SIZE) bytes.
    fn from_ne_slice(bytes: &[u8]) -> Option<Self>;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl Scalar for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();
            type Bytes = [u8; std::mem::size_of::<$ty>()];

            #[inline]
            fn to_ne_bytes(self) -> Self::Bytes {
                <$ty>::to_ne_bytes(self)
            }

            #[inline]
            fn from_ne_slice(bytes: &[u8]) -> Option<Self> {
                bytes.try_into().ok().map(<$ty>::from_ne_bytes)
            }
        }
    )*};
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, usize, isize, f32, f64);
