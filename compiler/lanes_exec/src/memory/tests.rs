use pretty_assertions::assert_eq;

use lanes_diagnostic::ErrorCode;

use super::*;

#[test]
fn zero_size_is_rejected() {
    let err = BufferHandle::create(0, None);
    assert_eq!(err.map_err(|e| e.code()).err(), Some(ErrorCode::L6001));
}

#[test]
fn init_is_copied_and_rest_zeroed() {
    let buf = BufferHandle::create(6, Some(&[1, 2, 3])).unwrap();
    assert_eq!(buf.to_vec(), vec![1, 2, 3, 0, 0, 0]);
    assert_eq!(buf.len(), 6);
    assert!(!buf.is_empty());
}

#[test]
fn oversized_init_is_rejected() {
    let err = BufferHandle::create(2, Some(&[1, 2, 3]));
    assert_eq!(
        err.err(),
        Some(MemoryError::OutOfRange {
            offset: 0,
            len: 3,
            size: 2,
        })
    );
}

#[test]
fn read_write_round_trip_at_offset() {
    let buf = BufferHandle::create(8, None).unwrap();
    assert_eq!(buf.write(4, &[9, 8, 7]), Ok(()));

    let mut out = [0u8; 4];
    assert_eq!(buf.read(3, &mut out), Ok(()));
    assert_eq!(out, [0, 9, 8, 7]);
}

#[test]
fn accesses_past_the_end_fail() {
    let buf = BufferHandle::create(4, None).unwrap();
    let mut out = [0u8; 2];
    assert_eq!(
        buf.read(3, &mut out),
        Err(MemoryError::OutOfRange {
            offset: 3,
            len: 2,
            size: 4,
        })
    );
    assert!(buf.write(usize::MAX, &[1]).is_err());
    assert_eq!(buf.load::<u32>(1).map_err(|e| e.code()), Err(ErrorCode::L6002));
}

#[test]
fn typed_elements() {
    let buf = BufferHandle::from_scalars(&[1.5f32, -2.0, 4.25]).unwrap();
    assert_eq!(buf.len(), 12);
    assert_eq!(buf.load::<f32>(2), Ok(4.25));
    assert_eq!(buf.store(0, 7.0f32), Ok(()));
    assert_eq!(buf.to_scalars::<f32>(), vec![7.0, -2.0, 4.25]);
}

#[test]
fn handles_share_one_region() {
    let a = BufferHandle::zeroed::<u32>(4).unwrap();
    let b = a.clone();
    assert!(a.ptr_eq(&b));
    assert_eq!(a.address(), b.address());
    assert_eq!(b.store(3, 42u32), Ok(()));
    assert_eq!(a.load::<u32>(3), Ok(42));

    let c = BufferHandle::zeroed::<u32>(4).unwrap();
    assert_ne!(a, c);
    assert_ne!(a.address(), c.address());
}

#[test]
fn element_count_overflow_is_rejected() {
    let err = BufferHandle::zeroed::<u64>(usize::MAX / 4);
    assert_eq!(
        err.err(),
        Some(MemoryError::InvalidBufferSize { size: usize::MAX })
    );
    assert!(BufferHandle::zeroed::<u8>(0).is_err());
}
