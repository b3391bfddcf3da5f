use std::mem::size_of;

use lanes_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::*;

fn table_for(signature: &KernelSignature) -> ArgumentTable {
    ArgumentTable::new(signature.params.len())
}

/// A Global and a Private parameter pack into pointer bytes then value
/// bytes.
#[test]
fn global_then_private_layout() {
    let signature = KernelSignature::new("k", [ParamDesc::global(), ParamDesc::private(4)]);
    let buffer = BufferHandle::zeroed::<f32>(4).unwrap();
    let mut table = table_for(&signature);
    table
        .bind(&signature, 0, size_of::<usize>(), Some(ArgValue::Global(buffer.clone())))
        .unwrap();
    table.bind(&signature, 1, 4, Some(ArgValue::scalar(7u32))).unwrap();

    let packed = ArgumentBuffer::marshal(&signature, &table).unwrap();
    let ptr = size_of::<usize>();
    assert_eq!(packed.len(), ptr + 4);
    assert_eq!(&packed.as_bytes()[..ptr], &buffer.address().to_ne_bytes()[..]);
    assert_eq!(&packed.as_bytes()[ptr..], &7u32.to_ne_bytes()[..]);
    assert_eq!(packed.offset_of(1), Some(ptr));
    assert_eq!(packed.arg::<u32>(1), Some(7));
    assert_eq!(packed.buffer(0), Some(&buffer));
    assert_eq!(packed.region_at(0), Some(&buffer));
}

#[test]
fn private_values_are_fitted_to_declared_width() {
    let signature = KernelSignature::new(
        "k",
        [ParamDesc::private(2), ParamDesc::private(8)],
    );
    let mut table = table_for(&signature);
    table.bind(&signature, 0, 4, Some(ArgValue::scalar(0x0001_0203u32))).unwrap();
    table.bind(&signature, 1, 4, Some(ArgValue::scalar(-1i32))).unwrap();

    let packed = ArgumentBuffer::marshal(&signature, &table).unwrap();
    assert_eq!(packed.len(), 10);
    assert_eq!(packed.arg::<u16>(0), Some(0x0203));
    // Zero-extended, not sign-extended.
    assert_eq!(packed.arg::<u64>(1), Some(0x0000_0000_FFFF_FFFF));
}

#[test]
fn unbound_parameter_fails_marshaling() {
    let signature = KernelSignature::new("k", [ParamDesc::private(4), ParamDesc::private(4)]);
    let mut table = table_for(&signature);
    table.bind(&signature, 0, 4, Some(ArgValue::scalar(1u32))).unwrap();

    assert_eq!(table.first_unbound(), Some(1));
    let err = ArgumentBuffer::marshal(&signature, &table).unwrap_err();
    assert_eq!(err, ArgumentError::UnboundArgument { index: 1 });
    assert_eq!(err.code(), ErrorCode::L2001);
}

#[test]
fn index_past_the_signature_is_rejected() {
    let signature = KernelSignature::new("k", [ParamDesc::private(4)]);
    let mut table = table_for(&signature);
    let err = table.bind(&signature, 1, 4, Some(ArgValue::scalar(1u32)));
    assert_eq!(err, Err(ArgumentError::ArgIndexOutOfRange { index: 1, count: 1 }));
}

#[test]
fn value_must_match_declared_space() {
    let signature = KernelSignature::new("k", [ParamDesc::global()]);
    let mut table = table_for(&signature);
    let err = table.bind(&signature, 0, 8, Some(ArgValue::scalar(1u64)));
    assert_eq!(
        err,
        Err(ArgumentError::AddressSpaceMismatch {
            index: 0,
            expected: AddressSpace::Global,
            found: AddressSpace::Private,
        })
    );
    assert_eq!(table.get(0), None);
}

#[test]
fn local_takes_a_size_and_no_value() {
    let signature = KernelSignature::new("k", [ParamDesc::local(4), ParamDesc::private(4)]);
    let mut table = table_for(&signature);

    assert_eq!(
        table.bind(&signature, 0, 64, Some(ArgValue::scalar(1u32))),
        Err(ArgumentError::UnexpectedArgValue { index: 0 })
    );
    assert_eq!(
        table.bind(&signature, 1, 4, None),
        Err(ArgumentError::MissingArgValue { index: 1 })
    );
    assert_eq!(table.bind(&signature, 0, 64, None), Ok(()));
    assert_eq!(table.get(0), Some(&BoundArg::Local { size: 64 }));
}

#[test]
fn local_and_constant_cannot_be_marshaled() {
    let region = BufferHandle::zeroed::<u8>(4).unwrap();
    let signature = KernelSignature::new("k", [ParamDesc::constant(8), ParamDesc::local(4)]);
    let mut table = table_for(&signature);
    table.bind(&signature, 0, 8, Some(ArgValue::Constant(region))).unwrap();
    table.bind(&signature, 1, 16, None).unwrap();

    let err = ArgumentBuffer::marshal(&signature, &table).unwrap_err();
    assert_eq!(
        err,
        ArgumentError::AddressSpaceUnsupported {
            index: 0,
            space: AddressSpace::Constant,
        }
    );
    assert_eq!(err.code(), ErrorCode::L2003);
}

#[test]
fn advisory_size_hint_is_accepted() {
    let signature = KernelSignature::new("k", [ParamDesc::private(4)]);
    let mut table = table_for(&signature);
    assert_eq!(table.bind(&signature, 0, 3, Some(ArgValue::scalar(5u32))), Ok(()));
    let packed = ArgumentBuffer::marshal(&signature, &table).unwrap();
    assert_eq!(packed.arg::<u32>(0), Some(5));
}

#[test]
fn scalar_reads_are_bounds_checked() {
    let signature = KernelSignature::new("k", [ParamDesc::private(2)]);
    let mut table = table_for(&signature);
    table.bind(&signature, 0, 2, Some(ArgValue::scalar(9u16))).unwrap();
    let packed = ArgumentBuffer::marshal(&signature, &table).unwrap();

    assert_eq!(packed.read_scalar::<u16>(0), Some(9));
    assert_eq!(packed.read_scalar::<u32>(0), None);
    assert_eq!(packed.arg::<u32>(0), None);
    assert_eq!(packed.region_at(0), None);
    assert_eq!(packed.read_scalar::<u8>(usize::MAX), None);
}

#[test]
fn empty_signature_packs_nothing() {
    let signature = KernelSignature::new("k", Vec::new());
    let packed = ArgumentBuffer::marshal(&signature, &ArgumentTable::default()).unwrap();
    assert!(packed.is_empty());
    assert_eq!(packed.arg_count(), 0);
}
