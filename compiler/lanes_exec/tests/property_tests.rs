//! Property-based tests for argument marshaling and dispatch coverage.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use lanes_exec::{
    launch_nd, ArgValue, ArgumentBuffer, ArgumentTable, BufferHandle, DispatchConfig, Kernel,
    KernelSignature, ParamDesc,
};
use proptest::prelude::*;

/// Private parameters of width 1, 2, 4 or 8 with a `u64` value each.
fn private_args() -> impl Strategy<Value = Vec<(usize, u64)>> {
    prop::collection::vec((prop::sample::select(vec![1usize, 2, 4, 8]), any::<u64>()), 0..8)
}

/// `(global, local)` extents with `local` dividing `global`.
fn space_strategy() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    prop::collection::vec((1usize..4, 1usize..4), 1..=3).prop_map(|dims| {
        let local: Vec<usize> = dims.iter().map(|&(l, _)| l).collect();
        let global: Vec<usize> = dims.iter().map(|&(l, groups)| l * groups).collect();
        (global, local)
    })
}

fn low_bytes(value: u64, width: usize) -> u64 {
    if width >= 8 {
        value
    } else {
        value & ((1u64 << (width * 8)) - 1)
    }
}

/// Counts invocations per linear work item.
fn counting_kernel(counts: &BufferHandle) -> Kernel<4> {
    let mut kernel = Kernel::new(KernelSignature::new("count", [ParamDesc::global()]))
        .with_scalar(|args, regs| {
            let counts = args.buffer(0).unwrap();
            let mut linear = 0;
            for dim in 0..regs.work_dim() {
                linear = linear * regs.global_size(dim) + regs.global_id(dim);
            }
            let seen: u32 = counts.load(linear).unwrap();
            counts.store(linear, seen + 1).unwrap();
        });
    kernel
        .set_arg(0, 8, Some(ArgValue::Global(counts.clone())))
        .unwrap();
    kernel
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    /// Parameters pack back to back and read back as their low bytes.
    #[test]
    fn prop_private_args_pack_in_order(args in private_args()) {
        let signature = KernelSignature::new(
            "k",
            args.iter().map(|&(width, _)| ParamDesc::private(width)),
        );
        let mut table = ArgumentTable::new(args.len());
        for (index, &(width, value)) in args.iter().enumerate() {
            table.bind(&signature, index, width, Some(ArgValue::scalar(value))).unwrap();
        }

        let packed = ArgumentBuffer::marshal(&signature, &table).unwrap();
        let total: usize = args.iter().map(|&(width, _)| width).sum();
        prop_assert_eq!(packed.len(), total);

        let mut offset = 0;
        for (index, &(width, value)) in args.iter().enumerate() {
            prop_assert_eq!(packed.offset_of(index), Some(offset));
            let read = match width {
                1 => packed.arg::<u8>(index).map(u64::from),
                2 => packed.arg::<u16>(index).map(u64::from),
                4 => packed.arg::<u32>(index).map(u64::from),
                _ => packed.arg::<u64>(index),
            };
            prop_assert_eq!(read, Some(low_bytes(value, width)));
            offset += width;
        }
    }

    /// Every work item runs exactly once, sequentially or in parallel.
    #[test]
    fn prop_every_item_runs_once(sizes in space_strategy(), threads in 1usize..4) {
        let (global, local) = sizes;
        let total: usize = global.iter().product();

        for config in [DispatchConfig::default(), DispatchConfig::default().parallel(threads)] {
            let counts = BufferHandle::zeroed::<u32>(total).unwrap();
            let summary = launch_nd(
                &counting_kernel(&counts),
                global.len(),
                Some(global.as_slice()),
                Some(local.as_slice()),
                &config,
            )
            .unwrap();
            prop_assert_eq!(summary.invocations, total);
            prop_assert!(counts.to_scalars::<u32>().iter().all(|&count| count == 1));
        }
    }
}
