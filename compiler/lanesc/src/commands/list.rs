//! The `list` command.

use crate::demos::Demo;
use crate::samples::Sample;

pub fn list_all() {
    println!("Kernels (lanes run <kernel>):");
    for demo in Demo::ALL {
        println!("  {:<10} {}", demo.name(), demo.description());
    }
    println!();
    println!("CFG samples (lanes liveness <sample>):");
    for sample in Sample::ALL {
        println!("  {:<10} {}", sample.name(), sample.description());
    }
}
