//! Lanes CLI
//!
//! Runs built-in kernels through the dispatcher and prints liveness for
//! built-in CFGs.

use lanes_exec::{DispatchConfig, THREADS_ENV};
use lanesc::commands::{
    explain_error, list_all, liveness_command, parse_run_options, run_command,
};
use lanesc::{init_tracing, LOG_ENV, LOG_TREE_ENV};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("Usage: lanes run <kernel> [options]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --parallel, -p       Spread work groups over a thread pool");
                eprintln!("  --threads=<n>        Parallel with n workers (0: one per core)");
                eprintln!("  --simd-dim=<d>       Use the vectorized entry along dimension d");
                eprintln!("  --lane-width=<w>     Vector lane width: 4 (default) or 8");
                eprintln!("  --size=<n>           Problem size (default depends on the kernel)");
                std::process::exit(1);
            }

            match parse_run_options(&args[2..], DispatchConfig::from_env()) {
                Ok(options) => run_command(&options),
                Err(message) => {
                    eprintln!("error: {message}");
                    std::process::exit(1);
                }
            }
        }
        "liveness" => {
            let mut check = false;
            let mut sample = None;
            for arg in args.iter().skip(2) {
                if arg == "--check" {
                    check = true;
                } else if !arg.starts_with('-') && sample.is_none() {
                    sample = Some(arg.as_str());
                }
            }

            let Some(sample) = sample else {
                eprintln!("error: missing sample name");
                eprintln!("Usage: lanes liveness <sample> [--check]");
                std::process::exit(1);
            };
            liveness_command(sample, check);
        }
        "list" => {
            list_all();
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("Lanes {}", env!("CARGO_PKG_VERSION"));
        }
        "--explain" | "explain" => {
            if args.len() < 3 {
                eprintln!("Usage: lanes explain <ERROR_CODE>");
                eprintln!("Example: lanes explain L3001");
                std::process::exit(1);
            }
            explain_error(&args[2]);
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Lanes, a CPU execution engine for data-parallel kernels");
    println!();
    println!("Usage: lanes <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <kernel>         Launch a built-in kernel and verify its output");
    println!("  liveness <sample>    Print live-in/live-out sets of a built-in CFG");
    println!("  list                 List built-in kernels and CFG samples");
    println!("  explain <code>       Explain an error code (e.g., L2001)");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Run options:");
    println!("  --parallel, -p       Spread work groups over a thread pool");
    println!("  --threads=<n>        Parallel with n workers (0: one per core)");
    println!("  --simd-dim=<d>       Use the vectorized entry along dimension d");
    println!("  --lane-width=<w>     Vector lane width: 4 (default) or 8");
    println!("  --size=<n>           Problem size");
    println!();
    println!("Liveness options:");
    println!("  --check              Compare with the reference fixed-point solver");
    println!();
    println!("Environment:");
    println!("  {THREADS_ENV:<20} Worker count; enables parallel dispatch when set");
    println!("  {LOG_ENV:<20} Log filter (default: warn)");
    println!("  {LOG_TREE_ENV:<20} Render logs as an indented tree");
    println!();
    println!("Examples:");
    println!("  lanes run square");
    println!("  lanes run pairwise --simd-dim=1 --parallel");
    println!("  lanes liveness loop --check");
    println!("  lanes explain L3001");
}
