//! The `explain` command: describe an engine error code.

use lanes_diagnostic::ErrorCode;

/// Print the description of `code_str`, or exit 1 if it is not a code.
pub fn explain_error(code_str: &str) {
    let Ok(code) = code_str.parse::<ErrorCode>() else {
        eprintln!("Unknown error code: {code_str}");
        eprintln!();
        eprintln!("Codes have the format LXXXX where X is a digit.");
        eprintln!("Examples: L1001, L2001, L3001");
        std::process::exit(1);
    };
    println!("{code}: {}", code.description());
}
