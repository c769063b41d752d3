//! The VM instruction set the compiler targets, and its text form.

mod structure;

pub use structure::{ArithmeticOp, Command, Label, LabelTag, Segment};

use std::fmt::Write;

/// Renders commands one per line, the way `.vm` files are written.
pub fn render(commands: &[Command]) -> String {
    let mut output = String::new();
    for command in commands {
        // Writing to a String cannot fail.
        let _ = writeln!(&mut output, "{}", command);
    }
    output
}
