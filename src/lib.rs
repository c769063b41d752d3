//! A compiler for the Jack language of the nand2tetris course. Each class is translated to code
//! for the course's stack-based virtual machine in a single pass over its tokens.

pub mod compiler;
pub mod error;
pub mod symbols;
pub mod tokens;
pub mod vm;

pub use compiler::{compile, compile_with_trace, Compiled, Compiler};
pub use error::{Error, Result};
