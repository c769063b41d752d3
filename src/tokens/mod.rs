mod parser;
mod structure;

pub use parser::{tokenize, Tokenizer, MAX_INTEGER_CONSTANT};
pub use structure::{Expected, Keyword, Location, Symbol, Token, TokenKind};
