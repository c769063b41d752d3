use crate::tokens::{Expected, Location, Token};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a class from compiling. There is no recovery: the first error
/// aborts the whole translation unit and whatever code was generated so far is dropped.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The scanner could not turn the input into a token.
    #[error("At {location}:\n{message}")]
    Lex { location: Location, message: String },

    /// The next token is not one the grammar allows here.
    #[error("At {location}:\nExpected {expected}, got {found} instead.")]
    Syntax {
        location: Location,
        expected: Expected,
        found: Token,
    },

    /// A variable was used that is declared in neither the subroutine nor the class.
    #[error(
        "At {location}:\nThe variable '{name}' either does not exist or was defined in another class or function."
    )]
    UnresolvedName { location: Location, name: String },

    /// The same name was declared twice in one scope.
    #[error("At {location}:\nThe name '{name}' is already declared in this scope.")]
    Redeclared { location: Location, name: String },

    /// A constant or a declaration count that the VM cannot represent.
    #[error("At {location}:\n{message}")]
    OutOfRange { location: Location, message: String },
}

impl Error {
    pub fn location(&self) -> Location {
        match self {
            Self::Lex { location, .. }
            | Self::Syntax { location, .. }
            | Self::UnresolvedName { location, .. }
            | Self::Redeclared { location, .. }
            | Self::OutOfRange { location, .. } => *location,
        }
    }
}
