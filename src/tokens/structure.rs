use std::fmt::{Display, Formatter};

/// 1-based position of a token in its source file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    Keyword(Keyword),
    Symbol(Symbol),
    IntegerConstant(u16),
    StringConstant(String),
    Identifier(String),
    /// Produced once the scanner has nothing left.
    Eof,
}

/// The kind of a token with its payload stripped. Expectation sets are written in terms of
/// these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword(Keyword),
    Symbol(Symbol),
    IntegerConstant,
    StringConstant,
    Identifier,
    Eof,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Keyword(k) => TokenKind::Keyword(*k),
            Self::Symbol(s) => TokenKind::Symbol(*s),
            Self::IntegerConstant(_) => TokenKind::IntegerConstant,
            Self::StringConstant(_) => TokenKind::StringConstant,
            Self::Identifier(_) => TokenKind::Identifier,
            Self::Eof => TokenKind::Eof,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }
}

impl From<Keyword> for Token {
    fn from(other: Keyword) -> Self {
        Self::Keyword(other)
    }
}

impl From<Symbol> for Token {
    fn from(other: Symbol) -> Self {
        Self::Symbol(other)
    }
}

impl From<Keyword> for TokenKind {
    fn from(other: Keyword) -> Self {
        Self::Keyword(other)
    }
}

impl From<Symbol> for TokenKind {
    fn from(other: Symbol) -> Self {
        Self::Symbol(other)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyword(k) => write!(f, "keyword '{}'", k),
            Self::Symbol(s) => write!(f, "symbol '{}'", s),
            Self::IntegerConstant(v) => write!(f, "integer literal '{}'", v),
            Self::StringConstant(v) => write!(f, "string literal \"{}\"", v),
            Self::Identifier(v) => write!(f, "identifier '{}'", v),
            Self::Eof => write!(f, "end of file"),
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyword(k) => write!(f, "'{}'", k),
            Self::Symbol(s) => write!(f, "'{}'", s),
            Self::IntegerConstant => write!(f, "integer literal"),
            Self::StringConstant => write!(f, "string literal"),
            Self::Identifier => write!(f, "identifier"),
            Self::Eof => write!(f, "end of file"),
        }
    }
}

/// A set of token kinds any of which would have been accepted at some point of the grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expected(pub Vec<TokenKind>);

impl Display for Expected {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0[..] {
            [] => write!(f, "nothing"),
            [only] => write!(f, "{}", only),
            [init @ .., last] => {
                for kind in init {
                    write!(f, "{}, ", kind)?;
                }
                write!(f, "or {}", last)
            }
        }
    }
}

/// This is a macro for creating an enum with functions to convert back and forth from a string
/// representation.
macro_rules! keyword_enum {
    ($EnumName:ident $($VariantName:ident $value:literal)*) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $EnumName {
            $($VariantName),*
        }
        impl $EnumName {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$VariantName),*];

            /// Returns the variant whose text is `text`, if there is one.
            pub fn from_text(text: &str) -> Option<Self> {
                match text {
                    $($value => Some(Self::$VariantName),)*
                    _ => None
                }
            }

            /// Returns the source text of this variant.
            pub fn as_text(self) -> &'static str {
                match self {
                    $(Self::$VariantName => $value,)*
                }
            }
        }
        impl Display for $EnumName {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_text())
            }
        }
    }
}

keyword_enum! {
    Keyword
    Class "class"
    Constructor "constructor"
    Function "function"
    Method "method"
    Field "field"
    Static "static"
    Var "var"
    Int "int"
    Char "char"
    Boolean "boolean"
    Void "void"
    True "true"
    False "false"
    Null "null"
    This "this"
    Let "let"
    Do "do"
    If "if"
    Else "else"
    While "while"
    Return "return"
}

keyword_enum! {
    Symbol
    LeftBrace "{"
    RightBrace "}"
    LeftParen "("
    RightParen ")"
    LeftSquareBracket "["
    RightSquareBracket "]"
    Dot "."
    Comma ","
    Semicolon ";"
    // Binary operators must stay contiguous, from Plus through Equals.
    Plus "+"
    Minus "-"
    Asterisk "*"
    ForwardSlash "/"
    Ampersand "&"
    VerticalPipe "|"
    LeftAngleBracket "<"
    RightAngleBracket ">"
    Equals "="
    Tilde "~"
}

impl Symbol {
    /// True for the symbols that may join two terms of an expression.
    pub fn is_operator(self) -> bool {
        (Symbol::Plus..=Symbol::Equals).contains(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trips_for_every_keyword_and_symbol() {
        for kw in Keyword::ALL {
            assert_eq!(Keyword::from_text(kw.as_text()), Some(*kw));
        }
        for sym in Symbol::ALL {
            assert_eq!(Symbol::from_text(sym.as_text()), Some(*sym));
        }
        assert_eq!(Keyword::from_text("Class"), None);
    }

    #[test]
    fn operators_are_exactly_the_binary_symbols() {
        let operators: String = Symbol::ALL
            .iter()
            .filter(|s| s.is_operator())
            .map(|s| s.as_text())
            .collect();
        assert_eq!(operators, "+-*/&|<>=");
        assert!(!Symbol::Tilde.is_operator());
    }

    #[test]
    fn expected_sets_read_naturally() {
        let one = Expected(vec![Symbol::Semicolon.into()]);
        assert_eq!(one.to_string(), "';'");
        let many = Expected(vec![
            Keyword::Int.into(),
            TokenKind::Identifier,
            Symbol::LeftParen.into(),
        ]);
        assert_eq!(many.to_string(), "'int', identifier, or '('");
    }

    #[test]
    fn kind_strips_payload() {
        assert_eq!(
            Token::Identifier("x".to_owned()).kind(),
            TokenKind::Identifier
        );
        assert!(Token::IntegerConstant(7).is(TokenKind::IntegerConstant));
        assert!(Token::from(Keyword::Let).is(Keyword::Let.into()));
    }
}
