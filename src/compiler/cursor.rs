use super::trace::{Rule, TraceEvent};
use crate::error::{Error, Result};
use crate::tokens::{Expected, Location, Symbol, Token, TokenKind};
use log::trace;

/// A window of two tokens over the scanner's output: the one most recently consumed and the one
/// after it. Grammar rules only ever look at the second one to decide what to do.
pub struct TokenCursor<I> {
    tokens: I,
    current: (Token, Location),
    peek: (Token, Location),
    /// `None` unless tracing was asked for.
    trace: Option<Vec<TraceEvent>>,
}

impl<I> TokenCursor<I>
where
    I: Iterator<Item = Result<(Token, Location)>>,
{
    pub fn new(tokens: I) -> Result<Self> {
        let mut cursor = Self {
            tokens,
            current: (Token::Eof, Location::default()),
            peek: (Token::Eof, Location::default()),
            trace: None,
        };
        cursor.peek = cursor.pull()?;
        Ok(cursor)
    }

    pub fn enable_trace(&mut self) {
        self.trace.get_or_insert_with(Vec::new);
    }

    pub fn take_trace(&mut self) -> Vec<TraceEvent> {
        self.trace.take().unwrap_or_default()
    }

    fn pull(&mut self) -> Result<(Token, Location)> {
        match self.tokens.next() {
            Some(result) => result,
            // Past the end, keep reporting the end.
            None => Ok((Token::Eof, self.peek.1)),
        }
    }

    fn record(&mut self, event: TraceEvent) {
        trace!("{:?}", event);
        if let Some(events) = &mut self.trace {
            events.push(event);
        }
    }

    pub fn enter(&mut self, rule: Rule) {
        self.record(TraceEvent::Enter(rule));
    }

    pub fn exit(&mut self, rule: Rule) {
        self.record(TraceEvent::Exit(rule));
    }

    /// Moves one token forward, pulling a fresh lookahead from the scanner.
    pub fn advance(&mut self) -> Result<()> {
        let next = self.pull()?;
        self.current = std::mem::replace(&mut self.peek, next);
        Ok(())
    }

    pub fn current(&self) -> &Token {
        &self.current.0
    }

    pub fn current_location(&self) -> Location {
        self.current.1
    }

    pub fn peek(&self) -> &Token {
        &self.peek.0
    }

    pub fn peek_location(&self) -> Location {
        self.peek.1
    }

    pub fn peek_is(&self, kind: impl Into<TokenKind>) -> bool {
        self.peek.0.is(kind.into())
    }

    pub fn peek_is_any_of(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek.0.kind())
    }

    /// The lookahead, if it is a binary operator.
    pub fn peek_operator(&self) -> Option<Symbol> {
        match self.peek.0 {
            Token::Symbol(symbol) if symbol.is_operator() => Some(symbol),
            _ => None,
        }
    }

    /// A syntax error saying the lookahead should have been one of `expected`.
    pub fn unexpected(&self, expected: &[TokenKind]) -> Error {
        Error::Syntax {
            location: self.peek.1,
            expected: Expected(expected.to_vec()),
            found: self.peek.0.clone(),
        }
    }

    /// Consumes the lookahead if it is of the given kind and returns it.
    pub fn expect(&mut self, kind: impl Into<TokenKind>) -> Result<Token> {
        self.expect_any_of(&[kind.into()])
    }

    /// Consumes the lookahead if it is of any of the given kinds and returns it.
    pub fn expect_any_of(&mut self, kinds: &[TokenKind]) -> Result<Token> {
        if !self.peek_is_any_of(kinds) {
            return Err(self.unexpected(kinds));
        }
        self.advance()?;
        let token = self.current.0.clone();
        self.record(TraceEvent::Consumed(token.clone()));
        Ok(token)
    }

    /// A syntax error saying the token just consumed should have been one of `expected`.
    pub fn rejected(&self, expected: &[TokenKind]) -> Error {
        Error::Syntax {
            location: self.current.1,
            expected: Expected(expected.to_vec()),
            found: self.current.0.clone(),
        }
    }

    pub fn expect_identifier(&mut self) -> Result<String> {
        match self.expect(TokenKind::Identifier)? {
            Token::Identifier(name) => Ok(name),
            _ => Err(self.rejected(&[TokenKind::Identifier])),
        }
    }
}
