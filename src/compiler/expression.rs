use super::trace::Rule;
use super::Compiler;
use crate::error::{Error, Result};
use crate::tokens::{Keyword, Location, Symbol, Token, TokenKind, MAX_INTEGER_CONSTANT};
use crate::vm::{ArithmeticOp, Command, Segment};

/// Every token a term may begin with.
const TERM_START: &[TokenKind] = &[
    TokenKind::IntegerConstant,
    TokenKind::StringConstant,
    TokenKind::Identifier,
    TokenKind::Keyword(Keyword::True),
    TokenKind::Keyword(Keyword::False),
    TokenKind::Keyword(Keyword::Null),
    TokenKind::Keyword(Keyword::This),
    TokenKind::Symbol(Symbol::LeftParen),
    TokenKind::Symbol(Symbol::Minus),
    TokenKind::Symbol(Symbol::Tilde),
];

/// The code for a binary operator whose operands are already on the stack, or `None` if the
/// symbol is not a binary operator.
fn operator_command(operator: Symbol) -> Option<Command> {
    use Symbol::*;
    let command = match operator {
        Plus => ArithmeticOp::Add.into(),
        Minus => ArithmeticOp::Sub.into(),
        Asterisk => Command::call("Math.multiply", 2),
        ForwardSlash => Command::call("Math.divide", 2),
        Ampersand => ArithmeticOp::And.into(),
        VerticalPipe => ArithmeticOp::Or.into(),
        LeftAngleBracket => ArithmeticOp::Lt.into(),
        RightAngleBracket => ArithmeticOp::Gt.into(),
        Equals => ArithmeticOp::Eq.into(),
        LeftBrace | RightBrace | LeftParen | RightParen | LeftSquareBracket
        | RightSquareBracket | Dot | Comma | Semicolon | Tilde => return None,
    };
    Some(command)
}

impl<I> Compiler<I>
where
    I: Iterator<Item = Result<(Token, Location)>>,
{
    /// `term (op term)*`, evaluated strictly left to right with no precedence.
    pub(super) fn compile_expression(&mut self) -> Result<()> {
        self.rule(Rule::Expression, |this| {
            this.compile_term()?;
            while let Some(operator) = this.cursor.peek_operator() {
                let Some(command) = operator_command(operator) else {
                    break;
                };
                this.cursor.expect(operator)?;
                this.compile_term()?;
                this.emit(command);
            }
            Ok(())
        })
    }

    pub(super) fn compile_term(&mut self) -> Result<()> {
        self.rule(Rule::Term, |this| {
            match this.cursor.expect_any_of(TERM_START)? {
                Token::IntegerConstant(value) => {
                    if value > MAX_INTEGER_CONSTANT {
                        return Err(Error::OutOfRange {
                            location: this.cursor.current_location(),
                            message: format!(
                                "Integer constant {} is larger than {}.",
                                value, MAX_INTEGER_CONSTANT
                            ),
                        });
                    }
                    this.emit(Command::Push(Segment::Constant, value));
                }
                Token::StringConstant(text) => this.compile_string(&text)?,
                Token::Identifier(name) => this.compile_identifier_term(name)?,
                Token::Keyword(keyword @ (Keyword::True | Keyword::False | Keyword::Null)) => {
                    // False and null are all zeroes, true is all ones.
                    this.emit(Command::Push(Segment::Constant, 0));
                    if keyword == Keyword::True {
                        this.emit(ArithmeticOp::Not.into());
                    }
                }
                Token::Keyword(Keyword::This) => this.emit(Command::Push(Segment::Pointer, 0)),
                Token::Symbol(Symbol::LeftParen) => {
                    this.compile_expression()?;
                    this.cursor.expect(Symbol::RightParen)?;
                }
                Token::Symbol(Symbol::Minus) => {
                    this.compile_term()?;
                    this.emit(ArithmeticOp::Neg.into());
                }
                Token::Symbol(Symbol::Tilde) => {
                    this.compile_term()?;
                    this.emit(ArithmeticOp::Not.into());
                }
                _ => return Err(this.cursor.rejected(TERM_START)),
            }
            Ok(())
        })
    }

    /// Builds the string at runtime one character at a time. The string object stays on the
    /// stack as the receiver of each `appendChar` call, which returns it again.
    fn compile_string(&mut self, text: &str) -> Result<()> {
        let location = self.cursor.current_location();
        if let Some(c) = text.chars().find(|c| !c.is_ascii()) {
            return Err(Error::OutOfRange {
                location,
                message: format!("The character '{}' has no character code.", c),
            });
        }
        // ASCII, so every character is one byte.
        let length = u16::try_from(text.len())
            .ok()
            .filter(|length| *length <= MAX_INTEGER_CONSTANT)
            .ok_or_else(|| Error::OutOfRange {
                location,
                message: format!(
                    "String constant is longer than {} characters.",
                    MAX_INTEGER_CONSTANT
                ),
            })?;
        self.emit(Command::Push(Segment::Constant, length));
        self.emit(Command::call("String.new", 1));
        for byte in text.bytes() {
            self.emit(Command::Push(Segment::Constant, u16::from(byte)));
            self.emit(Command::call("String.appendChar", 2));
        }
        Ok(())
    }

    /// Called with the identifier just consumed. It names a subroutine to call, an array to
    /// index, or a plain variable.
    fn compile_identifier_term(&mut self, name: String) -> Result<()> {
        let location = self.cursor.current_location();
        if self.cursor.peek_is(Symbol::LeftParen) || self.cursor.peek_is(Symbol::Dot) {
            return self.compile_subroutine_call(name);
        }
        let variable = self.lookup(&name, location)?;
        if self.cursor.peek_is(Symbol::LeftSquareBracket) {
            self.cursor.expect(Symbol::LeftSquareBracket)?;
            self.compile_expression()?;
            self.emit(Command::Push(variable.segment(), variable.index));
            self.emit(ArithmeticOp::Add.into());
            self.cursor.expect(Symbol::RightSquareBracket)?;
            self.emit(Command::Pop(Segment::Pointer, 1));
            self.emit(Command::Push(Segment::That, 0));
        } else {
            self.emit(Command::Push(variable.segment(), variable.index));
        }
        Ok(())
    }

    /// Called with the first identifier of the call already consumed:
    /// `subroutineName '(' expressionList ')'` calls a method of this object,
    /// `varName '.' subroutineName '(' expressionList ')'` a method of that variable's object, and
    /// `className '.' subroutineName '(' expressionList ')'` a function or constructor.
    pub(super) fn compile_subroutine_call(&mut self, first: String) -> Result<()> {
        let (target, receivers) = if self.cursor.peek_is(Symbol::Dot) {
            self.cursor.expect(Symbol::Dot)?;
            let subroutine = self.cursor.expect_identifier()?;
            match self.symbols.resolve(&first).cloned() {
                Some(object) => {
                    self.emit(Command::Push(object.segment(), object.index));
                    (format!("{}.{}", object.data_type, subroutine), 1)
                }
                None => (format!("{}.{}", first, subroutine), 0),
            }
        } else if self.cursor.peek_is(Symbol::LeftParen) {
            self.emit(Command::Push(Segment::Pointer, 0));
            (format!("{}.{}", self.class_name, first), 1)
        } else {
            return Err(self
                .cursor
                .unexpected(&[Symbol::LeftParen.into(), Symbol::Dot.into()]));
        };
        self.cursor.expect(Symbol::LeftParen)?;
        let args = self.compile_expression_list()?;
        self.cursor.expect(Symbol::RightParen)?;
        self.emit(Command::call(target, args + receivers));
        Ok(())
    }

    /// `(expression (',' expression)*)?`, returning how many expressions there were.
    fn compile_expression_list(&mut self) -> Result<u16> {
        self.rule(Rule::ExpressionList, |this| {
            let mut count = 0;
            if !this.cursor.peek_is(Symbol::RightParen) {
                this.compile_expression()?;
                count += 1;
                while this.cursor.peek_is(Symbol::Comma) {
                    this.cursor.expect(Symbol::Comma)?;
                    this.compile_expression()?;
                    count += 1;
                }
            }
            Ok(count)
        })
    }
}
