use super::trace::Rule;
use super::Compiler;
use crate::error::Result;
use crate::tokens::{Keyword, Location, Symbol, Token};
use crate::vm::{ArithmeticOp, Command, Label, LabelTag, Segment};

pub struct IfLabels {
    pub on_true: Label,
    pub on_false: Label,
    pub end: Label,
}

pub struct WhileLabels {
    pub condition: Label,
    pub end: Label,
}

/// Label numbering for one subroutine. `if` and `while` are numbered independently and both start
/// again from zero at every subroutine declaration.
#[derive(Default)]
pub struct LabelCounters {
    ifs: usize,
    whiles: usize,
}

impl LabelCounters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn next_if(&mut self) -> IfLabels {
        let id = self.ifs;
        self.ifs += 1;
        let label = |tag| Label { tag, id };
        IfLabels {
            on_true: label(LabelTag::IfTrue),
            on_false: label(LabelTag::IfFalse),
            end: label(LabelTag::IfEnd),
        }
    }

    pub fn next_while(&mut self) -> WhileLabels {
        let id = self.whiles;
        self.whiles += 1;
        WhileLabels {
            condition: Label {
                tag: LabelTag::WhileExp,
                id,
            },
            end: Label {
                tag: LabelTag::WhileEnd,
                id,
            },
        }
    }
}

impl<I> Compiler<I>
where
    I: Iterator<Item = Result<(Token, Location)>>,
{
    /// `'{' statements '}'`
    fn compile_block(&mut self) -> Result<()> {
        self.cursor.expect(Symbol::LeftBrace)?;
        self.compile_statements()?;
        self.cursor.expect(Symbol::RightBrace)?;
        Ok(())
    }

    /// `'if' '(' expression ')' '{' statements '}' ('else' '{' statements '}')?`
    pub(super) fn compile_if(&mut self) -> Result<()> {
        self.rule(Rule::IfStatement, |this| {
            let labels = this.labels.next_if();
            this.cursor.expect(Keyword::If)?;
            this.cursor.expect(Symbol::LeftParen)?;
            this.compile_expression()?;
            this.cursor.expect(Symbol::RightParen)?;

            this.emit(Command::IfGoto(labels.on_true));
            this.emit(Command::Goto(labels.on_false));
            this.emit(Command::Label(labels.on_true));
            this.compile_block()?;

            let has_else = this.cursor.peek_is(Keyword::Else);
            if has_else {
                this.emit(Command::Goto(labels.end));
            }
            this.emit(Command::Label(labels.on_false));
            if has_else {
                this.cursor.expect(Keyword::Else)?;
                this.compile_block()?;
                this.emit(Command::Label(labels.end));
            }
            Ok(())
        })
    }

    /// `'while' '(' expression ')' '{' statements '}'`
    pub(super) fn compile_while(&mut self) -> Result<()> {
        self.rule(Rule::WhileStatement, |this| {
            let labels = this.labels.next_while();
            this.cursor.expect(Keyword::While)?;
            this.emit(Command::Label(labels.condition));

            this.cursor.expect(Symbol::LeftParen)?;
            this.compile_expression()?;
            this.cursor.expect(Symbol::RightParen)?;
            // Leave the loop when the condition is false.
            this.emit(ArithmeticOp::Not.into());
            this.emit(Command::IfGoto(labels.end));

            this.compile_block()?;
            this.emit(Command::Goto(labels.condition));
            this.emit(Command::Label(labels.end));
            Ok(())
        })
    }

    /// `'let' varName ('[' expression ']')? '=' expression ';'`
    pub(super) fn compile_let(&mut self) -> Result<()> {
        self.rule(Rule::LetStatement, |this| {
            this.cursor.expect(Keyword::Let)?;
            let name = this.cursor.expect_identifier()?;
            let target = this.lookup(&name, this.cursor.current_location())?;

            if this.cursor.peek_is(Symbol::LeftSquareBracket) {
                // The element address is computed first, but `pointer 1` can only be set once the
                // value is known since the value's own code may index arrays too.
                this.cursor.expect(Symbol::LeftSquareBracket)?;
                this.compile_expression()?;
                this.cursor.expect(Symbol::RightSquareBracket)?;
                this.emit(Command::Push(target.segment(), target.index));
                this.emit(ArithmeticOp::Add.into());

                this.cursor.expect(Symbol::Equals)?;
                this.compile_expression()?;
                this.cursor.expect(Symbol::Semicolon)?;

                this.emit(Command::Pop(Segment::Temp, 0));
                this.emit(Command::Pop(Segment::Pointer, 1));
                this.emit(Command::Push(Segment::Temp, 0));
                this.emit(Command::Pop(Segment::That, 0));
            } else {
                this.cursor.expect(Symbol::Equals)?;
                this.compile_expression()?;
                this.cursor.expect(Symbol::Semicolon)?;
                this.emit(Command::Pop(target.segment(), target.index));
            }
            Ok(())
        })
    }
}
