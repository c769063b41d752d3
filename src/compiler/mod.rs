//! Parses one class and generates its VM code in the same pass. There is no syntax tree: every
//! rule emits code as soon as it has seen enough tokens, looking at most one token ahead.

mod control_flow;
mod cursor;
mod expression;
mod trace;

pub use control_flow::LabelCounters;
pub use cursor::TokenCursor;
pub use trace::{to_xml, Rule, TraceEvent};

use crate::error::{Error, Result};
use crate::symbols::{Kind, Scope, Symbol as Variable, SymbolTable};
use crate::tokens::{tokenize, Keyword, Location, Symbol, Token, TokenKind};
use crate::vm::{self, Command, Segment};
use log::debug;

const STATEMENT_START: &[TokenKind] = &[
    TokenKind::Keyword(Keyword::Let),
    TokenKind::Keyword(Keyword::If),
    TokenKind::Keyword(Keyword::While),
    TokenKind::Keyword(Keyword::Do),
    TokenKind::Keyword(Keyword::Return),
    TokenKind::Symbol(Symbol::RightBrace),
];

const SUBROUTINE_START: &[TokenKind] = &[
    TokenKind::Keyword(Keyword::Constructor),
    TokenKind::Keyword(Keyword::Function),
    TokenKind::Keyword(Keyword::Method),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

/// The result of compiling one class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Compiled {
    pub class_name: String,
    pub commands: Vec<Command>,
    /// Empty unless tracing was enabled.
    pub trace: Vec<TraceEvent>,
}

impl Compiled {
    pub fn vm_code(&self) -> String {
        vm::render(&self.commands)
    }

    pub fn xml(&self) -> String {
        to_xml(&self.trace)
    }
}

/// State for translating one class. Nothing here is shared, so separate classes can be compiled
/// by separate instances at the same time.
pub struct Compiler<I> {
    cursor: TokenCursor<I>,
    symbols: SymbolTable,
    labels: LabelCounters,
    class_name: String,
    output: Vec<Command>,
}

impl<I> Compiler<I>
where
    I: Iterator<Item = Result<(Token, Location)>>,
{
    pub fn new(tokens: I) -> Result<Self> {
        Ok(Self {
            cursor: TokenCursor::new(tokens)?,
            symbols: SymbolTable::new(),
            labels: LabelCounters::default(),
            class_name: String::new(),
            output: Vec::new(),
        })
    }

    /// Record a trace of the parse alongside the code.
    pub fn with_trace(mut self) -> Self {
        self.cursor.enable_trace();
        self
    }

    /// Compiles the single class the token stream must consist of.
    pub fn compile(mut self) -> Result<Compiled> {
        self.compile_class()?;
        self.cursor.expect(TokenKind::Eof)?;
        Ok(Compiled {
            class_name: self.class_name,
            commands: self.output,
            trace: self.cursor.take_trace(),
        })
    }

    fn emit(&mut self, command: Command) {
        self.output.push(command);
    }

    /// Runs `body` as the grammar rule `rule`, so it shows up in the trace.
    fn rule<T>(&mut self, rule: Rule, body: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.cursor.enter(rule);
        let result = body(self)?;
        self.cursor.exit(rule);
        Ok(result)
    }

    fn lookup(&self, name: &str, location: Location) -> Result<Variable> {
        self.symbols
            .resolve(name)
            .cloned()
            .ok_or_else(|| Error::UnresolvedName {
                location,
                name: name.to_owned(),
            })
    }

    /// `'int' | 'char' | 'boolean' | className`, plus `'void'` where a return type is expected.
    fn compile_type(&mut self, allow_void: bool) -> Result<String> {
        let mut kinds = vec![
            Keyword::Int.into(),
            Keyword::Char.into(),
            Keyword::Boolean.into(),
            TokenKind::Identifier,
        ];
        if allow_void {
            kinds.push(Keyword::Void.into());
        }
        match self.cursor.expect_any_of(&kinds)? {
            Token::Keyword(keyword) => Ok(keyword.as_text().to_owned()),
            Token::Identifier(name) => Ok(name),
            _ => Err(self.cursor.rejected(&kinds)),
        }
    }

    /// `type varName (',' varName)* ';'`, declaring every name as `kind`.
    fn compile_declarations(&mut self, kind: Kind) -> Result<()> {
        let data_type = self.compile_type(false)?;
        loop {
            let name = self.cursor.expect_identifier()?;
            let location = self.cursor.current_location();
            self.symbols.declare(&name, &data_type, kind, location)?;
            if !self.cursor.peek_is(Symbol::Comma) {
                break;
            }
            self.cursor.expect(Symbol::Comma)?;
        }
        self.cursor.expect(Symbol::Semicolon)?;
        Ok(())
    }

    /// `'class' className '{' classVarDec* subroutineDec* '}'`
    fn compile_class(&mut self) -> Result<()> {
        self.rule(Rule::Class, |this| {
            this.symbols.reset(Scope::Class);
            this.cursor.expect(Keyword::Class)?;
            this.class_name = this.cursor.expect_identifier()?;
            debug!("Compiling class {}", this.class_name);
            this.cursor.expect(Symbol::LeftBrace)?;

            while this.cursor.peek_is(Keyword::Static) || this.cursor.peek_is(Keyword::Field) {
                this.compile_class_var_dec()?;
            }
            while this.cursor.peek_is_any_of(SUBROUTINE_START) {
                this.compile_subroutine()?;
            }
            if !this.cursor.peek_is(Symbol::RightBrace) {
                let mut expected = SUBROUTINE_START.to_vec();
                expected.push(Symbol::RightBrace.into());
                return Err(this.cursor.unexpected(&expected));
            }
            this.cursor.expect(Symbol::RightBrace)?;
            Ok(())
        })
    }

    /// `('static' | 'field') type varName (',' varName)* ';'`
    fn compile_class_var_dec(&mut self) -> Result<()> {
        self.rule(Rule::ClassVarDec, |this| {
            let kind = match this
                .cursor
                .expect_any_of(&[Keyword::Static.into(), Keyword::Field.into()])?
            {
                Token::Keyword(Keyword::Static) => Kind::Static,
                _ => Kind::Field,
            };
            this.compile_declarations(kind)
        })
    }

    /// `('constructor' | 'function' | 'method') ('void' | type) subroutineName
    /// '(' parameterList ')' subroutineBody`
    fn compile_subroutine(&mut self) -> Result<()> {
        self.rule(Rule::SubroutineDec, |this| {
            this.symbols.reset(Scope::Subroutine);
            this.labels.reset();

            let kind = match this.cursor.expect_any_of(SUBROUTINE_START)? {
                Token::Keyword(Keyword::Constructor) => SubroutineKind::Constructor,
                Token::Keyword(Keyword::Method) => SubroutineKind::Method,
                _ => SubroutineKind::Function,
            };
            this.compile_type(true)?;
            let name = format!("{}.{}", this.class_name, this.cursor.expect_identifier()?);
            debug!("Compiling {:?} {}", kind, name);

            if kind == SubroutineKind::Method {
                // The object a method is called on is passed as its first argument.
                let location = this.cursor.current_location();
                this.symbols
                    .declare("this", &this.class_name, Kind::Argument, location)?;
            }
            this.cursor.expect(Symbol::LeftParen)?;
            this.compile_parameter_list()?;
            this.cursor.expect(Symbol::RightParen)?;
            this.compile_subroutine_body(name, kind)
        })
    }

    /// `((type varName) (',' type varName)*)?`
    fn compile_parameter_list(&mut self) -> Result<()> {
        self.rule(Rule::ParameterList, |this| {
            if this.cursor.peek_is(Symbol::RightParen) {
                return Ok(());
            }
            loop {
                let data_type = this.compile_type(false)?;
                let name = this.cursor.expect_identifier()?;
                let location = this.cursor.current_location();
                this.symbols
                    .declare(&name, &data_type, Kind::Argument, location)?;
                if !this.cursor.peek_is(Symbol::Comma) {
                    return Ok(());
                }
                this.cursor.expect(Symbol::Comma)?;
            }
        })
    }

    /// `'{' varDec* statements '}'`
    ///
    /// Local declarations all come before the first statement, so the `function` header can be
    /// written as soon as they have been read.
    fn compile_subroutine_body(&mut self, name: String, kind: SubroutineKind) -> Result<()> {
        self.rule(Rule::SubroutineBody, |this| {
            this.cursor.expect(Symbol::LeftBrace)?;
            while this.cursor.peek_is(Keyword::Var) {
                this.compile_var_dec()?;
            }
            let locals = this.symbols.count(Kind::Local);
            this.emit(Command::Function { name, locals });

            match kind {
                SubroutineKind::Constructor => {
                    let fields = this.symbols.count(Kind::Field);
                    this.emit(Command::Push(Segment::Constant, fields));
                    this.emit(Command::call("Memory.alloc", 1));
                    this.emit(Command::Pop(Segment::Pointer, 0));
                }
                SubroutineKind::Method => {
                    this.emit(Command::Push(Segment::Argument, 0));
                    this.emit(Command::Pop(Segment::Pointer, 0));
                }
                SubroutineKind::Function => (),
            }

            this.compile_statements()?;
            this.cursor.expect(Symbol::RightBrace)?;
            Ok(())
        })
    }

    /// `'var' type varName (',' varName)* ';'`
    fn compile_var_dec(&mut self) -> Result<()> {
        self.rule(Rule::VarDec, |this| {
            this.cursor.expect(Keyword::Var)?;
            this.compile_declarations(Kind::Local)
        })
    }

    /// `statement*`, ending at the `}` that closes the enclosing block.
    fn compile_statements(&mut self) -> Result<()> {
        self.rule(Rule::Statements, |this| {
            while !this.cursor.peek_is(Symbol::RightBrace) {
                this.compile_statement()?;
            }
            Ok(())
        })
    }

    fn compile_statement(&mut self) -> Result<()> {
        match self.cursor.peek().kind() {
            TokenKind::Keyword(Keyword::Let) => self.compile_let(),
            TokenKind::Keyword(Keyword::If) => self.compile_if(),
            TokenKind::Keyword(Keyword::While) => self.compile_while(),
            TokenKind::Keyword(Keyword::Do) => self.compile_do(),
            TokenKind::Keyword(Keyword::Return) => self.compile_return(),
            _ => Err(self.cursor.unexpected(STATEMENT_START)),
        }
    }

    /// `'do' subroutineCall ';'`
    fn compile_do(&mut self) -> Result<()> {
        self.rule(Rule::DoStatement, |this| {
            this.cursor.expect(Keyword::Do)?;
            let first = this.cursor.expect_identifier()?;
            this.compile_subroutine_call(first)?;
            this.cursor.expect(Symbol::Semicolon)?;
            // Every call leaves a value behind, which a `do` has no use for.
            this.emit(Command::Pop(Segment::Temp, 0));
            Ok(())
        })
    }

    /// `'return' expression? ';'`
    fn compile_return(&mut self) -> Result<()> {
        self.rule(Rule::ReturnStatement, |this| {
            this.cursor.expect(Keyword::Return)?;
            if this.cursor.peek_is(Symbol::Semicolon) {
                // Void subroutines still have to return something.
                this.emit(Command::Push(Segment::Constant, 0));
            } else {
                this.compile_expression()?;
            }
            this.cursor.expect(Symbol::Semicolon)?;
            this.emit(Command::Return);
            Ok(())
        })
    }
}

/// Compiles the source text of one class.
pub fn compile(source: &str) -> Result<Compiled> {
    Compiler::new(tokenize(source))?.compile()
}

/// Like [`compile`], also recording the parse trace.
pub fn compile_with_trace(source: &str) -> Result<Compiled> {
    Compiler::new(tokenize(source))?.with_trace().compile()
}
