//! A record of how the parser walked the grammar. Nothing in the compiler reads it back; it exists
//! so tools can show the parse, for example as the XML the course's syntax analyzer produces.

use crate::tokens::Token;
use std::fmt::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    Class,
    ClassVarDec,
    SubroutineDec,
    ParameterList,
    SubroutineBody,
    VarDec,
    Statements,
    LetStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ReturnStatement,
    Expression,
    Term,
    ExpressionList,
}

impl Rule {
    pub fn as_text(self) -> &'static str {
        use Rule::*;
        match self {
            Class => "class",
            ClassVarDec => "classVarDec",
            SubroutineDec => "subroutineDec",
            ParameterList => "parameterList",
            SubroutineBody => "subroutineBody",
            VarDec => "varDec",
            Statements => "statements",
            LetStatement => "letStatement",
            IfStatement => "ifStatement",
            WhileStatement => "whileStatement",
            DoStatement => "doStatement",
            ReturnStatement => "returnStatement",
            Expression => "expression",
            Term => "term",
            ExpressionList => "expressionList",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    Enter(Rule),
    Exit(Rule),
    Consumed(Token),
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders a trace as nested XML elements, one per rule and one per consumed token.
pub fn to_xml(events: &[TraceEvent]) -> String {
    let mut output = String::new();
    let mut depth = 0;
    for event in events {
        // Writing to a String cannot fail.
        let _ = match event {
            TraceEvent::Enter(rule) => {
                let line = writeln!(output, "{:indent$}<{}>", "", rule.as_text(), indent = depth * 2);
                depth += 1;
                line
            }
            TraceEvent::Exit(rule) => {
                depth = depth.saturating_sub(1);
                writeln!(output, "{:indent$}</{}>", "", rule.as_text(), indent = depth * 2)
            }
            TraceEvent::Consumed(token) => {
                let (tag, text) = match token {
                    Token::Keyword(k) => ("keyword", k.as_text().to_owned()),
                    Token::Symbol(s) => ("symbol", s.as_text().to_owned()),
                    Token::IntegerConstant(v) => ("integerConstant", v.to_string()),
                    Token::StringConstant(v) => ("stringConstant", v.clone()),
                    Token::Identifier(v) => ("identifier", v.clone()),
                    Token::Eof => continue,
                };
                writeln!(
                    output,
                    "{:indent$}<{tag}> {} </{tag}>",
                    "",
                    escape(&text),
                    indent = depth * 2,
                    tag = tag
                )
            }
        };
    }
    output
}
