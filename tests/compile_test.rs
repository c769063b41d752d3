//! End-to-end tests: Jack source in, VM code out.

use jack_compiler::tokens::{Keyword, Location, Symbol, Token, TokenKind};
use jack_compiler::vm::Command;
use jack_compiler::{compile, compile_with_trace, Error};

fn vm_lines(source: &str) -> Vec<String> {
    compile(source)
        .unwrap_or_else(|e| panic!("failed to compile:\n{}\n{}", source, e))
        .vm_code()
        .lines()
        .map(str::to_owned)
        .collect()
}

/// Compiles `statements` as the body of a function and returns only the code they produced.
fn statement_code(locals: &str, statements: &str) -> Vec<String> {
    let source = format!(
        "class Test {{ function void run() {{ {} {} return; }} }}",
        locals, statements
    );
    let lines = vm_lines(&source);
    assert!(lines[0].starts_with("function Test.run"));
    assert_eq!(&lines[lines.len() - 2..], ["push constant 0", "return"]);
    lines[1..lines.len() - 2].to_vec()
}

fn expression_code(expression: &str) -> Vec<String> {
    let source = format!(
        "class Test {{ function int run() {{ return {}; }} }}",
        expression
    );
    let lines = vm_lines(&source);
    assert_eq!(lines.last().map(|l| &l[..]), Some("return"));
    lines[1..lines.len() - 1].to_vec()
}

#[test]
fn string_literal_is_built_character_by_character() {
    assert_eq!(
        expression_code("\"AB\""),
        [
            "push constant 2",
            "call String.new 1",
            "push constant 65",
            "call String.appendChar 2",
            "push constant 66",
            "call String.appendChar 2",
        ]
    );
    assert_eq!(
        expression_code("\"\""),
        ["push constant 0", "call String.new 1"]
    );
}

#[test]
fn keyword_constants() {
    assert_eq!(expression_code("true"), ["push constant 0", "not"]);
    assert_eq!(expression_code("false"), ["push constant 0"]);
    assert_eq!(expression_code("null"), ["push constant 0"]);
}

#[test]
fn operators_chain_left_to_right() {
    assert_eq!(
        expression_code("1 + 2 * 3"),
        [
            "push constant 1",
            "push constant 2",
            "add",
            "push constant 3",
            "call Math.multiply 2",
        ]
    );
    assert_eq!(
        expression_code("8 - (6 / 2)"),
        [
            "push constant 8",
            "push constant 6",
            "push constant 2",
            "call Math.divide 2",
            "sub",
        ]
    );
    assert_eq!(
        expression_code("1 < 2 & 3 > 4 | ~(5 = 6)"),
        [
            "push constant 1",
            "push constant 2",
            "lt",
            "push constant 3",
            "and",
            "push constant 4",
            "gt",
            "push constant 5",
            "push constant 6",
            "eq",
            "not",
            "or",
        ]
    );
}

#[test]
fn unary_operators_bind_to_one_term() {
    assert_eq!(
        expression_code("-1 + 2"),
        ["push constant 1", "neg", "push constant 2", "add"]
    );
    assert_eq!(expression_code("~~true"), ["push constant 0", "not", "not", "not"]);
}

#[test]
fn if_else_emits_both_branches_in_order() {
    assert_eq!(
        statement_code(
            "var int x, y;",
            "if (x) { let y = 1; } else { let y = 2; }"
        ),
        [
            "push local 0",
            "if-goto IF_TRUE0",
            "goto IF_FALSE0",
            "label IF_TRUE0",
            "push constant 1",
            "pop local 1",
            "goto IF_END0",
            "label IF_FALSE0",
            "push constant 2",
            "pop local 1",
            "label IF_END0",
        ]
    );
}

#[test]
fn if_without_else_has_no_end_label() {
    assert_eq!(
        statement_code("var int x;", "if (x) { let x = 0; }"),
        [
            "push local 0",
            "if-goto IF_TRUE0",
            "goto IF_FALSE0",
            "label IF_TRUE0",
            "push constant 0",
            "pop local 0",
            "label IF_FALSE0",
        ]
    );
}

#[test]
fn while_tests_the_negated_condition() {
    assert_eq!(
        statement_code("var int i;", "while (i < 3) { let i = i + 1; }"),
        [
            "label WHILE_EXP0",
            "push local 0",
            "push constant 3",
            "lt",
            "not",
            "if-goto WHILE_END0",
            "push local 0",
            "push constant 1",
            "add",
            "pop local 0",
            "goto WHILE_EXP0",
            "label WHILE_END0",
        ]
    );
}

#[test]
fn nested_constructs_get_their_own_labels() {
    let code = statement_code(
        "var int i;",
        "while (i) { if (i) { while (i) { } } if (i) { } } if (i) { }",
    );
    let labels: Vec<&str> = code
        .iter()
        .filter_map(|l| l.strip_prefix("label "))
        .collect();
    assert_eq!(
        labels,
        [
            "WHILE_EXP0",
            "IF_TRUE0",
            "WHILE_EXP1",
            "WHILE_END1",
            "IF_FALSE0",
            "IF_TRUE1",
            "IF_FALSE1",
            "WHILE_END0",
            "IF_TRUE2",
            "IF_FALSE2",
        ]
    );
}

#[test]
fn array_elements_are_read_through_that() {
    assert_eq!(
        statement_code("var Array a; var int i, x;", "let x = a[i + 1];"),
        [
            "push local 1",
            "push constant 1",
            "add",
            "push local 0",
            "add",
            "pop pointer 1",
            "push that 0",
            "pop local 2",
        ]
    );
}

#[test]
fn array_assignment_stores_after_the_value_is_computed() {
    assert_eq!(
        statement_code("var Array a, b; var int i, j;", "let a[i] = b[j];"),
        [
            "push local 2",
            "push local 0",
            "add",
            "push local 3",
            "push local 1",
            "add",
            "pop pointer 1",
            "push that 0",
            "pop temp 0",
            "pop pointer 1",
            "push temp 0",
            "pop that 0",
        ]
    );
}

#[test]
fn calls_marshal_their_receiver() {
    let source = "class Game {
        field Ball ball;
        method void step() {
            do ball.bounce(1, 2);
            do redraw();
            do Screen.clearScreen();
            return;
        }
        method void redraw() { return; }
    }";
    assert_eq!(
        vm_lines(source),
        [
            "function Game.step 0",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "push constant 1",
            "push constant 2",
            "call Ball.bounce 3",
            "pop temp 0",
            "push pointer 0",
            "call Game.redraw 1",
            "pop temp 0",
            "call Screen.clearScreen 0",
            "pop temp 0",
            "push constant 0",
            "return",
            "function Game.redraw 0",
            "push argument 0",
            "pop pointer 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn complete_class() {
    let source = r#"
        /** A point that can move right. */
        class Point {
            field int x, y;
            static int count;

            constructor Point new(int ax, int ay) {
                let x = ax;
                let y = ay;
                let count = count + 1;
                return this;
            }

            method int getX() {
                return x;
            }

            method void move(int dx) {
                var int i;
                let i = 0;
                while (i < dx) {
                    let x = x + 1;
                    let i = i + 1;
                }
                return;
            }

            function void main() {
                var Point p;
                let p = Point.new(1, 2);
                do p.move(3);
                do Output.printInt(p.getX()); // prints 4
                return;
            }
        }
    "#;
    let expected = "\
function Point.new 0
push constant 2
call Memory.alloc 1
pop pointer 0
push argument 0
pop this 0
push argument 1
pop this 1
push static 0
push constant 1
add
pop static 0
push pointer 0
return
function Point.getX 0
push argument 0
pop pointer 0
push this 0
return
function Point.move 1
push argument 0
pop pointer 0
push constant 0
pop local 0
label WHILE_EXP0
push local 0
push argument 1
lt
not
if-goto WHILE_END0
push this 0
push constant 1
add
pop this 0
push local 0
push constant 1
add
pop local 0
goto WHILE_EXP0
label WHILE_END0
push constant 0
return
function Point.main 1
push constant 1
push constant 2
call Point.new 2
pop local 0
push local 0
push constant 3
call Point.move 2
pop temp 0
push local 0
call Point.getX 1
call Output.printInt 1
pop temp 0
push constant 0
return
";
    let compiled = compile(source).unwrap();
    assert_eq!(compiled.class_name, "Point");
    assert_eq!(compiled.vm_code(), expected);

    let returns = compiled
        .commands
        .iter()
        .filter(|c| **c == Command::Return)
        .count();
    let functions = compiled
        .commands
        .iter()
        .filter(|c| matches!(c, Command::Function { .. }))
        .count();
    assert_eq!(returns, 4);
    assert_eq!(functions, 4);
}

#[test]
fn compiling_twice_gives_identical_output() {
    let source = "class A {
        function int f(int n) {
            var int total;
            while (n > 0) { if (n = 3) { let total = total + n; } let n = n - 1; }
            return total;
        }
        function void g() { if (true) { } else { } return; }
    }";
    assert_eq!(compile(source).unwrap(), compile(source).unwrap());
}

#[test]
fn unknown_statement_is_a_syntax_error() {
    let err = compile("class A { function void f() { var int x; x = 1; return; } }").unwrap_err();
    match err {
        Error::Syntax {
            expected, found, ..
        } => {
            assert_eq!(found, Token::Identifier("x".to_owned()));
            assert!(expected.0.contains(&TokenKind::Keyword(Keyword::Let)));
            assert!(expected.0.contains(&TokenKind::Symbol(Symbol::RightBrace)));
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn bad_term_is_a_syntax_error() {
    let err = compile("class A { function int f() { return ; + 1; } }").unwrap_err();
    assert!(matches!(
        err,
        Error::Syntax { found: Token::Symbol(Symbol::Plus), .. }
    ));
    let err = compile("class A { function int f() { return 1 + ; } }").unwrap_err();
    assert!(matches!(
        err,
        Error::Syntax { found: Token::Symbol(Symbol::Semicolon), .. }
    ));
}

#[test]
fn missing_token_reports_where() {
    let err = compile("class A {\n  function void f() {\n    do f()\n  }\n}").unwrap_err();
    assert_eq!(
        err,
        Error::Syntax {
            location: Location::new(4, 3),
            expected: jack_compiler::tokens::Expected(vec![Symbol::Semicolon.into()]),
            found: Symbol::RightBrace.into(),
        }
    );
    assert_eq!(err.to_string(), "At 4:3:\nExpected ';', got symbol '}' instead.");
}

#[test]
fn undeclared_variables_are_rejected() {
    let err = compile("class A { function void f() { let y = 1; return; } }").unwrap_err();
    assert_eq!(
        err,
        Error::UnresolvedName {
            location: Location::new(1, 35),
            name: "y".to_owned(),
        }
    );
    assert!(matches!(
        compile("class A { function int f() { return z[0]; } }"),
        Err(Error::UnresolvedName { .. })
    ));
}

#[test]
fn locals_do_not_leak_between_subroutines() {
    let source = "class A {
        function void f() { var int x; let x = 1; return; }
        function void g() { let x = 2; return; }
    }";
    assert!(matches!(
        compile(source),
        Err(Error::UnresolvedName { name, .. }) if name == "x"
    ));
}

#[test]
fn duplicate_declarations_are_rejected() {
    assert!(matches!(
        compile("class A { function void f(int a) { var int a; return; } }"),
        Err(Error::Redeclared { name, .. }) if name == "a"
    ));
}

#[test]
fn scanner_errors_stop_compilation() {
    assert!(matches!(
        compile("class A { function int f() { return 40000; } }"),
        Err(Error::Lex { .. })
    ));
    assert!(matches!(compile("class A { ` }"), Err(Error::Lex { .. })));
}

#[test]
fn empty_input_expects_a_class() {
    assert!(matches!(
        compile("  // nothing here\n"),
        Err(Error::Syntax { found: Token::Eof, .. })
    ));
}

#[test]
fn trace_renders_as_xml() {
    let compiled = compile_with_trace("class A { static int n; }").unwrap();
    assert_eq!(
        compiled.xml(),
        "<class>
  <keyword> class </keyword>
  <identifier> A </identifier>
  <symbol> { </symbol>
  <classVarDec>
    <keyword> static </keyword>
    <keyword> int </keyword>
    <identifier> n </identifier>
    <symbol> ; </symbol>
  </classVarDec>
  <symbol> } </symbol>
</class>
"
    );
    assert!(compile("class A { }").unwrap().trace.is_empty());
}
