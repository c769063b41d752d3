use std::fmt::{Display, Formatter};

/// A named region of VM-addressable storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    /// Fields of the current object.
    This,
    /// Whatever `pointer 1` currently points at, usually an array element.
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn as_text(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Argument => "argument",
            Self::Local => "local",
            Self::Static => "static",
            Self::This => "this",
            Self::That => "that",
            Self::Pointer => "pointer",
            Self::Temp => "temp",
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Not,
    And,
    Or,
    Lt,
    Gt,
    Eq,
}

impl Display for ArithmeticOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use ArithmeticOp::*;
        let text = match self {
            Add => "add",
            Sub => "sub",
            Neg => "neg",
            Not => "not",
            And => "and",
            Or => "or",
            Lt => "lt",
            Gt => "gt",
            Eq => "eq",
        };
        write!(f, "{}", text)
    }
}

/// The construct a label belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelTag {
    IfTrue,
    IfFalse,
    IfEnd,
    WhileExp,
    WhileEnd,
}

/// A branch target. Only unique within the subroutine it was allocated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Label {
    pub tag: LabelTag,
    pub id: usize,
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let tag = match self.tag {
            LabelTag::IfTrue => "IF_TRUE",
            LabelTag::IfFalse => "IF_FALSE",
            LabelTag::IfEnd => "IF_END",
            LabelTag::WhileExp => "WHILE_EXP",
            LabelTag::WhileEnd => "WHILE_END",
        };
        write!(f, "{}{}", tag, self.id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Push(Segment, u16),
    Pop(Segment, u16),
    Arithmetic(ArithmeticOp),
    Label(Label),
    Goto(Label),
    IfGoto(Label),
    Function { name: String, locals: u16 },
    Call { name: String, args: u16 },
    Return,
}

impl Command {
    pub fn call(name: impl Into<String>, args: u16) -> Self {
        Self::Call {
            name: name.into(),
            args,
        }
    }
}

impl From<ArithmeticOp> for Command {
    fn from(other: ArithmeticOp) -> Self {
        Self::Arithmetic(other)
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push(segment, index) => write!(f, "push {} {}", segment, index),
            Self::Pop(segment, index) => write!(f, "pop {} {}", segment, index),
            Self::Arithmetic(op) => write!(f, "{}", op),
            Self::Label(label) => write!(f, "label {}", label),
            Self::Goto(label) => write!(f, "goto {}", label),
            Self::IfGoto(label) => write!(f, "if-goto {}", label),
            Self::Function { name, locals } => write!(f, "function {} {}", name, locals),
            Self::Call { name, args } => write!(f, "call {} {}", name, args),
            Self::Return => write!(f, "return"),
        }
    }
}
