//! Declared names, per scope. The class scope holds statics and fields for the whole class; the
//! subroutine scope holds arguments and locals and is cleared at every subroutine declaration.

use crate::error::{Error, Result};
use crate::tokens::Location;
use crate::vm::Segment;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Argument,
    Local,
}

impl Kind {
    /// The segment a variable of this kind lives in.
    pub fn segment(self) -> Segment {
        match self {
            Kind::Static => Segment::Static,
            Kind::Field => Segment::This,
            Kind::Argument => Segment::Argument,
            Kind::Local => Segment::Local,
        }
    }

    fn scope(self) -> Scope {
        match self {
            Kind::Static | Kind::Field => Scope::Class,
            Kind::Argument | Kind::Local => Scope::Subroutine,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    Class,
    Subroutine,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    /// `int`, `char`, `boolean` or a class name.
    pub data_type: String,
    pub kind: Kind,
    pub index: u16,
}

impl Symbol {
    pub fn segment(&self) -> Segment {
        self.kind.segment()
    }
}

#[derive(Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Symbol>,
    subroutine_scope: HashMap<String, Symbol>,
    statics: u16,
    fields: u16,
    arguments: u16,
    locals: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&mut self, kind: Kind) -> &mut u16 {
        match kind {
            Kind::Static => &mut self.statics,
            Kind::Field => &mut self.fields,
            Kind::Argument => &mut self.arguments,
            Kind::Local => &mut self.locals,
        }
    }

    /// Adds `name` to the scope its kind belongs to and returns the slot it was given.
    /// `location` is where errors are reported: a redeclaration, or a kind with every slot taken.
    pub fn declare(
        &mut self,
        name: &str,
        data_type: &str,
        kind: Kind,
        location: Location,
    ) -> Result<u16> {
        let scope = match kind.scope() {
            Scope::Class => &self.class_scope,
            Scope::Subroutine => &self.subroutine_scope,
        };
        if scope.contains_key(name) {
            return Err(Error::Redeclared {
                location,
                name: name.to_owned(),
            });
        }
        let counter = self.counter(kind);
        let index = *counter;
        *counter = index.checked_add(1).ok_or_else(|| Error::OutOfRange {
            location,
            message: format!("Too many {:?} variables; '{}' does not fit.", kind, name),
        })?;
        let symbol = Symbol {
            name: name.to_owned(),
            data_type: data_type.to_owned(),
            kind,
            index,
        };
        match kind.scope() {
            Scope::Class => self.class_scope.insert(name.to_owned(), symbol),
            Scope::Subroutine => self.subroutine_scope.insert(name.to_owned(), symbol),
        };
        Ok(index)
    }

    /// Looks `name` up in the subroutine scope first, then the class scope.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    /// Forgets every symbol of `scope`. Clearing the class scope clears the subroutine scope too.
    pub fn reset(&mut self, scope: Scope) {
        if scope == Scope::Class {
            self.class_scope.clear();
            self.statics = 0;
            self.fields = 0;
        }
        self.subroutine_scope.clear();
        self.arguments = 0;
        self.locals = 0;
    }

    pub fn count(&self, kind: Kind) -> u16 {
        match kind {
            Kind::Static => self.statics,
            Kind::Field => self.fields,
            Kind::Argument => self.arguments,
            Kind::Local => self.locals,
        }
    }
}
