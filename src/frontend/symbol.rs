// src/frontend/symbol.rs
//
// Symbol arenas for the program graph: functions, formals, variables.
// Handles are plain indices; the graph owns the storage.

use crate::frontend::ast::ExprId;
use crate::frontend::flags::FlagSet;
use crate::frontend::intern::Name;
use crate::frontend::types::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FnId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArgId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u32);

/// A reference to any symbol kind. Type symbols are the interned types
/// themselves; a `Sym` expression may name a type directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymId {
    Fn(FnId),
    Arg(ArgId),
    Var(VarId),
    Type(TypeId),
}

/// Calling-convention tag on a formal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Blank,
    Const,
    In,
    Out,
    Inout,
    Ref,
    ConstRef,
    Param,
    Type,
}

impl Intent {
    /// Reference-carrying intents: the callee can alias the actual.
    pub fn is_ref_like(self) -> bool {
        matches!(self, Intent::Ref | Intent::ConstRef)
    }
}

/// How a function returns its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetTag {
    Value,
    Ref,
    Param,
    Type,
}

/// Compile-time literal payload carried by a variable symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum Immediate {
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(String),
}

#[derive(Debug, Clone)]
pub struct FnSymbol {
    pub name: Name,
    /// Lowered name; wrappers get a distinguishing prefix here.
    pub cname: Name,
    pub formals: Vec<ArgId>,
    /// Body block expression.
    pub body: ExprId,
    pub ret_type: TypeId,
    pub ret_tag: RetTag,
    pub flags: FlagSet,
    /// Receiver of a method or constructor. Usually a formal; the defaults
    /// wrapper of a specialized constructor defines its own local receiver.
    pub receiver: Option<SymId>,
    pub throws: bool,
    /// Constraint block gating candidate selection.
    pub where_clause: Option<ExprId>,
    /// Scope block used to resolve names when generic instantiation
    /// re-opens this function.
    pub instantiation_point: Option<ExprId>,
    /// The Def expression that introduces this function into its block.
    pub def_point: Option<ExprId>,
}

#[derive(Debug, Clone)]
pub struct ArgSymbol {
    pub name: Name,
    pub ty: TypeId,
    pub intent: Intent,
    /// Block evaluating the default value, when the formal has one.
    pub default_expr: Option<ExprId>,
    /// Block evaluating the declared type, when spelled as an expression.
    pub type_expr: Option<ExprId>,
    pub flags: FlagSet,
}

#[derive(Debug, Clone)]
pub struct VarSymbol {
    pub name: Name,
    pub ty: TypeId,
    pub flags: FlagSet,
    pub immediate: Option<Immediate>,
}

impl VarSymbol {
    pub fn is_immediate(&self) -> bool {
        self.immediate.is_some()
    }
}
