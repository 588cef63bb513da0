// src/frontend/ast.rs
//
// Expression/statement nodes of the program graph. Nodes live in one arena
// and reference each other (and their parent) by ExprId; blocks keep their
// statements as ordered child vectors.

use smallvec::SmallVec;

use crate::frontend::intern::Name;
use crate::frontend::symbol::{FnId, SymId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub u32);

/// Operations the layer emits directly into the graph for later lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prim {
    Move,
    Return,
    Deref,
    AddrOf,
    Init,
    InitFields,
    SetCid,
    SetMember,
    Typeof,
    Yield,
    Alloc,
    /// Reads the iterator-record field standing in for a wrapper formal;
    /// iterator lowering replaces it with the materialized field.
    IterRecFieldValueByFormal,
}

/// What a call invokes: a resolved function, a name resolved later, or a
/// primitive operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTarget {
    Fn(FnId),
    Name(Name),
    Prim(Prim),
}

#[derive(Debug, Clone)]
pub struct CallData {
    pub target: CallTarget,
    pub actuals: SmallVec<[ExprId; 4]>,
    /// Call spelled with square brackets at the source level.
    pub square: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    Serial,
    Forall,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Reference to a resolved symbol.
    Sym(SymId),
    /// Reference by name, bound by a later pass.
    Unresolved(Name),
    /// Introduces a symbol into the enclosing block.
    Def(SymId),
    /// Named actual at a call site.
    Named { name: Name, actual: ExprId },
    Call(CallData),
    Block { body: Vec<ExprId> },
    Cond {
        cond: ExprId,
        then_stmt: ExprId,
        else_stmt: Option<ExprId>,
    },
    Loop {
        kind: LoopKind,
        indices: ExprId,
        iterator: ExprId,
        /// Block holding the per-iteration statements.
        body: ExprId,
        zippered: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub parent: Option<ExprId>,
    /// Source line of the construct this node was generated for.
    pub line: u32,
}
