// src/frontend/mod.rs
pub mod ast;
pub mod build;
pub mod flags;
pub mod graph;
pub mod intern;
pub mod symbol;
pub mod types;

pub use ast::{CallData, CallTarget, Expr, ExprId, ExprKind, LoopKind, Prim};
pub use flags::{Flag, FlagSet, WRAPPER_FORWARDED_FLAGS};
pub use graph::{ProgramGraph, SymbolMap};
pub use intern::{Interner, Name};
pub use symbol::{
    ArgId, ArgSymbol, FnId, FnSymbol, Immediate, Intent, RetTag, SymId, VarId, VarSymbol,
};
pub use types::{TypeArena, TypeId, TypeIdVec, TypeKind};
