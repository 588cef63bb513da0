// src/sema/call_info.rs
//
// Per-call-site record built when the resolution pass visits a call. Keeps
// the resolved identity of each actual alongside the name it was passed
// under (when named), in actual order. The reorder stage permutes both
// arrays together with the call's argument list.

use crate::frontend::{ExprId, ExprKind, FnId, Name, ProgramGraph, SymId};

#[derive(Debug, Clone)]
pub struct CallInfo {
    pub call: ExprId,
    /// Resolved identity of each actual, in actual order.
    pub actuals: Vec<SymId>,
    /// Name each actual was passed under; `None` when positional.
    pub actual_names: Vec<Option<Name>>,
}

impl CallInfo {
    pub fn from_call(g: &ProgramGraph, call: ExprId) -> Self {
        let mut actuals = Vec::new();
        let mut actual_names = Vec::new();
        for actual in g.call_actuals(call) {
            match &g.expr(actual).kind {
                ExprKind::Sym(sym) => {
                    actuals.push(*sym);
                    actual_names.push(None);
                }
                ExprKind::Named { name, actual: inner } => match g.expr(*inner).kind {
                    ExprKind::Sym(sym) => {
                        actuals.push(sym);
                        actual_names.push(Some(*name));
                    }
                    _ => panic!("named actual does not wrap a resolved symbol"),
                },
                _ => panic!("call-site actual is not a resolved symbol"),
            }
        }
        CallInfo {
            call,
            actuals,
            actual_names,
        }
    }

    /// The unadapted call shape, for the promotion report.
    pub fn display(&self, g: &ProgramGraph, callee: FnId) -> String {
        let name = g.interner.resolve(g.func(callee).name);
        let parts: Vec<String> = self
            .actuals
            .iter()
            .zip(self.actual_names.iter())
            .map(|(sym, passed_name)| {
                let ty = g.type_display(g.sym_type(*sym));
                match passed_name {
                    Some(n) => format!("{}: {}", g.interner.resolve(*n), ty),
                    None => ty,
                }
            })
            .collect();
        format!("{}({})", name, parts.join(", "))
    }
}
