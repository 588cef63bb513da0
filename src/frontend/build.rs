// src/frontend/build.rs
//
// Node builders shared by resolution-time code generation: casts and the
// two loop forms promotion emits. Loop construction also materializes the
// index variables named by unresolved references in the indices expression,
// defining them at the head of the loop body.

use crate::frontend::ast::{ExprId, ExprKind, LoopKind};
use crate::frontend::graph::ProgramGraph;
use crate::frontend::symbol::SymId;
use crate::frontend::types::TypeId;

/// An explicit conversion of `expr` to `target`: a call the resolver binds
/// to the matching cast overload.
pub fn create_cast(g: &mut ProgramGraph, expr: ExprId, target: TypeId) -> ExprId {
    let cast_name = g.interner.intern("_cast");
    let call = g.call_named(cast_name);
    let ty_ref = g.sym_expr(SymId::Type(target));
    g.add_actual(call, ty_ref);
    g.add_actual(call, expr);
    call
}

/// A serial for-loop over `iterator`, binding `indices` each iteration.
pub fn build_for_loop(
    g: &mut ProgramGraph,
    indices: ExprId,
    iterator: ExprId,
    body: ExprId,
    zippered: bool,
) -> ExprId {
    build_loop(g, LoopKind::Serial, indices, iterator, body, zippered)
}

/// A parallel forall statement over `iterator`.
pub fn build_forall_loop(
    g: &mut ProgramGraph,
    indices: ExprId,
    iterator: ExprId,
    body: ExprId,
    zippered: bool,
) -> ExprId {
    build_loop(g, LoopKind::Forall, indices, iterator, body, zippered)
}

fn build_loop(
    g: &mut ProgramGraph,
    kind: LoopKind,
    indices: ExprId,
    iterator: ExprId,
    body: ExprId,
    zippered: bool,
) -> ExprId {
    let loop_id = g.new_expr(ExprKind::Loop {
        kind,
        indices,
        iterator,
        body,
        zippered,
    });
    g.expr_mut(indices).parent = Some(loop_id);
    g.expr_mut(iterator).parent = Some(loop_id);
    g.expr_mut(body).parent = Some(loop_id);
    destructure_indices(g, indices, body);
    loop_id
}

/// Turn each unresolved name in the indices expression into a fresh index
/// variable defined at the head of the loop body. References elsewhere in
/// the graph stay unresolved until the index-binding pass runs.
fn destructure_indices(g: &mut ProgramGraph, indices: ExprId, body: ExprId) {
    let mut unresolved = Vec::new();
    collect_unresolved(g, indices, &mut unresolved);

    for &node in unresolved.iter().rev() {
        let name = match g.expr(node).kind {
            ExprKind::Unresolved(name) => name,
            _ => unreachable!(),
        };
        let index_var = g.new_var(name, g.t_unknown);
        let def = g.def_expr(SymId::Var(index_var));
        g.insert_at_head(body, def);
        let sym = g.sym_expr(SymId::Var(index_var));
        g.replace(node, sym);
    }
}

fn collect_unresolved(g: &ProgramGraph, root: ExprId, out: &mut Vec<ExprId>) {
    match &g.expr(root).kind {
        ExprKind::Unresolved(_) => out.push(root),
        ExprKind::Call(data) => {
            let actuals: Vec<ExprId> = data.actuals.to_vec();
            for a in actuals {
                collect_unresolved(g, a, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::CallTarget;
    use crate::frontend::types::TypeKind;

    #[test]
    fn create_cast_carries_type_then_value() {
        let mut g = ProgramGraph::new();
        let int = g.types.intern(TypeKind::Int);
        let v = g.new_temp("v");
        let arg = g.sym_expr(SymId::Var(v));
        let cast = create_cast(&mut g, arg, int);

        let actuals = g.call_actuals(cast);
        assert_eq!(actuals.len(), 2);
        assert!(matches!(g.expr(actuals[0]).kind, ExprKind::Sym(SymId::Type(t)) if t == int));
        assert_eq!(actuals[1], arg);
        match g.call_target(cast) {
            CallTarget::Name(n) => assert_eq!(g.interner.resolve(n), "_cast"),
            other => panic!("unexpected cast target {other:?}"),
        }
    }

    #[test]
    fn for_loop_defines_unresolved_indices_in_order() {
        let mut g = ProgramGraph::new();
        let tuple_name = g.interner.intern("_build_tuple");
        let indices = g.call_named(tuple_name);
        let i1 = g.interner.intern("p_i_1");
        let i2 = g.interner.intern("p_i_2");
        let u1 = g.unresolved(i1);
        let u2 = g.unresolved(i2);
        g.add_actual(indices, u1);
        g.add_actual(indices, u2);

        let iter_var = g.new_temp("it");
        let iterator = g.sym_expr(SymId::Var(iter_var));
        let body = g.block(vec![]);
        let loop_id = build_for_loop(&mut g, indices, iterator, body, true);

        let stmts = g.block_body(body);
        assert_eq!(stmts.len(), 2);
        let mut defined = Vec::new();
        for stmt in stmts {
            match g.expr(stmt).kind {
                ExprKind::Def(SymId::Var(v)) => defined.push(g.var(v).name),
                ref other => panic!("expected index definition, found {other:?}"),
            }
        }
        assert_eq!(defined, vec![i1, i2]);

        // The indices tuple now references the definitions.
        let actuals = g.call_actuals(indices);
        for a in actuals {
            assert!(matches!(g.expr(a).kind, ExprKind::Sym(SymId::Var(_))));
        }
        assert!(matches!(
            g.expr(loop_id).kind,
            ExprKind::Loop { zippered: true, .. }
        ));
    }

    #[test]
    fn symbol_indices_are_left_alone() {
        let mut g = ProgramGraph::new();
        let idx = g.new_temp("idx");
        let indices = g.sym_expr(SymId::Var(idx));
        let iter_var = g.new_temp("it");
        let iterator = g.sym_expr(SymId::Var(iter_var));
        let body = g.block(vec![]);
        build_for_loop(&mut g, indices, iterator, body, false);

        assert!(g.block_body(body).is_empty());
    }
}
