// src/sema/wrappers/coerce.rs
//
// Insert explicit conversions from each actual's type to its formal's
// type. One conversion step may expose another form still needing work
// (read-synchronize yields a reference, dereference yields a value that
// still widens), so each position loops to a fixed point:
//
//   sync T   --readFE-->  ref T
//   single T --readFF-->  ref T
//   ref T    --deref-->   T
//   T        --cast-->    formal type
//
// The cap below is empirical headroom, not a semantic limit: the deepest
// chain the test suite exercises is a reference to a doubly-nested
// synchronized value, which needs five conversions plus one final check.
// Widening it must be a deliberate change, never a silent one.

use tracing::trace;

use crate::errors::ResolveError;
use crate::frontend::build::create_cast;
use crate::frontend::{
    ArgId, ExprId, ExprKind, Flag, FnId, Immediate, Intent, Prim, RetTag, SymId, TypeId,
};
use crate::sema::call_info::CallInfo;
use crate::sema::host::ResolveHost;

use super::{fn_line, CallAdapter};

pub(crate) const MAX_COERCION_STEPS: usize = 6;

impl<H: ResolveHost> CallAdapter<'_, H> {
    pub(crate) fn coerce_actuals(
        &mut self,
        callee: FnId,
        info: &mut CallInfo,
    ) -> Result<(), ResolveError> {
        if self.graph.func(callee).ret_tag == RetTag::Param {
            // The call folds away after resolution. A read-synchronize
            // inserted here would outlive it.
            return Ok(());
        }

        let formals = self.graph.func(callee).formals.clone();
        for (position, &formal) in formals.iter().enumerate() {
            let mut actual_sym = info.actuals[position];
            let mut actual_expr = self.graph.call_actuals(info.call)[position];
            let mut checks_left = MAX_COERCION_STEPS;

            loop {
                let actual_type = self.graph.sym_type(actual_sym);
                let mut check_again = false;

                if self.needs_coercion(actual_type, actual_sym, formal, callee) {
                    let formal_type = self.graph.formal(formal).ty;
                    let literal = string_literal_text(self, actual_sym);
                    if self.graph.types.is_c_string(formal_type)
                        && self.graph.types.is_string(actual_type)
                        && literal.is_some()
                    {
                        // A string literal against a c_string formal swaps
                        // the symbol in place; there is no cast between the
                        // two string types.
                        let text = literal.unwrap();
                        let swapped = self.graph.c_string_literal(&text);
                        let new_actual = self.graph.sym_expr(SymId::Var(swapped));
                        self.graph.replace(actual_expr, new_actual);
                        actual_expr = new_actual;
                        actual_sym = SymId::Var(swapped);
                    } else {
                        self.add_arg_coercion(
                            callee,
                            info.call,
                            formal,
                            &mut actual_expr,
                            &mut actual_sym,
                            &mut check_again,
                        )?;
                    }
                }

                checks_left -= 1;
                if !check_again {
                    break;
                }
                assert!(
                    checks_left > 0,
                    "coercion chain for actual {} did not settle within {} steps",
                    position,
                    MAX_COERCION_STEPS
                );
            }
        }

        Ok(())
    }

    /// Whether the actual still needs a conversion step toward `formal`.
    fn needs_coercion(
        &self,
        actual_type: TypeId,
        actual_sym: SymId,
        formal: ArgId,
        callee: FnId,
    ) -> bool {
        let formal_type = self.graph.formal(formal).ty;

        if actual_type == formal_type {
            false
        } else if self.graph.types.ref_type_of(formal_type) == Some(actual_type)
            && self.effective_intent(formal).is_ref_like()
        {
            // A reference to the formal type under a reference intent
            // passes through untouched.
            false
        } else if self
            .host
            .can_coerce(self.graph, actual_type, actual_sym, formal_type, callee)
        {
            true
        } else {
            self.host
                .is_dispatch_parent(self.graph, actual_type, formal_type)
        }
    }

    fn effective_intent(&self, formal: ArgId) -> Intent {
        let intent = self.graph.formal(formal).intent;
        if matches!(intent, Intent::Blank | Intent::Const)
            && !self.graph.types.is_iterator_record(self.graph.formal(formal).ty)
        {
            self.host.concrete_intent_for_arg(self.graph, formal)
        } else {
            intent
        }
    }

    /// Insert one conversion step: define a temporary before the call's
    /// statement, move the converted value into it, and retarget the
    /// actual at the temporary. `check_again` reports that the step may
    /// have exposed another form still needing conversion.
    fn add_arg_coercion(
        &mut self,
        callee: FnId,
        call: ExprId,
        formal: ArgId,
        actual_expr: &mut ExprId,
        actual_sym: &mut SymId,
        check_again: &mut bool,
    ) -> Result<(), ResolveError> {
        let line = self.graph.expr(*actual_expr).line;
        self.graph.set_line(line);

        let original_sym = *actual_sym;
        let actual_type = self.graph.sym_type(original_sym);
        let formal_type = self.graph.formal(formal).ty;

        let cast_temp = self.graph.new_temp("coerce_tmp");
        self.graph.var_mut(cast_temp).flags.set(Flag::CoerceTemp);

        // A receiver upcast to a parent must stay writable as the receiver.
        if self.graph.has_flag(original_sym, Flag::ArgThis)
            && self
                .host
                .is_dispatch_parent(self.graph, actual_type, formal_type)
        {
            self.graph.var_mut(cast_temp).flags.set(Flag::ArgThis);
        }

        let new_actual = self.graph.sym_expr(SymId::Var(cast_temp));
        let named_inner = match &self.graph.expr(*actual_expr).kind {
            ExprKind::Named { actual, .. } => Some(*actual),
            _ => None,
        };
        let mut prev_actual = *actual_expr;
        if let Some(inner) = named_inner {
            // Keep the name node in place; convert the expression under it.
            self.graph.replace(inner, new_actual);
            prev_actual = inner;
        } else {
            self.graph.replace(prev_actual, new_actual);
            *actual_expr = new_actual;
        }
        *actual_sym = SymId::Var(cast_temp);

        trace!(
            from = %self.graph.type_display(actual_type),
            to = %self.graph.type_display(formal_type),
            "inserting coercion step"
        );

        let value_form = self.graph.types.value_type(actual_type);
        let mut cast_call = None;

        if self.graph.types.is_sync(value_form) {
            *check_again = true;
            let read = self.graph.call_named(self.wk.read_fe);
            let token = self.graph.sym_expr(SymId::Var(self.wk.method_token));
            self.graph.add_actual(read, token);
            self.graph.add_actual(read, prev_actual);
            cast_call = Some(read);
        } else if self.graph.types.is_single(value_form) {
            *check_again = true;
            let read = self.graph.call_named(self.wk.read_ff);
            let token = self.graph.sym_expr(SymId::Var(self.wk.method_token));
            self.graph.add_actual(read, token);
            self.graph.add_actual(read, prev_actual);
            cast_call = Some(read);
        } else if self.graph.types.is_ref(actual_type)
            && !(self.graph.types.is_tuple(value_form)
                && self
                    .graph
                    .types
                    .is_tuple(self.graph.types.value_type(formal_type)))
        {
            // Dereference, except between two tuple references, which later
            // lowering handles directly.
            *check_again = true;
            let deref = self.graph.call_prim(Prim::Deref, &[prev_actual]);

            if self.graph.has_flag(original_sym, Flag::RefToConst) {
                self.graph.var_mut(cast_temp).flags.set(Flag::Const);
                if self
                    .graph
                    .has_flag(original_sym, Flag::RefForConstFieldOfThis)
                {
                    self.graph
                        .var_mut(cast_temp)
                        .flags
                        .set(Flag::RefForConstFieldOfThis);
                }
            }
            cast_call = Some(deref);
        } else {
            assert!(
                !self.graph.has_flag(original_sym, Flag::InstantiatedParam),
                "instantiated param actual reached the generic cast path"
            );
        }

        let cast_call = match cast_call {
            Some(c) => c,
            None => {
                let cast = create_cast(self.graph, prev_actual, formal_type);
                if self.graph.types.is_string(formal_type) {
                    self.graph
                        .var_mut(cast_temp)
                        .flags
                        .set(Flag::InsertAutoDestroy);
                }
                cast
            }
        };

        let temp_ref = self.graph.sym_expr(SymId::Var(cast_temp));
        let cast_move = self.graph.call_prim(Prim::Move, &[temp_ref, cast_call]);
        let def = self.graph.def_expr(SymId::Var(cast_temp));
        let stmt = self.graph.enclosing_stmt(call);
        self.graph.insert_before(stmt, def);
        self.graph.insert_before(stmt, cast_move);

        let target = self.host.resolve_call_and_callee(self.graph, cast_call, true);
        if let Some(target) = target {
            if !self.graph.func(target).flags.has(Flag::Resolved) {
                return Err(ResolveError::CastResolution {
                    from: self.graph.type_display(actual_type),
                    to: self.graph.type_display(formal_type),
                    line: self.graph.expr(call).line,
                    target_line: fn_line(self.graph, target),
                });
            }
        }

        self.host.resolve_call(self.graph, cast_move);

        Ok(())
    }
}

fn string_literal_text<H: ResolveHost>(adapter: &CallAdapter<'_, H>, sym: SymId) -> Option<String> {
    match sym {
        SymId::Var(v) => match &adapter.graph.var(v).immediate {
            Some(Immediate::Str(text)) => Some(text.clone()),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{CallTarget, TypeKind};
    use crate::sema::test_support::Fixture;

    #[test]
    fn sync_sync_chain_settles_through_four_temps() {
        let mut fx = Fixture::new();
        let int = fx.wk.t_int;
        let real = fx.wk.t_real;
        let sync_int = fx.g.types.intern(TypeKind::Sync(int));
        let sync_sync_int = fx.g.types.intern(TypeKind::Sync(sync_int));

        let callee = fx.make_fn("h", &[("x", real)], fx.wk.t_void);
        let actual = fx.var("s", sync_sync_int);
        let (call, mut info, caller) = fx.make_call(callee, &[actual]);
        let body = fx.g.func(caller).body;

        let mut adapter = fx.adapter();
        adapter
            .coerce_actuals(callee, &mut info)
            .expect("chain should resolve");

        // Four def/move pairs precede the call statement.
        let stmts = adapter.graph.block_body(body);
        assert_eq!(stmts.len(), 9);
        let names: Vec<&str> = stmts[..8]
            .chunks(2)
            .map(|pair| {
                match adapter.graph.expr(pair[0]).kind {
                    ExprKind::Def(SymId::Var(v)) => {
                        assert!(adapter.graph.var(v).flags.has(Flag::CoerceTemp));
                    }
                    ref other => panic!("expected def, found {other:?}"),
                }
                let rhs = match &adapter.graph.expr(pair[1]).kind {
                    ExprKind::Call(data) => data.actuals[1],
                    other => panic!("expected move, found {other:?}"),
                };
                match adapter.graph.call_target(rhs) {
                    CallTarget::Name(n) => adapter.graph.interner.resolve(n),
                    CallTarget::Prim(Prim::Deref) => "deref",
                    other => panic!("unexpected conversion {other:?}"),
                }
            })
            .collect();
        assert_eq!(names, vec!["readFE", "readFE", "deref", "_cast"]);

        // The call's actual now names the last temporary, typed real.
        let final_actual = adapter.graph.call_actuals(call)[0];
        match adapter.graph.expr(final_actual).kind {
            ExprKind::Sym(sym) => assert_eq!(adapter.graph.sym_type(sym), real),
            ref other => panic!("expected symbol actual, found {other:?}"),
        }
    }

    #[test]
    fn equal_types_insert_nothing() {
        let mut fx = Fixture::new();
        let int = fx.wk.t_int;
        let callee = fx.make_fn("h", &[("x", int)], fx.wk.t_void);
        let actual = fx.var("a", int);
        let (_, mut info, caller) = fx.make_call(callee, &[actual]);
        let body = fx.g.func(caller).body;

        let mut adapter = fx.adapter();
        adapter.coerce_actuals(callee, &mut info).unwrap();
        assert_eq!(adapter.graph.block_body(body).len(), 1);
    }

    #[test]
    fn ref_actual_with_ref_intent_passes_through() {
        let mut fx = Fixture::new();
        let int = fx.wk.t_int;
        let ref_int = fx.g.types.make_ref_type(int);
        let callee = fx.make_fn("h", &[("x", int)], fx.wk.t_void);
        let formals = fx.g.func(callee).formals.clone();
        fx.g.formal_mut(formals[0]).intent = Intent::Ref;

        let actual = fx.var("r", ref_int);
        let (_, mut info, caller) = fx.make_call(callee, &[actual]);
        let body = fx.g.func(caller).body;

        let mut adapter = fx.adapter();
        adapter.coerce_actuals(callee, &mut info).unwrap();
        assert_eq!(adapter.graph.block_body(body).len(), 1);
    }

    #[test]
    fn param_returning_callee_skips_coercion() {
        let mut fx = Fixture::new();
        let int = fx.wk.t_int;
        let real = fx.wk.t_real;
        let sync_int = fx.g.types.intern(TypeKind::Sync(int));
        let callee = fx.make_fn("h", &[("x", real)], real);
        fx.g.func_mut(callee).ret_tag = RetTag::Param;

        let actual = fx.var("s", sync_int);
        let (_, mut info, caller) = fx.make_call(callee, &[actual]);
        let body = fx.g.func(caller).body;

        let mut adapter = fx.adapter();
        adapter.coerce_actuals(callee, &mut info).unwrap();
        assert_eq!(adapter.graph.block_body(body).len(), 1);
    }

    #[test]
    fn string_literal_swaps_for_c_string_formal() {
        let mut fx = Fixture::new();
        let c_string = fx.wk.t_c_string;
        let string = fx.wk.t_string;
        let callee = fx.make_fn("h", &[("s", c_string)], fx.wk.t_void);

        let lit = fx.var("greeting", string);
        fx.g.var_mut(lit).immediate = Some(Immediate::Str("hello".to_string()));
        let (call, mut info, caller) = fx.make_call(callee, &[lit]);
        let body = fx.g.func(caller).body;

        let mut adapter = fx.adapter();
        adapter.coerce_actuals(callee, &mut info).unwrap();

        // No cast statements; the actual itself was swapped.
        assert_eq!(adapter.graph.block_body(body).len(), 1);
        let actual = adapter.graph.call_actuals(call)[0];
        match adapter.graph.expr(actual).kind {
            ExprKind::Sym(SymId::Var(v)) => {
                assert_eq!(adapter.graph.var(v).ty, c_string);
                assert_eq!(
                    adapter.graph.var(v).immediate,
                    Some(Immediate::Str("hello".to_string()))
                );
            }
            ref other => panic!("expected swapped literal, found {other:?}"),
        }
    }

    #[test]
    fn unresolvable_cast_target_reports_both_types() {
        let mut fx = Fixture::new();
        let int = fx.wk.t_int;
        let real = fx.wk.t_real;
        // A cast overload exists but never resolves.
        let broken = fx.make_fn("_cast", &[], real);
        fx.g.func_mut(broken).flags.clear(Flag::Resolved);
        fx.host.cast_fn = Some(broken);

        let callee = fx.make_fn("h", &[("x", real)], fx.wk.t_void);
        let actual = fx.var("a", int);
        let (_, mut info, _) = fx.make_call(callee, &[actual]);

        let mut adapter = fx.adapter();
        let err = adapter
            .coerce_actuals(callee, &mut info)
            .expect_err("cast resolution should fail");
        assert!(matches!(
            err,
            ResolveError::CastResolution { ref from, ref to, .. }
                if from == "int" && to == "real"
        ));
    }
}
