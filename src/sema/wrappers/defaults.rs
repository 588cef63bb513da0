// src/sema/wrappers/defaults.rs
//
// Wrap a call that supplies fewer actuals than the callee has formals.
// The wrapper accepts only the supplied actuals, materializes every
// omitted formal from its default (or its type's default), and forwards
// one fully-populated call to the callee.
//
// Default constructors get extra treatment: the wrapper defines the
// receiver itself, allocates it for class types, and stores each argument
// into the matching field before the constructor call so a default
// expression that names a sibling field (an array sized by a domain field,
// say) sees the field already set.

use tracing::debug;

use crate::frontend::{
    ArgId, CallTarget, ExprId, ExprKind, Flag, FnId, Intent, Prim, SymId, SymbolMap, VarId,
};
use crate::sema::call_info::CallInfo;
use crate::sema::host::ResolveHost;

use super::{copy_formal_for_wrapper, specialize_default_constructor, CallAdapter};

impl<H: ResolveHost> CallAdapter<'_, H> {
    /// Find or build the defaults wrapper for this call shape and rewrite
    /// `actual_to_formal` to target the wrapper's formals.
    pub(crate) fn supply_defaults(
        &mut self,
        callee: FnId,
        info: &CallInfo,
        actual_to_formal: &mut [ArgId],
    ) -> FnId {
        let formals = self.graph.func(callee).formals.clone();
        let omitted: Vec<ArgId> = formals
            .iter()
            .filter(|formal| !actual_to_formal.contains(formal))
            .copied()
            .collect();

        let wrapper = match self.state.cached_defaults_wrapper(callee, &omitted) {
            Some(wrapper) => {
                debug!(
                    callee = %self.graph.interner.resolve(self.graph.func(callee).name),
                    "defaults wrapper cache hit"
                );
                wrapper
            }
            None => {
                let wrapper = self.build_defaults_wrapper(callee, info, &omitted);
                self.host.resolve_formals(self.graph, wrapper);
                self.state.cache_defaults_wrapper(callee, &omitted, wrapper);
                wrapper
            }
        };

        // Point each supplied position at the wrapper formal standing in
        // for its original formal; wrapper formals mirror the supplied
        // formals in declaration order.
        let wrapper_formals = self.graph.func(wrapper).formals.clone();
        let mut next = 0;
        for formal in formals {
            for slot in actual_to_formal.iter_mut() {
                if *slot == formal {
                    *slot = wrapper_formals[next];
                    next += 1;
                }
            }
        }

        wrapper
    }

    fn build_defaults_wrapper(&mut self, callee: FnId, info: &CallInfo, omitted: &[ArgId]) -> FnId {
        let wrapper = self.build_empty_wrapper(callee, info);

        let cname = {
            let base = self.graph.interner.resolve(self.graph.func(callee).cname);
            format!("_default_wrap_{base}")
        };
        let cname = self.graph.interner.intern(&cname);
        self.graph.func_mut(wrapper).cname = cname;

        if !self.graph.func(callee).flags.has(Flag::IteratorFn) {
            let ret = self.graph.func(callee).ret_type;
            self.graph.func_mut(wrapper).ret_type = ret;
        }

        let mut copy_map = SymbolMap::default();
        let specialize = specialize_default_constructor(self.graph, callee);
        let wrapper_body = self.graph.func(wrapper).body;

        if specialize {
            self.set_up_constructor_receiver(callee, wrapper, omitted, &mut copy_map);
        }

        let call = self.graph.call_fn(callee);
        let square = match &self.graph.expr(info.call).kind {
            ExprKind::Call(data) => data.square,
            _ => false,
        };
        if let ExprKind::Call(data) = &mut self.graph.expr_mut(call).kind {
            data.square = square;
        }

        for formal in self.graph.func(callee).formals.clone() {
            if !omitted.contains(&formal) {
                self.append_supplied_formal(callee, formal, call, wrapper, &mut copy_map);
            } else if let Some(&value) = self.state.param_map.get(&SymId::Arg(formal)) {
                let actual = self.graph.sym_expr(value);
                self.graph.add_actual(call, actual);
            } else if self.graph.formal(formal).flags.has(Flag::IsMeme) {
                let receiver = self.graph.func(wrapper).receiver.expect(
                    "placeholder formal on a wrapper without a receiver",
                );
                self.graph.formal_mut(formal).ty = self.graph.sym_type(receiver);
                let actual = self.graph.sym_expr(receiver);
                self.graph.add_actual(call, actual);
            } else {
                self.append_defaulted_formal(callee, formal, call, wrapper, &mut copy_map);
            }
        }

        self.graph.substitute_symbols(wrapper_body, &copy_map);
        self.finish_wrapper_call(callee, wrapper, call);
        self.host.normalize(self.graph, wrapper);

        wrapper
    }

    /// Define the constructor receiver inside the wrapper, allocating it
    /// for class types before field initialization runs.
    fn set_up_constructor_receiver(
        &mut self,
        callee: FnId,
        wrapper: FnId,
        omitted: &[ArgId],
        copy_map: &mut SymbolMap,
    ) {
        let callee_receiver = self
            .graph
            .func(callee)
            .receiver
            .expect("default constructor without a receiver");
        let receiver_type = self.graph.sym_type(callee_receiver);
        let receiver_name = self.graph.sym_name(callee_receiver);

        let local = self.graph.new_var(receiver_name, receiver_type);
        let receiver_flags = match callee_receiver {
            SymId::Arg(a) => self.graph.formal(a).flags,
            SymId::Var(v) => self.graph.var(v).flags,
            _ => Default::default(),
        };
        self.graph.var_mut(local).flags = receiver_flags;
        self.graph.func_mut(wrapper).receiver = Some(SymId::Var(local));
        copy_map.insert(callee_receiver, SymId::Var(local));

        let body = self.graph.func(wrapper).body;
        let def = self.graph.def_expr(SymId::Var(local));
        self.graph.push_stmt(body, def);

        let last_is_meme = omitted
            .last()
            .is_some_and(|&formal| self.graph.formal(formal).flags.has(Flag::IsMeme));
        if last_is_meme
            && !self.graph.types.is_record(receiver_type)
            && !self.graph.types.is_union(receiver_type)
        {
            let type_ref = self.graph.sym_expr(SymId::Type(receiver_type));
            let alloc = self.graph.call_prim(Prim::Alloc, &[type_ref]);
            let receiver_ref = self.graph.sym_expr(SymId::Var(local));
            let move_stmt = self.graph.call_prim(Prim::Move, &[receiver_ref, alloc]);
            self.graph.push_stmt(body, move_stmt);

            let receiver_ref = self.graph.sym_expr(SymId::Var(local));
            let set_cid = self.graph.call_prim(Prim::SetCid, &[receiver_ref]);
            self.graph.push_stmt(body, set_cid);
        }

        let receiver_ref = self.graph.sym_expr(SymId::Var(local));
        let init_fields = self.graph.call_prim(Prim::InitFields, &[receiver_ref]);
        self.graph.push_stmt(body, init_fields);
    }

    /// The call supplies an actual for this formal: the wrapper accepts it
    /// and forwards it, materializing a temporary when forwarding needs
    /// address-of or the declared type of a constructor field.
    fn append_supplied_formal(
        &mut self,
        callee: FnId,
        formal: ArgId,
        call: ExprId,
        wrapper: FnId,
        copy_map: &mut SymbolMap,
    ) {
        let wrapper_formal = copy_formal_for_wrapper(self.graph, formal);
        self.graph.add_formal(wrapper, wrapper_formal);

        if let Some(&value) = self.state.param_map.get(&SymId::Arg(formal)) {
            self.state.param_map.insert(SymId::Arg(wrapper_formal), value);
        }

        if self.graph.func(callee).receiver == Some(SymId::Arg(formal)) {
            self.graph.func_mut(wrapper).receiver = Some(SymId::Arg(wrapper_formal));
        }

        if self.graph.formal(formal).flags.has(Flag::IsMeme) {
            if let Some(receiver) = self.graph.func(wrapper).receiver {
                // Rebind the receiver to the incoming placeholder right
                // after its definition.
                let body = self.graph.func(wrapper).body;
                let receiver_def = self
                    .graph
                    .collect_defs(body)
                    .into_iter()
                    .find(|&def| matches!(self.graph.expr(def).kind, ExprKind::Def(sym) if sym == receiver));
                if let Some(receiver_def) = receiver_def {
                    let receiver_ref = self.graph.sym_expr(receiver);
                    let formal_ref = self.graph.sym_expr(SymId::Arg(wrapper_formal));
                    let move_stmt = self
                        .graph
                        .call_prim(Prim::Move, &[receiver_ref, formal_ref]);
                    self.graph.insert_after(receiver_def, move_stmt);
                }
            }
        }

        let body = self.graph.func(wrapper).body;
        let formal_type = self.graph.formal(formal).ty;

        if self.graph.types.is_ref(formal_type) {
            // Forward a reference formal by address.
            let temp = self.graph.new_temp("wrap_ref_arg");
            self.graph.var_mut(temp).flags.set(Flag::MaybeParam);

            let def = self.graph.def_expr(SymId::Var(temp));
            self.graph.push_stmt(body, def);
            let formal_ref = self.graph.sym_expr(SymId::Arg(wrapper_formal));
            let addr = self.graph.call_prim(Prim::AddrOf, &[formal_ref]);
            let temp_ref = self.graph.sym_expr(SymId::Var(temp));
            let move_stmt = self.graph.call_prim(Prim::Move, &[temp_ref, addr]);
            self.graph.push_stmt(body, move_stmt);

            self.update_wrap_call(callee, formal, call, wrapper, SymId::Var(temp), copy_map);
        } else if specialize_default_constructor(self.graph, callee)
            && self.graph.formal(wrapper_formal).type_expr.is_some()
            && self.graph.types.is_record_wrapped(formal_type)
        {
            // A record-wrapped constructor argument with a declared type:
            // evaluate the type expression, default-initialize a temporary
            // of that type, then assign the incoming value into it. This
            // keeps the declared type of the matching field when the field
            // shares the formal's name.
            let temp = self.graph.new_temp("wrap_type_arg");

            let receiver = self.graph.func(callee).receiver.unwrap();
            let receiver_type = self.graph.sym_type(receiver);
            let formal_name = self.graph.formal(formal).name;
            if self.graph.types.own_field(receiver_type, formal_name).is_some() {
                self.graph
                    .var_mut(temp)
                    .flags
                    .set(Flag::InsertAutoDestroy);
            }

            let def = self.graph.def_expr(SymId::Var(temp));
            self.graph.push_stmt(body, def);

            let type_expr = self.graph.formal(wrapper_formal).type_expr.unwrap();
            let mut scratch = SymbolMap::default();
            let type_expr = self.graph.copy_expr(type_expr, &mut scratch);
            for stmt in self.graph.block_body(type_expr) {
                self.graph.remove(stmt);
                self.graph.push_stmt(body, stmt);
            }

            let last = self.graph.remove_tail(body);
            let init = self.graph.call_prim(Prim::Init, &[last]);
            let temp_ref = self.graph.sym_expr(SymId::Var(temp));
            let move_stmt = self.graph.call_prim(Prim::Move, &[temp_ref, init]);
            self.graph.push_stmt(body, move_stmt);

            let assign = self.graph.call_named(self.wk.assign);
            let temp_ref = self.graph.sym_expr(SymId::Var(temp));
            self.graph.add_actual(assign, temp_ref);
            let formal_ref = self.graph.sym_expr(SymId::Arg(wrapper_formal));
            self.graph.add_actual(assign, formal_ref);
            self.graph.push_stmt(body, assign);

            self.update_wrap_call(callee, formal, call, wrapper, SymId::Var(temp), copy_map);
        } else {
            self.update_wrap_call(
                callee,
                formal,
                call,
                wrapper,
                SymId::Arg(wrapper_formal),
                copy_map,
            );
        }
    }

    /// Append `value` as the next actual of the forwarded call, and for a
    /// specialized default constructor copy it into the matching field of
    /// the receiver so the field and the argument agree.
    fn update_wrap_call(
        &mut self,
        callee: FnId,
        formal: ArgId,
        call: ExprId,
        wrapper: FnId,
        value: SymId,
        copy_map: &mut SymbolMap,
    ) {
        copy_map.insert(SymId::Arg(formal), value);

        let actual = self.graph.sym_expr(value);
        self.graph.add_actual(call, actual);

        let callee_name = self.graph.func(callee).name;
        if !specialize_default_constructor(self.graph, callee)
            || callee_name == self.wk.tuple_construct
            || self.graph.formal(formal).flags.has(Flag::TypeVariable)
            || self.state.param_map.contains_key(&SymId::Arg(formal))
            || self.graph.formal(formal).ty == self.wk.t_method_token
        {
            return;
        }

        let receiver = self.graph.func(wrapper).receiver.unwrap();
        let receiver_type = self.graph.sym_type(receiver);
        let formal_name = self.graph.formal(formal).name;
        if self.graph.types.own_field(receiver_type, formal_name).is_none() {
            return;
        }

        // The constructor no longer copy-constructs its arguments itself,
        // so the wrapper copies before storing into the field.
        let body = self.graph.func(wrapper).body;
        let temp = self.graph.new_temp("wrap_arg");
        let def = self.graph.def_expr(SymId::Var(temp));
        self.graph.push_stmt(body, def);

        let auto_copy = self.graph.call_named(self.wk.auto_copy);
        let value_ref = self.graph.sym_expr(value);
        self.graph.add_actual(auto_copy, value_ref);
        let temp_ref = self.graph.sym_expr(SymId::Var(temp));
        let move_stmt = self.graph.call_prim(Prim::Move, &[temp_ref, auto_copy]);
        self.graph.push_stmt(body, move_stmt);

        let field_name = self
            .graph
            .interner
            .resolve(formal_name)
            .to_string();
        let name_literal = self.graph.c_string_literal(&field_name);
        let receiver_ref = self.graph.sym_expr(receiver);
        let name_ref = self.graph.sym_expr(SymId::Var(name_literal));
        let temp_ref = self.graph.sym_expr(SymId::Var(temp));
        let set_member = self
            .graph
            .call_prim(Prim::SetMember, &[receiver_ref, name_ref, temp_ref]);
        self.graph.push_stmt(body, set_member);

        copy_map.insert(SymId::Arg(formal), SymId::Var(temp));

        let last_actual = *self
            .graph
            .call_actuals(call)
            .last()
            .expect("forwarded call has an actual to replace");
        let replacement = self.graph.sym_expr(SymId::Var(temp));
        self.graph.replace(last_actual, replacement);
    }

    /// The call omits this formal: materialize a temporary from the
    /// formal's default expression, or from its type's default value.
    fn append_defaulted_formal(
        &mut self,
        callee: FnId,
        formal: ArgId,
        call: ExprId,
        wrapper: FnId,
        copy_map: &mut SymbolMap,
    ) {
        let temp_name = format!(
            "default_arg_{}",
            self.graph.interner.resolve(self.graph.formal(formal).name)
        );
        let temp = self.graph.new_temp(&temp_name);

        let specialize = specialize_default_constructor(self.graph, callee);
        let formal_type = self.graph.formal(formal).ty;
        let mut intent = self.graph.formal(formal).intent;
        if formal_type != self.wk.t_type_default_token
            && formal_type != self.wk.t_method_token
            && intent == Intent::Blank
        {
            intent = self.host.blank_intent_for_type(self.graph, formal_type);
        }

        if intent != Intent::Inout && intent != Intent::Out {
            self.graph.var_mut(temp).flags.set(Flag::MaybeParam);
            self.graph.var_mut(temp).flags.set(Flag::ExprTemp);
        }
        if self.graph.formal(formal).flags.has(Flag::TypeVariable) {
            self.graph.var_mut(temp).flags.set(Flag::TypeVariable);
        }

        copy_map.insert(SymId::Arg(formal), SymId::Var(temp));

        let body = self.graph.func(wrapper).body;
        let def = self.graph.def_expr(SymId::Var(temp));
        self.graph.push_stmt(body, def);

        let default_expr = self.graph.formal(formal).default_expr;
        let default_is_type_sentinel = default_expr.is_some_and(|block| {
            let stmts = self.graph.block_body(block);
            stmts.len() == 1
                && matches!(
                    self.graph.expr(stmts[0]).kind,
                    ExprKind::Sym(SymId::Var(v)) if v == self.wk.type_default_token
                )
        });

        if intent == Intent::Out || default_expr.is_none() || default_is_type_sentinel {
            self.apply_type_default(formal, wrapper, temp);
        } else {
            let mut scratch = SymbolMap::default();
            let default_copy = self.graph.copy_expr(default_expr.unwrap(), &mut scratch);
            for stmt in self.graph.block_body(default_copy) {
                self.graph.remove(stmt);
                self.graph.push_stmt(body, stmt);
            }

            if specialize {
                // Copy-construct from the default value; normalization may
                // already have inserted the copy in the default expression.
                let from_expr = self.graph.remove_tail(body);
                let needs_init_copy = match &self.graph.expr(from_expr).kind {
                    ExprKind::Call(data) => match data.target {
                        CallTarget::Name(n) => {
                            n != self.wk.init_copy && n != self.wk.create_field_default
                        }
                        CallTarget::Fn(_) => panic!(
                            "default expression for '{}' resolved before wrapping",
                            self.graph.interner.resolve(self.graph.formal(formal).name)
                        ),
                        CallTarget::Prim(_) => true,
                    },
                    _ => true,
                };
                let from_expr = if needs_init_copy {
                    let copy = self.graph.call_named(self.wk.init_copy);
                    self.graph.add_actual(copy, from_expr);
                    copy
                } else {
                    from_expr
                };
                let temp_ref = self.graph.sym_expr(SymId::Var(temp));
                let move_stmt = self.graph.call_prim(Prim::Move, &[temp_ref, from_expr]);
                self.graph.push_stmt(body, move_stmt);
            } else {
                let tail = self.graph.remove_tail(body);
                let from_expr = if intent.is_ref_like() {
                    self.graph.call_prim(Prim::AddrOf, &[tail])
                } else {
                    tail
                };
                let temp_ref = self.graph.sym_expr(SymId::Var(temp));
                let move_stmt = self.graph.call_prim(Prim::Move, &[temp_ref, from_expr]);
                self.graph.push_stmt(body, move_stmt);
            }

            if self.graph.formal(formal).intent == Intent::Inout {
                assert!(
                    !self.graph.var(temp).flags.has(Flag::ExprTemp),
                    "inout default temporary must stay writable"
                );
                self.graph.var_mut(temp).flags.clear(Flag::MaybeParam);
            }
        }

        let actual = self.graph.sym_expr(SymId::Var(temp));
        self.graph.add_actual(call, actual);

        // Set the matching field before the constructor call so a sibling
        // field's initializer can read it.
        let callee_name = self.graph.func(callee).name;
        if specialize
            && callee_name != self.wk.tuple_construct
            && !self.graph.formal(formal).flags.has(Flag::TypeVariable)
        {
            let receiver = self.graph.func(wrapper).receiver.unwrap();
            let receiver_type = self.graph.sym_type(receiver);
            let formal_name = self.graph.formal(formal).name;
            if self.graph.types.own_field(receiver_type, formal_name).is_some() {
                let field_name = self.graph.interner.resolve(formal_name).to_string();
                let name_literal = self.graph.c_string_literal(&field_name);
                let receiver_ref = self.graph.sym_expr(receiver);
                let name_ref = self.graph.sym_expr(SymId::Var(name_literal));
                let temp_ref = self.graph.sym_expr(SymId::Var(temp));
                let set_member = self
                    .graph
                    .call_prim(Prim::SetMember, &[receiver_ref, name_ref, temp_ref]);
                self.graph.push_stmt(body, set_member);
            }
        }
    }

    /// Populate `temp` with the default value of the formal's type.
    fn apply_type_default(&mut self, formal: ArgId, wrapper: FnId, temp: VarId) {
        let body = self.graph.func(wrapper).body;
        let is_type_variable = self.graph.formal(formal).flags.has(Flag::TypeVariable);

        if let Some(type_expr) = self.graph.formal(formal).type_expr {
            let mut scratch = SymbolMap::default();
            let type_copy = self.graph.copy_expr(type_expr, &mut scratch);
            for stmt in self.graph.block_body(type_copy) {
                self.graph.remove(stmt);
                self.graph.push_stmt(body, stmt);
            }

            if is_type_variable {
                let tail = self.graph.remove_tail(body);
                let temp_ref = self.graph.sym_expr(SymId::Var(temp));
                let move_stmt = self.graph.call_prim(Prim::Move, &[temp_ref, tail]);
                self.graph.push_stmt(body, move_stmt);
                return;
            }

            // If the tail is already a move, seed the default from its
            // destination rather than re-evaluating the whole expression.
            let tail = self.graph.block_tail(body).unwrap();
            let move_lhs = match &self.graph.expr(tail).kind {
                ExprKind::Call(data) if data.target == CallTarget::Prim(Prim::Move) => {
                    Some(data.actuals[0])
                }
                _ => None,
            };

            let init_arg = match move_lhs {
                Some(lhs) => {
                    let mut scratch = SymbolMap::default();
                    self.graph.copy_expr(lhs, &mut scratch)
                }
                None => self.graph.remove_tail(body),
            };
            let init = self.graph.call_prim(Prim::Init, &[init_arg]);
            let temp_ref = self.graph.sym_expr(SymId::Var(temp));
            let move_stmt = self.graph.call_prim(Prim::Move, &[temp_ref, init]);
            self.graph.push_stmt(body, move_stmt);
        } else {
            let formal_type = self.graph.formal(formal).ty;
            let type_ref = self.graph.sym_expr(SymId::Type(formal_type));
            let from_expr = if is_type_variable {
                type_ref
            } else {
                self.graph.call_prim(Prim::Init, &[type_ref])
            };
            let temp_ref = self.graph.sym_expr(SymId::Var(temp));
            let move_stmt = self.graph.call_prim(Prim::Move, &[temp_ref, from_expr]);
            self.graph.push_stmt(body, move_stmt);
        }
    }

    /// Close the wrapper with the forwarded call, binding and returning
    /// its result unless the callee returns nothing, and define the
    /// wrapper next to the callee.
    fn finish_wrapper_call(&mut self, callee: FnId, wrapper: FnId, call: ExprId) {
        let body = self.graph.func(wrapper).body;

        if self.graph.func(callee).ret_type == self.wk.t_void {
            self.graph.push_stmt(body, call);
        } else {
            let temp = self.graph.new_temp("wrap_call_tmp");
            {
                let flags = &mut self.graph.var_mut(temp).flags;
                flags.set(Flag::ExprTemp);
                flags.set(Flag::MaybeParam);
                flags.set(Flag::MaybeType);
            }
            let def = self.graph.def_expr(SymId::Var(temp));
            self.graph.push_stmt(body, def);
            let temp_ref = self.graph.sym_expr(SymId::Var(temp));
            let move_stmt = self.graph.call_prim(Prim::Move, &[temp_ref, call]);
            self.graph.push_stmt(body, move_stmt);
            let temp_ref = self.graph.sym_expr(SymId::Var(temp));
            let ret = self.graph.call_prim(Prim::Return, &[temp_ref]);
            self.graph.push_stmt(body, ret);
        }

        let def = self.graph.def_expr(SymId::Fn(wrapper));
        match self.graph.func(callee).def_point {
            Some(callee_def) => self.graph.insert_after(callee_def, def),
            None => {
                let program_block = self.graph.program_block;
                self.graph.push_stmt(program_block, def);
            }
        }
        self.graph.func_mut(wrapper).def_point = Some(def);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{Immediate, TypeKind};
    use crate::sema::test_support::Fixture;

    // f(a: int, b: int = 3, c: int = 5) called as f(a = ten).
    fn defaults_scenario(fx: &mut Fixture) -> (FnId, CallInfo, Vec<ArgId>) {
        let int = fx.wk.t_int;
        let callee = fx.make_fn("f", &[("a", int), ("b", int), ("c", int)], int);
        fx.set_int_default(callee, 1, 3);
        fx.set_int_default(callee, 2, 5);

        let ten = fx.var("ten", int);
        let (_, info, _) = fx.make_call(callee, &[ten]);
        let formals = fx.g.func(callee).formals.clone();
        (callee, info, vec![formals[0]])
    }

    #[test]
    fn omitted_formals_become_default_temps() {
        let mut fx = Fixture::new();
        let (callee, info, mut actual_to_formal) = defaults_scenario(&mut fx);

        let mut adapter = fx.adapter();
        let wrapper = adapter.supply_defaults(callee, &info, &mut actual_to_formal);

        // One formal survives; the map now points into the wrapper.
        let formals = adapter.graph.func(wrapper).formals.clone();
        assert_eq!(formals.len(), 1);
        assert_eq!(actual_to_formal, formals);

        // Body: def tb; move tb, 3; def tc; move tc, 5; then the call.
        let body = adapter.graph.block_body(adapter.graph.func(wrapper).body);
        assert_eq!(body.len(), 7);

        for (def_idx, value) in [(0usize, 3i64), (2, 5)] {
            let temp = match adapter.graph.expr(body[def_idx]).kind {
                ExprKind::Def(SymId::Var(v)) => v,
                ref other => panic!("expected temp definition, found {other:?}"),
            };
            let name = adapter.graph.interner.resolve(adapter.graph.var(temp).name);
            assert!(name.starts_with("default_arg_"), "got {name}");
            assert!(adapter.graph.var(temp).flags.has(Flag::MaybeParam));
            assert!(adapter.graph.var(temp).flags.has(Flag::ExprTemp));

            let rhs = match &adapter.graph.expr(body[def_idx + 1]).kind {
                ExprKind::Call(data) => {
                    assert_eq!(data.target, CallTarget::Prim(Prim::Move));
                    data.actuals[1]
                }
                other => panic!("expected move, found {other:?}"),
            };
            match adapter.graph.expr(rhs).kind {
                ExprKind::Sym(SymId::Var(v)) => {
                    assert_eq!(adapter.graph.var(v).immediate, Some(Immediate::Int(value)));
                }
                ref other => panic!("expected literal default, found {other:?}"),
            }
        }

        // The forwarded call lists the wrapper formal then both temps, and
        // its result is bound and returned.
        let move_call = &body[5];
        let inner_call = match &adapter.graph.expr(*move_call).kind {
            ExprKind::Call(data) => {
                assert_eq!(data.target, CallTarget::Prim(Prim::Move));
                data.actuals[1]
            }
            other => panic!("expected move of call result, found {other:?}"),
        };
        assert_eq!(adapter.graph.resolved_fn(inner_call), Some(callee));
        let actuals = adapter.graph.call_actuals(inner_call);
        assert_eq!(actuals.len(), 3);
        assert!(matches!(
            adapter.graph.expr(actuals[0]).kind,
            ExprKind::Sym(SymId::Arg(a)) if a == formals_of(adapter.graph, wrapper)[0]
        ));
        assert!(matches!(
            adapter.graph.expr(body[6]).kind,
            ExprKind::Call(ref data) if data.target == CallTarget::Prim(Prim::Return)
        ));
    }

    fn formals_of(g: &crate::frontend::ProgramGraph, f: FnId) -> Vec<ArgId> {
        g.func(f).formals.clone()
    }

    #[test]
    fn identical_shapes_share_one_wrapper() {
        let mut fx = Fixture::new();
        let (callee, info, mut map_one) = defaults_scenario(&mut fx);
        let mut map_two = map_one.clone();

        let first = fx.adapter().supply_defaults(callee, &info, &mut map_one);
        let second = fx.adapter().supply_defaults(callee, &info, &mut map_two);
        assert_eq!(first, second);
        assert_eq!(map_one, map_two);

        // A different omission set builds a different wrapper.
        let int = fx.wk.t_int;
        let ten = fx.var("ten2", int);
        let five = fx.var("five", int);
        let (_, info_two, _) = fx.make_call(callee, &[ten, five]);
        let formals = fx.g.func(callee).formals.clone();
        let mut map_three = vec![formals[0], formals[1]];
        let third = fx
            .adapter()
            .supply_defaults(callee, &info_two, &mut map_three);
        assert_ne!(first, third);
    }

    #[test]
    fn void_callee_gets_bare_trailing_call() {
        let mut fx = Fixture::new();
        let int = fx.wk.t_int;
        let callee = fx.make_fn("p", &[("a", int), ("b", int)], fx.wk.t_void);
        fx.set_int_default(callee, 1, 2);

        let ten = fx.var("ten", int);
        let (_, info, _) = fx.make_call(callee, &[ten]);
        let formals = fx.g.func(callee).formals.clone();
        let mut actual_to_formal = vec![formals[0]];

        let mut adapter = fx.adapter();
        let wrapper = adapter.supply_defaults(callee, &info, &mut actual_to_formal);

        let body = adapter.graph.block_body(adapter.graph.func(wrapper).body);
        let tail = *body.last().unwrap();
        assert_eq!(adapter.graph.resolved_fn(tail), Some(callee));
        // No result temporary, no return.
        assert!(!body.iter().any(|&stmt| matches!(
            adapter.graph.expr(stmt).kind,
            ExprKind::Call(ref data) if data.target == CallTarget::Prim(Prim::Return)
        )));
    }

    #[test]
    fn ref_formal_is_forwarded_by_address() {
        let mut fx = Fixture::new();
        let int = fx.wk.t_int;
        let ref_int = fx.g.types.make_ref_type(int);
        let callee = fx.make_fn("r", &[("a", ref_int), ("b", int)], fx.wk.t_void);
        fx.set_int_default(callee, 1, 2);

        let arg = fx.var("arg", ref_int);
        let (_, info, _) = fx.make_call(callee, &[arg]);
        let formals = fx.g.func(callee).formals.clone();
        let mut actual_to_formal = vec![formals[0]];

        let mut adapter = fx.adapter();
        let wrapper = adapter.supply_defaults(callee, &info, &mut actual_to_formal);

        let body = adapter.graph.block_body(adapter.graph.func(wrapper).body);
        let addr_move = body.iter().find_map(|&stmt| match &adapter.graph.expr(stmt).kind {
            ExprKind::Call(data) if data.target == CallTarget::Prim(Prim::Move) => {
                match &adapter.graph.expr(data.actuals[1]).kind {
                    ExprKind::Call(rhs) if rhs.target == CallTarget::Prim(Prim::AddrOf) => {
                        Some(data.actuals[0])
                    }
                    _ => None,
                }
            }
            _ => None,
        });
        let temp = match addr_move {
            Some(lhs) => match adapter.graph.expr(lhs).kind {
                ExprKind::Sym(SymId::Var(v)) => v,
                ref other => panic!("expected temp on move lhs, found {other:?}"),
            },
            None => panic!("no address-of forwarding found"),
        };
        assert!(adapter.graph.var(temp).flags.has(Flag::MaybeParam));
        let name = adapter.graph.interner.resolve(adapter.graph.var(temp).name);
        assert_eq!(name, "wrap_ref_arg");
    }

    #[test]
    fn constructor_wrapper_sets_fields_before_the_call() {
        let mut fx = Fixture::new();
        let int = fx.wk.t_int;
        let domain = fx.g.types.intern(TypeKind::Domain);
        let array = fx.g.types.intern(TypeKind::Array { elem: int });

        let d_name = fx.g.interner.intern("D");
        let a_name = fx.g.interner.intern("A");
        let record = fx.g.types.intern(TypeKind::Record {
            name: fx.g.interner.intern("R"),
            fields: smallvec::smallvec![(d_name, domain), (a_name, array)],
        });

        // _construct_R(D: domain = <default>, A: [D] int with type expr)
        let ctor = fx.make_fn("_construct_R", &[("D", domain), ("A", array)], record);
        fx.g.func_mut(ctor).flags.set(Flag::DefaultConstructor);
        let this_name = fx.g.interner.intern("this");
        let this_formal = fx.g.new_arg(this_name, record, Intent::Blank);
        fx.g.func_mut(ctor).receiver = Some(SymId::Arg(this_formal));

        let formals = fx.g.func(ctor).formals.clone();
        // D's default: a domain literal variable.
        let dom_default = fx.var("dom_lit", domain);
        let dom_ref = fx.g.sym_expr(SymId::Var(dom_default));
        let dom_block = fx.g.block(vec![dom_ref]);
        fx.g.formal_mut(formals[0]).default_expr = Some(dom_block);
        // A's type expression references D.
        let d_ref = fx.g.sym_expr(SymId::Arg(formals[0]));
        let type_block = fx.g.block(vec![d_ref]);
        fx.g.formal_mut(formals[1]).type_expr = Some(type_block);

        let (_, info, _) = fx.make_call(ctor, &[]);
        let mut actual_to_formal = Vec::new();

        let mut adapter = fx.adapter();
        let wrapper = adapter.supply_defaults(ctor, &info, &mut actual_to_formal);

        let w = adapter.graph.func(wrapper);
        assert!(w.formals.is_empty());
        let receiver = w.receiver.expect("constructor wrapper defines a receiver");
        assert!(matches!(receiver, SymId::Var(_)));

        let body = adapter.graph.block_body(adapter.graph.func(wrapper).body);

        // Receiver definition and field initialization come first.
        assert!(matches!(
            adapter.graph.expr(body[0]).kind,
            ExprKind::Def(sym) if sym == receiver
        ));
        assert!(matches!(
            adapter.graph.expr(body[1]).kind,
            ExprKind::Call(ref data) if data.target == CallTarget::Prim(Prim::InitFields)
        ));

        // Both fields are stored through set_member before the call.
        let set_members: Vec<usize> = body
            .iter()
            .enumerate()
            .filter_map(|(i, &stmt)| match &adapter.graph.expr(stmt).kind {
                ExprKind::Call(data) if data.target == CallTarget::Prim(Prim::SetMember) => Some(i),
                _ => None,
            })
            .collect();
        assert_eq!(set_members.len(), 2);
        let ctor_call_pos = body
            .iter()
            .position(|&stmt| adapter.graph.resolved_fn(stmt) == Some(ctor))
            .or_else(|| {
                body.iter().position(|&stmt| {
                    match &adapter.graph.expr(stmt).kind {
                        ExprKind::Call(data) if data.target == CallTarget::Prim(Prim::Move) => {
                            adapter.graph.resolved_fn(data.actuals[1]) == Some(ctor)
                        }
                        _ => false,
                    }
                })
            })
            .expect("constructor call is in the wrapper body");
        assert!(set_members.iter().all(|&i| i < ctor_call_pos));

        // The defaulted domain was copy-constructed for the field write.
        let has_init_copy = body.iter().any(|&stmt| match &adapter.graph.expr(stmt).kind {
            ExprKind::Call(data) if data.target == CallTarget::Prim(Prim::Move) => {
                match &adapter.graph.expr(data.actuals[1]).kind {
                    ExprKind::Call(rhs) => rhs.target == CallTarget::Name(adapter.wk.init_copy),
                    _ => false,
                }
            }
            _ => false,
        });
        assert!(has_init_copy);
    }

    #[test]
    fn param_instantiated_formal_passes_the_param_value() {
        let mut fx = Fixture::new();
        let int = fx.wk.t_int;
        let callee = fx.make_fn("f", &[("a", int), ("n", int)], fx.wk.t_void);
        let formals = fx.g.func(callee).formals.clone();
        let three = fx.var("three", int);
        fx.g.var_mut(three).immediate = Some(Immediate::Int(3));
        fx.state
            .param_map
            .insert(SymId::Arg(formals[1]), SymId::Var(three));

        let a = fx.var("a", int);
        let (_, info, _) = fx.make_call(callee, &[a]);
        let mut actual_to_formal = vec![formals[0]];

        let mut adapter = fx.adapter();
        let wrapper = adapter.supply_defaults(callee, &info, &mut actual_to_formal);

        let body = adapter.graph.block_body(adapter.graph.func(wrapper).body);
        let call = *body.last().unwrap();
        let actuals = adapter.graph.call_actuals(call);
        assert_eq!(actuals.len(), 2);
        assert!(matches!(
            adapter.graph.expr(actuals[1]).kind,
            ExprKind::Sym(SymId::Var(v)) if v == three
        ));
    }
}
