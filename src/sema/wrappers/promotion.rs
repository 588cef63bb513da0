// src/sema/wrappers/promotion.rs
//
// Scalar-to-collection promotion. When an actual is a collection whose
// element type fits a scalar formal, the call retargets a wrapper that
// iterates the collection and invokes the callee element-wise. A promoted
// callee that returns a value becomes a cooperating iterator family:
//
//   serial   -- the wrapper itself, a for-loop yielding per-element results
//   leader   -- partitions the promoted iterands for parallel execution
//   follower -- produces elements for one partition, with an opt-in fast
//               path taken when every iterand declares compatibility
//   probes   -- static/dynamic checks (with and without a lead iterand)
//               that decide whether the fast path applies
//
// The family is generated from one shared signature so the shapes agree;
// the serial body is filled in last, after the leader and follower clone
// the still-empty template.

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::frontend::build::{build_for_loop, build_forall_loop};
use crate::frontend::{
    ArgId, ExprId, ExprKind, Flag, FnId, Intent, Name, Prim, RetTag, SymId, SymbolMap, TypeId,
    VarId,
};
use crate::sema::call_info::CallInfo;
use crate::sema::host::ResolveHost;

use super::{copy_formal_for_wrapper, CallAdapter};

impl<H: ResolveHost> CallAdapter<'_, H> {
    /// The promoted positions of this call: each formal whose actual is a
    /// collection dispatching element-wise, with the concrete actual type
    /// substituted there. `None` when the call does not promote. The
    /// assignment operator and type constructors never promote.
    pub(crate) fn promoted_substitutions(
        &mut self,
        callee: FnId,
        info: &CallInfo,
    ) -> Option<Vec<(ArgId, TypeId)>> {
        if self.graph.func(callee).name == self.wk.assign
            || self.graph.func(callee).flags.has(Flag::TypeConstructor)
        {
            return None;
        }

        let formals = self.graph.func(callee).formals.clone();
        let mut substitutions = Vec::new();

        for (position, &formal) in formals.iter().enumerate() {
            let actual_sym = info.actuals[position];
            let mut actual_type = self.graph.sym_type(actual_sym);
            if self.graph.types.is_record_wrapped(actual_type) {
                actual_type = self.graph.types.make_ref_type(actual_type);
            }

            let formal_type = self.graph.formal(formal).ty;
            let mut promotes = false;
            if self.host.can_dispatch(
                self.graph,
                actual_type,
                actual_sym,
                formal_type,
                callee,
                &mut promotes,
            ) && promotes
            {
                substitutions.push((formal, actual_type));
            }
        }

        if substitutions.is_empty() {
            None
        } else {
            Some(substitutions)
        }
    }

    /// Find or build the promotion wrapper for this call shape.
    pub(crate) fn promotion_wrap(
        &mut self,
        callee: FnId,
        info: &CallInfo,
        substitutions: &[(ArgId, TypeId)],
        fast_follower_checks: bool,
    ) -> FnId {
        if self.config.report_promotion {
            warn!(call = %info.display(self.graph, callee), "promotion");
        }

        if let Some(wrapper) = self.state.cached_promotion_wrapper(callee, substitutions) {
            debug!(
                callee = %self.graph.interner.resolve(self.graph.func(callee).name),
                "promotion wrapper cache hit"
            );
            self.host.resolve_formals(self.graph, wrapper);
            return wrapper;
        }

        let wrapper = self.build_promotion_wrapper(callee, info, substitutions, fast_follower_checks);
        self.state.cache_promotion_wrapper(callee, substitutions, wrapper);
        self.host.resolve_formals(self.graph, wrapper);
        wrapper
    }

    fn build_promotion_wrapper(
        &mut self,
        callee: FnId,
        info: &CallInfo,
        substitutions: &[(ArgId, TypeId)],
        fast_follower_checks: bool,
    ) -> FnId {
        self.graph.set_line(self.graph.expr(info.call).line);

        let wrapper = self.build_empty_wrapper(callee, info);
        {
            let flags = &mut self.graph.func_mut(wrapper).flags;
            flags.set(Flag::PromotionWrapper);
            // Promoting a default constructor does not yield a constructor.
            flags.clear(Flag::DefaultConstructor);
        }
        let cname = {
            let base = self.graph.interner.resolve(self.graph.func(callee).cname);
            format!("_promotion_wrap_{base}")
        };
        let cname = self.graph.interner.intern(&cname);
        self.graph.func_mut(wrapper).cname = cname;

        let mut requires_promotion: FxHashSet<ArgId> = FxHashSet::default();
        let indices_call = self.graph.call_named(self.wk.build_tuple);
        let iterator_call = self.graph.call_named(self.wk.build_tuple);
        let actual_call = self.graph.call_fn(callee);

        for (position, formal) in self.graph.func(callee).formals.clone().into_iter().enumerate() {
            let new_formal = copy_formal_for_wrapper(self.graph, formal);

            if let Some(&value) = self.state.param_map.get(&SymId::Arg(formal)) {
                self.state.param_map.insert(SymId::Arg(new_formal), value);
            }

            if self.graph.func(callee).receiver == Some(SymId::Arg(formal)) {
                self.graph.func_mut(wrapper).receiver = Some(SymId::Arg(new_formal));
            }

            let substitution = substitutions
                .iter()
                .find(|(original, _)| *original == formal)
                .map(|&(_, ty)| ty);

            if let Some(concrete) = substitution {
                requires_promotion.insert(new_formal);
                self.graph.formal_mut(new_formal).ty = concrete;
                self.graph.add_formal(wrapper, new_formal);

                let formal_ref = self.graph.sym_expr(SymId::Arg(new_formal));
                self.graph.add_actual(iterator_call, formal_ref);

                // The index name is left unresolved here; the loop builder
                // defines it and the binding pass links the call's copy.
                let index_name = self
                    .graph
                    .interner
                    .intern(&format!("p_i_{}", position + 1));
                let index_ref = self.graph.unresolved(index_name);
                self.graph.add_actual(indices_call, index_ref);
                let index_ref = self.graph.unresolved(index_name);
                self.graph.add_actual(actual_call, index_ref);
            } else {
                self.graph.add_formal(wrapper, new_formal);
                let formal_ref = self.graph.sym_expr(SymId::Arg(new_formal));
                self.graph.add_actual(actual_call, formal_ref);
            }
        }

        // A single promoted position iterates directly, not zippered.
        let mut zippered = true;
        let indices = if self.graph.call_actuals(indices_call).len() == 1 {
            self.graph.remove(self.graph.call_actuals(indices_call)[0])
        } else {
            indices_call
        };
        let iterator = if self.graph.call_actuals(iterator_call).len() == 1 {
            zippered = false;
            self.graph.remove(self.graph.call_actuals(iterator_call)[0])
        } else {
            iterator_call
        };

        if self.graph.func(callee).ret_type == self.wk.t_void {
            let loop_body = self.graph.block(vec![actual_call]);
            let forall = build_forall_loop(self.graph, indices, iterator, loop_body, zippered);
            let outer = self.graph.block(vec![forall]);
            let wrapper_body = self.graph.func(wrapper).body;
            self.graph.push_stmt(wrapper_body, outer);
        } else {
            {
                let flags = &mut self.graph.func_mut(wrapper).flags;
                flags.set(Flag::IteratorFn);
                flags.clear(Flag::Inline);
            }

            self.build_leader(wrapper, info, iterator, zippered);
            self.build_follower(callee, wrapper, info, indices, iterator, actual_call, zippered);

            if self.config.fast_follower_checks && fast_follower_checks {
                self.build_fast_follower_check(true, false, info, wrapper, &requires_promotion);
                self.build_fast_follower_check(true, true, info, wrapper, &requires_promotion);
                self.build_fast_follower_check(false, false, info, wrapper, &requires_promotion);
                self.build_fast_follower_check(false, true, info, wrapper, &requires_promotion);
            }

            // Fill in the serial body last; the leader and follower cloned
            // the signature while it was still empty.
            let yield_temp = self.graph.new_temp("p_yield");
            self.graph.var_mut(yield_temp).flags.set(Flag::ExprTemp);
            let def = self.graph.def_expr(SymId::Var(yield_temp));
            let temp_ref = self.graph.sym_expr(SymId::Var(yield_temp));
            let move_stmt = self.graph.call_prim(Prim::Move, &[temp_ref, actual_call]);
            let temp_ref = self.graph.sym_expr(SymId::Var(yield_temp));
            let yield_stmt = self.graph.call_prim(Prim::Yield, &[temp_ref]);
            let loop_body = self.graph.block(vec![def, move_stmt, yield_stmt]);

            let serial = build_for_loop(self.graph, indices, iterator, loop_body, zippered);
            let outer = self.graph.block(vec![serial]);
            let wrapper_body = self.graph.func(wrapper).body;
            self.graph.push_stmt(wrapper_body, outer);
        }

        let def = self.graph.def_expr(SymId::Fn(wrapper));
        match self.graph.func(callee).def_point {
            Some(callee_def) => self.graph.insert_before(callee_def, def),
            None => {
                let program_block = self.graph.program_block;
                self.graph.push_stmt(program_block, def);
            }
        }
        self.graph.func_mut(wrapper).def_point = Some(def);

        self.host.normalize(self.graph, wrapper);
        self.fix_unresolved_indices(wrapper, callee);

        wrapper
    }

    /// Clone the wrapper into the leader iterator: same signature plus the
    /// leader tag, yielding indices of the leader-transformed iterands.
    fn build_leader(&mut self, wrapper: FnId, info: &CallInfo, iterator: ExprId, zippered: bool) {
        let mut leader_map = SymbolMap::default();
        let leader = self.graph.copy_fn(wrapper, &mut leader_map);
        assert!(
            !self.graph.func(leader).flags.has(Flag::Resolved),
            "leader cloned from an already-resolved wrapper"
        );
        self.state.iterator_leader.insert(wrapper, leader);

        // Indices are unused in the leader; start from a fresh body.
        let body = self.graph.new_expr(ExprKind::Block { body: Vec::new() });
        self.graph.func_mut(leader).body = body;

        self.propagate_params(&leader_map);

        self.graph.func_mut(leader).flags.set(Flag::InlineIterator);

        let tag = self
            .graph
            .new_arg(self.wk.tag_name, self.wk.t_leader_tag, Intent::Param);
        self.graph.add_formal(leader, tag);
        let where_clause = self.tag_constraint(tag, self.wk.leader_tag);
        self.graph.func_mut(leader).where_clause = Some(where_clause);

        let leader_index = self.graph.new_temp("p_leaderIndex");
        let leader_iterator = self.graph.new_temp("p_leaderIterator");
        self.graph
            .var_mut(leader_iterator)
            .flags
            .set(Flag::ExprTemp);

        let def = self.graph.def_expr(SymId::Var(leader_iterator));
        self.graph.push_stmt(body, def);

        let to_leader = if zippered {
            self.wk.to_leader_zip
        } else {
            self.wk.to_leader
        };
        let to_leader_call = self.graph.call_named(to_leader);
        let iterator_copy = self.graph.copy_expr(iterator, &mut leader_map);
        self.graph.add_actual(to_leader_call, iterator_copy);
        let iterator_ref = self.graph.sym_expr(SymId::Var(leader_iterator));
        let move_stmt = self
            .graph
            .call_prim(Prim::Move, &[iterator_ref, to_leader_call]);
        self.graph.push_stmt(body, move_stmt);

        let index_ref = self.graph.sym_expr(SymId::Var(leader_index));
        let yield_stmt = self.graph.call_prim(Prim::Yield, &[index_ref]);
        let loop_body = self.graph.block(vec![yield_stmt]);
        let index_ref = self.graph.sym_expr(SymId::Var(leader_index));
        let iterator_ref = self.graph.sym_expr(SymId::Var(leader_iterator));
        let leader_loop = build_for_loop(self.graph, index_ref, iterator_ref, loop_body, zippered);
        self.graph.push_stmt(body, leader_loop);

        let program_block = self.graph.program_block;
        let def = self.graph.def_expr(SymId::Fn(leader));
        self.graph.push_stmt(program_block, def);
        self.graph.func_mut(leader).def_point = Some(def);

        let index_def = self.graph.def_expr(SymId::Var(leader_index));
        self.graph.insert_at_head(loop_body, index_def);

        self.host.normalize(self.graph, leader);

        self.graph.func_mut(leader).flags.set(Flag::Generic);
        let visibility = self.graph.visibility_block(info.call);
        self.graph.func_mut(leader).instantiation_point = Some(visibility);
    }

    /// Clone the wrapper into the follower iterator: tag, followThis, and
    /// a param fast flag selecting the fast-follower transform.
    #[allow(clippy::too_many_arguments)]
    fn build_follower(
        &mut self,
        callee: FnId,
        wrapper: FnId,
        info: &CallInfo,
        indices: ExprId,
        iterator: ExprId,
        actual_call: ExprId,
        zippered: bool,
    ) {
        let mut follower_map = SymbolMap::default();
        let follower = self.graph.copy_fn(wrapper, &mut follower_map);
        assert!(
            !self.graph.func(follower).flags.has(Flag::Resolved),
            "follower cloned from an already-resolved wrapper"
        );
        self.state.iterator_follower.insert(wrapper, follower);

        self.propagate_params(&follower_map);

        let tag = self
            .graph
            .new_arg(self.wk.tag_name, self.wk.t_follower_tag, Intent::Param);
        self.graph.add_formal(follower, tag);

        let follow_this = self
            .graph
            .new_arg(self.wk.follow_this_name, self.wk.t_any, Intent::Blank);
        self.graph.add_formal(follower, follow_this);

        let fast = self
            .graph
            .new_arg(self.wk.fast_name, self.wk.t_bool, Intent::Param);
        let false_ref = self.graph.sym_expr(SymId::Var(self.wk.false_sym));
        let false_block = self.graph.block(vec![false_ref]);
        self.graph.formal_mut(fast).default_expr = Some(false_block);
        self.graph.add_formal(follower, fast);

        let where_clause = self.tag_constraint(tag, self.wk.follower_tag);
        self.graph.func_mut(follower).where_clause = Some(where_clause);

        let body = self.graph.func(follower).body;
        let follower_iterator = self.graph.new_temp("p_followerIterator");
        self.graph
            .var_mut(follower_iterator)
            .flags
            .set(Flag::ExprTemp);
        let def = self.graph.def_expr(SymId::Var(follower_iterator));
        self.graph.push_stmt(body, def);

        let (fast_name, slow_name) = if zippered {
            (self.wk.to_fast_follower_zip, self.wk.to_follower_zip)
        } else {
            (self.wk.to_fast_follower, self.wk.to_follower)
        };
        let fast_move = self.follower_transform(
            fast_name,
            iterator,
            &mut follower_map,
            follow_this,
            follower_iterator,
        );
        let slow_move = self.follower_transform(
            slow_name,
            iterator,
            &mut follower_map,
            follow_this,
            follower_iterator,
        );
        let fast_ref = self.graph.sym_expr(SymId::Arg(fast));
        let cond = self.graph.new_expr(ExprKind::Cond {
            cond: fast_ref,
            then_stmt: fast_move,
            else_stmt: Some(slow_move),
        });
        self.graph.expr_mut(fast_ref).parent = Some(cond);
        self.graph.expr_mut(fast_move).parent = Some(cond);
        self.graph.expr_mut(slow_move).parent = Some(cond);
        self.graph.push_stmt(body, cond);

        let yield_temp = self.graph.new_temp("p_yield");
        self.graph.var_mut(yield_temp).flags.set(Flag::ExprTemp);
        let def = self.graph.def_expr(SymId::Var(yield_temp));
        let call_copy = self.graph.copy_expr(actual_call, &mut follower_map);
        let temp_ref = self.graph.sym_expr(SymId::Var(yield_temp));
        let move_stmt = self.graph.call_prim(Prim::Move, &[temp_ref, call_copy]);
        let temp_ref = self.graph.sym_expr(SymId::Var(yield_temp));
        let yield_stmt = self.graph.call_prim(Prim::Yield, &[temp_ref]);
        let loop_body = self.graph.block(vec![def, move_stmt, yield_stmt]);

        let indices_copy = self.graph.copy_expr(indices, &mut follower_map);
        let iterator_ref = self.graph.sym_expr(SymId::Var(follower_iterator));
        let follower_loop =
            build_for_loop(self.graph, indices_copy, iterator_ref, loop_body, zippered);
        self.graph.push_stmt(body, follower_loop);

        let program_block = self.graph.program_block;
        let def = self.graph.def_expr(SymId::Fn(follower));
        self.graph.push_stmt(program_block, def);
        self.graph.func_mut(follower).def_point = Some(def);

        self.host.normalize(self.graph, follower);

        self.graph.func_mut(follower).flags.set(Flag::Generic);
        let visibility = self.graph.visibility_block(info.call);
        self.graph.func_mut(follower).instantiation_point = Some(visibility);

        self.fix_unresolved_indices(follower, callee);
    }

    fn follower_transform(
        &mut self,
        helper: Name,
        iterator: ExprId,
        follower_map: &mut SymbolMap,
        follow_this: ArgId,
        follower_iterator: VarId,
    ) -> ExprId {
        let call = self.graph.call_named(helper);
        let iterator_copy = self.graph.copy_expr(iterator, follower_map);
        self.graph.add_actual(call, iterator_copy);
        let follow_ref = self.graph.sym_expr(SymId::Arg(follow_this));
        self.graph.add_actual(call, follow_ref);
        let iterator_ref = self.graph.sym_expr(SymId::Var(follower_iterator));
        self.graph.call_prim(Prim::Move, &[iterator_ref, call])
    }

    /// `where tag == <sentinel>` constraining an iterator clone to its role.
    fn tag_constraint(&mut self, tag: ArgId, sentinel: VarId) -> ExprId {
        let compare = self.graph.call_named(self.wk.equals);
        let tag_ref = self.graph.sym_expr(SymId::Arg(tag));
        self.graph.add_actual(compare, tag_ref);
        let sentinel_ref = self.graph.sym_expr(SymId::Var(sentinel));
        self.graph.add_actual(compare, sentinel_ref);
        self.graph.block(vec![compare])
    }

    fn propagate_params(&mut self, clone_map: &SymbolMap) {
        let entries: Vec<(SymId, SymId)> = clone_map
            .iter()
            .map(|(&original, &clone)| (original, clone))
            .collect();
        for (original, clone) in entries {
            if let Some(&value) = self.state.param_map.get(&original) {
                self.state.param_map.insert(clone, value);
            }
        }
    }

    /// Bind the unresolved index names inside each copied call to the
    /// index definitions of the loop enclosing that call.
    fn fix_unresolved_indices(&mut self, wrapper: FnId, callee: FnId) {
        let body = self.graph.func(wrapper).body;
        for call in self.graph.collect_calls(body) {
            if self.graph.resolved_fn(call) != Some(callee) {
                continue;
            }
            for actual in self.graph.call_actuals(call) {
                let name = match self.graph.expr(actual).kind {
                    ExprKind::Unresolved(name) => name,
                    _ => continue,
                };

                let stmt = self.graph.enclosing_stmt(call);
                let call_block = self
                    .graph
                    .expr(stmt)
                    .parent
                    .expect("promoted call statement is detached");
                let enclosing_loop = self
                    .graph
                    .expr(call_block)
                    .parent
                    .expect("promoted call's block is not inside a loop");
                assert!(
                    matches!(self.graph.expr(enclosing_loop).kind, ExprKind::Loop { .. }),
                    "promoted call's block is not a loop body"
                );

                let mut bound = false;
                for def in self.graph.collect_defs(enclosing_loop) {
                    let sym = match self.graph.expr(def).kind {
                        ExprKind::Def(sym) => sym,
                        _ => continue,
                    };
                    if !matches!(sym, SymId::Var(_)) {
                        continue;
                    }
                    if self.graph.sym_name(sym) == name {
                        let replacement = self.graph.sym_expr(sym);
                        self.graph.replace(actual, replacement);
                        bound = true;
                        break;
                    }
                }
                assert!(
                    bound,
                    "promoted index '{}' has no binding in its loop",
                    self.graph.interner.resolve(name)
                );
            }
        }
    }

    /// One fast-follower probe: reads the promoted fields out of the
    /// not-yet-lowered iterator record, tuples them, and forwards to the
    /// zip-form check. The where clause pins the probe to records of this
    /// exact call's type.
    fn build_fast_follower_check(
        &mut self,
        is_static: bool,
        add_lead: bool,
        info: &CallInfo,
        wrapper: FnId,
        requires_promotion: &FxHashSet<ArgId>,
    ) {
        let (fn_name, forward_name) = if is_static {
            (
                self.wk.static_fast_follow_check,
                self.wk.static_fast_follow_check_zip,
            )
        } else {
            (
                self.wk.dynamic_fast_follow_check,
                self.wk.dynamic_fast_follow_check_zip,
            )
        };

        let check = self.graph.new_fn(fn_name);
        self.graph.func_mut(check).ret_tag = if is_static {
            RetTag::Param
        } else {
            RetTag::Value
        };

        let record_arg = self
            .graph
            .new_arg(self.wk.x_name, self.wk.t_iterator_record, Intent::Blank);
        self.graph.add_formal(check, record_arg);

        let lead = self
            .graph
            .new_arg(self.wk.lead_name, self.wk.t_any, Intent::Blank);
        if add_lead {
            self.graph.add_formal(check, lead);
        }

        let body = self.graph.func(check).body;
        let build_tuple = self.graph.call_named(self.wk.build_tuple_allow_ref);

        for formal in self.graph.func(wrapper).formals.clone() {
            if !requires_promotion.contains(&formal) {
                continue;
            }
            let field = self
                .graph
                .new_var(self.graph.formal(formal).name, self.graph.formal(formal).ty);
            let def = self.graph.def_expr(SymId::Var(field));
            self.graph.push_stmt(body, def);

            let record_ref = self.graph.sym_expr(SymId::Arg(record_arg));
            let formal_ref = self.graph.sym_expr(SymId::Arg(formal));
            let field_value = self
                .graph
                .call_prim(Prim::IterRecFieldValueByFormal, &[record_ref, formal_ref]);
            let field_ref = self.graph.sym_expr(SymId::Var(field));
            let move_stmt = self.graph.call_prim(Prim::Move, &[field_ref, field_value]);
            self.graph.push_stmt(body, move_stmt);

            let field_ref = self.graph.sym_expr(SymId::Var(field));
            self.graph.add_actual(build_tuple, field_ref);
        }

        let record_ref = self.graph.sym_expr(SymId::Arg(record_arg));
        let record_type = self.graph.call_prim(Prim::Typeof, &[record_ref]);
        let mut scratch = SymbolMap::default();
        let call_copy = self.graph.copy_expr(info.call, &mut scratch);
        let call_type = self.graph.call_prim(Prim::Typeof, &[call_copy]);
        let compare = self.graph.call_named(self.wk.equals);
        self.graph.add_actual(compare, record_type);
        self.graph.add_actual(compare, call_type);
        let where_clause = self.graph.block(vec![compare]);
        self.graph.func_mut(check).where_clause = Some(where_clause);

        let tuple_temp = self.graph.new_temp("p_tup");
        let def = self.graph.def_expr(SymId::Var(tuple_temp));
        self.graph.push_stmt(body, def);
        let tuple_ref = self.graph.sym_expr(SymId::Var(tuple_temp));
        let move_stmt = self.graph.call_prim(Prim::Move, &[tuple_ref, build_tuple]);
        self.graph.push_stmt(body, move_stmt);

        let result_temp = self.graph.new_temp("p_ret");
        {
            let flags = &mut self.graph.var_mut(result_temp).flags;
            flags.set(Flag::ExprTemp);
            flags.set(Flag::MaybeParam);
        }
        let def = self.graph.def_expr(SymId::Var(result_temp));
        self.graph.push_stmt(body, def);

        let forward = self.graph.call_named(forward_name);
        let tuple_ref = self.graph.sym_expr(SymId::Var(tuple_temp));
        self.graph.add_actual(forward, tuple_ref);
        if add_lead {
            let lead_ref = self.graph.sym_expr(SymId::Arg(lead));
            self.graph.add_actual(forward, lead_ref);
        }
        let result_ref = self.graph.sym_expr(SymId::Var(result_temp));
        let move_stmt = self.graph.call_prim(Prim::Move, &[result_ref, forward]);
        self.graph.push_stmt(body, move_stmt);
        let result_ref = self.graph.sym_expr(SymId::Var(result_temp));
        let ret = self.graph.call_prim(Prim::Return, &[result_ref]);
        self.graph.push_stmt(body, ret);

        let program_block = self.graph.program_block;
        let def = self.graph.def_expr(SymId::Fn(check));
        self.graph.push_stmt(program_block, def);
        self.graph.func_mut(check).def_point = Some(def);

        self.host.normalize(self.graph, check);

        self.graph.func_mut(check).flags.set(Flag::Generic);
        let visibility = self.graph.visibility_block(info.call);
        self.graph.func_mut(check).instantiation_point = Some(visibility);
    }
}
