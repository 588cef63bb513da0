// src/sema/wrappers/mod.rs
//
// Call-site adaptation. After overload resolution picks a callee, the call
// may still not be lowerable: actuals can be named, omitted, implicitly
// convertible, or whole collections passed to scalar formals. This module
// reconciles each of those by rewriting the call in place or synthesizing
// a wrapper procedure for the call to target instead:
//
//   defaults  -- a wrapper that accepts only the supplied actuals and
//                materializes the rest from default values
//   reorder   -- permute actuals into formal order
//   coerce    -- insert explicit conversion steps ahead of the call
//   promote   -- a wrapper family that iterates collection actuals and
//                invokes the callee element-wise
//
// The stages compose only in that order: supplying defaults changes the
// formal set reorder and coerce operate on, and coercion must settle
// element types before promotion is detected.

mod coerce;
mod defaults;
mod promotion;
mod reorder;

use crate::errors::ResolveError;
use crate::frontend::{
    ArgId, Flag, FnId, Intent, ProgramGraph, SymbolMap, WRAPPER_FORWARDED_FLAGS,
};
use crate::sema::caches::ResolutionState;
use crate::sema::call_info::CallInfo;
use crate::sema::host::ResolveHost;
use crate::sema::well_known::WellKnown;
use crate::sema::ResolveConfig;

/// One call-site visit's view of the shared resolution machinery.
pub struct CallAdapter<'a, H: ResolveHost> {
    pub graph: &'a mut ProgramGraph,
    pub host: &'a mut H,
    pub state: &'a mut ResolutionState,
    pub wk: &'a WellKnown,
    pub config: &'a ResolveConfig,
}

impl<H: ResolveHost> CallAdapter<'_, H> {
    /// Reconcile a call site with `callee` and return the function the
    /// call should target instead. `actual_to_formal` maps each actual
    /// position to the formal it supplies; the defaults stage rewrites it
    /// to point at wrapper formals.
    pub fn adapt_call(
        &mut self,
        callee: FnId,
        info: &mut CallInfo,
        actual_to_formal: &mut Vec<ArgId>,
        fast_follower_checks: bool,
    ) -> Result<FnId, ResolveError> {
        let num_actuals = actual_to_formal.len();
        let mut effective = callee;

        if num_actuals < self.graph.func(effective).formals.len() {
            effective = self.supply_defaults(effective, info, actual_to_formal);
        }

        if actual_to_formal.len() > 1 {
            self.reorder_actuals(effective, info, actual_to_formal);
        }

        if !info.actuals.is_empty() {
            self.coerce_actuals(effective, info)?;
        }

        if let Some(substitutions) = self.promoted_substitutions(effective, info) {
            effective = self.promotion_wrap(effective, info, &substitutions, fast_follower_checks);
        }

        Ok(effective)
    }

    /// A fresh wrapper sharing the callee's name, forwarded flags, and
    /// return tag, with empty body and formal list.
    pub(crate) fn build_empty_wrapper(&mut self, callee: FnId, info: &CallInfo) -> FnId {
        let g = &mut *self.graph;
        let callee_flags = g.func(callee).flags;
        let callee_ret_tag = g.func(callee).ret_tag;
        let callee_throws = g.func(callee).throws;
        let name = g.func(callee).name;

        let wrapper = g.new_fn(name);
        {
            let flags = &mut g.func_mut(wrapper).flags;
            flags.set(Flag::Wrapper);
            flags.set(Flag::Invisible);
            flags.set(Flag::Inline);
            for &flag in WRAPPER_FORWARDED_FLAGS {
                if callee_flags.has(flag) {
                    flags.set(flag);
                }
            }
            if callee_flags.has(Flag::CompilerGenerated) {
                flags.set(Flag::WasCompilerGenerated);
            }
            flags.set(Flag::CompilerGenerated);
        }

        // Iterator wrappers get re-tagged by the promotion stage.
        if !callee_flags.has(Flag::IteratorFn) {
            g.func_mut(wrapper).ret_tag = callee_ret_tag;
        }

        let visibility = g.visibility_block(info.call);
        g.func_mut(wrapper).instantiation_point = Some(visibility);

        if callee_throws {
            g.func_mut(wrapper).throws = true;
        }

        wrapper
    }
}

/// Clone a formal for use on a wrapper. Out/inout formals (and formals a
/// previous wrapper already marked) keep the written marker so the wrapper
/// can store back through them; ref intents survive, everything else
/// flattens to blank and the wrapper body re-applies the semantics.
pub(crate) fn copy_formal_for_wrapper(g: &mut ProgramGraph, formal: ArgId) -> ArgId {
    let mut map = SymbolMap::default();
    let copy = g.copy_formal(formal, &mut map);

    let src_intent = g.formal(formal).intent;
    let src_written = g.formal(formal).flags.has(Flag::WrittenFormal);

    if matches!(src_intent, Intent::Out | Intent::Inout) || src_written {
        g.formal_mut(copy).flags.set(Flag::WrittenFormal);
    }

    if !src_intent.is_ref_like() {
        g.formal_mut(copy).intent = Intent::Blank;
    }

    copy
}

/// Whether the defaults wrapper must specialize for a default constructor:
/// define the receiver locally and write fields through it as arguments
/// materialize.
pub(crate) fn specialize_default_constructor(g: &ProgramGraph, func: FnId) -> bool {
    if !g.func(func).flags.has(Flag::DefaultConstructor) {
        return false;
    }
    match g.func(func).receiver {
        Some(receiver) => !g.types.is_ref(g.sym_type(receiver)),
        None => false,
    }
}

/// Line a function was defined at, for diagnostics.
pub(crate) fn fn_line(g: &ProgramGraph, func: FnId) -> u32 {
    g.func(func)
        .def_point
        .map(|def| g.expr(def).line)
        .unwrap_or(0)
}
