// src/sema/host.rs
//
// Interface to the rest of the resolution pass. The adaptation layer asks
// the host for dispatch/coercion judgements and intent resolution, and
// hands freshly built wrappers back to it for normalization and formal
// resolution. The layer itself never implements these.

use crate::frontend::{ArgId, ExprId, FnId, Intent, ProgramGraph, SymId, TypeId};

pub trait ResolveHost {
    /// Whether a value of `actual` coerces implicitly to `formal` at a call
    /// to `callee`.
    fn can_coerce(
        &self,
        g: &ProgramGraph,
        actual: TypeId,
        actual_sym: SymId,
        formal: TypeId,
        callee: FnId,
    ) -> bool;

    /// Whether `actual` can be passed to `formal`, possibly by promoting a
    /// collection element-wise; `promotes` reports the latter.
    fn can_dispatch(
        &self,
        g: &ProgramGraph,
        actual: TypeId,
        actual_sym: SymId,
        formal: TypeId,
        callee: FnId,
        promotes: &mut bool,
    ) -> bool;

    /// Whether `parent` is an ancestor of `ty` in the dispatch hierarchy.
    fn is_dispatch_parent(&self, g: &ProgramGraph, ty: TypeId, parent: TypeId) -> bool;

    /// The concrete intent a blank-intent formal of type `ty` resolves to.
    fn blank_intent_for_type(&self, g: &ProgramGraph, ty: TypeId) -> Intent;

    /// The concrete intent of `formal` after abstract intents resolve.
    fn concrete_intent_for_arg(&self, g: &ProgramGraph, formal: ArgId) -> Intent;

    /// Canonicalize a freshly generated function body.
    fn normalize(&mut self, g: &mut ProgramGraph, func: FnId);

    /// Resolve the formal types of a generated function.
    fn resolve_formals(&mut self, g: &mut ProgramGraph, func: FnId);

    /// Resolve a generated call in place.
    fn resolve_call(&mut self, g: &mut ProgramGraph, call: ExprId);

    /// Resolve a call and its callee; with `check_only`, failure to find a
    /// callee returns `None` instead of reporting.
    fn resolve_call_and_callee(
        &mut self,
        g: &mut ProgramGraph,
        call: ExprId,
        check_only: bool,
    ) -> Option<FnId>;
}
