// src/sema/test_support.rs
//
// Shared fixtures for the wrapper tests: a small program graph, a stub
// resolution host with just enough judgement to exercise every stage, and
// builders for callees and call sites.

use crate::frontend::{
    ArgId, CallTarget, ExprId, ExprKind, Flag, FnId, Immediate, Intent, Prim, ProgramGraph,
    SymId, TypeId, TypeKind, VarId,
};
use crate::sema::caches::ResolutionState;
use crate::sema::call_info::CallInfo;
use crate::sema::host::ResolveHost;
use crate::sema::well_known::WellKnown;
use crate::sema::wrappers::CallAdapter;
use crate::sema::ResolveConfig;

pub(crate) struct Fixture {
    pub g: ProgramGraph,
    pub wk: WellKnown,
    pub state: ResolutionState,
    pub host: StubHost,
    pub config: ResolveConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let mut g = ProgramGraph::new();
        let wk = WellKnown::populate(&mut g);
        Fixture {
            g,
            wk,
            state: ResolutionState::new(),
            host: StubHost::default(),
            config: ResolveConfig::default(),
        }
    }

    pub fn adapter(&mut self) -> CallAdapter<'_, StubHost> {
        CallAdapter {
            graph: &mut self.g,
            host: &mut self.host,
            state: &mut self.state,
            wk: &self.wk,
            config: &self.config,
        }
    }

    /// A resolved function with blank-intent formals, defined at the top
    /// level.
    pub fn make_fn(&mut self, name: &str, formals: &[(&str, TypeId)], ret: TypeId) -> FnId {
        let fn_name = self.g.interner.intern(name);
        let func = self.g.new_fn(fn_name);
        for &(formal_name, ty) in formals {
            let formal_name = self.g.interner.intern(formal_name);
            let formal = self.g.new_arg(formal_name, ty, Intent::Blank);
            self.g.add_formal(func, formal);
        }
        self.g.func_mut(func).ret_type = ret;
        self.g.func_mut(func).flags.set(Flag::Resolved);

        let def = self.g.def_expr(SymId::Fn(func));
        let program_block = self.g.program_block;
        self.g.push_stmt(program_block, def);
        self.g.func_mut(func).def_point = Some(def);
        func
    }

    pub fn var(&mut self, name: &str, ty: TypeId) -> VarId {
        let name = self.g.interner.intern(name);
        self.g.new_var(name, ty)
    }

    /// Give the formal at `position` an integer-literal default.
    pub fn set_int_default(&mut self, func: FnId, position: usize, value: i64) {
        let formal = self.g.func(func).formals[position];
        let lit = self.var(&format!("_lit_{value}"), self.wk.t_int);
        self.g.var_mut(lit).immediate = Some(Immediate::Int(value));
        let lit_ref = self.g.sym_expr(SymId::Var(lit));
        let block = self.g.block(vec![lit_ref]);
        self.g.formal_mut(formal).default_expr = Some(block);
    }

    /// A call statement `callee(actuals...)` inside a fresh caller body.
    pub fn make_call(&mut self, callee: FnId, actuals: &[VarId]) -> (ExprId, CallInfo, FnId) {
        let caller_name = self.g.interner.intern("caller");
        let caller = self.g.new_fn(caller_name);
        let call = self.g.call_fn(callee);
        for &actual in actuals {
            let actual_ref = self.g.sym_expr(SymId::Var(actual));
            self.g.add_actual(call, actual_ref);
        }
        let body = self.g.func(caller).body;
        self.g.push_stmt(body, call);
        let info = CallInfo::from_call(&self.g, call);
        (call, info, caller)
    }
}

/// Minimal stand-in for the surrounding resolution pass. Coercion accepts
/// widening through synchronization and reference wrappers; dispatch
/// promotes array element types; generated moves get their destination
/// typed so chained coercions observe the converted type.
#[derive(Default)]
pub(crate) struct StubHost {
    /// Overload returned for generated cast calls.
    pub cast_fn: Option<FnId>,
}

fn strip_wrappers(g: &ProgramGraph, mut ty: TypeId) -> TypeId {
    loop {
        ty = match *g.types.kind(ty) {
            TypeKind::Ref(inner) | TypeKind::Sync(inner) | TypeKind::Single(inner) => inner,
            _ => return ty,
        };
    }
}

fn widens(g: &ProgramGraph, from: TypeId, to: TypeId) -> bool {
    matches!(
        (g.types.kind(from), g.types.kind(to)),
        (TypeKind::Int, TypeKind::Real)
            | (TypeKind::Bool, TypeKind::Int)
            | (TypeKind::Str, TypeKind::CStr)
    )
}

fn rhs_type(g: &mut ProgramGraph, expr: ExprId) -> TypeId {
    let kind = g.expr(expr).kind.clone();
    match kind {
        ExprKind::Sym(sym) => g.sym_type(sym),
        ExprKind::Call(data) => match data.target {
            CallTarget::Prim(Prim::Deref) => {
                let inner = rhs_type(g, data.actuals[0]);
                g.types.value_type(inner)
            }
            CallTarget::Name(name) => {
                let name = g.interner.resolve(name).to_string();
                match name.as_str() {
                    "readFE" | "readFF" => {
                        let receiver = rhs_type(g, data.actuals[1]);
                        let value = g.types.value_type(receiver);
                        match *g.types.kind(value) {
                            TypeKind::Sync(inner) | TypeKind::Single(inner) => {
                                g.types.make_ref_type(inner)
                            }
                            _ => g.t_unknown,
                        }
                    }
                    "_cast" => rhs_type(g, data.actuals[0]),
                    _ => g.t_unknown,
                }
            }
            _ => g.t_unknown,
        },
        _ => g.t_unknown,
    }
}

impl ResolveHost for StubHost {
    fn can_coerce(
        &self,
        g: &ProgramGraph,
        actual: TypeId,
        _actual_sym: SymId,
        formal: TypeId,
        _callee: FnId,
    ) -> bool {
        if actual == formal {
            return false;
        }
        let base = strip_wrappers(g, actual);
        base == formal || widens(g, base, formal)
    }

    fn can_dispatch(
        &self,
        g: &ProgramGraph,
        actual: TypeId,
        actual_sym: SymId,
        formal: TypeId,
        callee: FnId,
        promotes: &mut bool,
    ) -> bool {
        if actual == formal {
            return true;
        }
        if self.can_coerce(g, actual, actual_sym, formal, callee) {
            return true;
        }
        if self.is_dispatch_parent(g, actual, formal) {
            return true;
        }
        let base = g.types.value_type(actual);
        if let TypeKind::Array { elem } = *g.types.kind(base) {
            if elem == formal || widens(g, elem, formal) || self.is_dispatch_parent(g, elem, formal)
            {
                *promotes = true;
                return true;
            }
        }
        false
    }

    fn is_dispatch_parent(&self, g: &ProgramGraph, ty: TypeId, parent: TypeId) -> bool {
        let mut current = g.types.class_parent(ty);
        while let Some(ancestor) = current {
            if ancestor == parent {
                return true;
            }
            current = g.types.class_parent(ancestor);
        }
        false
    }

    fn blank_intent_for_type(&self, g: &ProgramGraph, ty: TypeId) -> Intent {
        if g.types.is_record_wrapped(ty) {
            Intent::Ref
        } else {
            Intent::Const
        }
    }

    fn concrete_intent_for_arg(&self, g: &ProgramGraph, formal: ArgId) -> Intent {
        match g.formal(formal).intent {
            Intent::Blank | Intent::Const => {
                self.blank_intent_for_type(g, g.formal(formal).ty)
            }
            other => other,
        }
    }

    fn normalize(&mut self, _g: &mut ProgramGraph, _func: FnId) {}

    fn resolve_formals(&mut self, _g: &mut ProgramGraph, _func: FnId) {}

    fn resolve_call(&mut self, g: &mut ProgramGraph, call: ExprId) {
        let (lhs, rhs) = match &g.expr(call).kind {
            ExprKind::Call(data)
                if data.target == CallTarget::Prim(Prim::Move) && data.actuals.len() == 2 =>
            {
                (data.actuals[0], data.actuals[1])
            }
            _ => return,
        };
        let destination = match g.expr(lhs).kind {
            ExprKind::Sym(SymId::Var(v)) => v,
            _ => return,
        };
        let ty = rhs_type(g, rhs);
        if ty != g.t_unknown {
            g.var_mut(destination).ty = ty;
        }
    }

    fn resolve_call_and_callee(
        &mut self,
        g: &mut ProgramGraph,
        call: ExprId,
        _check_only: bool,
    ) -> Option<FnId> {
        match g.call_target(call) {
            CallTarget::Name(name) if g.interner.resolve(name) == "_cast" => self.cast_fn,
            _ => None,
        }
    }
}
