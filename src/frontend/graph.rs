// src/frontend/graph.rs
//
// The shared mutable program graph: symbol arenas, the expression arena,
// and the surgery the resolution pass performs on both. All mutation goes
// through this type so parent links stay consistent.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::frontend::ast::{CallData, CallTarget, Expr, ExprId, ExprKind, Prim};
use crate::frontend::flags::{Flag, FlagSet};
use crate::frontend::intern::{Interner, Name};
use crate::frontend::symbol::{
    ArgId, ArgSymbol, FnId, FnSymbol, Immediate, Intent, RetTag, SymId, VarId, VarSymbol,
};
use crate::frontend::types::{TypeArena, TypeId, TypeKind};

/// Partial mapping from original symbols to replacements, threaded through
/// deep copies and applied by `substitute_symbols`.
pub type SymbolMap = FxHashMap<SymId, SymId>;

pub struct ProgramGraph {
    pub interner: Interner,
    pub types: TypeArena,
    fns: Vec<FnSymbol>,
    args: Vec<ArgSymbol>,
    vars: Vec<VarSymbol>,
    exprs: Vec<Expr>,
    /// Top-level definition block; generated iterator families land here.
    pub program_block: ExprId,
    pub t_unknown: TypeId,
    pub t_void: TypeId,
    pub t_c_string: TypeId,
    cur_line: u32,
}

impl ProgramGraph {
    pub fn new() -> Self {
        let mut types = TypeArena::new();
        let t_unknown = types.intern(TypeKind::Unknown);
        let t_void = types.intern(TypeKind::Void);
        let t_c_string = types.intern(TypeKind::CStr);

        let mut graph = ProgramGraph {
            interner: Interner::new(),
            types,
            fns: Vec::new(),
            args: Vec::new(),
            vars: Vec::new(),
            exprs: Vec::new(),
            program_block: ExprId(0),
            t_unknown,
            t_void,
            t_c_string,
            cur_line: 0,
        };
        graph.program_block = graph.new_expr(ExprKind::Block { body: Vec::new() });
        graph
    }

    /// Line attached to nodes built from here on.
    pub fn set_line(&mut self, line: u32) {
        self.cur_line = line;
    }

    pub fn line(&self) -> u32 {
        self.cur_line
    }

    // ===== Node access =====

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0 as usize]
    }

    pub fn expr_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.exprs[id.0 as usize]
    }

    pub fn func(&self, id: FnId) -> &FnSymbol {
        &self.fns[id.0 as usize]
    }

    pub fn func_mut(&mut self, id: FnId) -> &mut FnSymbol {
        &mut self.fns[id.0 as usize]
    }

    pub fn formal(&self, id: ArgId) -> &ArgSymbol {
        &self.args[id.0 as usize]
    }

    pub fn formal_mut(&mut self, id: ArgId) -> &mut ArgSymbol {
        &mut self.args[id.0 as usize]
    }

    pub fn var(&self, id: VarId) -> &VarSymbol {
        &self.vars[id.0 as usize]
    }

    pub fn var_mut(&mut self, id: VarId) -> &mut VarSymbol {
        &mut self.vars[id.0 as usize]
    }

    // ===== Symbol creation =====

    pub fn new_fn(&mut self, name: Name) -> FnId {
        let body = self.new_expr(ExprKind::Block { body: Vec::new() });
        let id = FnId(self.fns.len() as u32);
        self.fns.push(FnSymbol {
            name,
            cname: name,
            formals: Vec::new(),
            body,
            ret_type: self.t_void,
            ret_tag: RetTag::Value,
            flags: FlagSet::empty(),
            receiver: None,
            throws: false,
            where_clause: None,
            instantiation_point: None,
            def_point: None,
        });
        id
    }

    pub fn new_arg(&mut self, name: Name, ty: TypeId, intent: Intent) -> ArgId {
        let id = ArgId(self.args.len() as u32);
        self.args.push(ArgSymbol {
            name,
            ty,
            intent,
            default_expr: None,
            type_expr: None,
            flags: FlagSet::empty(),
        });
        id
    }

    pub fn new_var(&mut self, name: Name, ty: TypeId) -> VarId {
        let id = VarId(self.vars.len() as u32);
        self.vars.push(VarSymbol {
            name,
            ty,
            flags: FlagSet::empty(),
            immediate: None,
        });
        id
    }

    /// A fresh untyped temporary; resolution fills the type in later.
    pub fn new_temp(&mut self, name: &str) -> VarId {
        let name = self.interner.intern(name);
        self.new_var(name, self.t_unknown)
    }

    /// A c_string literal symbol.
    pub fn c_string_literal(&mut self, value: &str) -> VarId {
        let name = self.interner.intern(value);
        let id = self.new_var(name, self.t_c_string);
        self.var_mut(id).immediate = Some(Immediate::Str(value.to_string()));
        id
    }

    pub fn add_formal(&mut self, func: FnId, formal: ArgId) {
        self.func_mut(func).formals.push(formal);
    }

    // ===== Symbol queries =====

    pub fn sym_name(&self, sym: SymId) -> Name {
        match sym {
            SymId::Fn(f) => self.func(f).name,
            SymId::Arg(a) => self.formal(a).name,
            SymId::Var(v) => self.var(v).name,
            SymId::Type(_) => panic!("type symbols have no interned name"),
        }
    }

    pub fn sym_type(&self, sym: SymId) -> TypeId {
        match sym {
            SymId::Fn(f) => self.func(f).ret_type,
            SymId::Arg(a) => self.formal(a).ty,
            SymId::Var(v) => self.var(v).ty,
            SymId::Type(t) => t,
        }
    }

    pub fn has_flag(&self, sym: SymId, flag: Flag) -> bool {
        match sym {
            SymId::Fn(f) => self.func(f).flags.has(flag),
            SymId::Arg(a) => self.formal(a).flags.has(flag),
            SymId::Var(v) => self.var(v).flags.has(flag),
            SymId::Type(_) => false,
        }
    }

    pub fn add_flag(&mut self, sym: SymId, flag: Flag) {
        match sym {
            SymId::Fn(f) => self.func_mut(f).flags.set(flag),
            SymId::Arg(a) => self.formal_mut(a).flags.set(flag),
            SymId::Var(v) => self.var_mut(v).flags.set(flag),
            SymId::Type(_) => panic!("type symbols carry no flags"),
        }
    }

    pub fn type_display(&self, ty: TypeId) -> String {
        self.types.display(ty, &self.interner)
    }

    // ===== Expression creation =====

    pub fn new_expr(&mut self, kind: ExprKind) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(Expr {
            kind,
            parent: None,
            line: self.cur_line,
        });
        id
    }

    pub fn sym_expr(&mut self, sym: SymId) -> ExprId {
        self.new_expr(ExprKind::Sym(sym))
    }

    pub fn unresolved(&mut self, name: Name) -> ExprId {
        self.new_expr(ExprKind::Unresolved(name))
    }

    pub fn def_expr(&mut self, sym: SymId) -> ExprId {
        self.new_expr(ExprKind::Def(sym))
    }

    pub fn call_fn(&mut self, func: FnId) -> ExprId {
        self.new_expr(ExprKind::Call(CallData {
            target: CallTarget::Fn(func),
            actuals: SmallVec::new(),
            square: false,
        }))
    }

    pub fn call_named(&mut self, name: Name) -> ExprId {
        self.new_expr(ExprKind::Call(CallData {
            target: CallTarget::Name(name),
            actuals: SmallVec::new(),
            square: false,
        }))
    }

    pub fn call_prim(&mut self, prim: Prim, actuals: &[ExprId]) -> ExprId {
        let call = self.new_expr(ExprKind::Call(CallData {
            target: CallTarget::Prim(prim),
            actuals: SmallVec::new(),
            square: false,
        }));
        for &a in actuals {
            self.add_actual(call, a);
        }
        call
    }

    pub fn block(&mut self, body: Vec<ExprId>) -> ExprId {
        let id = self.new_expr(ExprKind::Block { body: body.clone() });
        for stmt in body {
            self.expr_mut(stmt).parent = Some(id);
        }
        id
    }

    pub fn add_actual(&mut self, call: ExprId, actual: ExprId) {
        match &mut self.expr_mut(call).kind {
            ExprKind::Call(data) => data.actuals.push(actual),
            _ => panic!("add_actual on a non-call node"),
        }
        self.expr_mut(actual).parent = Some(call);
    }

    // ===== Expression queries =====

    pub fn call_actuals(&self, call: ExprId) -> Vec<ExprId> {
        match &self.expr(call).kind {
            ExprKind::Call(data) => data.actuals.to_vec(),
            _ => panic!("call_actuals on a non-call node"),
        }
    }

    pub fn call_target(&self, call: ExprId) -> CallTarget {
        match &self.expr(call).kind {
            ExprKind::Call(data) => data.target,
            _ => panic!("call_target on a non-call node"),
        }
    }

    /// The function a call invokes, when its target is already resolved.
    pub fn resolved_fn(&self, call: ExprId) -> Option<FnId> {
        match &self.expr(call).kind {
            ExprKind::Call(data) => match data.target {
                CallTarget::Fn(f) => Some(f),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn block_body(&self, block: ExprId) -> Vec<ExprId> {
        match &self.expr(block).kind {
            ExprKind::Block { body } => body.clone(),
            _ => panic!("block_body on a non-block node"),
        }
    }

    pub fn block_tail(&self, block: ExprId) -> Option<ExprId> {
        match &self.expr(block).kind {
            ExprKind::Block { body } => body.last().copied(),
            _ => panic!("block_tail on a non-block node"),
        }
    }

    /// The statement containing `expr`: the ancestor whose parent is a block.
    pub fn enclosing_stmt(&self, expr: ExprId) -> ExprId {
        let mut cur = expr;
        while let Some(parent) = self.expr(cur).parent {
            if matches!(self.expr(parent).kind, ExprKind::Block { .. }) {
                return cur;
            }
            cur = parent;
        }
        cur
    }

    /// The scope block names at `expr` resolve in; generated wrappers record
    /// it as their instantiation point.
    pub fn visibility_block(&self, expr: ExprId) -> ExprId {
        let mut cur = expr;
        while let Some(parent) = self.expr(cur).parent {
            if matches!(self.expr(parent).kind, ExprKind::Block { .. }) {
                return parent;
            }
            cur = parent;
        }
        self.program_block
    }

    // ===== Graph surgery =====

    pub fn push_stmt(&mut self, block: ExprId, stmt: ExprId) {
        match &mut self.expr_mut(block).kind {
            ExprKind::Block { body } => body.push(stmt),
            _ => panic!("push_stmt on a non-block node"),
        }
        self.expr_mut(stmt).parent = Some(block);
    }

    pub fn insert_at_head(&mut self, block: ExprId, stmt: ExprId) {
        match &mut self.expr_mut(block).kind {
            ExprKind::Block { body } => body.insert(0, stmt),
            _ => panic!("insert_at_head on a non-block node"),
        }
        self.expr_mut(stmt).parent = Some(block);
    }

    pub fn insert_before(&mut self, stmt: ExprId, new_stmt: ExprId) {
        let block = self
            .expr(stmt)
            .parent
            .expect("insert_before on a detached statement");
        match &mut self.expr_mut(block).kind {
            ExprKind::Block { body } => {
                let pos = body
                    .iter()
                    .position(|&s| s == stmt)
                    .expect("statement not found in its parent block");
                body.insert(pos, new_stmt);
            }
            _ => panic!("insert_before: parent is not a block"),
        }
        self.expr_mut(new_stmt).parent = Some(block);
    }

    pub fn insert_after(&mut self, stmt: ExprId, new_stmt: ExprId) {
        let block = self
            .expr(stmt)
            .parent
            .expect("insert_after on a detached statement");
        match &mut self.expr_mut(block).kind {
            ExprKind::Block { body } => {
                let pos = body
                    .iter()
                    .position(|&s| s == stmt)
                    .expect("statement not found in its parent block");
                body.insert(pos + 1, new_stmt);
            }
            _ => panic!("insert_after: parent is not a block"),
        }
        self.expr_mut(new_stmt).parent = Some(block);
    }

    /// Detach `expr` from its parent's child list and return it.
    pub fn remove(&mut self, expr: ExprId) -> ExprId {
        let parent = self
            .expr(expr)
            .parent
            .expect("remove on an already-detached node");
        match &mut self.expr_mut(parent).kind {
            ExprKind::Block { body } => {
                let pos = body
                    .iter()
                    .position(|&s| s == expr)
                    .expect("node not found in its parent block");
                body.remove(pos);
            }
            ExprKind::Call(data) => {
                let pos = data
                    .actuals
                    .iter()
                    .position(|&a| a == expr)
                    .expect("node not found in its parent call");
                data.actuals.remove(pos);
            }
            _ => panic!("remove: unsupported parent kind"),
        }
        self.expr_mut(expr).parent = None;
        expr
    }

    pub fn remove_tail(&mut self, block: ExprId) -> ExprId {
        let tail = self.block_tail(block).expect("remove_tail on an empty block");
        self.remove(tail)
    }

    /// Swap `old` for `new_expr` in `old`'s parent slot. `old` is detached.
    pub fn replace(&mut self, old: ExprId, new_expr: ExprId) {
        let parent = self
            .expr(old)
            .parent
            .expect("replace on a detached node");
        match &mut self.expr_mut(parent).kind {
            ExprKind::Block { body } => {
                let pos = body
                    .iter()
                    .position(|&s| s == old)
                    .expect("node not found in its parent block");
                body[pos] = new_expr;
            }
            ExprKind::Call(data) => {
                let pos = data
                    .actuals
                    .iter()
                    .position(|&a| a == old)
                    .expect("node not found in its parent call");
                data.actuals[pos] = new_expr;
            }
            ExprKind::Named { actual, .. } => {
                assert!(*actual == old, "node not found under its named parent");
                *actual = new_expr;
            }
            ExprKind::Cond {
                cond,
                then_stmt,
                else_stmt,
            } => {
                if *cond == old {
                    *cond = new_expr;
                } else if *then_stmt == old {
                    *then_stmt = new_expr;
                } else if *else_stmt == Some(old) {
                    *else_stmt = Some(new_expr);
                } else {
                    panic!("node not found under its conditional parent");
                }
            }
            ExprKind::Loop {
                indices, iterator, body, ..
            } => {
                if *indices == old {
                    *indices = new_expr;
                } else if *iterator == old {
                    *iterator = new_expr;
                } else if *body == old {
                    *body = new_expr;
                } else {
                    panic!("node not found under its loop parent");
                }
            }
            _ => panic!("replace: unsupported parent kind"),
        }
        self.expr_mut(new_expr).parent = Some(parent);
        self.expr_mut(old).parent = None;
    }

    // ===== Deep copy and substitution =====

    /// Clone a subtree. `Sym` references are rewritten through `map`;
    /// cloned definitions record their replacement in `map`.
    pub fn copy_expr(&mut self, expr: ExprId, map: &mut SymbolMap) -> ExprId {
        let Expr { kind, line, .. } = self.expr(expr).clone();
        let saved_line = self.cur_line;
        self.cur_line = line;
        let copied = match kind {
            ExprKind::Sym(s) => {
                let s = map.get(&s).copied().unwrap_or(s);
                self.new_expr(ExprKind::Sym(s))
            }
            ExprKind::Unresolved(n) => self.new_expr(ExprKind::Unresolved(n)),
            ExprKind::Def(s) => {
                let replacement = self.clone_defined_symbol(s, map);
                self.new_expr(ExprKind::Def(replacement))
            }
            ExprKind::Named { name, actual } => {
                let actual = self.copy_expr(actual, map);
                let id = self.new_expr(ExprKind::Named { name, actual });
                self.expr_mut(actual).parent = Some(id);
                id
            }
            ExprKind::Call(data) => {
                let actuals: Vec<ExprId> = data
                    .actuals
                    .iter()
                    .map(|&a| self.copy_expr(a, map))
                    .collect();
                let id = self.new_expr(ExprKind::Call(CallData {
                    target: data.target,
                    actuals: SmallVec::new(),
                    square: data.square,
                }));
                for a in actuals {
                    self.add_actual(id, a);
                }
                id
            }
            ExprKind::Block { body } => {
                let body: Vec<ExprId> = body.iter().map(|&s| self.copy_expr(s, map)).collect();
                self.block(body)
            }
            ExprKind::Cond {
                cond,
                then_stmt,
                else_stmt,
            } => {
                let cond = self.copy_expr(cond, map);
                let then_stmt = self.copy_expr(then_stmt, map);
                let else_stmt = else_stmt.map(|e| self.copy_expr(e, map));
                let id = self.new_expr(ExprKind::Cond {
                    cond,
                    then_stmt,
                    else_stmt,
                });
                self.expr_mut(cond).parent = Some(id);
                self.expr_mut(then_stmt).parent = Some(id);
                if let Some(e) = else_stmt {
                    self.expr_mut(e).parent = Some(id);
                }
                id
            }
            ExprKind::Loop {
                kind,
                indices,
                iterator,
                body,
                zippered,
            } => {
                let indices = self.copy_expr(indices, map);
                let iterator = self.copy_expr(iterator, map);
                let body = self.copy_expr(body, map);
                let id = self.new_expr(ExprKind::Loop {
                    kind,
                    indices,
                    iterator,
                    body,
                    zippered,
                });
                self.expr_mut(indices).parent = Some(id);
                self.expr_mut(iterator).parent = Some(id);
                self.expr_mut(body).parent = Some(id);
                id
            }
        };
        self.cur_line = saved_line;
        copied
    }

    fn clone_defined_symbol(&mut self, sym: SymId, map: &mut SymbolMap) -> SymId {
        match sym {
            SymId::Var(v) => {
                let src = self.var(v).clone();
                let id = VarId(self.vars.len() as u32);
                self.vars.push(src);
                map.insert(sym, SymId::Var(id));
                SymId::Var(id)
            }
            _ => panic!("cannot clone a non-variable definition inside a body"),
        }
    }

    /// Clone a formal, including its default and type expression blocks.
    pub fn copy_formal(&mut self, formal: ArgId, map: &mut SymbolMap) -> ArgId {
        let src = self.formal(formal).clone();
        let default_expr = src.default_expr.map(|e| self.copy_expr(e, map));
        let type_expr = src.type_expr.map(|e| self.copy_expr(e, map));
        let id = ArgId(self.args.len() as u32);
        self.args.push(ArgSymbol {
            name: src.name,
            ty: src.ty,
            intent: src.intent,
            default_expr,
            type_expr,
            flags: src.flags,
        });
        map.insert(SymId::Arg(formal), SymId::Arg(id));
        id
    }

    /// Clone a whole function through `map`: formals, receiver, body, and
    /// where clause all land on the clone.
    pub fn copy_fn(&mut self, func: FnId, map: &mut SymbolMap) -> FnId {
        let src = self.func(func).clone();
        let formals: Vec<ArgId> = src
            .formals
            .iter()
            .map(|&a| self.copy_formal(a, map))
            .collect();
        let body = self.copy_expr(src.body, map);
        let where_clause = src.where_clause.map(|w| self.copy_expr(w, map));
        let receiver = src
            .receiver
            .map(|r| map.get(&r).copied().unwrap_or(r));

        let id = FnId(self.fns.len() as u32);
        self.fns.push(FnSymbol {
            name: src.name,
            cname: src.cname,
            formals,
            body,
            ret_type: src.ret_type,
            ret_tag: src.ret_tag,
            flags: src.flags,
            receiver,
            throws: src.throws,
            where_clause,
            instantiation_point: src.instantiation_point,
            def_point: None,
        });
        id
    }

    fn walk(&self, root: ExprId, out: &mut Vec<ExprId>) {
        out.push(root);
        match &self.expr(root).kind {
            ExprKind::Sym(_) | ExprKind::Unresolved(_) | ExprKind::Def(_) => {}
            ExprKind::Named { actual, .. } => self.walk(*actual, out),
            ExprKind::Call(data) => {
                for &a in data.actuals.iter() {
                    self.walk(a, out);
                }
            }
            ExprKind::Block { body } => {
                for &s in body {
                    self.walk(s, out);
                }
            }
            ExprKind::Cond {
                cond,
                then_stmt,
                else_stmt,
            } => {
                self.walk(*cond, out);
                self.walk(*then_stmt, out);
                if let Some(e) = else_stmt {
                    self.walk(*e, out);
                }
            }
            ExprKind::Loop {
                indices, iterator, body, ..
            } => {
                self.walk(*indices, out);
                self.walk(*iterator, out);
                self.walk(*body, out);
            }
        }
    }

    /// Rewrite `Sym` references under `root` through `map`.
    pub fn substitute_symbols(&mut self, root: ExprId, map: &SymbolMap) {
        let mut nodes = Vec::new();
        self.walk(root, &mut nodes);
        for node in nodes {
            if let ExprKind::Sym(s) = &mut self.expr_mut(node).kind {
                if let Some(&replacement) = map.get(s) {
                    *s = replacement;
                }
            }
        }
    }

    pub fn collect_calls(&self, root: ExprId) -> Vec<ExprId> {
        let mut nodes = Vec::new();
        self.walk(root, &mut nodes);
        nodes
            .into_iter()
            .filter(|&n| matches!(self.expr(n).kind, ExprKind::Call(_)))
            .collect()
    }

    pub fn collect_defs(&self, root: ExprId) -> Vec<ExprId> {
        let mut nodes = Vec::new();
        self.walk(root, &mut nodes);
        nodes
            .into_iter()
            .filter(|&n| matches!(self.expr(n).kind, ExprKind::Def(_)))
            .collect()
    }
}

impl Default for ProgramGraph {
    fn default() -> Self {
        Self::new()
    }
}
