// src/sema/well_known.rs
//
// Sentinel symbols, token types, and runtime helper names the resolution
// pass references. Created once per program graph and cached for fast
// comparison; helpers are invoked by name and bound by later resolution.

use crate::frontend::{Immediate, Name, ProgramGraph, TypeId, TypeKind, VarId};

#[derive(Debug, Clone)]
pub struct WellKnown {
    // Sentinel value symbols
    pub true_sym: VarId,
    pub false_sym: VarId,
    /// Marks a defaulted formal whose default is "whatever the type's
    /// default value is".
    pub type_default_token: VarId,
    /// Method-token argument threaded through method-style helper calls.
    pub method_token: VarId,
    pub leader_tag: VarId,
    pub follower_tag: VarId,

    // Token and primitive types
    pub t_void: TypeId,
    pub t_bool: TypeId,
    pub t_int: TypeId,
    pub t_real: TypeId,
    pub t_string: TypeId,
    pub t_c_string: TypeId,
    pub t_any: TypeId,
    pub t_method_token: TypeId,
    pub t_type_default_token: TypeId,
    pub t_leader_tag: TypeId,
    pub t_follower_tag: TypeId,
    pub t_iterator_record: TypeId,

    // Operator and runtime helper names
    pub assign: Name,
    pub equals: Name,
    pub auto_copy: Name,
    pub init_copy: Name,
    pub create_field_default: Name,
    pub read_fe: Name,
    pub read_ff: Name,
    pub to_leader: Name,
    pub to_leader_zip: Name,
    pub to_follower: Name,
    pub to_follower_zip: Name,
    pub to_fast_follower: Name,
    pub to_fast_follower_zip: Name,
    pub build_tuple: Name,
    pub build_tuple_allow_ref: Name,
    pub static_fast_follow_check: Name,
    pub static_fast_follow_check_zip: Name,
    pub dynamic_fast_follow_check: Name,
    pub dynamic_fast_follow_check_zip: Name,
    /// The builtin tuple constructor; field-write specialization never
    /// applies to it.
    pub tuple_construct: Name,

    // Formal names used by generated iterator families
    pub tag_name: Name,
    pub follow_this_name: Name,
    pub fast_name: Name,
    pub x_name: Name,
    pub lead_name: Name,
}

fn sentinel(g: &mut ProgramGraph, name: &str, ty: TypeId) -> VarId {
    let name = g.interner.intern(name);
    g.new_var(name, ty)
}

impl WellKnown {
    pub fn populate(g: &mut ProgramGraph) -> Self {
        let t_void = g.types.intern(TypeKind::Void);
        let t_bool = g.types.intern(TypeKind::Bool);
        let t_int = g.types.intern(TypeKind::Int);
        let t_real = g.types.intern(TypeKind::Real);
        let t_string = g.types.intern(TypeKind::Str);
        let t_c_string = g.types.intern(TypeKind::CStr);
        let t_any = g.types.intern(TypeKind::Any);
        let t_method_token = g.types.intern(TypeKind::MethodToken);
        let t_type_default_token = g.types.intern(TypeKind::TypeDefaultToken);
        let t_leader_tag = g.types.intern(TypeKind::LeaderTag);
        let t_follower_tag = g.types.intern(TypeKind::FollowerTag);
        let t_iterator_record = g.types.intern(TypeKind::IteratorRecord);

        let true_sym = sentinel(g, "true", t_bool);
        g.var_mut(true_sym).immediate = Some(Immediate::Bool(true));
        let false_sym = sentinel(g, "false", t_bool);
        g.var_mut(false_sym).immediate = Some(Immediate::Bool(false));
        let type_default_token = sentinel(g, "_type_default", t_type_default_token);
        let method_token = sentinel(g, "_method_token", t_method_token);
        let leader_tag = sentinel(g, "_leader_tag", t_leader_tag);
        let follower_tag = sentinel(g, "_follower_tag", t_follower_tag);

        WellKnown {
            true_sym,
            false_sym,
            type_default_token,
            method_token,
            leader_tag,
            follower_tag,
            t_void,
            t_bool,
            t_int,
            t_real,
            t_string,
            t_c_string,
            t_any,
            t_method_token,
            t_type_default_token,
            t_leader_tag,
            t_follower_tag,
            t_iterator_record,
            assign: g.interner.intern("="),
            equals: g.interner.intern("=="),
            auto_copy: g.interner.intern("weft__autoCopy"),
            init_copy: g.interner.intern("weft__initCopy"),
            create_field_default: g.interner.intern("_createFieldDefault"),
            read_fe: g.interner.intern("readFE"),
            read_ff: g.interner.intern("readFF"),
            to_leader: g.interner.intern("_toLeader"),
            to_leader_zip: g.interner.intern("_toLeaderZip"),
            to_follower: g.interner.intern("_toFollower"),
            to_follower_zip: g.interner.intern("_toFollowerZip"),
            to_fast_follower: g.interner.intern("_toFastFollower"),
            to_fast_follower_zip: g.interner.intern("_toFastFollowerZip"),
            build_tuple: g.interner.intern("_build_tuple"),
            build_tuple_allow_ref: g.interner.intern("_build_tuple_always_allow_ref"),
            static_fast_follow_check: g.interner.intern("weft__staticFastFollowCheck"),
            static_fast_follow_check_zip: g.interner.intern("weft__staticFastFollowCheckZip"),
            dynamic_fast_follow_check: g.interner.intern("weft__dynamicFastFollowCheck"),
            dynamic_fast_follow_check_zip: g.interner.intern("weft__dynamicFastFollowCheckZip"),
            tuple_construct: g.interner.intern("_construct_tuple"),
            tag_name: g.interner.intern("tag"),
            follow_this_name: g.interner.intern("followThis"),
            fast_name: g.interner.intern("fast"),
            x_name: g.interner.intern("x"),
            lead_name: g.interner.intern("lead"),
        }
    }
}
