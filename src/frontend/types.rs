// src/frontend/types.rs
//
// Interned type arena for the program graph.
//
// TypeId is a u32 handle with O(1) equality; the arena deduplicates
// structurally so two mentions of `sync int` share one handle. Structural
// predicates live here; dispatch and coercion judgements belong to the
// resolution host.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::frontend::intern::{Interner, Name};

/// Concrete type identity in the `TypeArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> u32 {
        self.0
    }
}

pub type TypeIdVec = SmallVec<[TypeId; 4]>;

/// Structural shape of a type. Token kinds exist so sentinel formals
/// (method token, tag arguments, defaulted-type markers) are typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Unknown,
    Void,
    Bool,
    Int,
    Real,
    Str,
    CStr,

    Any,
    MethodToken,
    TypeDefaultToken,
    LeaderTag,
    FollowerTag,
    /// Placeholder record produced for a not-yet-lowered iterator.
    IteratorRecord,

    Ref(TypeId),
    Sync(TypeId),
    Single(TypeId),
    Tuple(TypeIdVec),

    // Record-wrapped family: runtime identity is a record holding a
    // reference to a shared descriptor.
    Array { elem: TypeId },
    Domain,
    Dist,

    Class { name: Name, parent: Option<TypeId>, fields: SmallVec<[(Name, TypeId); 4]> },
    Record { name: Name, fields: SmallVec<[(Name, TypeId); 4]> },
    Union { name: Name },
}

#[derive(Debug, Default)]
pub struct TypeArena {
    kinds: Vec<TypeKind>,
    lookup: HashMap<TypeKind, TypeId>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.lookup.get(&kind) {
            return id;
        }
        let id = TypeId(self.kinds.len() as u32);
        self.kinds.push(kind.clone());
        self.lookup.insert(kind, id);
        id
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.kinds[id.0 as usize]
    }

    /// The reference type of `ty`, created on first use.
    pub fn make_ref_type(&mut self, ty: TypeId) -> TypeId {
        self.intern(TypeKind::Ref(ty))
    }

    /// The reference type of `ty` if one has already been created.
    pub fn ref_type_of(&self, ty: TypeId) -> Option<TypeId> {
        self.lookup.get(&TypeKind::Ref(ty)).copied()
    }

    /// Strip one level of reference.
    pub fn value_type(&self, ty: TypeId) -> TypeId {
        match self.kind(ty) {
            TypeKind::Ref(inner) => *inner,
            _ => ty,
        }
    }

    pub fn is_ref(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Ref(_))
    }

    pub fn is_sync(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Sync(_))
    }

    pub fn is_single(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Single(_))
    }

    pub fn is_tuple(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Tuple(_))
    }

    pub fn is_string(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Str)
    }

    pub fn is_c_string(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::CStr)
    }

    pub fn is_record(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Record { .. })
    }

    pub fn is_union(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Union { .. })
    }

    pub fn is_class(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Class { .. })
    }

    pub fn is_iterator_record(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::IteratorRecord)
    }

    /// Arrays, domains, and distributions: record-like values wrapping a
    /// shared descriptor.
    pub fn is_record_wrapped(&self, ty: TypeId) -> bool {
        matches!(
            self.kind(ty),
            TypeKind::Array { .. } | TypeKind::Domain | TypeKind::Dist
        )
    }

    /// Direct superclass edge, when `ty` is a class with one.
    pub fn class_parent(&self, ty: TypeId) -> Option<TypeId> {
        match self.kind(ty) {
            TypeKind::Class { parent, .. } => *parent,
            _ => None,
        }
    }

    /// Field declared on this aggregate itself, not on an ancestor.
    pub fn own_field(&self, ty: TypeId, name: Name) -> Option<TypeId> {
        let fields = match self.kind(ty) {
            TypeKind::Class { fields, .. } => fields,
            TypeKind::Record { fields, .. } => fields,
            _ => return None,
        };
        fields.iter().find(|(n, _)| *n == name).map(|(_, t)| *t)
    }

    /// Human-readable spelling for diagnostics.
    pub fn display(&self, ty: TypeId, interner: &Interner) -> String {
        match self.kind(ty) {
            TypeKind::Unknown => "<unknown>".into(),
            TypeKind::Void => "void".into(),
            TypeKind::Bool => "bool".into(),
            TypeKind::Int => "int".into(),
            TypeKind::Real => "real".into(),
            TypeKind::Str => "string".into(),
            TypeKind::CStr => "c_string".into(),
            TypeKind::Any => "<any>".into(),
            TypeKind::MethodToken => "<method token>".into(),
            TypeKind::TypeDefaultToken => "<type default>".into(),
            TypeKind::LeaderTag => "<leader tag>".into(),
            TypeKind::FollowerTag => "<follower tag>".into(),
            TypeKind::IteratorRecord => "<iterator record>".into(),
            TypeKind::Ref(inner) => format!("ref {}", self.display(*inner, interner)),
            TypeKind::Sync(inner) => format!("sync {}", self.display(*inner, interner)),
            TypeKind::Single(inner) => format!("single {}", self.display(*inner, interner)),
            TypeKind::Tuple(elems) => {
                let parts: Vec<String> =
                    elems.iter().map(|e| self.display(*e, interner)).collect();
                format!("({})", parts.join(", "))
            }
            TypeKind::Array { elem } => format!("[] {}", self.display(*elem, interner)),
            TypeKind::Domain => "domain".into(),
            TypeKind::Dist => "dist".into(),
            TypeKind::Class { name, .. }
            | TypeKind::Record { name, .. }
            | TypeKind::Union { name } => interner.resolve(*name).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_deduplicates() {
        let mut arena = TypeArena::new();
        let int = arena.intern(TypeKind::Int);
        let int2 = arena.intern(TypeKind::Int);
        assert_eq!(int, int2);

        let sync_int = arena.intern(TypeKind::Sync(int));
        let sync_int2 = arena.intern(TypeKind::Sync(int));
        assert_eq!(sync_int, sync_int2);
        assert_ne!(int, sync_int);
    }

    #[test]
    fn ref_type_roundtrip() {
        let mut arena = TypeArena::new();
        let int = arena.intern(TypeKind::Int);
        assert_eq!(arena.ref_type_of(int), None);

        let ref_int = arena.make_ref_type(int);
        assert_eq!(arena.ref_type_of(int), Some(ref_int));
        assert_eq!(arena.value_type(ref_int), int);
        assert_eq!(arena.value_type(int), int);
    }

    #[test]
    fn structural_predicates() {
        let mut arena = TypeArena::new();
        let int = arena.intern(TypeKind::Int);
        let arr = arena.intern(TypeKind::Array { elem: int });
        let dom = arena.intern(TypeKind::Domain);

        assert!(arena.is_record_wrapped(arr));
        assert!(arena.is_record_wrapped(dom));
        assert!(!arena.is_record_wrapped(int));
    }

    #[test]
    fn own_field_ignores_parent_fields() {
        let mut arena = TypeArena::new();
        let mut interner = Interner::new();
        let int = arena.intern(TypeKind::Int);
        let x = interner.intern("x");
        let y = interner.intern("y");

        let base = arena.intern(TypeKind::Class {
            name: interner.intern("Base"),
            parent: None,
            fields: smallvec::smallvec![(x, int)],
        });
        let derived = arena.intern(TypeKind::Class {
            name: interner.intern("Derived"),
            parent: Some(base),
            fields: smallvec::smallvec![(y, int)],
        });

        assert_eq!(arena.own_field(derived, y), Some(int));
        assert_eq!(arena.own_field(derived, x), None);
        assert_eq!(arena.own_field(base, x), Some(int));
    }
}
