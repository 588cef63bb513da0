// src/sema/caches.rs
//
// Wrapper caches and the iterator-family side tables. Both live for the
// whole resolution pass: wrappers built for one call site are reused by
// any later call site with the same shape.
//
// Shape keys compare by symbol identity, never by name. Two calls omitting
// the same formals of the same callee share one defaults wrapper; two calls
// promoting the same formals at the same concrete types share one
// promotion wrapper.

use rustc_hash::FxHashMap;

use crate::frontend::{ArgId, FnId, SymbolMap, TypeId};

/// A defaults wrapper is keyed by the set of formals the caller omitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DefaultsKey {
    callee: FnId,
    omitted: Vec<ArgId>,
}

impl DefaultsKey {
    fn new(callee: FnId, omitted: &[ArgId]) -> Self {
        let mut omitted = omitted.to_vec();
        omitted.sort_unstable();
        DefaultsKey { callee, omitted }
    }
}

/// A promotion wrapper is keyed by the concrete actual type substituted at
/// each promoted formal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PromotionKey {
    callee: FnId,
    substitutions: Vec<(ArgId, TypeId)>,
}

impl PromotionKey {
    fn new(callee: FnId, substitutions: &[(ArgId, TypeId)]) -> Self {
        let mut substitutions = substitutions.to_vec();
        substitutions.sort_unstable_by_key(|(formal, _)| *formal);
        PromotionKey {
            callee,
            substitutions,
        }
    }
}

/// Pass-lifetime state shared by every call-site visit.
#[derive(Debug, Default)]
pub struct ResolutionState {
    defaults: FxHashMap<DefaultsKey, FnId>,
    promotions: FxHashMap<PromotionKey, FnId>,
    /// Serial promotion wrapper -> its leader iterator.
    pub iterator_leader: FxHashMap<FnId, FnId>,
    /// Serial promotion wrapper -> its follower iterator.
    pub iterator_follower: FxHashMap<FnId, FnId>,
    /// Compile-time values bound to instantiated param formals.
    pub param_map: SymbolMap,
}

impl ResolutionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached_defaults_wrapper(&self, callee: FnId, omitted: &[ArgId]) -> Option<FnId> {
        self.defaults.get(&DefaultsKey::new(callee, omitted)).copied()
    }

    pub fn cache_defaults_wrapper(&mut self, callee: FnId, omitted: &[ArgId], wrapper: FnId) {
        self.defaults.insert(DefaultsKey::new(callee, omitted), wrapper);
    }

    pub fn cached_promotion_wrapper(
        &self,
        callee: FnId,
        substitutions: &[(ArgId, TypeId)],
    ) -> Option<FnId> {
        self.promotions
            .get(&PromotionKey::new(callee, substitutions))
            .copied()
    }

    pub fn cache_promotion_wrapper(
        &mut self,
        callee: FnId,
        substitutions: &[(ArgId, TypeId)],
        wrapper: FnId,
    ) {
        self.promotions
            .insert(PromotionKey::new(callee, substitutions), wrapper);
    }

    /// Drop everything at the end of the resolution pass.
    pub fn clear(&mut self) {
        self.defaults.clear();
        self.promotions.clear();
        self.iterator_leader.clear();
        self.iterator_follower.clear();
        self.param_map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_key_ignores_omission_order() {
        let mut state = ResolutionState::new();
        let callee = FnId(0);
        let wrapper = FnId(1);
        let b = ArgId(1);
        let c = ArgId(2);

        state.cache_defaults_wrapper(callee, &[b, c], wrapper);
        assert_eq!(state.cached_defaults_wrapper(callee, &[c, b]), Some(wrapper));
        assert_eq!(state.cached_defaults_wrapper(callee, &[b]), None);
        assert_eq!(state.cached_defaults_wrapper(FnId(9), &[b, c]), None);
    }

    #[test]
    fn promotion_key_distinguishes_substituted_types() {
        use crate::frontend::{TypeArena, TypeKind};

        let mut arena = TypeArena::new();
        let int = arena.intern(TypeKind::Int);
        let real = arena.intern(TypeKind::Real);
        let int_array = arena.intern(TypeKind::Array { elem: int });
        let real_array = arena.intern(TypeKind::Array { elem: real });

        let mut state = ResolutionState::new();
        let callee = FnId(0);
        let x = ArgId(0);

        state.cache_promotion_wrapper(callee, &[(x, int_array)], FnId(1));
        assert_eq!(
            state.cached_promotion_wrapper(callee, &[(x, int_array)]),
            Some(FnId(1))
        );
        assert_eq!(state.cached_promotion_wrapper(callee, &[(x, real_array)]), None);
    }

    #[test]
    fn clear_empties_every_table() {
        let mut state = ResolutionState::new();
        state.cache_defaults_wrapper(FnId(0), &[ArgId(0)], FnId(1));
        state.iterator_leader.insert(FnId(1), FnId(2));
        state.clear();
        assert_eq!(state.cached_defaults_wrapper(FnId(0), &[ArgId(0)]), None);
        assert!(state.iterator_leader.is_empty());
    }
}
