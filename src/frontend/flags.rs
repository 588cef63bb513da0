// src/frontend/flags.rs
//
// Closed flag enumeration for graph symbols, and the bitset carrying them.
// Later passes read these to decide destruction, folding, and inlining, so
// the set is deliberately closed: adding a flag means auditing its readers.

/// Markers attached to functions, formals, and variables in the program
/// graph. One symbol carries a `FlagSet` of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Flag {
    // Function markers
    Wrapper,
    Invisible,
    Inline,
    CompilerGenerated,
    WasCompilerGenerated,
    InitCopyFn,
    AutoCopyFn,
    AutoDestroyFn,
    DonorFn,
    NoParens,
    Constructor,
    DefaultConstructor,
    TypeConstructor,
    FieldAccessor,
    RefToConst,
    Method,
    MethodPrimary,
    Assignop,
    LastResort,
    PromotionWrapper,
    IteratorFn,
    InlineIterator,
    Generic,
    Resolved,
    Extern,

    // Value markers
    MaybeParam,
    MaybeType,
    ExprTemp,
    CoerceTemp,
    TypeVariable,
    InsertAutoDestroy,
    ArgThis,
    Const,
    RefForConstFieldOfThis,
    InstantiatedParam,
    WrittenFormal,
    IsMeme,
}

/// A set of `Flag`s packed into one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagSet(u64);

impl FlagSet {
    pub const fn empty() -> Self {
        FlagSet(0)
    }

    pub fn has(self, flag: Flag) -> bool {
        self.0 & (1 << flag as u64) != 0
    }

    pub fn set(&mut self, flag: Flag) {
        self.0 |= 1 << flag as u64;
    }

    pub fn clear(&mut self, flag: Flag) {
        self.0 &= !(1 << flag as u64);
    }

    pub fn with(mut self, flag: Flag) -> Self {
        self.set(flag);
        self
    }
}

/// Flags a wrapper inherits verbatim from the function it wraps.
/// `Wrapper`, `Invisible`, `Inline`, and the compiler-generated pair are
/// handled separately by the scaffold.
pub const WRAPPER_FORWARDED_FLAGS: &[Flag] = &[
    Flag::InitCopyFn,
    Flag::AutoCopyFn,
    Flag::AutoDestroyFn,
    Flag::DonorFn,
    Flag::NoParens,
    Flag::Constructor,
    Flag::FieldAccessor,
    Flag::RefToConst,
    Flag::Method,
    Flag::MethodPrimary,
    Flag::Assignop,
    Flag::DefaultConstructor,
    Flag::LastResort,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_clear() {
        let mut flags = FlagSet::empty();
        assert!(!flags.has(Flag::Wrapper));

        flags.set(Flag::Wrapper);
        flags.set(Flag::ExprTemp);
        assert!(flags.has(Flag::Wrapper));
        assert!(flags.has(Flag::ExprTemp));

        flags.clear(Flag::Wrapper);
        assert!(!flags.has(Flag::Wrapper));
        assert!(flags.has(Flag::ExprTemp));
    }

    #[test]
    fn with_builds_incrementally() {
        let flags = FlagSet::empty().with(Flag::MaybeParam).with(Flag::MaybeType);
        assert!(flags.has(Flag::MaybeParam));
        assert!(flags.has(Flag::MaybeType));
        assert!(!flags.has(Flag::CoerceTemp));
    }
}
