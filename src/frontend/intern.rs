// src/frontend/intern.rs

use std::collections::HashMap;

/// Interned identifier handle. Cheap to copy and compare; resolve through
/// the `Interner` that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(pub u32);

/// Interns strings to unique Name IDs
#[derive(Debug, Default)]
pub struct Interner {
    map: HashMap<String, Name>,
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.map.get(s) {
            return name;
        }

        let name = Name(self.strings.len() as u32);
        self.strings.push(s.to_string());
        self.map.insert(s.to_string(), name);
        name
    }

    pub fn resolve(&self, name: Name) -> &str {
        &self.strings[name.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_returns_same_name() {
        let mut interner = Interner::new();
        let a = interner.intern("leader");
        let b = interner.intern("leader");
        let c = interner.intern("follower");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn resolve_returns_original_string() {
        let mut interner = Interner::new();
        let name = interner.intern("coerce_tmp");
        assert_eq!(interner.resolve(name), "coerce_tmp");
    }
}
