//! String interners built on `lasso`.
//!
//! Interners are partitioned by category: one for file paths,
//! one for qualified symbol names. During a scan the interner is mutable and
//! additive-only (`ThreadedRodeo`); at query time callers take an immutable
//! `RodeoReader` snapshot for contention-free shared reads, matching the

use lasso::{Key, Spur, ThreadedRodeo};

use super::identifiers::{FileId, SymbolId};

/// Convert a `lasso::Spur` into one of our domain handles and back.
/// `Spur` and our identifiers are both `u32`-sized, non-zero keys.
fn spur_to_raw(spur: Spur) -> u32 {
    spur.into_usize() as u32
}

fn raw_to_spur(raw: u32) -> Spur {
    Spur::try_from_usize(raw as usize).expect("raw identifier did not round-trip through Spur")
}

/// Interns absolute/relative file paths into stable `FileId` handles.
///
/// Add-only during a scan; safe to share across worker threads because
/// `ThreadedRodeo` uses internal sharding rather than a single global lock.
pub struct PathInterner {
    rodeo: ThreadedRodeo,
}

impl PathInterner {
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Intern a path, returning its stable handle. Re-interning the same
    /// string returns the same handle.
    pub fn intern(&self, path: &str) -> FileId {
        FileId(spur_to_raw(self.rodeo.get_or_intern(path)))
    }

    /// Resolve a handle back to its string. Panics if the handle was never
    /// produced by this interner — handles are not portable across interners.
    pub fn resolve(&self, id: FileId) -> &str {
        self.rodeo.resolve(&raw_to_spur(id.0))
    }

    pub fn try_resolve(&self, id: FileId) -> Option<&str> {
        self.rodeo.try_resolve(&raw_to_spur(id.0))
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for PathInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Interns qualified symbol names (`module.Class.method`, route paths, etc.)
/// into stable `SymbolId` handles. Separate table from `PathInterner` so the
/// two id spaces never collide and each can be sized/profiled independently.
pub struct QualifiedNameInterner {
    rodeo: ThreadedRodeo,
}

impl QualifiedNameInterner {
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    pub fn intern(&self, qualified_name: &str) -> SymbolId {
        SymbolId(spur_to_raw(self.rodeo.get_or_intern(qualified_name)))
    }

    pub fn resolve(&self, id: SymbolId) -> &str {
        self.rodeo.resolve(&raw_to_spur(id.0))
    }

    pub fn try_resolve(&self, id: SymbolId) -> Option<&str> {
        self.rodeo.try_resolve(&raw_to_spur(id.0))
    }

    pub fn get(&self, qualified_name: &str) -> Option<SymbolId> {
        self.rodeo.get(qualified_name).map(|s| SymbolId(spur_to_raw(s)))
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for QualifiedNameInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_interner_returns_stable_handles() {
        let interner = PathInterner::new();
        let a = interner.intern("src/main.rs");
        let b = interner.intern("src/main.rs");
        let c = interner.intern("src/lib.rs");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "src/main.rs");
    }

    #[test]
    fn qualified_name_interner_round_trips() {
        let interner = QualifiedNameInterner::new();
        let id = interner.intern("a.greet");
        assert_eq!(interner.resolve(id), "a.greet");
        assert_eq!(interner.get("a.greet"), Some(id));
        assert_eq!(interner.get("missing"), None);
    }
}
