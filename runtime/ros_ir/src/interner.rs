//! String interner for identifier storage.
//!
//! Provides O(1) interning and lookup. A script session interns a handful of
//! identifiers, so a single locked map is sufficient (no sharding).

use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

struct InternerInner {
    /// Map from string content to index.
    map: FxHashMap<Box<str>, u32>,
    /// Storage for string contents, indexed by `Name::raw()`.
    strings: Vec<Box<str>>,
}

impl InternerInner {
    fn with_empty() -> Self {
        let mut map = FxHashMap::default();
        map.insert(Box::from(""), 0);
        Self {
            map,
            strings: vec![Box::from("")],
        }
    }
}

/// String interner mapping identifier text to compact `Name` ids.
///
/// The empty string is pre-interned as `Name::EMPTY`.
pub struct StringInterner {
    inner: RwLock<InternerInner>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(InternerInner::with_empty()),
        }
    }

    /// Intern a string, returning its `Name`.
    ///
    /// Interning the same content twice returns the same `Name`.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&idx) = self.inner.read().map.get(s) {
            return Name::from_raw(idx);
        }
        let mut inner = self.inner.write();
        // Re-check: another caller may have interned between the locks.
        if let Some(&idx) = inner.map.get(s) {
            return Name::from_raw(idx);
        }
        let idx = u32::try_from(inner.strings.len()).unwrap_or(u32::MAX);
        let boxed: Box<str> = Box::from(s);
        inner.map.insert(boxed.clone(), idx);
        inner.strings.push(boxed);
        Name::from_raw(idx)
    }

    /// Look up the textual form of a `Name`.
    ///
    /// Returns the empty string for names this interner did not produce.
    pub fn lookup(&self, name: Name) -> String {
        self.inner
            .read()
            .strings
            .get(name.raw() as usize)
            .map(|s| s.to_string())
            .unwrap_or_default()
    }

    /// Number of interned strings (including the pre-interned empty string).
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Always false: the empty string is pre-interned.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Cheaply cloneable shared interner handle.
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a fresh shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
