//! Variable scopes.
//!
//! A `Scope` is one lexical level of bindings with an optional parent.
//! Scopes live here (rather than in the executor crate) because function
//! values capture their defining scope chain by reference, so mutations
//! made inside a function body are visible to the enclosing script.

use crate::value::Value;
use ros_ir::Name;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Whether a binding can be reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// Binding can be reassigned.
    Mutable,
    /// Binding cannot be reassigned (host-registered globals).
    Immutable,
}

impl Mutability {
    /// Returns `true` if this is `Mutable`.
    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }
}

/// Error returned by `Scope::assign` when assignment fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignError {
    /// Variable exists but is immutable.
    Immutable,
    /// Variable not found in any scope.
    Undefined,
}

/// Single-threaded reference-counted interior mutability wrapper.
///
/// Wraps `Rc<RefCell<T>>` so all scope allocations go through one factory
/// method. Not thread-safe, intentionally: the executor is single-threaded
/// cooperative and `Rc` avoids atomic overhead on the variable-access path.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    /// Create a new `LocalScope` wrapping the given value.
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    /// Borrow the inner value immutably.
    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    /// Borrow the inner value mutably.
    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Returns `true` if both handles refer to the same scope.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A variable binding.
#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    mutability: Mutability,
}

/// A single scope containing variable bindings.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    /// Bindings in this scope.
    bindings: FxHashMap<Name, Binding>,
    /// Parent scope for lexical nesting.
    parent: Option<LocalScope<Scope>>,
}

impl Scope {
    /// Create a new empty scope with no parent.
    pub fn new() -> Self {
        Scope::default()
    }

    /// Create a new scope with a parent.
    pub fn with_parent(parent: LocalScope<Scope>) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Define a variable in this scope, shadowing any outer binding.
    #[inline]
    pub fn define(&mut self, name: Name, value: Value, mutability: Mutability) {
        self.bindings.insert(name, Binding { value, mutability });
    }

    /// Look up a variable through the scope chain.
    #[inline]
    pub fn lookup(&self, name: Name) -> Option<Value> {
        if let Some(binding) = self.bindings.get(&name) {
            return Some(binding.value.clone());
        }
        if let Some(parent) = &self.parent {
            return parent.borrow().lookup(name);
        }
        None
    }

    /// Returns `true` if `name` is bound anywhere in the chain.
    pub fn is_bound(&self, name: Name) -> bool {
        if self.bindings.contains_key(&name) {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.borrow().is_bound(name),
            None => false,
        }
    }

    /// Assign to the nearest binding of `name` in the chain.
    #[inline]
    pub fn assign(&mut self, name: Name, value: Value) -> Result<(), AssignError> {
        if let Some(binding) = self.bindings.get_mut(&name) {
            if !binding.mutability.is_mutable() {
                return Err(AssignError::Immutable);
            }
            binding.value = value;
            return Ok(());
        }
        if let Some(parent) = &self.parent {
            return parent.borrow_mut().assign(name, value);
        }
        Err(AssignError::Undefined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn name(n: u32) -> Name {
        Name::from_raw(n)
    }

    #[test]
    fn define_and_lookup() {
        let mut scope = Scope::new();
        scope.define(name(1), Value::Int(42), Mutability::Mutable);
        assert_eq!(scope.lookup(name(1)), Some(Value::Int(42)));
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let parent = LocalScope::new(Scope::new());
        parent
            .borrow_mut()
            .define(name(1), Value::Int(1), Mutability::Mutable);

        let mut child = Scope::with_parent(parent);
        child.define(name(1), Value::Int(2), Mutability::Mutable);
        assert_eq!(child.lookup(name(1)), Some(Value::Int(2)));
    }

    #[test]
    fn assign_reaches_outer_scope() {
        let parent = LocalScope::new(Scope::new());
        parent
            .borrow_mut()
            .define(name(1), Value::Int(1), Mutability::Mutable);

        let mut child = Scope::with_parent(parent.clone());
        assert!(child.assign(name(1), Value::Int(9)).is_ok());
        assert_eq!(parent.borrow().lookup(name(1)), Some(Value::Int(9)));
    }

    #[test]
    fn immutable_binding_rejects_assignment() {
        let mut scope = Scope::new();
        scope.define(name(1), Value::Int(1), Mutability::Immutable);
        assert_eq!(
            scope.assign(name(1), Value::Int(2)),
            Err(AssignError::Immutable)
        );
    }

    #[test]
    fn undefined_assignment_is_reported() {
        let mut scope = Scope::new();
        assert_eq!(
            scope.assign(name(9), Value::Int(2)),
            Err(AssignError::Undefined)
        );
    }
}
