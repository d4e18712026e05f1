//! Host-object interop.
//!
//! Values foreign to the runtime (a vessel handle, a part, ...) are carried
//! opaquely: the core never looks inside them. At startup the host registers
//! [`NativeHook`]s (a capability negotiation of `can_handle` plus
//! `build_descriptor`) and the registry wraps host objects into values
//! whose descriptor exposes exactly the members the host chose to expose.

use crate::props::Props;
use crate::value::Value;
use std::any::Any;
use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

/// Descriptor for one family of host objects.
pub struct NativeDescriptor {
    /// Type name surfaced in diagnostics and `to_display`.
    pub name: Box<str>,
    /// Member table the host registered for this family.
    pub props: Props,
}

impl NativeDescriptor {
    /// Create a descriptor with the given type name and member table.
    pub fn new(name: impl Into<Box<str>>, props: Props) -> Self {
        NativeDescriptor {
            name: name.into(),
            props,
        }
    }
}

impl fmt::Debug for NativeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// An opaque host object paired with its registered descriptor.
#[derive(Clone, Debug)]
pub struct NativeValue {
    /// Host-registered descriptor.
    pub descriptor: Rc<NativeDescriptor>,
    /// The boxed host object; only the host's own member implementations
    /// downcast it.
    pub object: Rc<dyn Any>,
}

impl NativeValue {
    /// Borrow the host object as a concrete type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.object.downcast_ref::<T>()
    }
}

impl PartialEq for NativeValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.object, &other.object)
    }
}

/// Capability negotiation the host implements per native type family.
pub trait NativeHook {
    /// Stable name for this hook (used to reject duplicate registration).
    fn name(&self) -> &str;

    /// Returns `true` if this hook understands `object`.
    fn can_handle(&self, object: &dyn Any) -> bool;

    /// Build the descriptor for this hook's type family.
    ///
    /// Called at most once per registry; the registry caches the result.
    fn build_descriptor(&self) -> Rc<NativeDescriptor>;
}

/// Error raised during host registration.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A hook with the same name was already registered.
    #[error("native hook '{0}' is already registered")]
    DuplicateHook(String),
}

struct RegistryEntry {
    hook: Box<dyn NativeHook>,
    descriptor: OnceCell<Rc<NativeDescriptor>>,
}

/// Registry of host-provided native hooks.
///
/// Populated before the first script executes and read-only afterwards; the
/// runtime only ever routes lookups through it.
#[derive(Default)]
pub struct NativeRegistry {
    entries: Vec<RegistryEntry>,
}

impl NativeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        NativeRegistry::default()
    }

    /// Register a hook; rejects duplicate hook names.
    pub fn register(&mut self, hook: Box<dyn NativeHook>) -> Result<(), RegistryError> {
        if self.entries.iter().any(|e| e.hook.name() == hook.name()) {
            return Err(RegistryError::DuplicateHook(hook.name().to_string()));
        }
        self.entries.push(RegistryEntry {
            hook,
            descriptor: OnceCell::new(),
        });
        Ok(())
    }

    /// Wrap a host object into a value, if some hook handles it.
    pub fn wrap(&self, object: Rc<dyn Any>) -> Option<Value> {
        let entry = self.entries.iter().find(|e| e.hook.can_handle(&*object))?;
        let descriptor = entry
            .descriptor
            .get_or_init(|| entry.hook.build_descriptor())
            .clone();
        Some(Value::Native(NativeValue { descriptor, object }))
    }
}
