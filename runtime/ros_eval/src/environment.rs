//! Global binding environment.
//!
//! Owns the root scope every script executes under. The runtime builtins
//! (`print`, `string`) and any host-registered globals live here as
//! immutable bindings; scripts can shadow them locally but not reassign
//! them.

use ros_ir::{Name, SharedInterner};
use ros_value::{Builtin, LocalScope, Mutability, Scope, Value};

/// The global scope plus registration helpers.
pub struct Environment {
    globals: LocalScope<Scope>,
}

impl Environment {
    /// Create an environment with the runtime builtins registered.
    pub fn new(interner: &SharedInterner) -> Self {
        let env = Environment {
            globals: LocalScope::new(Scope::new()),
        };
        env.register(interner, "print", Value::Builtin(Builtin::Print));
        env.register(interner, "string", Value::Builtin(Builtin::StringType));
        env
    }

    /// Register an immutable host global (a native object, a constant).
    pub fn register(&self, interner: &SharedInterner, name: &str, value: Value) {
        self.globals
            .borrow_mut()
            .define(interner.intern(name), value, Mutability::Immutable);
    }

    /// Define a mutable global binding.
    pub fn define_global(&self, name: Name, value: Value) {
        self.globals
            .borrow_mut()
            .define(name, value, Mutability::Mutable);
    }

    /// Look up a global binding.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        self.globals.borrow().lookup(name)
    }

    /// Handle to the root scope.
    pub fn globals(&self) -> &LocalScope<Scope> {
        &self.globals
    }
}
