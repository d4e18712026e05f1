//! Runtime values.
//!
//! `Value` is the closed tagged union the whole runtime operates on. A value
//! is immutable once constructed; "mutation" produces a new value assigned
//! back into a variable slot. Every value has a descriptor (derived from its
//! tag, so it can never be missing) and all polymorphic operations route
//! through it; see [`crate::Descriptor`].

use crate::descriptor::Descriptor;
use crate::heap::Heap;
use crate::native::NativeValue;
use crate::props::MethodFn;
use crate::scope::{LocalScope, Scope};
use ros_ir::FunctionDef;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Value kind discriminant, used as a conversion target and for dispatch
/// table indexing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    UInt,
    Float,
    Char,
    Str,
    List,
    Function,
    Builtin,
    Native,
}

/// Built-in callables provided by the runtime itself.
///
/// Their call convention needs the processor back-reference (print sink,
/// culture), so the executor crate performs the actual call; the descriptor
/// layer only identifies them and resolves `string.format` member access.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Builtin {
    /// `print(...)`: formats and emits through the host sink.
    Print,
    /// `string`: the string type object; callable like `print` but silent.
    StringType,
    /// `string.format`: strict formatting.
    StringFormat,
}

impl Builtin {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::StringType => "string",
            Builtin::StringFormat => "string.format",
        }
    }
}

/// A function value: shared definition plus the captured defining scope.
///
/// The scope is captured by reference (`Rc` chain), so assignments inside
/// the function body are visible to the enclosing script.
#[derive(Clone)]
pub struct FunctionValue {
    /// Shared definition (name, params, body).
    pub def: Arc<FunctionDef>,
    /// Scope chain at the point of definition.
    pub captured: LocalScope<Scope>,
}

impl FunctionValue {
    /// Create a function value closing over `captured`.
    pub fn new(def: Arc<FunctionDef>, captured: LocalScope<Scope>) -> Self {
        FunctionValue { def, captured }
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("name", &self.def.name)
            .field("params", &self.def.params.len())
            .finish_non_exhaustive()
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.def, &other.def) && LocalScope::ptr_eq(&self.captured, &other.captured)
    }
}

/// A method bound to its receiver, produced by member access
/// (`"abc".substring`, `vessel.stage`).
#[derive(Clone)]
pub struct BoundMethod {
    /// Member name, for diagnostics.
    pub name: Rc<str>,
    /// The implementation; receives the receiver and the argument slice.
    pub func: MethodFn,
    /// The receiver the method was looked up on.
    pub receiver: Rc<Value>,
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("name", &self.name)
            .field("receiver", &self.receiver)
            .finish_non_exhaustive()
    }
}

impl PartialEq for BoundMethod {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.receiver == other.receiver
    }
}

/// Runtime value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// `null`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// Unsigned 64-bit integer.
    UInt(u64),
    /// Double-precision float.
    Float(f64),
    /// Single code unit.
    Char(char),
    /// String.
    Str(Heap<String>),
    /// List of values.
    List(Heap<Vec<Value>>),
    /// Script function (closure over its defining scope).
    Function(FunctionValue),
    /// Runtime-provided callable.
    Builtin(Builtin),
    /// Method bound to a receiver.
    Bound(BoundMethod),
    /// Opaque host object with a host-registered descriptor.
    Native(NativeValue),
}

impl Value {
    /// Create a string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    /// Create a list value.
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Heap::new(items))
    }

    /// Create a bound method value.
    pub fn bound(name: impl Into<Rc<str>>, func: MethodFn, receiver: Value) -> Self {
        Value::Bound(BoundMethod {
            name: name.into(),
            func,
            receiver: Rc::new(receiver),
        })
    }

    /// Kind discriminant for this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::UInt(_) => Kind::UInt,
            Value::Float(_) => Kind::Float,
            Value::Char(_) => Kind::Char,
            Value::Str(_) => Kind::Str,
            Value::List(_) => Kind::List,
            Value::Function(_) => Kind::Function,
            Value::Builtin(_) | Value::Bound(_) => Kind::Builtin,
            Value::Native(_) => Kind::Native,
        }
    }

    /// The descriptor handling all polymorphic operations for this value.
    ///
    /// Never null by construction: every tag maps to exactly one descriptor.
    pub fn descriptor(&self) -> Descriptor {
        Descriptor::of(self)
    }

    /// Truthiness used by conditions: `null`, `false`, numeric zero, the
    /// NUL char and the empty string are false; everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::UInt(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Char(c) => *c != '\0',
            Value::Str(s) => !s.is_empty(),
            Value::List(_)
            | Value::Function(_)
            | Value::Builtin(_)
            | Value::Bound(_)
            | Value::Native(_) => true,
        }
    }

    /// Signed integer view, when the value is integral.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::UInt(n) => i64::try_from(*n).ok(),
            Value::Char(c) => Some(i64::from(u32::from(*c))),
            _ => None,
        }
    }

    /// Float view for any numeric value.
    #[allow(clippy::cast_precision_loss, reason = "script numerics are double-based")]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::UInt(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Human-readable type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "double",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Function(_) => "function",
            Value::Builtin(_) | Value::Bound(_) => "builtin",
            Value::Native(_) => "native",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn truthiness_table() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(Value::Int(3).is_truthy());
        assert!(Value::string("x").is_truthy());
        assert!(Value::list(vec![]).is_truthy());
    }

    #[test]
    fn every_value_has_a_descriptor() {
        for v in [
            Value::Null,
            Value::Bool(true),
            Value::Int(1),
            Value::UInt(1),
            Value::Float(1.0),
            Value::Char('a'),
            Value::string("s"),
            Value::list(vec![]),
            Value::Builtin(Builtin::Print),
        ] {
            // `of` is total over the tag set; this must not panic.
            let _ = v.descriptor();
        }
    }

    #[test]
    fn string_values_compare_by_content() {
        assert_eq!(Value::string("abc"), Value::string("abc"));
        assert_ne!(Value::string("abc"), Value::string("abd"));
    }
}
