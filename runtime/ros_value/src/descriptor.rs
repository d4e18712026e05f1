//! Per-type descriptors: the flat polymorphic set replacing inheritance.
//!
//! One descriptor exists per value family. Every polymorphic operation on a
//! value (conversion, operators, member lookup, indexing, calling, display
//! formatting, enumeration) is resolved by delegating to
//! `value.descriptor()`, never by type-switching at call sites. The set is
//! closed (an enum), so dispatch is direct pattern matching rather than
//! trait objects, the same choice the evaluator makes for operators.
//!
//! A descriptor may decline an operation; the shared entry points here fall
//! back (for binary operators, to the other operand's descriptor) and raise
//! the appropriate `TypeError` when nobody handles it.

use crate::culture::Culture;
use crate::enumerate::ValueIter;
use crate::errors::{self, EvalResult};
use crate::native::NativeDescriptor;
use crate::value::{Kind, Value};
use crate::{binary, convert, display, enumerate, members};
use ros_ir::{BinaryOp, ParsedFormatSpec, UnaryOp};
use std::rc::Rc;

/// Type descriptor: one variant per represented value family.
///
/// Primitive descriptors are zero-sized singletons; native descriptors are
/// the host-registered tables carried by the value itself.
#[derive(Clone, Debug)]
pub enum Descriptor {
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
    Native(Rc<NativeDescriptor>),
}

impl Descriptor {
    /// The descriptor for a value. Total over the tag set.
    pub fn of(value: &Value) -> Descriptor {
        match value {
            Value::Null => Descriptor::Null,
            Value::Bool(_) => Descriptor::Bool,
            Value::Int(_) => Descriptor::Int,
            Value::UInt(_) => Descriptor::UInt,
            Value::Float(_) => Descriptor::Float,
            Value::Char(_) => Descriptor::Char,
            Value::Str(_) => Descriptor::Str,
            Value::List(_) => Descriptor::List,
            Value::Function(_) => Descriptor::Function,
            Value::Builtin(_) | Value::Bound(_) => Descriptor::Builtin,
            Value::Native(n) => Descriptor::Native(Rc::clone(&n.descriptor)),
        }
    }

    /// Descriptor (type) name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Descriptor::Null => "null",
            Descriptor::Bool => "bool",
            Descriptor::Int => "int",
            Descriptor::UInt => "uint",
            Descriptor::Float => "double",
            Descriptor::Char => "char",
            Descriptor::Str => "string",
            Descriptor::List => "list",
            Descriptor::Function => "function",
            Descriptor::Builtin => "builtin",
            Descriptor::Native(_) => "native",
        }
    }

    /// Convert `value` to the `target` kind.
    ///
    /// Numeric string parsing fails with `ParseError` on malformed input,
    /// never a silent zero. Culture controls the accepted decimal separator.
    pub fn convert(&self, value: &Value, target: Kind, culture: Culture) -> EvalResult {
        convert::convert(self, value, target, culture)
    }

    /// Named member access on `receiver`.
    pub fn get_member(&self, receiver: &Value, name: &str) -> EvalResult {
        members::get_member(self, receiver, name)
    }

    /// Indexed access `receiver[index]`.
    pub fn index(&self, receiver: &Value, index: &Value) -> EvalResult {
        members::index(self, receiver, index)
    }

    /// Call `callee` with plain argument values.
    ///
    /// Returns `Ok(None)` when this descriptor does not complete calls by
    /// itself (script functions need executor frames; builtins need the
    /// processor back-reference); the executor handles those.
    pub fn call(&self, callee: &Value, args: &[Value]) -> EvalResult<Option<Value>> {
        match (self, callee) {
            (Descriptor::Builtin, Value::Bound(bound)) => {
                (bound.func)(&bound.receiver, args).map(Some)
            }
            (Descriptor::Builtin | Descriptor::Function, _) => Ok(None),
            _ => Err(errors::not_callable(callee.type_name())),
        }
    }

    /// Render `value` as display text, honoring an optional format spec.
    pub fn to_display(
        &self,
        value: &Value,
        spec: Option<&ParsedFormatSpec>,
        culture: Culture,
    ) -> EvalResult<String> {
        display::to_display(self, value, spec, culture)
    }

    /// Lazy, finite, restartable enumeration of `value`'s elements.
    pub fn enumerate(&self, value: &Value) -> EvalResult<ValueIter> {
        enumerate::enumerate(self, value)
    }
}

/// Evaluate a binary operation by descriptor delegation: the left operand's
/// descriptor gets the first chance, the right operand's the second.
pub fn evaluate_binary(op: BinaryOp, lhs: &Value, rhs: &Value, culture: Culture) -> EvalResult {
    if let Some(result) = binary::binary(&lhs.descriptor(), op, lhs, rhs, culture)? {
        return Ok(result);
    }
    if let Some(result) = binary::binary(&rhs.descriptor(), op, lhs, rhs, culture)? {
        return Ok(result);
    }
    Err(errors::invalid_binary_op(
        op,
        lhs.type_name(),
        rhs.type_name(),
    ))
}

/// Evaluate a unary operation through the operand's descriptor.
pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> EvalResult {
    binary::unary(&operand.descriptor(), op, operand)
}
