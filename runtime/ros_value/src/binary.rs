//! The Binary and Unary operator capabilities.
//!
//! Entry points return `Ok(None)` when the descriptor declines the
//! operand pair; `evaluate_binary` in the descriptor module then gives the
//! other operand's descriptor a chance before raising `TypeError`.
//!
//! String rules: `+` concatenates the two operands' string forms,
//! converting a non-string side first; comparisons are ordinal and
//! case-insensitive, deterministic regardless of host locale. `&&`/`||`
//! never reach this layer; the executor short-circuits them.

use crate::culture::Culture;
use crate::descriptor::Descriptor;
use crate::errors::{self, EvalResult};
use crate::value::{Kind, Value};
use ros_ir::{BinaryOp, UnaryOp};
use std::cmp::Ordering;

pub(crate) fn binary(
    desc: &Descriptor,
    op: BinaryOp,
    lhs: &Value,
    rhs: &Value,
    culture: Culture,
) -> EvalResult<Option<Value>> {
    match desc {
        Descriptor::Str => str_binary(op, lhs, rhs, culture),
        Descriptor::Int | Descriptor::UInt | Descriptor::Float => numeric_binary(op, lhs, rhs),
        Descriptor::Bool => bool_binary(op, lhs, rhs),
        Descriptor::Char => char_binary(op, lhs, rhs),
        Descriptor::Null => null_binary(op, lhs, rhs),
        Descriptor::List => list_binary(op, lhs, rhs),
        Descriptor::Function | Descriptor::Builtin | Descriptor::Native(_) => {
            identity_binary(op, lhs, rhs)
        }
    }
}

// Strings

fn str_binary(
    op: BinaryOp,
    lhs: &Value,
    rhs: &Value,
    culture: Culture,
) -> EvalResult<Option<Value>> {
    let lhs_str = to_string_form(lhs, culture)?;
    let rhs_str = to_string_form(rhs, culture)?;
    let (Some(a), Some(b)) = (lhs_str, rhs_str) else {
        return Ok(None);
    };
    match op {
        BinaryOp::Add => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(&a);
            joined.push_str(&b);
            Ok(Some(Value::string(joined)))
        }
        BinaryOp::Eq => Ok(Some(Value::Bool(ordinal_ci(&a, &b) == Ordering::Equal))),
        BinaryOp::Ne => Ok(Some(Value::Bool(ordinal_ci(&a, &b) != Ordering::Equal))),
        BinaryOp::Lt => Ok(Some(Value::Bool(ordinal_ci(&a, &b) == Ordering::Less))),
        BinaryOp::Gt => Ok(Some(Value::Bool(ordinal_ci(&a, &b) == Ordering::Greater))),
        BinaryOp::Le => Ok(Some(Value::Bool(ordinal_ci(&a, &b) != Ordering::Greater))),
        BinaryOp::Ge => Ok(Some(Value::Bool(ordinal_ci(&a, &b) != Ordering::Less))),
        _ => Ok(None),
    }
}

/// The operand's string form, if it has one: strings verbatim, everything
/// displayable through its descriptor's Convert capability.
fn to_string_form(value: &Value, culture: Culture) -> EvalResult<Option<String>> {
    match value {
        Value::Str(s) => Ok(Some(s.to_string())),
        Value::Function(_) | Value::Builtin(_) | Value::Bound(_) => Ok(None),
        _ => {
            let converted = value.descriptor().convert(value, Kind::Str, culture)?;
            Ok(converted.as_str().map(str::to_string))
        }
    }
}

/// Ordinal case-insensitive comparison: code-point order over lowercased
/// forms, independent of the host locale.
fn ordinal_ci(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

// Numerics

/// Numeric view of an operand pair used for promotion.
enum NumPair {
    Float(f64, f64),
    UInt(u64, u64),
    Int(i64, i64),
}

#[allow(clippy::cast_precision_loss, reason = "script numerics are double-based")]
fn num_pair(lhs: &Value, rhs: &Value) -> Option<NumPair> {
    match (lhs, rhs) {
        (Value::Float(a), _) => Some(NumPair::Float(*a, rhs.as_float()?)),
        (_, Value::Float(b)) => Some(NumPair::Float(lhs.as_float()?, *b)),
        (Value::UInt(a), Value::UInt(b)) => Some(NumPair::UInt(*a, *b)),
        _ => {
            let a = match lhs {
                Value::Int(n) => *n,
                Value::UInt(n) => i64::try_from(*n).ok()?,
                _ => return None,
            };
            let b = match rhs {
                Value::Int(n) => *n,
                Value::UInt(n) => i64::try_from(*n).ok()?,
                _ => return None,
            };
            Some(NumPair::Int(a, b))
        }
    }
}

fn numeric_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult<Option<Value>> {
    let Some(pair) = num_pair(lhs, rhs) else {
        return Ok(None);
    };
    match pair {
        NumPair::Float(a, b) => float_binary(op, a, b).map(Some),
        NumPair::Int(a, b) => int_binary(op, a, b).map(Some),
        NumPair::UInt(a, b) => uint_binary(op, a, b).map(Some),
    }
}

fn float_binary(op: BinaryOp, a: f64, b: f64) -> EvalResult {
    Ok(match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Sub => Value::Float(a - b),
        BinaryOp::Mul => Value::Float(a * b),
        BinaryOp::Div => Value::Float(a / b),
        BinaryOp::Mod => Value::Float(a % b),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::Ne => Value::Bool(a != b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Le => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Ge => Value::Bool(a >= b),
        _ => {
            return Err(errors::invalid_binary_op(op, "double", "double"));
        }
    })
}

fn int_binary(op: BinaryOp, a: i64, b: i64) -> EvalResult {
    let checked = |r: Option<i64>, name: &'static str| {
        r.map(Value::Int).ok_or_else(|| errors::integer_overflow(name))
    };
    match op {
        BinaryOp::Add => checked(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked(a.checked_mul(b), "multiplication"),
        BinaryOp::Div => {
            if b == 0 {
                Err(errors::division_by_zero())
            } else {
                checked(a.checked_div(b), "division")
            }
        }
        BinaryOp::Mod => {
            if b == 0 {
                Err(errors::division_by_zero())
            } else {
                checked(a.checked_rem(b), "remainder")
            }
        }
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::Ne => Ok(Value::Bool(a != b)),
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::Le => Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::Ge => Ok(Value::Bool(a >= b)),
        BinaryOp::BitAnd => Ok(Value::Int(a & b)),
        BinaryOp::BitOr => Ok(Value::Int(a | b)),
        BinaryOp::BitXor => Ok(Value::Int(a ^ b)),
        BinaryOp::Shl => checked(
            u32::try_from(b).ok().and_then(|s| a.checked_shl(s)),
            "shift",
        ),
        BinaryOp::Shr => checked(
            u32::try_from(b).ok().and_then(|s| a.checked_shr(s)),
            "shift",
        ),
        BinaryOp::And | BinaryOp::Or => Err(errors::invalid_binary_op(op, "int", "int")),
    }
}

fn uint_binary(op: BinaryOp, a: u64, b: u64) -> EvalResult {
    let checked = |r: Option<u64>, name: &'static str| {
        r.map(Value::UInt).ok_or_else(|| errors::integer_overflow(name))
    };
    match op {
        BinaryOp::Add => checked(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked(a.checked_mul(b), "multiplication"),
        BinaryOp::Div => {
            if b == 0 {
                Err(errors::division_by_zero())
            } else {
                checked(a.checked_div(b), "division")
            }
        }
        BinaryOp::Mod => {
            if b == 0 {
                Err(errors::division_by_zero())
            } else {
                checked(a.checked_rem(b), "remainder")
            }
        }
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::Ne => Ok(Value::Bool(a != b)),
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::Le => Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::Ge => Ok(Value::Bool(a >= b)),
        BinaryOp::BitAnd => Ok(Value::UInt(a & b)),
        BinaryOp::BitOr => Ok(Value::UInt(a | b)),
        BinaryOp::BitXor => Ok(Value::UInt(a ^ b)),
        BinaryOp::Shl => checked(
            u32::try_from(b).ok().and_then(|s| a.checked_shl(s)),
            "shift",
        ),
        BinaryOp::Shr => checked(
            u32::try_from(b).ok().and_then(|s| a.checked_shr(s)),
            "shift",
        ),
        BinaryOp::And | BinaryOp::Or => Err(errors::invalid_binary_op(op, "uint", "uint")),
    }
}

// Remaining families

fn bool_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult<Option<Value>> {
    let (Value::Bool(a), Value::Bool(b)) = (lhs, rhs) else {
        return Ok(None);
    };
    match op {
        BinaryOp::Eq => Ok(Some(Value::Bool(a == b))),
        BinaryOp::Ne => Ok(Some(Value::Bool(a != b))),
        BinaryOp::BitAnd => Ok(Some(Value::Bool(*a && *b))),
        BinaryOp::BitOr => Ok(Some(Value::Bool(*a || *b))),
        BinaryOp::BitXor => Ok(Some(Value::Bool(a != b))),
        _ => Ok(None),
    }
}

fn char_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult<Option<Value>> {
    let (Value::Char(a), Value::Char(b)) = (lhs, rhs) else {
        return Ok(None);
    };
    match op {
        BinaryOp::Eq => Ok(Some(Value::Bool(a == b))),
        BinaryOp::Ne => Ok(Some(Value::Bool(a != b))),
        BinaryOp::Lt => Ok(Some(Value::Bool(a < b))),
        BinaryOp::Le => Ok(Some(Value::Bool(a <= b))),
        BinaryOp::Gt => Ok(Some(Value::Bool(a > b))),
        BinaryOp::Ge => Ok(Some(Value::Bool(a >= b))),
        _ => Ok(None),
    }
}

fn null_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult<Option<Value>> {
    let both_null = matches!(lhs, Value::Null) && matches!(rhs, Value::Null);
    match op {
        BinaryOp::Eq => Ok(Some(Value::Bool(both_null))),
        BinaryOp::Ne => Ok(Some(Value::Bool(!both_null))),
        _ => Ok(None),
    }
}

fn list_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult<Option<Value>> {
    let (Value::List(a), Value::List(b)) = (lhs, rhs) else {
        return Ok(None);
    };
    match op {
        BinaryOp::Add => {
            let mut items = a.to_vec();
            items.extend(b.iter().cloned());
            Ok(Some(Value::list(items)))
        }
        BinaryOp::Eq => Ok(Some(Value::Bool(lhs == rhs))),
        BinaryOp::Ne => Ok(Some(Value::Bool(lhs != rhs))),
        _ => Ok(None),
    }
}

fn identity_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult<Option<Value>> {
    match op {
        BinaryOp::Eq => Ok(Some(Value::Bool(lhs == rhs))),
        BinaryOp::Ne => Ok(Some(Value::Bool(lhs != rhs))),
        _ => Ok(None),
    }
}

// Unary

pub(crate) fn unary(desc: &Descriptor, op: UnaryOp, operand: &Value) -> EvalResult {
    match (op, operand) {
        (UnaryOp::Not, _) => Ok(Value::Bool(!operand.is_truthy())),
        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| errors::integer_overflow("negation")),
        (UnaryOp::Neg, Value::UInt(n)) => i64::try_from(*n)
            .ok()
            .and_then(i64::checked_neg)
            .map(Value::Int)
            .ok_or_else(|| errors::integer_overflow("negation")),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Plus, Value::Int(_) | Value::UInt(_) | Value::Float(_)) => Ok(operand.clone()),
        _ => Err(errors::invalid_unary_op(op.symbol(), desc.name())),
    }
}
